//! Dialogue turns and how they are presented

pub mod controller;
pub mod session;
pub mod sink;
pub mod speaker;

pub use controller::{TurnController, TurnError, TurnOutcome};
pub use session::build_session;
pub use sink::{PresentationSink, RecordingSink, TerminalSink};
pub use speaker::{DisplayStyle, Speaker};
