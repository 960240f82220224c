//! Turn-based dialogue session manager
//!
//! Keeps a bounded running context of token ids between a presentation
//! surface and a sequence-generation model, runs one generation step per
//! user turn and extracts only the newly produced reply.

pub mod config;
pub mod context;
pub mod dialogue;
pub mod error;
pub mod generation;
pub mod metrics;

pub use config::Config;
pub use context::{ContextBuffer, TokenBudget, TokenId, Tokenizer};
pub use dialogue::{PresentationSink, Speaker, TurnController, TurnOutcome};
pub use error::{DialogueError, Result};
pub use generation::{GenerationParams, Generator};
