//! Generation backends

pub mod echo;
pub mod http;
pub mod invoker;

pub use echo::EchoGenerator;
pub use http::HttpGenerator;
pub use invoker::{GenerationError, GenerationParams, Generator};
