//! Session bootstrap
//!
//! Acquires the tokenizer and generator once and hands them to a fresh
//! turn controller. Anything that fails here is a setup failure: no
//! controller is created.

use std::sync::Arc;
use tracing::info;

use super::controller::TurnController;
use super::sink::PresentationSink;
use crate::config::{Config, GeneratorBackend};
use crate::context::{ensure_pad_token, TiktokenTokenizer, Tokenizer};
use crate::error::Result;
use crate::generation::{EchoGenerator, GenerationParams, Generator, HttpGenerator};

/// Build a ready-to-use session from configuration
pub fn build_session<S: PresentationSink>(config: &Config, sink: S) -> Result<TurnController<S>> {
    config.validate()?;
    let budget = config.budget()?;

    let mut tokenizer = TiktokenTokenizer::new(&config.tokenizer.encoding)?;
    if let Some(ref pad) = config.tokenizer.pad_token {
        tokenizer.set_pad_token(pad)?;
    }
    ensure_pad_token(&mut tokenizer)?;

    let generator: Arc<dyn Generator> = match config.generator.backend {
        GeneratorBackend::Http => Arc::new(HttpGenerator::new(&config.generator)?),
        GeneratorBackend::Echo => Arc::new(EchoGenerator::new(tokenizer.eos_token_id())),
    };

    let params = GenerationParams::from_config(&config.generation, tokenizer.eos_token_id());

    info!(
        encoding = tokenizer.encoding(),
        backend = ?config.generator.backend,
        max_context_tokens = budget.max_length(),
        "Session ready"
    );

    Ok(TurnController::new(
        Box::new(tokenizer),
        generator,
        params,
        budget,
        sink,
    ))
}
