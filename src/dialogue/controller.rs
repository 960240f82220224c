//! Turn controller
//!
//! Runs one user turn end to end: encode, extend the context, generate,
//! slice out the reply and enforce the budget. The new context is staged on
//! a copy and only committed once every step has succeeded, so a failed turn
//! leaves the conversation exactly as it was.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::sink::PresentationSink;
use super::speaker::Speaker;
use crate::context::{
    ContextBuffer, SessionState, TokenBudget, TokenId, Tokenizer, TokenizerError, Turn,
};
use crate::generation::{GenerationError, GenerationParams, Generator};
use crate::metrics::METRICS;

/// Why a turn did not produce a reply
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("failed to encode input: {0}")]
    Encode(#[source] TokenizerError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("failed to decode reply: {0}")]
    Decode(#[source] TokenizerError),
}

/// Result of a single `run_turn` call
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened
    Ignored,
    Replied {
        reply: String,
        context_len: usize,
        truncated: bool,
    },
    /// The turn failed and the context was left untouched
    Failed { error: String },
}

impl TurnOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            TurnOutcome::Ignored => "ignored",
            TurnOutcome::Replied { .. } => "replied",
            TurnOutcome::Failed { .. } => "failed",
        }
    }
}

/// Staged result of a successful turn, not yet committed
struct StagedTurn {
    context: ContextBuffer,
    dropped: usize,
}

/// Owns one session's context and drives its turns
pub struct TurnController<S: PresentationSink> {
    session_id: Uuid,
    tokenizer: Box<dyn Tokenizer>,
    generator: Arc<dyn Generator>,
    params: GenerationParams,
    budget: TokenBudget,
    context: ContextBuffer,
    sink: S,
}

impl<S: PresentationSink> TurnController<S> {
    /// Create a controller with an empty context.
    ///
    /// The tokenizer should already have its pad token set up (see
    /// [`ensure_pad_token`](crate::context::ensure_pad_token)).
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        generator: Arc<dyn Generator>,
        params: GenerationParams,
        budget: TokenBudget,
        sink: S,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            tokenizer,
            generator,
            params,
            budget,
            context: ContextBuffer::new(),
            sink,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn context(&self) -> &ContextBuffer {
        &self.context
    }

    pub fn state(&self) -> SessionState {
        self.context.state()
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Show an assistant message that is not part of the context
    pub fn greet(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.sink.emit(Speaker::Assistant, text);
        }
    }

    /// Run one conversational turn.
    ///
    /// Never fails: errors are reported to the sink as a system message and
    /// the context is kept as it was before the call.
    pub async fn run_turn(&mut self, user_text: &str) -> TurnOutcome {
        let utterance = user_text.trim();
        if utterance.is_empty() {
            METRICS.record_turn(TurnOutcome::Ignored.metric_label());
            return TurnOutcome::Ignored;
        }

        self.sink.emit(Speaker::User, utterance);

        let mut turn = Turn::new(utterance);
        let outcome = match self.execute(&mut turn).await {
            Ok(staged) => {
                let truncated = staged.dropped > 0;
                if truncated {
                    METRICS.context_truncations.inc();
                    warn!(
                        session = %self.session_id,
                        "Context exceeded {} tokens, dropped {} oldest",
                        self.budget.max_length(),
                        staged.dropped
                    );
                }

                self.context = staged.context;
                METRICS.context_tokens.observe(self.context.len() as f64);

                let reply = turn.reply.take().unwrap_or_default();
                info!(
                    session = %self.session_id,
                    context_len = self.context.len(),
                    "Turn completed"
                );
                self.sink.emit(Speaker::Assistant, &reply);

                TurnOutcome::Replied {
                    reply,
                    context_len: self.context.len(),
                    truncated,
                }
            }
            Err(e) => {
                warn!(session = %self.session_id, "Turn failed: {}", e);
                let error = e.to_string();
                self.sink.emit(Speaker::System, &format!("Error: {}", error));
                TurnOutcome::Failed { error }
            }
        };

        METRICS.record_turn(outcome.metric_label());
        outcome
    }

    async fn execute(&self, turn: &mut Turn) -> Result<StagedTurn, TurnError> {
        turn.user_tokens = self
            .tokenizer
            .encode(&turn.utterance, true)
            .map_err(TurnError::Encode)?;

        let mut staged = self.context.clone();
        staged.append(&turn.user_tokens);
        turn.response_start = staged.len();

        debug!(
            session = %self.session_id,
            user_tokens = turn.user_tokens.len(),
            input_len = turn.response_start,
            "Invoking generator"
        );

        let started = Instant::now();
        let output = self.generator.generate(staged.tokens(), &self.params).await?;
        METRICS
            .generation_duration
            .observe(started.elapsed().as_secs_f64());

        let continuation = reply_tokens(&output, turn.response_start)?;
        METRICS.generated_tokens.observe(continuation.len() as f64);

        turn.reply = Some(
            self.tokenizer
                .decode(continuation, true)
                .map_err(TurnError::Decode)?,
        );

        let mut context = ContextBuffer::from(output);
        let dropped = context.enforce_budget(self.budget.max_length());

        Ok(StagedTurn { context, dropped })
    }
}

/// Tokens generated after the echoed input
fn reply_tokens(output: &[TokenId], response_start: usize) -> Result<&[TokenId], GenerationError> {
    output
        .get(response_start..)
        .ok_or(GenerationError::MalformedOutput {
            input_len: response_start,
            output_len: output.len(),
        })
}
