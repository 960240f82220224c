//! Data models for the conversation context

/// Token id as produced by the tokenizer and consumed by the generator
pub type TokenId = usize;

/// Lifecycle state of a session's context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No turn has completed yet
    Empty,
    /// The context holds at least one token
    Active,
}

/// One user utterance and what became of it.
///
/// Lives only for the duration of a single `run_turn` call.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    pub utterance: String,
    /// Encoded utterance, ending in the end-of-turn marker
    pub user_tokens: Vec<TokenId>,
    /// Length of the generation input; the reply starts here in the output
    pub response_start: usize,
    pub reply: Option<String>,
}

impl Turn {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            ..Default::default()
        }
    }
}
