//! Running token sequence for one conversation

use super::models::{SessionState, TokenId};
use super::token_budget::retained_len;

/// Ordered token ids representing the conversation so far.
///
/// Grows through [`append`](Self::append) and only ever shrinks through
/// [`enforce_budget`](Self::enforce_budget).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBuffer {
    tokens: Vec<TokenId>,
}

impl ContextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `new_tokens` onto the context, or adopt them if the
    /// context is still empty. Token values are not checked.
    pub fn append(&mut self, new_tokens: &[TokenId]) {
        if self.tokens.is_empty() {
            self.tokens = new_tokens.to_vec();
        } else {
            self.tokens.extend_from_slice(new_tokens);
        }
    }

    /// Keep only the last `max_length / 2` tokens when the context is longer
    /// than `max_length`. Returns how many tokens were dropped.
    pub fn enforce_budget(&mut self, max_length: usize) -> usize {
        if self.tokens.len() <= max_length {
            return 0;
        }

        let keep = retained_len(max_length);
        let dropped = self.tokens.len() - keep;
        self.tokens.drain(..dropped);
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn state(&self) -> SessionState {
        if self.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active
        }
    }
}

impl From<Vec<TokenId>> for ContextBuffer {
    fn from(tokens: Vec<TokenId>) -> Self {
        Self { tokens }
    }
}
