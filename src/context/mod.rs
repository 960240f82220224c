//! Conversation context: token ids, the tokenizer adapter and the budget
//!
//! The context is a plain owned buffer of token ids. It is cut back to half
//! the budget whenever a completed turn leaves it above the ceiling.

pub mod buffer;
pub mod models;
pub mod token_budget;
pub mod tokenizer;

pub use buffer::ContextBuffer;
pub use models::{SessionState, TokenId, Turn};
pub use token_budget::{BudgetError, TokenBudget};
pub use tokenizer::{ensure_pad_token, TiktokenTokenizer, Tokenizer, TokenizerError};
