//! Token budget for the running conversation context
//!
//! When the context outgrows the ceiling it is cut back to half the ceiling,
//! not to the ceiling itself, so a truncation buys room for several more
//! turns before the next one.

use thiserror::Error;

/// Smallest ceiling whose half still retains at least one token
pub const MIN_CONTEXT_TOKENS: usize = 2;

/// Token budget errors
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Configuration invalid: context ceiling of {max} tokens is below the minimum of {min}")]
    ConfigurationInvalid { max: usize, min: usize },
}

/// Validated maximum context length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    max_length: usize,
}

impl TokenBudget {
    /// Create a budget with the given ceiling
    pub fn new(max_length: usize) -> Result<Self, BudgetError> {
        if max_length < MIN_CONTEXT_TOKENS {
            return Err(BudgetError::ConfigurationInvalid {
                max: max_length,
                min: MIN_CONTEXT_TOKENS,
            });
        }
        Ok(Self { max_length })
    }

    /// The token ceiling
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of trailing tokens kept after a truncation
    pub fn retained_len(&self) -> usize {
        retained_len(self.max_length)
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self { max_length: 1024 }
    }
}

pub(crate) fn retained_len(max_length: usize) -> usize {
    max_length / 2
}
