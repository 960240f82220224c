//! Tokenizer adapter over tiktoken BPE encodings

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tiktoken_rs::{cl100k_base, p50k_base, r50k_base, CoreBPE};
use tracing::debug;

use super::models::TokenId;

/// Text form of the end-of-turn marker shared by every supported encoding
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Tokenizer errors
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Failed to load encoding {encoding}: {reason}")]
    LoadFailed { encoding: String, reason: String },

    #[error("Unknown special token: {0}")]
    UnknownToken(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    #[error("Decoding failed: {0}")]
    DecodeFailed(String),
}

/// Converts text to token ids and back.
///
/// Implementations expose the end-of-turn marker used to delimit turns and
/// an optional pad token.
pub trait Tokenizer: Send + Sync {
    /// Encode `text`, optionally followed by the end-of-turn marker
    fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, TokenizerError>;

    /// Decode `tokens`, optionally dropping control tokens
    fn decode(&self, tokens: &[TokenId], skip_special: bool) -> Result<String, TokenizerError>;

    fn eos_token(&self) -> &str;

    fn eos_token_id(&self) -> TokenId;

    fn pad_token(&self) -> Option<&str>;

    fn pad_token_id(&self) -> Option<TokenId>;

    /// Designate an existing special token as the pad token
    fn set_pad_token(&mut self, token: &str) -> Result<(), TokenizerError>;
}

/// Alias the pad token to the end-of-turn marker when none is defined.
///
/// Safe to call repeatedly; returns the pad token id in effect.
pub fn ensure_pad_token(tokenizer: &mut dyn Tokenizer) -> Result<TokenId, TokenizerError> {
    if tokenizer.pad_token().is_none() {
        let eos = tokenizer.eos_token().to_string();
        debug!("No pad token defined, aliasing to {}", eos);
        tokenizer.set_pad_token(&eos)?;
    }

    tokenizer
        .pad_token_id()
        .ok_or_else(|| TokenizerError::UnknownToken("<pad>".to_string()))
}

/// Special token table for one encoding
struct SpecialTokens {
    eos_id: TokenId,
    /// Ordinary BPE ranks are `0..rank_limit`
    rank_limit: TokenId,
    by_name: Vec<(&'static str, TokenId)>,
}

impl SpecialTokens {
    fn for_encoding(encoding: &str) -> Option<Self> {
        match encoding {
            "cl100k_base" => Some(Self {
                eos_id: 100257,
                rank_limit: 100256,
                by_name: vec![
                    (END_OF_TEXT, 100257),
                    ("<|fim_prefix|>", 100258),
                    ("<|fim_middle|>", 100259),
                    ("<|fim_suffix|>", 100260),
                    ("<|endofprompt|>", 100276),
                ],
            }),
            "p50k_base" => Some(Self {
                eos_id: 50256,
                rank_limit: 50281,
                by_name: vec![(END_OF_TEXT, 50256)],
            }),
            "r50k_base" => Some(Self {
                eos_id: 50256,
                rank_limit: 50256,
                by_name: vec![(END_OF_TEXT, 50256)],
            }),
            _ => None,
        }
    }

    fn id_of(&self, token: &str) -> Option<TokenId> {
        self.by_name
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, id)| *id)
    }
}

/// Tokenizer backed by a tiktoken BPE encoding
pub struct TiktokenTokenizer {
    bpe: Arc<CoreBPE>,
    encoding: String,
    eos_id: TokenId,
    specials: SpecialTokens,
    special_ids: HashSet<TokenId>,
    pad: Option<(String, TokenId)>,
}

impl TiktokenTokenizer {
    /// Load the named encoding
    pub fn new(encoding: &str) -> Result<Self, TokenizerError> {
        let specials = SpecialTokens::for_encoding(encoding)
            .ok_or_else(|| TokenizerError::UnknownEncoding(encoding.to_string()))?;

        let bpe = match encoding {
            "cl100k_base" => cl100k_base(),
            "p50k_base" => p50k_base(),
            _ => r50k_base(),
        }
        .map_err(|e| TokenizerError::LoadFailed {
            encoding: encoding.to_string(),
            reason: e.to_string(),
        })?;

        let special_ids = specials.by_name.iter().map(|(_, id)| *id).collect();

        Ok(Self {
            bpe: Arc::new(bpe),
            encoding: encoding.to_string(),
            eos_id: specials.eos_id,
            specials,
            special_ids,
            pad: None,
        })
    }

    /// Load with the default encoding (cl100k_base)
    pub fn cl100k() -> Result<Self, TokenizerError> {
        Self::new("cl100k_base")
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn is_special(&self, id: TokenId) -> bool {
        self.special_ids.contains(&id)
    }

    /// Whether `id` is an ordinary rank or a special token of this encoding
    pub fn is_known(&self, id: TokenId) -> bool {
        id < self.specials.rank_limit || self.is_special(id)
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, TokenizerError> {
        // User text is never parsed for special tokens; only the marker we
        // append ourselves delimits turns.
        let mut tokens = self.bpe.encode_ordinary(text);
        if append_eos {
            tokens.push(self.eos_id);
        }
        Ok(tokens)
    }

    fn decode(&self, tokens: &[TokenId], skip_special: bool) -> Result<String, TokenizerError> {
        // CoreBPE panics on ids outside its vocabulary
        if let Some(id) = tokens.iter().find(|id| !self.is_known(**id)) {
            return Err(TokenizerError::DecodeFailed(format!(
                "token id {} is not in the {} vocabulary",
                id, self.encoding
            )));
        }

        let ids: Vec<TokenId> = if skip_special {
            tokens
                .iter()
                .copied()
                .filter(|id| !self.is_special(*id))
                .collect()
        } else {
            tokens.to_vec()
        };

        self.bpe
            .decode(ids)
            .map_err(|e| TokenizerError::DecodeFailed(e.to_string()))
    }

    fn eos_token(&self) -> &str {
        END_OF_TEXT
    }

    fn eos_token_id(&self) -> TokenId {
        self.eos_id
    }

    fn pad_token(&self) -> Option<&str> {
        self.pad.as_ref().map(|(name, _)| name.as_str())
    }

    fn pad_token_id(&self) -> Option<TokenId> {
        self.pad.as_ref().map(|(_, id)| *id)
    }

    fn set_pad_token(&mut self, token: &str) -> Result<(), TokenizerError> {
        let id = self
            .specials
            .id_of(token)
            .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))?;
        self.pad = Some((token.to_string(), id));
        Ok(())
    }
}
