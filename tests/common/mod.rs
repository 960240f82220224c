//! Test doubles for the tokenizer and generator

#![allow(dead_code)]

use async_trait::async_trait;
use dialogue_session::context::{TokenId, Tokenizer, TokenizerError};
use dialogue_session::generation::{GenerationError, GenerationParams, Generator};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const EOS: TokenId = 0;
pub const EOS_TEXT: &str = "<eos>";

const VOCAB: &[(&str, TokenId)] = &[
    ("hello", 7),
    ("there", 8),
    ("how", 10),
    ("are", 11),
    ("you", 12),
    ("fine", 13),
    ("thanks", 14),
    ("hi", 42),
];

/// Whitespace tokenizer over a fixed vocabulary; unknown words fail to encode
#[derive(Default)]
pub struct WordTokenizer {
    pad: Option<String>,
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, TokenizerError> {
        let mut tokens = text
            .split_whitespace()
            .map(|word| {
                VOCAB
                    .iter()
                    .find(|(w, _)| *w == word)
                    .map(|(_, id)| *id)
                    .ok_or_else(|| TokenizerError::EncodeFailed(format!("unknown word '{word}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if append_eos {
            tokens.push(EOS);
        }
        Ok(tokens)
    }

    fn decode(&self, tokens: &[TokenId], skip_special: bool) -> Result<String, TokenizerError> {
        let mut words = Vec::new();
        for id in tokens {
            if *id == EOS {
                if !skip_special {
                    words.push(EOS_TEXT);
                }
                continue;
            }
            let word = VOCAB
                .iter()
                .find(|(_, v)| v == id)
                .map(|(w, _)| *w)
                .ok_or_else(|| TokenizerError::DecodeFailed(format!("unknown id {id}")))?;
            words.push(word);
        }
        Ok(words.join(" "))
    }

    fn eos_token(&self) -> &str {
        EOS_TEXT
    }

    fn eos_token_id(&self) -> TokenId {
        EOS
    }

    fn pad_token(&self) -> Option<&str> {
        self.pad.as_deref()
    }

    fn pad_token_id(&self) -> Option<TokenId> {
        self.pad.as_ref().map(|_| EOS)
    }

    fn set_pad_token(&mut self, token: &str) -> Result<(), TokenizerError> {
        if token != EOS_TEXT {
            return Err(TokenizerError::UnknownToken(token.to_string()));
        }
        self.pad = Some(token.to_string());
        Ok(())
    }
}

/// One scripted generator response
pub enum Step {
    /// Echo the input, then these tokens
    Continue(Vec<TokenId>),
    /// Return exactly this sequence
    Raw(Vec<TokenId>),
    Fail(String),
}

/// Replays scripted responses and records every call
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    steps: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<(Vec<TokenId>, GenerationParams)>>>,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            calls: Arc::default(),
        }
    }

    pub fn inputs(&self) -> Vec<Vec<TokenId>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(input, _)| input.clone())
            .collect()
    }

    pub fn params(&self) -> Vec<GenerationParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        input: &[TokenId],
        params: &GenerationParams,
    ) -> Result<Vec<TokenId>, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_vec(), params.clone()));

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("generator called more often than scripted");

        match step {
            Step::Continue(tokens) => {
                let mut output = input.to_vec();
                output.extend(tokens);
                Ok(output)
            }
            Step::Raw(tokens) => Ok(tokens),
            Step::Fail(msg) => Err(GenerationError::Api(msg)),
        }
    }
}
