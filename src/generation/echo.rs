//! Offline generator that answers with the user's last utterance

use async_trait::async_trait;

use super::invoker::{GenerationError, GenerationParams, Generator};
use crate::context::TokenId;

/// Continues the input by repeating its last turn, then the end-of-turn
/// marker. The output never grows past `params.max_length`.
pub struct EchoGenerator {
    eos_token_id: TokenId,
}

impl EchoGenerator {
    pub fn new(eos_token_id: TokenId) -> Self {
        Self { eos_token_id }
    }

    /// Tokens of the last turn, without its trailing marker
    fn last_turn<'a>(&self, input: &'a [TokenId]) -> &'a [TokenId] {
        let body = match input.split_last() {
            Some((last, rest)) if *last == self.eos_token_id => rest,
            _ => input,
        };

        let start = body
            .iter()
            .rposition(|id| *id == self.eos_token_id)
            .map_or(0, |pos| pos + 1);

        &body[start..]
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(
        &self,
        input: &[TokenId],
        params: &GenerationParams,
    ) -> Result<Vec<TokenId>, GenerationError> {
        let room = params.max_length.saturating_sub(input.len());

        let mut output = input.to_vec();
        output.extend(
            self.last_turn(input)
                .iter()
                .copied()
                .chain(std::iter::once(self.eos_token_id))
                .take(room),
        );
        Ok(output)
    }
}
