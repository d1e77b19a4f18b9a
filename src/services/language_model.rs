use async_trait::async_trait;

use crate::domain::conversation::Transcript;
use crate::domain::ticket::Ticket;
use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Returns the raw content of the model's reply for this turn.
    async fn complete_turn(
        &self,
        instructions: &str,
        snapshot: &Ticket,
        transcript: &Transcript,
    ) -> AppResult<String>;
}
