use tracing::{debug, warn};

use crate::domain::conversation::Transcript;
use crate::domain::reply::TurnReply;
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::services::LanguageModelService;

pub const INTAKE_INSTRUCTIONS: &str = include_str!("../prompts/intake.md");

/// Added to the transcript when the model's reply could not be parsed.
pub const INVALID_REPLY_NOTE: &str = "I produced invalid JSON. Please ask your question again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Malformed,
    Replied { assistant_reply: String, ready: bool },
}

/// One ticket being built: the record plus the conversation that feeds it.
pub struct TicketSession {
    source: String,
    ticket: Ticket,
    transcript: Transcript,
}

impl TicketSession {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            ticket: Ticket::new(source.clone()),
            transcript: Transcript::new(),
            source,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn reset(&mut self) {
        self.ticket = Ticket::new(self.source.clone());
        self.transcript = Transcript::new();
    }

    /// Runs one operator turn. Model transport errors propagate; an
    /// unparseable reply is recovered here and leaves the ticket untouched.
    pub async fn handle_turn(
        &mut self,
        model: &dyn LanguageModelService,
        input: &str,
    ) -> AppResult<TurnOutcome> {
        self.transcript.push_user(input);

        let raw = model
            .complete_turn(INTAKE_INSTRUCTIONS, &self.ticket, &self.transcript)
            .await?;

        let reply = match TurnReply::parse(&raw) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%err, "model reply was not a valid turn object");
                self.transcript.push_assistant(INVALID_REPLY_NOTE);
                return Ok(TurnOutcome::Malformed);
            }
        };

        if !reply.question_for_user.is_empty() {
            debug!(question = %reply.question_for_user, "model follow-up question");
        }

        self.ticket = self.ticket.clone().merge(reply.ticket);
        self.transcript.push_assistant(reply.assistant_reply.clone());

        Ok(TurnOutcome::Replied {
            assistant_reply: reply.assistant_reply,
            ready: reply.is_ticket_ready,
        })
    }
}
