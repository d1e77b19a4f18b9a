use std::fmt::Display;

use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::ticket::{Priority, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::HelpdeskRecord;

const UNTITLED: &str = "Untitled ticket";
const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Backend settings are incomplete; nothing was sent.
    DryRun { missing: Vec<&'static str> },
    AuthenticationFailed(AppError),
    CreateFailed(AppError),
    Created { id: u64 },
}

impl SubmissionOutcome {
    /// Operator-facing report. Every failure includes the ticket payload.
    pub fn report(&self, ticket: &Ticket) -> AppResult<String> {
        let mut lines = Vec::new();
        match self {
            SubmissionOutcome::Created { id } => {
                lines.push("[helpdesk] Ticket successfully created.".to_string());
                lines.push(format!("[helpdesk] New ticket ID: {id}"));
                return Ok(format!("\n{}\n\n", lines.join("\n")));
            }
            SubmissionOutcome::DryRun { missing } => {
                lines.push(format!(
                    "[helpdesk] Missing backend settings: {}.",
                    missing.join(", ")
                ));
                lines.push("[helpdesk] Ticket was NOT sent, but payload is shown below:".to_string());
            }
            SubmissionOutcome::AuthenticationFailed(error) => {
                lines.push(format!("[helpdesk] Authentication failed: {error}"));
                lines.push("[helpdesk] Ticket was NOT sent, but payload is shown below:".to_string());
            }
            SubmissionOutcome::CreateFailed(error) => {
                lines.push(format!("[helpdesk] Error creating ticket: {error}"));
                lines.push("[helpdesk] Ticket payload that failed:".to_string());
            }
        }
        Ok(format!(
            "\n{}\n\n{}\n\n",
            lines.join("\n"),
            ticket.to_pretty_json()?
        ))
    }
}

/// Authenticates, composes and creates. Never fails: every problem becomes
/// an outcome the caller reports.
pub async fn submit_ticket(ctx: &AppContext, ticket: &Ticket) -> SubmissionOutcome {
    let Some(credentials) = ctx.config.backend_credentials() else {
        let missing = ctx.config.missing_backend_settings();
        warn!(?missing, "backend not configured, skipping submission");
        return SubmissionOutcome::DryRun { missing };
    };

    let uid = match ctx.issue_tracker.authenticate(&credentials).await {
        Ok(uid) => uid,
        Err(error) => {
            warn!(%error, "backend authentication failed");
            return SubmissionOutcome::AuthenticationFailed(error);
        }
    };

    let record = compose_record(ticket);
    match ctx
        .issue_tracker
        .create_ticket(&credentials, uid, &record)
        .await
    {
        Ok(id) => {
            info!(id, "ticket submitted");
            SubmissionOutcome::Created { id }
        }
        Err(error) => {
            warn!(%error, "ticket creation failed");
            SubmissionOutcome::CreateFailed(error)
        }
    }
}

pub fn compose_record(ticket: &Ticket) -> HelpdeskRecord {
    HelpdeskRecord {
        name: ticket
            .title
            .clone()
            .unwrap_or_else(|| UNTITLED.to_string()),
        description: compose_description(ticket),
        priority: priority_code(ticket.priority).to_string(),
    }
}

/// Helpdesk priority codes; anything unknown lands on medium.
pub fn priority_code(priority: Option<Priority>) -> &'static str {
    match priority {
        Some(Priority::Low) => "0",
        Some(Priority::Medium) | None => "1",
        Some(Priority::High) => "2",
    }
}

pub fn compose_description(ticket: &Ticket) -> String {
    format!(
        "Type: {}\n\
         Problem/Context:\n{}\n\n\
         Expected Outcome:\n{}\n\n\
         Proposed Solution:\n{}\n\n\
         Affected Users:\n{}\n\n\
         Urgency Stars: {}\n\
         Requested By: {}\n\
         Source: {}\n",
        or_not_provided(ticket.ticket_type.map(|t| t.as_str())),
        or_not_provided(ticket.problem_context.as_deref()),
        or_not_provided(ticket.expected_outcome.as_deref()),
        ticket.proposed_solution.as_deref().unwrap_or(""),
        or_not_provided(ticket.affected_users.as_deref()),
        or_not_provided(ticket.urgency_stars),
        or_not_provided(ticket.requested_by.as_deref()),
        ticket.source,
    )
}

fn or_not_provided<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}
