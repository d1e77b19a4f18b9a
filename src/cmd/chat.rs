use std::io::{self, BufRead, Write};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::session::{TicketSession, TurnOutcome};
use crate::workflow::submit::submit_ticket;

const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_loop(ctx, &mut input, &mut output).await
}

/// Drives the conversation until the operator leaves or input ends.
pub async fn run_loop<R, W>(ctx: &AppContext, input: &mut R, output: &mut W) -> AppResult<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Ticket intake assistant")?;
    writeln!(output, "Type 'exit' or 'quit' to stop.\n")?;

    let mut session = TicketSession::new(ctx.config.source.clone());

    loop {
        let line = match prompt_line(input, output, "You: ")? {
            Some(line) if !is_exit(&line) => line,
            _ => {
                writeln!(output, "Bot: Goodbye!")?;
                return Ok(());
            }
        };
        if line.is_empty() {
            continue;
        }

        let outcome = session
            .handle_turn(ctx.language_model.as_ref(), &line)
            .await?;

        let ready = match outcome {
            TurnOutcome::Malformed => {
                writeln!(
                    output,
                    "Bot: Sorry, I had trouble formatting my response. Let me try again.\n"
                )?;
                continue;
            }
            TurnOutcome::Replied {
                assistant_reply,
                ready,
            } => {
                writeln!(output, "Bot: {assistant_reply}\n")?;
                ready
            }
        };
        if !ready {
            continue;
        }

        writeln!(
            output,
            "Bot: I believe the ticket is now ready. Here is a summary of what will be sent:\n"
        )?;
        writeln!(output, "{}", session.ticket().to_pretty_json()?)?;

        let submission = submit_ticket(ctx, session.ticket()).await;
        write!(output, "{}", submission.report(session.ticket())?)?;

        match prompt_line(input, output, "Create another ticket? (y/n): ")? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => {
                session.reset();
                writeln!(output, "\nStarting a new ticket.\n")?;
            }
            _ => {
                writeln!(output, "Bot: Okay, goodbye!")?;
                return Ok(());
            }
        }
    }
}

fn is_exit(line: &str) -> bool {
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| line.eq_ignore_ascii_case(keyword))
}

/// `None` at end of input.
fn prompt_line<R, W>(input: &mut R, output: &mut W, prompt: &str) -> AppResult<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::test_support::{BACKEND_ENV, FakeIssueTracker, ScriptedModel, context_with};

    const NOT_READY: &str = r#"{"assistant_reply": "Which browser?", "ticket": {"type": "bug", "title": "Export broken"}, "is_ticket_ready": false}"#;
    const READY: &str = r#"{"assistant_reply": "All set.", "ticket": {"priority": "high", "urgency_stars": 4}, "is_ticket_ready": true}"#;

    async fn drive(ctx: &AppContext, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        run_loop(ctx, &mut input, &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn matches_exit_keywords_exactly() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit(""));
    }

    #[tokio::test]
    async fn exits_on_keyword_without_calling_model() {
        let model = ScriptedModel::new(Vec::new());
        let ctx = context_with(&[], model.clone(), FakeIssueTracker::succeeding(1, 1));

        let output = drive(&ctx, "Exit\n").await;

        assert!(output.contains("Bot: Goodbye!"));
        assert!(model.seen().is_empty());
    }

    #[tokio::test]
    async fn end_of_input_is_graceful() {
        let ctx = context_with(
            &[],
            ScriptedModel::new(Vec::new()),
            FakeIssueTracker::succeeding(1, 1),
        );
        let output = drive(&ctx, "").await;
        assert!(output.ends_with("Bot: Goodbye!\n"));
    }

    #[tokio::test]
    async fn apologizes_for_malformed_reply_and_continues() {
        let model = ScriptedModel::new(vec!["not json at all", NOT_READY]);
        let ctx = context_with(&[], model.clone(), FakeIssueTracker::succeeding(1, 1));

        let output = drive(&ctx, "export is broken\non Safari\nquit\n").await;

        assert!(output.contains("Bot: Sorry, I had trouble formatting my response."));
        assert!(output.contains("Bot: Which browser?"));
        assert_eq!(model.seen().len(), 2);
    }

    #[tokio::test]
    async fn ready_ticket_without_backend_prints_payload_only() {
        let tracker = FakeIssueTracker::succeeding(7, 42);
        let ctx = context_with(
            &[],
            ScriptedModel::new(vec![NOT_READY, READY]),
            tracker.clone(),
        );

        let output = drive(&ctx, "the export button is broken on Safari\nurgent\nn\n").await;

        assert!(output.contains("Here is a summary of what will be sent"));
        assert!(output.contains("\"priority\": \"high\""));
        assert!(output.contains("Ticket was NOT sent"));
        assert!(output.ends_with("Bot: Okay, goodbye!\n"));
        assert_eq!(tracker.calls(), 0);
    }

    #[tokio::test]
    async fn submits_then_starts_a_fresh_session() {
        let model = ScriptedModel::new(vec![NOT_READY, READY, NOT_READY]);
        let tracker = FakeIssueTracker::succeeding(7, 42);
        let ctx = context_with(BACKEND_ENV, model.clone(), tracker.clone());

        let output = drive(&ctx, "export broken\nurgent\ny\nnew idea\nexit\n").await;

        assert!(output.contains("New ticket ID: 42"));
        assert!(output.contains("Starting a new ticket."));
        assert_eq!(tracker.created().len(), 1);

        let seen = model.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].0, crate::domain::ticket::Ticket::new("Chatbot"));
        assert_eq!(seen[2].1.len(), 1);
    }
}
