//! Ask command implementation.

use super::connect;
use crate::app::QueryOutcome;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::view::{ANSWER_HEADING, ASK_BUSY_LABEL};
use anyhow::Result;
use console::style;
use std::io::Write;

/// Run the ask command.
pub async fn run_ask(question: &str, stream: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ragdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let app = connect(&settings)?;
    app.edit_query(question);

    if stream {
        println!("\n{}", style(ANSWER_HEADING).bold());
        let outcome = app
            .submit_query_streamed(|fragment| {
                print!("{}", fragment);
                std::io::stdout().flush().ok();
            })
            .await;
        println!("\n");
        if let QueryOutcome::Answered(answer) = &outcome {
            Output::answer_details(answer);
        }
        return report(outcome, app.snapshot().answer());
    }

    let spinner = Output::spinner(ASK_BUSY_LABEL);
    let outcome = app.submit_query().await;
    spinner.finish_and_clear();

    if let QueryOutcome::Answered(answer) = &outcome {
        Output::answer(answer);
    }
    report(outcome, app.snapshot().answer())
}

fn report(outcome: QueryOutcome, answer: &str) -> Result<()> {
    match outcome {
        QueryOutcome::Answered(_) => Ok(()),
        QueryOutcome::Skipped => {
            Output::warning("Nothing to ask: the question is empty.");
            Ok(())
        }
        QueryOutcome::Busy => Ok(()),
        QueryOutcome::Failed => {
            Output::error(answer);
            anyhow::bail!("query failed")
        }
    }
}
