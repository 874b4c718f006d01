//! Interactive page: edit a question, ask it, upload documents.

use super::connect;
use crate::app::{App, QueryOutcome};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{IngestSettings, Settings};
use crate::picker::FileSelection;
use crate::view;
use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    /// Replace the query text.
    Edit(String),
    /// Submit the current query.
    Ask,
    /// Upload these paths.
    Upload(Vec<String>),
    /// Redraw the page.
    Show,
    Help,
    Quit,
    Unknown(String),
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return ChatInput::Ask;
        }
        let Some(command) = line.trim_start().strip_prefix(':') else {
            return ChatInput::Edit(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "ask" => ChatInput::Ask,
            "upload" => ChatInput::Upload(parts.map(str::to_string).collect()),
            "show" => ChatInput::Show,
            "help" => ChatInput::Help,
            "quit" | "exit" => ChatInput::Quit,
            other => ChatInput::Unknown(other.to_string()),
        }
    }
}

fn print_help() {
    Output::kv("<text>", "set the question");
    Output::kv("<empty line> or :ask", "ask the question");
    Output::kv(":upload <files...>", "upload .pdf/.txt documents");
    Output::kv(":show", "redraw the page");
    Output::kv(":quit", "exit");
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ragdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let app = connect(&settings)?;

    println!(
        "{}",
        style("Type a question and press enter twice to ask. ':help' lists commands.").dim()
    );
    Output::frame(&view::render(&app.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match ChatInput::parse(&line) {
            ChatInput::Edit(text) => app.edit_query(text),
            ChatInput::Ask => ask(&app),
            ChatInput::Upload(paths) => upload(&app, &paths, &settings.ingest),
            ChatInput::Show => Output::frame(&view::render(&app.snapshot())),
            ChatInput::Help => print_help(),
            ChatInput::Quit => break,
            ChatInput::Unknown(command) => {
                Output::warning(&format!("Unknown command ':{}'. Try ':help'.", command));
            }
        }
    }

    Output::info("Goodbye!");
    Ok(())
}

/// Start a query in the background; the page is redrawn when it completes.
fn ask(app: &App) {
    let snapshot = app.snapshot();
    if snapshot.query().is_empty() {
        return;
    }
    if snapshot.is_querying() {
        Output::warning(&format!("{}...", view::ASK_BUSY_LABEL));
        return;
    }

    let task_app = app.clone();
    tokio::spawn(async move {
        let outcome = task_app.submit_query().await;
        debug!("Query finished: {:?}", outcome);
        if !matches!(outcome, QueryOutcome::Skipped | QueryOutcome::Busy) {
            Output::frame(&view::render(&task_app.snapshot()));
        }
    });
    Output::info(&format!("{}...", view::ASK_BUSY_LABEL));
}

/// Start an upload in the background and report its notice when done.
fn upload(app: &App, paths: &[String], ingest: &IngestSettings) {
    if app.snapshot().is_ingesting() {
        Output::warning(view::PROCESSING_NOTICE);
        return;
    }

    let (mut selection, skipped) = FileSelection::pick(paths, ingest);
    for path in &skipped {
        Output::warning(&format!("Skipping {}: unsupported file type", path.display()));
    }
    if selection.is_empty() {
        return;
    }

    let task_app = app.clone();
    tokio::spawn(async move {
        if let Some(notice) = task_app.handle_upload(&mut selection).await {
            Output::notice(&notice);
            Output::frame(&view::render(&task_app.snapshot()));
        }
    });
    Output::info(view::PROCESSING_NOTICE);
}
