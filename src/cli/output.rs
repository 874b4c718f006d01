//! CLI output formatting utilities.

use crate::app::IngestNotice;
use crate::backend::QueryResponse;
use crate::view::{Frame, ANSWER_HEADING};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the whole page.
    pub fn frame(frame: &Frame) {
        println!("\n{}", frame);
    }

    /// Print an answer with its sources.
    pub fn answer(answer: &QueryResponse) {
        println!("\n{}", style(ANSWER_HEADING).bold());
        println!("{}\n", answer.response);
        Output::answer_details(answer);
    }

    /// Print the sources and confidence of an answer, if it has any.
    pub fn answer_details(answer: &QueryResponse) {
        if !answer.sources.is_empty() {
            Output::header("Sources");
            for source in &answer.sources {
                Output::list_item(source);
            }
        }
        if let Some(confidence) = answer.confidence {
            Output::kv("Confidence", &format!("{:.0}%", confidence * 100.0));
        }
    }

    /// Print the result of an upload.
    pub fn notice(notice: &IngestNotice) {
        let text = notice.to_string();
        if notice.is_success() {
            Output::success(&text);
        } else {
            Output::error(&text);
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
