//! CLI module for Ragdesk.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::{GeneralSettings, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ragdesk - a terminal client for a RAG backend
///
/// Ask questions about your documents and upload new documents for ingestion.
#[derive(Parser, Debug)]
#[command(name = "ragdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Backend base URL (overrides the configuration file)
    #[arg(long, env = "RAGDESK_SERVER", global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration file for this run: `--config`, else the default location.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_deref()
            .map(Settings::expand_path)
            .unwrap_or_else(Settings::default_config_path)
    }

    /// Tracing directive. `-v` flags take precedence over `general.log_level`.
    pub fn log_directive(&self, general: &GeneralSettings) -> String {
        let level = match self.verbose {
            0 => general.log_level.as_str(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!("ragdesk={}", level)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about your documents
    Ask {
        /// The question to ask
        question: String,

        /// Print the answer as it is generated
        #[arg(short, long)]
        stream: bool,
    },

    /// Upload documents for ingestion
    Ingest {
        /// Files to upload (.pdf, .txt)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Start the interactive page
    Chat,

    /// Check configuration and backend health
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest_files() {
        let cli = Cli::try_parse_from(["ragdesk", "ingest", "a.pdf", "b.txt"]).unwrap();
        match cli.command {
            Commands::Ingest { files } => assert_eq!(files, vec!["a.pdf", "b.txt"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ingest_requires_files() {
        assert!(Cli::try_parse_from(["ragdesk", "ingest"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "ragdesk",
            "ask",
            "--stream",
            "what is rag?",
            "-vv",
            "--server",
            "http://rag:9000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.server.as_deref(), Some("http://rag:9000"));
        assert!(matches!(cli.command, Commands::Ask { stream: true, .. }));
    }

    #[test]
    fn test_log_directive_uses_configured_level() {
        let mut general = GeneralSettings::default();
        general.log_level = "debug".to_string();

        let cli = Cli::try_parse_from(["ragdesk", "doctor"]).unwrap();
        assert_eq!(cli.log_directive(&general), "ragdesk=debug");
        assert_eq!(
            cli.log_directive(&GeneralSettings::default()),
            "ragdesk=warn"
        );

        let cli = Cli::try_parse_from(["ragdesk", "doctor", "-v"]).unwrap();
        assert_eq!(cli.log_directive(&general), "ragdesk=info");

        let cli = Cli::try_parse_from(["ragdesk", "doctor", "-vvv"]).unwrap();
        assert_eq!(cli.log_directive(&general), "ragdesk=trace");
    }

    #[test]
    fn test_config_path_follows_flag() {
        let cli = Cli::try_parse_from(["ragdesk", "doctor"]).unwrap();
        assert_eq!(cli.config_path(), Settings::default_config_path());

        let cli = Cli::try_parse_from(["ragdesk", "doctor", "-c", "/tmp/rag.toml"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/rag.toml"));
    }
}
