//! Command-line interface definition for Sonia
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat plus one-shot ask, upload and health
//! commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sonia - chat with your documents from the terminal
///
/// Upload PDFs to the Sonia assistant service and ask questions about them.
#[derive(Parser, Debug, Clone)]
#[command(name = "sonia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the assistant service base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sonia
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to send
        query: String,
    },

    /// Upload a PDF document for question answering
    Upload {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Check whether the assistant service is reachable
    Health {
        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["sonia", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.config, "config/config.yaml");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from(["sonia", "ask", "What is in chapter 2?"]).unwrap();
        if let Commands::Ask { query } = cli.command {
            assert_eq!(query, "What is in chapter 2?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_query() {
        assert!(Cli::try_parse_from(["sonia", "ask"]).is_err());
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::try_parse_from(["sonia", "upload", "docs/report.pdf"]).unwrap();
        if let Commands::Upload { file } = cli.command {
            assert_eq!(file, PathBuf::from("docs/report.pdf"));
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_health_json() {
        let cli = Cli::try_parse_from(["sonia", "health", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Health { json: true }));
    }

    #[test]
    fn test_cli_parse_global_options() {
        let cli = Cli::try_parse_from([
            "sonia",
            "--config",
            "custom.yaml",
            "--api-base",
            "http://remote:8000",
            "--verbose",
            "chat",
        ])
        .unwrap();
        assert_eq!(cli.config, "custom.yaml");
        assert_eq!(cli.api_base, Some("http://remote:8000".to_string()));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["sonia"]).is_err());
    }

    #[test]
    fn test_cli_unknown_subcommand() {
        assert!(Cli::try_parse_from(["sonia", "serve"]).is_err());
    }
}
