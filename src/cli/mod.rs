//! Command line entry points
//!
//! - `serve`: HTTP API
//! - `ask`: answer one question and exit
//! - `ingest`: chunk a text file into the knowledge base

pub mod ask;
pub mod ingest;
pub mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Jarvis - personal knowledge assistant
#[derive(Parser)]
#[command(name = "jarvis-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single question from the knowledge base
    Ask(ask::AskArgs),

    /// Add a UTF-8 text file to the knowledge base
    Ingest {
        /// File to chunk and add
        file: PathBuf,
    },
}

/// `.env`, layered configuration and logging, shared by every command
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_context_files() {
        let cli = Cli::try_parse_from([
            "jarvis-rag",
            "ask",
            "What color is the sky?",
            "--context-file",
            "notes.txt",
        ])
        .unwrap();

        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question, "What color is the sky?");
                assert_eq!(args.context_files, vec![PathBuf::from("notes.txt")]);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ingest_requires_file() {
        assert!(Cli::try_parse_from(["jarvis-rag", "ingest"]).is_err());
    }
}
