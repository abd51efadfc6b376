//! Ask command - one question, answered on stdout

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::info;

use super::ingest::ingest_file;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// Text files to ingest before asking (useful with in-memory storage)
    #[arg(long = "context-file")]
    pub context_files: Vec<PathBuf>,

    /// Print the answer as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config).await?;

    for path in &args.context_files {
        let ids = ingest_file(&state.knowledge, path).await?;
        info!(file = %path.display(), chunks = ids.len(), "Context file ingested");
    }

    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let result = state
        .answers
        .ask_with_timeout(&args.question, &[], timeout)
        .await;

    state.knowledge.store().close().await;
    let answer = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!("{}", answer.response);

    if !answer.sources.is_empty() {
        println!("\nSources:");
        for (i, source) in answer.sources.iter().enumerate() {
            println!("  [{}] {}", i + 1, source);
        }
    }

    Ok(())
}
