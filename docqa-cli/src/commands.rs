//! Command dispatch and output rendering.

use std::fmt::Write as _;
use std::sync::Arc;

use docqa_rag::local::FastEmbedProvider;
use docqa_rag::{IndexStats, RagError, RebuildReport, RetrievalEngine, SearchResult};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::json;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::{self, Overrides};

const PROMPT: &str = "docqa> ";

/// Resolve the configuration, build the engine and run one command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::resolve(cli.config.as_deref(), &Overrides::from(&cli))?;
    let provider = FastEmbedProvider::new(config.embedding_model.clone())?;
    let engine =
        RetrievalEngine::builder().config(config).embedding_provider(Arc::new(provider)).build()?;

    match cli.command {
        Command::Ask { question } => {
            println!("{}", engine.answer(&question.join(" ")).await?);
        }
        Command::Search { query, k } => {
            let k = k.unwrap_or(engine.config().top_k);
            let results = engine.search(&query.join(" "), k).await?;
            print!("{}", render_results(&results));
        }
        Command::Refresh { clean } => {
            if clean {
                info!(dir = %engine.store().dir().display(), "clearing persisted index");
                engine.store().clear().await?;
            }
            let report = engine.refresh().await?;
            print!("{}", render_report(&report));
        }
        Command::Status => {
            let outcome = match engine.initialize().await {
                Ok(()) => Ok(engine.stats().await),
                Err(e) => Err(e),
            };
            println!("{}", render_status(&outcome)?);
        }
        Command::Chat => chat(&engine).await?,
    }
    Ok(())
}

async fn chat(engine: &RetrievalEngine) -> anyhow::Result<()> {
    engine.initialize().await?;
    let mut editor = DefaultEditor::new()?;
    println!("Ask a question. /refresh rebuilds the index, /quit exits.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "/quit" | "/exit" => break,
            "/refresh" => match engine.refresh().await {
                Ok(report) => print!("{}", render_report(&report)),
                Err(e) => eprintln!("Error: {e}"),
            },
            question => match engine.answer(question).await {
                Ok(answer) => println!("{answer}\n"),
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }
    Ok(())
}

/// One block per hit: rank, source, score, then the chunk text.
pub fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results above the similarity threshold.\n".to_string();
    }
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} #{} (score {:.3})\n   {}",
            rank + 1,
            result.metadata.filename,
            result.metadata.chunk_id,
            result.score,
            result.text
        );
    }
    out
}

pub fn render_report(report: &RebuildReport) -> String {
    let mut out = format!(
        "Indexed {} chunks from {} documents.\n",
        report.chunks, report.documents
    );
    for failure in &report.failures {
        let _ = writeln!(out, "Skipped {}: {}", failure.filename, failure.error);
    }
    out
}

/// Stats as pretty JSON, or `{"status": "error", ...}` when the engine
/// could not initialize.
pub fn render_status(outcome: &Result<IndexStats, RagError>) -> anyhow::Result<String> {
    let value = match outcome {
        Ok(stats) => serde_json::to_value(stats)?,
        Err(e) => json!({ "status": "error", "error": e.to_string() }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
