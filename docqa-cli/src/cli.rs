//! Argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ask questions about a folder of text documents.
#[derive(Parser, Debug)]
#[command(name = "docqa", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with engine settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder scanned for .txt, .md and .doc files
    #[arg(long, global = true)]
    pub documents: Option<PathBuf>,

    /// Folder holding the persisted index
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Minimum similarity score (0.0 to 1.0)
    #[arg(long, global = true)]
    pub threshold: Option<f32>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Answer a question from the indexed documents
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// List the chunks most similar to a query
    Search {
        /// The query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Maximum number of results (defaults to the configured top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Rebuild the index from the documents folder
    Refresh {
        /// Delete the persisted index before rebuilding
        #[arg(long)]
        clean: bool,
    },
    /// Show index statistics
    Status,
    /// Interactive question loop
    Chat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_collects_question_words() {
        let cli = Cli::try_parse_from(["docqa", "ask", "what", "is", "rust"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Ask { question: vec!["what".into(), "is".into(), "rust".into()] }
        );
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docqa", "search", "fox", "-k", "2", "--threshold", "0.3", "--documents", "docs",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::Search { query: vec!["fox".into()], k: Some(2) });
        assert_eq!(cli.threshold, Some(0.3));
        assert_eq!(cli.documents, Some(PathBuf::from("docs")));
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["docqa", "ask"]).is_err());
    }

    #[test]
    fn refresh_clean_flag() {
        let cli = Cli::try_parse_from(["docqa", "--json", "refresh", "--clean"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.command, Command::Refresh { clean: true });
    }
}
