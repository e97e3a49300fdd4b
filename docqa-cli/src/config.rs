//! Resolving the engine configuration from file and flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use docqa_rag::RagConfig;

use crate::cli::Cli;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub documents: Option<PathBuf>,
    pub index: Option<PathBuf>,
    pub threshold: Option<f32>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self { documents: cli.documents.clone(), index: cli.index.clone(), threshold: cli.threshold }
    }
}

/// Parse a TOML document into a config. Missing keys keep their defaults.
pub fn parse_toml(source: &str) -> anyhow::Result<RagConfig> {
    Ok(toml::from_str(source)?)
}

/// Defaults, then the optional file, then overrides, then validation.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<RagConfig> {
    let mut config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            parse_toml(&source).with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => RagConfig::default(),
    };

    if let Some(dir) = &overrides.documents {
        config.documents_dir = dir.clone();
    }
    if let Some(dir) = &overrides.index {
        config.index_dir = dir.clone();
    }
    if let Some(threshold) = overrides.threshold {
        config.similarity_threshold = threshold;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}
