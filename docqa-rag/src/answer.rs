//! Turning ranked search results into an answer string.

use crate::config::DEFAULT_FALLBACK_ANSWER;
use crate::document::SearchResult;

/// Renders ranked results as the text shown to the user.
///
/// Implementations must be deterministic: the same query and results always
/// render the same answer.
pub trait AnswerFormatter: Send + Sync {
    /// Render an answer from results ordered by descending score.
    fn format(&self, query: &str, results: &[SearchResult]) -> String;
}

/// Quotes the best chunk and lists the other files that matched.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{AnswerFormatter, ChunkMetadata, ExtractiveFormatter, SearchResult};
///
/// let hit = |file: &str, text: &str| SearchResult {
///     text: text.into(),
///     score: 0.9,
///     metadata: ChunkMetadata { filename: file.into(), chunk_id: 0, text: text.into() },
/// };
/// let answer = ExtractiveFormatter::default()
///     .format("fox", &[hit("alpha.txt", "The fox."), hit("beta.md", "Foxes.")]);
/// assert_eq!(
///     answer,
///     "Based on document 'alpha.txt':\n\nThe fox.\n\n(Additional information found in: beta.md)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ExtractiveFormatter {
    fallback: String,
}

impl ExtractiveFormatter {
    /// Create a formatter that answers `fallback` when given no results.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self { fallback: fallback.into() }
    }
}

impl Default for ExtractiveFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_ANSWER)
    }
}

impl AnswerFormatter for ExtractiveFormatter {
    fn format(&self, _query: &str, results: &[SearchResult]) -> String {
        let Some((best, rest)) = results.split_first() else {
            return self.fallback.clone();
        };

        let top_file = best.metadata.filename.as_str();
        let mut answer = format!("Based on document '{top_file}':\n\n{}", best.text);

        let mut others: Vec<&str> = Vec::new();
        for result in rest {
            let file = result.metadata.filename.as_str();
            if file != top_file && !others.contains(&file) {
                others.push(file);
            }
        }
        if !others.is_empty() {
            answer.push_str(&format!("\n\n(Additional information found in: {})", others.join(", ")));
        }

        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn hit(file: &str, chunk_id: usize, text: &str, score: f32) -> SearchResult {
        SearchResult {
            text: text.into(),
            score,
            metadata: ChunkMetadata { filename: file.into(), chunk_id, text: text.into() },
        }
    }

    #[test]
    fn single_result_has_no_sources_line() {
        let answer = ExtractiveFormatter::default().format("q", &[hit("a.txt", 0, "Alpha.", 0.9)]);
        assert_eq!(answer, "Based on document 'a.txt':\n\nAlpha.");
    }

    #[test]
    fn other_sources_are_deduplicated_in_first_seen_order() {
        let results = [
            hit("a.txt", 0, "Alpha.", 0.9),
            hit("c.txt", 2, "Gamma.", 0.8),
            hit("a.txt", 1, "Alpha again.", 0.7),
            hit("b.txt", 0, "Beta.", 0.6),
            hit("c.txt", 3, "Gamma again.", 0.5),
        ];
        let answer = ExtractiveFormatter::default().format("q", &results);
        assert!(answer.starts_with("Based on document 'a.txt':\n\nAlpha."));
        assert!(answer.ends_with("(Additional information found in: c.txt, b.txt)"));
    }

    #[test]
    fn same_file_only_has_no_sources_line() {
        let results = [hit("a.txt", 0, "Alpha.", 0.9), hit("a.txt", 1, "More alpha.", 0.8)];
        let answer = ExtractiveFormatter::default().format("q", &results);
        assert!(!answer.contains("Additional information"));
    }

    #[test]
    fn empty_results_render_the_fallback() {
        assert_eq!(ExtractiveFormatter::default().format("q", &[]), "I don't know");
        assert_eq!(ExtractiveFormatter::new("Je ne sais pas").format("q", &[]), "Je ne sais pas");
    }
}
