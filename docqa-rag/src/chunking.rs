//! Splitting normalized text into overlapping chunks.
//!
//! Sizes and positions are counted in characters, not bytes, so multi-byte
//! text is never cut inside a code point.

use crate::config::RagConfig;
use crate::error::{RagError, Result};

/// A strategy for splitting a normalized document into chunk texts.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks, in left-to-right order.
    ///
    /// Returns an empty `Vec` if the text is empty or blank.
    fn chunk(&self, text: &str) -> Result<Vec<String>>;
}

/// Fixed-size windows with overlap that prefer to cut at a space.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{Chunker, WordBoundaryChunker};
///
/// let chunker = WordBoundaryChunker::new(10, 2);
/// let chunks = chunker.chunk("aaaa bbbb cccc dddd").unwrap();
/// assert_eq!(chunks, vec!["aaaa bbbb", "bb cccc", "cc dddd"]);
/// ```
#[derive(Debug, Clone)]
pub struct WordBoundaryChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordBoundaryChunker {
    /// Create a new `WordBoundaryChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of characters the next window steps back by
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Create a chunker using the sizes from a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

impl Chunker for WordBoundaryChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        split_into_chunks(text, self.chunk_size, self.chunk_overlap)
    }
}

/// Split text into windows of at most `chunk_size` characters.
///
/// A window that ends before the end of the text is pulled back to the last
/// space inside it, as long as that space lies after the window start and
/// still lets the next window (which starts `overlap` characters before the
/// cut) move forward. Otherwise the window is cut hard at `chunk_size`.
/// Pieces are trimmed and empty pieces dropped.
///
/// # Errors
///
/// Returns [`RagError::ChunkingError`] if `chunk_size` is zero or
/// `overlap >= chunk_size`, since no window could then advance.
pub fn split_into_chunks(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(RagError::ChunkingError("chunk_size must be greater than zero".to_string()));
    }
    if overlap >= chunk_size {
        return Err(RagError::ChunkingError(format!(
            "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= chunk_size {
        let whole = text.trim();
        return Ok(if whole.is_empty() { Vec::new() } else { vec![whole.to_string()] });
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = start + chunk_size;

        if end < len {
            if let Some(space) = last_space(&chars[start..end]).map(|offset| start + offset) {
                if space > start + overlap {
                    end = space;
                }
            }
        }

        let piece: String = chars[start..end.min(len)].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        let next = end - overlap;
        if next <= start {
            return Err(RagError::ChunkingError(format!(
                "window at {start} did not advance (chunk_size {chunk_size}, overlap {overlap})"
            )));
        }
        if next >= len {
            break;
        }
        start = next;
    }

    Ok(chunks)
}

fn last_space(window: &[char]) -> Option<usize> {
    window.iter().rposition(|c| *c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_into_chunks("short text", 500, 50).unwrap();
        assert_eq!(chunks, vec!["short text"]);
    }

    #[test]
    fn text_exactly_chunk_size_is_a_single_chunk() {
        let text = "a".repeat(20);
        assert_eq!(split_into_chunks(&text, 20, 5).unwrap(), vec![text]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_into_chunks("", 500, 50).unwrap().is_empty());
        assert!(split_into_chunks("   ", 500, 50).unwrap().is_empty());
    }

    #[test]
    fn cuts_at_spaces_and_steps_back_by_overlap() {
        let chunks = split_into_chunks("aaaa bbbb cccc dddd", 10, 2).unwrap();
        assert_eq!(chunks, vec!["aaaa bbbb", "bb cccc", "cc dddd"]);
    }

    #[test]
    fn word_longer_than_window_is_cut_hard() {
        let chunks = split_into_chunks("abcdefghijklmnop qr", 10, 3).unwrap();
        assert_eq!(chunks, vec!["abcdefghij", "hijklmnop", "nop qr"]);
    }

    #[test]
    fn early_space_that_would_stall_falls_back_to_hard_cut() {
        let text = "ab cdefghijklmnopqrstu";
        let chunks = split_into_chunks(text, 10, 5).unwrap();
        assert_eq!(chunks[0], "ab cdefghi");
        assert_eq!(chunks[1], "efghijklmn");
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "été été été été";
        let chunks = split_into_chunks(text, 8, 1).unwrap();
        assert_eq!(chunks[0], "été été");
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(matches!(split_into_chunks("abc", 4, 4), Err(RagError::ChunkingError(_))));
        assert!(matches!(split_into_chunks("abc", 0, 0), Err(RagError::ChunkingError(_))));
    }

    #[test]
    fn zero_overlap_partitions_text() {
        let chunks = split_into_chunks("one two three four five six", 9, 0).unwrap();
        assert_eq!(chunks, vec!["one two", "three", "four", "five six"]);
    }

    #[test]
    fn trait_delegates_to_split() {
        let chunker = WordBoundaryChunker::from_config(&RagConfig::default());
        assert_eq!(chunker.chunk("hello world").unwrap(), vec!["hello world"]);
    }
}
