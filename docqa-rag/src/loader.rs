//! Reading the documents folder.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// File name suffixes treated as plain text.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".txt", ".md", ".doc"];

/// A file that matched a supported extension but could not be read.
#[derive(Debug)]
pub struct DocumentReadFailure {
    /// The file name within the documents folder.
    pub filename: String,
    /// Why the read failed (always [`RagError::DocumentRead`]).
    pub error: RagError,
}

/// The outcome of scanning the documents folder.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully read documents, sorted by file name.
    pub documents: Vec<Document>,
    /// Files that were skipped because they could not be read.
    pub failures: Vec<DocumentReadFailure>,
}

impl LoadReport {
    /// Whether no document was read.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Whether a file name carries one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(filename: &str) -> bool {
    SUPPORTED_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

/// Read every supported file directly inside `dir`.
///
/// A missing folder is created and yields an empty report. Files that fail
/// to read (I/O errors, invalid UTF-8) are logged and collected in
/// [`LoadReport::failures`]; the remaining files are still loaded.
///
/// # Errors
///
/// Returns [`RagError::Io`] only when the folder itself cannot be created
/// or listed.
pub async fn load_documents(dir: impl AsRef<Path>) -> Result<LoadReport> {
    let dir = dir.as_ref();

    if !tokio::fs::try_exists(dir).await? {
        info!(dir = %dir.display(), "documents folder missing, creating it");
        tokio::fs::create_dir_all(dir).await?;
        return Ok(LoadReport::default());
    }

    let mut report = LoadReport::default();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let Some(filename) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(path = %entry.path().display(), "skipping entry with non UTF-8 name");
            continue;
        };
        if !is_supported(&filename) {
            continue;
        }

        let path: PathBuf = entry.path();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(filename = %filename, bytes = text.len(), "read document");
                report.documents.push(Document::new(filename, text));
            }
            Err(source) => {
                warn!(filename = %filename, error = %source, "skipping unreadable document");
                report.failures.push(DocumentReadFailure {
                    filename,
                    error: RagError::DocumentRead { path, source },
                });
            }
        }
    }

    report.documents.sort_by(|a, b| a.filename.cmp(&b.filename));
    report.failures.sort_by(|a, b| a.filename.cmp(&b.filename));

    info!(
        dir = %dir.display(),
        documents = report.documents.len(),
        failures = report.failures.len(),
        "loaded documents"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn missing_folder_is_created_and_empty() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("docs");

        let report = load_documents(&dir).await.unwrap();
        assert!(report.is_empty());
        assert!(report.failures.is_empty());
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn reads_only_supported_extensions_sorted() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b.md"), "# Bee").unwrap();
        fs::write(dir.join("a.txt"), "Ay").unwrap();
        fs::write(dir.join("c.doc"), "Sea").unwrap();
        fs::write(dir.join("notes.pdf"), "ignored").unwrap();
        fs::write(dir.join("README"), "ignored").unwrap();

        let report = load_documents(dir).await.unwrap();
        let names: Vec<&str> = report.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md", "c.doc"]);
        assert_eq!(report.documents[0].text, "Ay");
    }

    #[tokio::test]
    async fn invalid_utf8_is_reported_and_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join("good.txt"), "fine").unwrap();
        fs::write(dir.join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();

        let report = load_documents(dir).await.unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].filename, "good.txt");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].filename, "bad.txt");
        assert!(matches!(report.failures[0].error, RagError::DocumentRead { .. }));
    }

    #[tokio::test]
    async fn directory_with_text_suffix_is_a_failure_not_an_abort() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::create_dir(dir.join("folder.txt")).unwrap();
        fs::write(dir.join("real.txt"), "content").unwrap();

        let report = load_documents(dir).await.unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn extension_matching_is_suffix_based() {
        assert!(is_supported("notes.txt"));
        assert!(is_supported("README.md"));
        assert!(is_supported("legacy.doc"));
        assert!(!is_supported("legacy.docx"));
        assert!(!is_supported("notes.TXT"));
    }
}
