//! Document text extraction.

use async_trait::async_trait;

use crate::error::AnalyzerError;

/// Extracts plain text from a stored document.
///
/// Extraction failures propagate as analysis failures, never as submission
/// failures — the upload was already accepted by the time this runs.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &str) -> Result<String, AnalyzerError>;
}

/// PDF extractor backed by `pdf-extract`.
///
/// The underlying crate is synchronous and CPU-bound, so extraction runs
/// on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &str) -> Result<String, AnalyzerError> {
        let path = path.to_string();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
            .await
            .map_err(|e| AnalyzerError::Extraction(format!("extraction task panicked: {e}")))?
            .map_err(|e| AnalyzerError::Extraction(e.to_string()))?;

        let cleaned = collapse_blank_lines(&text);
        if cleaned.trim().is_empty() {
            return Err(AnalyzerError::Extraction(
                "no text content found in document".into(),
            ));
        }
        Ok(cleaned)
    }
}

/// Collapse runs of blank lines so the prompt stays compact.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && last_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        last_blank = blank;
    }
    out
}
