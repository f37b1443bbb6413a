//! Failure modes of the analysis pipeline.

/// Errors surfaced by [`crate::DocumentAnalyzer`] implementations.
///
/// The worker records the display string as the job's `error_message`;
/// keep messages human-readable.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Document text could not be extracted.
    #[error("document extraction failed: {0}")]
    Extraction(String),

    /// The LLM service rejected the request or returned an unusable
    /// response.
    #[error("analysis service error: {0}")]
    Upstream(String),

    /// The analysis was cancelled at the soft timeout threshold.
    #[error("analysis cancelled before completion")]
    Cancelled,
}
