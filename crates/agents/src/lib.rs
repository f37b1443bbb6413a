//! Analysis collaborator: document text extraction and the LLM pipeline.
//!
//! The worker treats everything here as a black box behind the
//! [`DocumentAnalyzer`] trait: a query and a document path go in, raw
//! analysis text comes out (ideally JSON, but the contract is best-effort),
//! or an [`AnalyzerError`] is returned. The production implementation is
//! [`pipeline::LlmPipeline`]; tests substitute stubs.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub mod client;
pub mod error;
pub mod extract;
pub mod pipeline;

pub use error::AnalyzerError;

/// The sole blocking call in the Background Executor.
///
/// Implementations should observe `cancel` — it is triggered at the soft
/// timeout threshold to request graceful self-termination before the hard
/// wall-clock cutoff abandons the attempt.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        query: &str,
        document_path: &str,
        cancel: CancellationToken,
    ) -> Result<String, AnalyzerError>;
}
