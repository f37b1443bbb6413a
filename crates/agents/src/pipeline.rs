//! The production analysis pipeline: extract document text, prompt the
//! LLM as a senior equity research analyst, return the raw completion.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::{ChatMessage, LlmClient, LlmConfig};
use crate::error::AnalyzerError;
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::DocumentAnalyzer;

/// Cap on document text included in the prompt, in characters.
const MAX_DOCUMENT_CHARS: usize = 48_000;

const SYSTEM_PROMPT: &str = "\
You are a Senior Equity Research Analyst. Conduct rigorous financial \
analysis of the provided document. Be deterministic and professional, cite \
figures from the document, and never invent numbers that are not present. \
Respond strictly with a single JSON object with the fields: \
\"recommendation\" (BUY | HOLD | SELL), \"confidence_score\" (0-100), \
\"key_metrics\" (object), \"risks\" (array of strings), \
\"opportunities\" (array of strings), and \"summary\" (string).";

/// LLM-backed implementation of [`DocumentAnalyzer`].
///
/// Construct one per process and inject it into the executor; it holds no
/// mutable state and is safe to share.
pub struct LlmPipeline {
    client: LlmClient,
    extractor: Box<dyn TextExtractor>,
}

impl LlmPipeline {
    /// Build the pipeline from environment configuration with the PDF
    /// extractor.
    pub fn from_env() -> Self {
        Self::new(LlmClient::new(LlmConfig::from_env()), Box::new(PdfTextExtractor))
    }

    pub fn new(client: LlmClient, extractor: Box<dyn TextExtractor>) -> Self {
        Self { client, extractor }
    }

    fn user_prompt(query: &str, document_text: &str) -> String {
        let truncated: String = document_text.chars().take(MAX_DOCUMENT_CHARS).collect();
        format!(
            "Analyze the user's query: {query}\n\
             Review the financial document below carefully, extract key \
             financial metrics and indicators, and provide professional \
             investment insights.\n\n\
             --- DOCUMENT ---\n{truncated}"
        )
    }
}

#[async_trait]
impl DocumentAnalyzer for LlmPipeline {
    async fn analyze(
        &self,
        query: &str,
        document_path: &str,
        cancel: CancellationToken,
    ) -> Result<String, AnalyzerError> {
        let document_text = self.extractor.extract(document_path).await?;
        tracing::debug!(
            document_path,
            chars = document_text.len(),
            "Document text extracted"
        );

        if cancel.is_cancelled() {
            return Err(AnalyzerError::Cancelled);
        }

        let messages = [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: Self::user_prompt(query, &document_text),
            },
        ];

        self.client.complete(&messages, &cancel).await
    }
}
