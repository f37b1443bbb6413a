//! Submission-input rules and collaborator-output coercion.
//!
//! These are the pure pieces of the job lifecycle: what counts as an
//! acceptable upload, how a blank query is defaulted, how oversized error
//! detail is bounded, and how the analysis pipeline's free-form text output
//! is coerced into a JSON payload.

use serde_json::{json, Value};

/// File extensions accepted by the submission endpoint.
pub const SUPPORTED_DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Instruction used when the caller supplies no query.
pub const DEFAULT_QUERY: &str = "Analyze this financial document comprehensively";

/// Upper bound on persisted `error_message` length, in characters.
pub const MAX_ERROR_DETAIL_CHARS: usize = 500;

/// Whether `filename` denotes a supported document format.
///
/// Matches on the final extension, case-insensitively. A bare name with no
/// extension is rejected.
pub fn is_supported_document(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_DOCUMENT_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Normalize the caller's query: trim whitespace, fall back to
/// [`DEFAULT_QUERY`] when missing or blank.
pub fn normalize_query(query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => DEFAULT_QUERY.to_string(),
    }
}

/// Bound an error message to [`MAX_ERROR_DETAIL_CHARS`] characters.
///
/// Counts characters rather than bytes so truncation never splits a UTF-8
/// sequence.
pub fn truncate_error_detail(detail: &str) -> String {
    if detail.chars().count() <= MAX_ERROR_DETAIL_CHARS {
        return detail.to_string();
    }
    detail.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
}

/// Coerce the collaborator's raw text output into a JSON result payload.
///
/// The structured-output contract is best-effort: when the text is valid
/// JSON it is stored as-is, otherwise the job still completes and the text
/// is wrapped as `{"raw_analysis": <text>}`. Malformed output is a degraded
/// success, not a job failure.
pub fn coerce_result(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => json!({ "raw_analysis": raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_supported_case_insensitively() {
        assert!(is_supported_document("report.pdf"));
        assert!(is_supported_document("Q3-earnings.PDF"));
        assert!(is_supported_document("a.b.pdf"));
    }

    #[test]
    fn non_pdf_filenames_are_rejected() {
        assert!(!is_supported_document("report.docx"));
        assert!(!is_supported_document("report"));
        assert!(!is_supported_document(".pdf"));
        assert!(!is_supported_document(""));
    }

    #[test]
    fn blank_query_falls_back_to_default() {
        assert_eq!(normalize_query(None), DEFAULT_QUERY);
        assert_eq!(normalize_query(Some("")), DEFAULT_QUERY);
        assert_eq!(normalize_query(Some("   ")), DEFAULT_QUERY);
    }

    #[test]
    fn non_blank_query_is_trimmed() {
        assert_eq!(normalize_query(Some("  Analyze this  ")), "Analyze this");
    }

    #[test]
    fn short_error_detail_is_untouched() {
        assert_eq!(truncate_error_detail("boom"), "boom");
    }

    #[test]
    fn long_error_detail_is_bounded() {
        let long = "x".repeat(2 * MAX_ERROR_DETAIL_CHARS);
        assert_eq!(
            truncate_error_detail(&long).chars().count(),
            MAX_ERROR_DETAIL_CHARS
        );
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let long = "é".repeat(MAX_ERROR_DETAIL_CHARS + 10);
        let truncated = truncate_error_detail(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_DETAIL_CHARS);
    }

    #[test]
    fn valid_json_output_is_stored_verbatim() {
        let raw = r#"{"recommendation":"BUY","confidence_score":80}"#;
        assert_eq!(
            coerce_result(raw),
            json!({ "recommendation": "BUY", "confidence_score": 80 })
        );
    }

    #[test]
    fn plain_text_output_is_wrapped_as_raw_analysis() {
        let raw = "The company looks healthy.";
        assert_eq!(coerce_result(raw), json!({ "raw_analysis": raw }));
    }
}
