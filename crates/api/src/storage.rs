//! Durable storage for uploaded documents.
//!
//! Uploads are written to disk before the job row is created; if anything
//! later in the submission fails, the stored file is removed best-effort so
//! no orphaned artifacts accumulate.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Path under `upload_dir` for the document belonging to job `id`.
pub fn document_path(upload_dir: &str, id: Uuid) -> PathBuf {
    Path::new(upload_dir).join(format!("financial_document_{id}.pdf"))
}

/// Persist upload bytes, creating the directory if needed. Returns the
/// stored path.
pub async fn save_document(
    upload_dir: &str,
    id: Uuid,
    bytes: &[u8],
) -> std::io::Result<String> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = document_path(upload_dir, id);
    tokio::fs::write(&path, bytes).await?;
    Ok(path.to_string_lossy().into_owned())
}

/// Best-effort removal of a stored document. Failures are logged, never
/// propagated — cleanup must not mask the error that triggered it.
pub async fn remove_document(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path, error = %e, "Could not remove stored document");
    }
}
