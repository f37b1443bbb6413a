//! Handlers for the analysis job lifecycle: submit, poll status, fetch
//! result.
//!
//! Submission is the only writer here; the status and result endpoints are
//! pure reads. All state transitions after submission belong to the worker.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use validator::ValidateEmail;

use finsight_core::document::{is_supported_document, normalize_query};
use finsight_core::error::CoreError;
use finsight_core::types::{DbId, Timestamp};
use finsight_db::models::analysis::{AnalysisJob, NewAnalysisJob};
use finsight_db::models::status::AnalysisStatus;
use finsight_db::repositories::{AnalysisRepo, OwnerRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage;

// ---------------------------------------------------------------------------
// Response schemas
// ---------------------------------------------------------------------------

/// Response to `POST /analyze`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub task_id: Uuid,
    pub status: &'static str,
    pub message: &'static str,
    pub status_url: String,
}

/// Response to `GET /status/{task_id}`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub task_id: Uuid,
    pub status: &'static str,
    pub progress: u8,
}

/// Response to `GET /analysis/{task_id}` once the job has completed.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub id: Uuid,
    pub owner_id: Option<DbId>,
    pub filename: String,
    pub status: &'static str,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl ResultResponse {
    fn from_job(job: AnalysisJob, status: AnalysisStatus) -> Self {
        Self {
            id: job.id,
            owner_id: job.owner_id,
            filename: job.filename,
            status: status.as_str(),
            result: job.result,
            error: job.error_message,
            created_at: job.created_at,
            completed_at: job.completed_at,
        }
    }
}

/// Parsed multipart fields of a submission.
struct SubmissionInput {
    filename: String,
    bytes: Vec<u8>,
    query: String,
    email: Option<String>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /analyze
///
/// Accept a PDF upload, persist it, create the pending job row (which is
/// also the enqueue — the table is the queue), and return the task id plus
/// a status URL for polling.
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let input = read_submission(multipart).await?;

    // Caller faults are rejected before anything is persisted.
    if !is_supported_document(&input.filename) {
        return Err(CoreError::Validation("Only PDF files are supported".into()).into());
    }
    if let Some(email) = &input.email {
        if !email.validate_email() {
            return Err(CoreError::Validation(format!("Invalid email address: {email}")).into());
        }
    }

    let task_id = Uuid::new_v4();

    let document_path = storage::save_document(&state.config.upload_dir, task_id, &input.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("could not store upload: {e}")))?;
    tracing::info!(
        task_id = %task_id,
        filename = %input.filename,
        bytes = input.bytes.len(),
        "Upload stored",
    );

    // Anything failing past this point must not leave the stored file
    // behind.
    match create_job(&state, task_id, &document_path, &input).await {
        Ok(job) => {
            tracing::info!(task_id = %job.id, "Analysis job submitted");
            Ok((
                StatusCode::CREATED,
                Json(SubmitResponse {
                    task_id: job.id,
                    status: job.status()?.as_str(),
                    message:
                        "Analysis submitted successfully. Use status endpoint to check progress.",
                    status_url: format!("/status/{}", job.id),
                }),
            ))
        }
        Err(e) => {
            storage::remove_document(&document_path).await;
            Err(e)
        }
    }
}

/// Resolve the owner (if any) and insert the pending job row.
async fn create_job(
    state: &AppState,
    task_id: Uuid,
    document_path: &str,
    input: &SubmissionInput,
) -> AppResult<AnalysisJob> {
    let owner_id = match &input.email {
        Some(email) => Some(OwnerRepo::get_or_create(&state.pool, email).await?.id),
        None => None,
    };

    let job = AnalysisRepo::create(
        &state.pool,
        &NewAnalysisJob {
            id: task_id,
            owner_id,
            filename: &input.filename,
            document_path,
            query: &input.query,
            queue_ttl_secs: state.config.queue_ttl_secs,
        },
    )
    .await?;
    Ok(job)
}

/// Drain the multipart body into a [`SubmissionInput`].
async fn read_submission(mut multipart: Multipart) -> AppResult<SubmissionInput> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut query: Option<String> = None;
    let mut email: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            "query" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                query = Some(text);
            }
            "email" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.trim().is_empty() {
                    email = Some(text.trim().to_string());
                }
            }
            _ => {} // ignore unknown fields
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    Ok(SubmissionInput {
        filename,
        bytes,
        query: normalize_query(query.as_deref()),
        email,
    })
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /status/{task_id}
///
/// Current lifecycle status plus the fixed progress mapping
/// (pending 0, running 50, completed 100, failed 0).
pub async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<StatusResponse>> {
    let job = AnalysisRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Analysis job",
            id: task_id.to_string(),
        })?;

    let status = job.status()?;
    Ok(Json(StatusResponse {
        task_id,
        status: status.as_str(),
        progress: status.progress(),
    }))
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// GET /analysis/{task_id}
///
/// Full record once completed; 202 while pending/running; 400 with the
/// recorded detail when failed; 404 when unknown.
pub async fn result(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<ResultResponse>> {
    let job = AnalysisRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Analysis job",
            id: task_id.to_string(),
        })?;

    let status = job.status()?;
    if !status.is_terminal() {
        return Err(CoreError::StillProcessing {
            status: status.as_str(),
        }
        .into());
    }
    if status == AnalysisStatus::Failed {
        let detail = job.error_message.clone().unwrap_or_default();
        return Err(CoreError::JobFailed(detail).into());
    }

    Ok(Json(ResultResponse::from_job(job, status)))
}
