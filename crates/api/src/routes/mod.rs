//! Route registration.
//!
//! All routes live at the root level: the polling contract
//! (`/analyze`, `/status/{task_id}`, `/analysis/{task_id}`) plus the
//! health endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

pub mod health;

/// All analysis lifecycle routes.
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analysis::submit))
        .route("/status/{task_id}", get(analysis::status))
        .route("/analysis/{task_id}", get(analysis::result))
}
