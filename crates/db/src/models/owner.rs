//! Owner entity: an email-keyed identity used to group analysis jobs.

use finsight_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `owners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Owner {
    pub id: DbId,
    pub email: String,
    pub created_at: Timestamp,
}
