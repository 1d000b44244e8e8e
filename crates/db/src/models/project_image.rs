//! Product photos attached to a project.

use mj_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectImage {
    pub id: DbId,
    pub project_id: DbId,
    pub file_name: String,
    pub original_name: String,
    /// Path relative to the upload root.
    pub file_path: String,
    pub file_size: i64,
    pub sha256: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateProjectImage {
    pub project_id: DbId,
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub sha256: String,
}
