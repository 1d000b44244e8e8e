//! Warehouse receiving entries and their photos.

use chrono::NaiveDate;
use mj_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarehouseEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub entry_date: NaiveDate,
    pub quantity: i32,
    pub note: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWarehouseEntry {
    pub project_id: DbId,
    pub entry_date: NaiveDate,
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarehouseImage {
    pub id: DbId,
    pub project_id: DbId,
    pub entry_id: Option<DbId>,
    pub file_name: String,
    pub original_name: String,
    /// Path relative to the upload root.
    pub file_path: String,
    pub file_size: i64,
    pub sha256: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateWarehouseImage {
    pub project_id: DbId,
    pub entry_id: Option<DbId>,
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub sha256: String,
}
