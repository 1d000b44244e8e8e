//! Packing-list item model and DTOs.

use chrono::NaiveDate;
use mj_core::packing::PackingRow;
use mj_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `mj_packing_list` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackingListItem {
    pub id: DbId,
    pub client_id: Option<String>,
    pub project_id: Option<DbId>,
    pub pl_date: NaiveDate,
    pub packing_code: String,
    pub box_count: i32,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub packaging_method: Option<String>,
    pub packaging_count: i32,
    pub quantity_per_box: i32,
    pub logistic_company: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PackingRow for PackingListItem {
    fn pl_date(&self) -> NaiveDate {
        self.pl_date
    }

    fn packing_code(&self) -> &str {
        &self.packing_code
    }

    fn box_count(&self) -> i32 {
        self.box_count
    }

    fn quantity_per_box(&self) -> i32 {
        self.quantity_per_box
    }
}

/// DTO for creating (or auto-saving) a packing-list row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackingListItem {
    pub client_id: Option<Uuid>,
    pub project_id: Option<DbId>,
    pub pl_date: NaiveDate,
    pub packing_code: String,
    #[serde(default)]
    pub box_count: i32,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub packaging_method: Option<String>,
    #[serde(default)]
    pub packaging_count: i32,
    #[serde(default)]
    pub quantity_per_box: i32,
    pub logistic_company: Option<String>,
}

/// Filter for listing packing-list rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackingListFilter {
    pub pl_date: Option<NaiveDate>,
    pub project_id: Option<DbId>,
}

/// Outcome of an auto-save: the stored row and whether it was newly inserted.
#[derive(Debug, Clone, Serialize)]
pub struct AutoSaveResult {
    pub item: PackingListItem,
    pub created: bool,
}

/// One distinct shipment (date + code) for the calendar.
#[derive(Debug, Clone, FromRow)]
pub struct PackingDateRow {
    pub pl_date: NaiveDate,
    pub packing_code: String,
    pub project_id: Option<DbId>,
}
