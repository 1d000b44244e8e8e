//! Per-box shipping fee rows.

use chrono::NaiveDate;
use mj_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `logistic_payment` row joined with its packing-list item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogisticPaymentRow {
    pub id: DbId,
    pub packing_list_id: DbId,
    pub packing_code: String,
    pub box_no: i32,
    pub box_fee: Decimal,
    pub is_paid: bool,
    pub product_name: String,
    pub pl_date: NaiveDate,
    pub updated_at: Timestamp,
}

/// One box fee to insert or overwrite, keyed by `(packing_list_id, box_no)`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLogisticPayment {
    pub packing_list_id: DbId,
    pub packing_code: String,
    pub box_no: i32,
    pub box_fee: Decimal,
    #[serde(default)]
    pub is_paid: bool,
}
