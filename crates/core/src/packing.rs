//! Packing-list grouping, totals and auto-save identity.
//!
//! Packing list rows are stored flat (one row per product per packing code).
//! The packing-list screens show them grouped by shipment date (`pl_date`)
//! and then by packing code; that grouping lives here so every consumer gets
//! the same order and the same totals.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::validation::{validate_name, validate_non_negative_count, ValidationErrors};

/// Maximum length of a packing code label.
pub const MAX_PACKING_CODE_LENGTH: usize = 100;

/// The fields grouping needs from a packing-list row.
pub trait PackingRow {
    fn pl_date(&self) -> NaiveDate;
    fn packing_code(&self) -> &str;
    fn box_count(&self) -> i32;
    fn quantity_per_box(&self) -> i32;

    /// Units in this row: boxes × units per box.
    fn total_units(&self) -> i64 {
        i64::from(self.box_count()) * i64::from(self.quantity_per_box())
    }
}

/// Rows sharing one packing code on one date.
#[derive(Debug, Clone, Serialize)]
pub struct PackingGroup<T> {
    pub packing_code: String,
    pub total_boxes: i64,
    pub total_units: i64,
    pub items: Vec<T>,
}

/// All packing groups shipped on one date.
#[derive(Debug, Clone, Serialize)]
pub struct PackingDay<T> {
    pub pl_date: NaiveDate,
    pub total_boxes: i64,
    pub total_units: i64,
    pub groups: Vec<PackingGroup<T>>,
}

/// Group rows by date (ascending), then by packing code in first-seen order.
///
/// Codes are compared after trimming, so `"A-1 "` and `"A-1"` land in the
/// same group.
pub fn group_by_date<T: PackingRow>(rows: Vec<T>) -> Vec<PackingDay<T>> {
    let mut days: Vec<PackingDay<T>> = Vec::new();

    for row in rows {
        let date = row.pl_date();
        let day_idx = match days.iter().position(|d| d.pl_date == date) {
            Some(idx) => idx,
            None => {
                days.push(PackingDay {
                    pl_date: date,
                    total_boxes: 0,
                    total_units: 0,
                    groups: Vec::new(),
                });
                days.len() - 1
            }
        };
        let day = &mut days[day_idx];

        let code = row.packing_code().trim().to_string();
        let boxes = i64::from(row.box_count());
        let units = row.total_units();

        day.total_boxes += boxes;
        day.total_units += units;

        match day.groups.iter_mut().find(|g| g.packing_code == code) {
            Some(group) => {
                group.total_boxes += boxes;
                group.total_units += units;
                group.items.push(row);
            }
            None => day.groups.push(PackingGroup {
                packing_code: code,
                total_boxes: boxes,
                total_units: units,
                items: vec![row],
            }),
        }
    }

    days.sort_by_key(|d| d.pl_date);
    days
}

// ---------------------------------------------------------------------------
// Auto-save identity
// ---------------------------------------------------------------------------

/// How an auto-saved row is matched against existing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveKey {
    /// The client generated a stable id for the row.
    ClientId(Uuid),
    /// No client id: match on date + packing code + product name.
    Natural {
        pl_date: NaiveDate,
        packing_code: String,
        product_name: String,
    },
}

impl AutoSaveKey {
    pub fn resolve(
        client_id: Option<Uuid>,
        pl_date: NaiveDate,
        packing_code: &str,
        product_name: &str,
    ) -> Self {
        match client_id {
            Some(id) => AutoSaveKey::ClientId(id),
            None => AutoSaveKey::Natural {
                pl_date,
                packing_code: packing_code.trim().to_string(),
                product_name: product_name.trim().to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_packing_code(code: &str) -> Result<(), String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err("Packing code must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_PACKING_CODE_LENGTH {
        return Err(format!(
            "Packing code exceeds maximum length of {MAX_PACKING_CODE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate the user-entered fields of one packing-list row.
pub fn validate_packing_item(
    packing_code: &str,
    product_name: &str,
    box_count: i32,
    packaging_count: i32,
    quantity_per_box: i32,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors
        .check(validate_packing_code(packing_code))
        .check(validate_name("Product name", product_name))
        .check(validate_non_negative_count("Box count", box_count))
        .check(validate_non_negative_count("Packaging count", packaging_count))
        .check(validate_non_negative_count(
            "Quantity per box",
            quantity_per_box,
        ));
    errors.into_result()
}

/// Box numbers on a row run from 1 to `box_count`.
pub fn validate_box_no(box_no: i32, box_count: i32) -> Result<(), String> {
    if box_no < 1 || box_no > box_count {
        return Err(format!(
            "Box number {box_no} is out of range (1..={box_count})"
        ));
    }
    Ok(())
}
