//! Handlers for per-box shipping fees.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use mj_core::error::CoreError;
use mj_core::finance::LogisticTotals;
use mj_core::packing::{validate_box_no, validate_packing_code};
use mj_core::validation::{validate_money_amount, ValidationErrors};
use mj_db::models::logistic_payment::{LogisticPaymentRow, UpsertLogisticPayment};
use mj_db::repositories::{LogisticPaymentRepo, PackingListRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::AffectedResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogisticPaymentBatch {
    pub payments: Vec<UpsertLogisticPayment>,
}

#[derive(Debug, Serialize)]
pub struct LogisticPaymentsByDate {
    pub pl_date: NaiveDate,
    pub rows: Vec<LogisticPaymentRow>,
    pub totals: LogisticTotals,
}

/// PUT /api/logistic-payment/update
///
/// Insert or overwrite box fees keyed by packing-list row and box number.
/// The whole batch is validated first and written in one transaction. Each
/// row's packing code must match the item it references.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<LogisticPaymentBatch>,
) -> AppResult<Json<AffectedResponse>> {
    if input.payments.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one payment row is required".into(),
        )));
    }

    let mut ids: Vec<_> = input.payments.iter().map(|p| p.packing_list_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let items: HashMap<_, _> = PackingListRepo::find_many(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut errors = ValidationErrors::new();
    for (idx, payment) in input.payments.iter().enumerate() {
        let row = idx + 1;
        let Some(item) = items.get(&payment.packing_list_id) else {
            errors.check(Err(format!(
                "Row #{row}: packing-list item {} does not exist",
                payment.packing_list_id
            )));
            continue;
        };
        for result in [
            validate_packing_code(&payment.packing_code),
            validate_same_packing_code(&payment.packing_code, &item.packing_code),
            validate_box_no(payment.box_no, item.box_count),
            validate_money_amount("Box fee", payment.box_fee),
        ] {
            if let Err(msg) = result {
                errors.check(Err(format!("Row #{row}: {msg}")));
            }
        }
    }
    errors.into_result()?;

    let affected = LogisticPaymentRepo::upsert_many(&state.pool, &input.payments).await?;
    tracing::info!(affected, updated_by = admin.user_id, "Saved logistic payments");
    Ok(Json(AffectedResponse { affected }))
}

/// A fee row is filed under the packing code of the item it belongs to.
fn validate_same_packing_code(submitted: &str, stored: &str) -> Result<(), String> {
    if submitted.trim().is_empty() || submitted.trim() == stored {
        return Ok(());
    }
    Err(format!(
        "Packing code '{}' does not match the item's packing code '{stored}'",
        submitted.trim()
    ))
}

/// GET /api/logistic-payment/by-date/{date}
pub async fn by_date(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(pl_date): Path<NaiveDate>,
) -> AppResult<Json<LogisticPaymentsByDate>> {
    let rows = LogisticPaymentRepo::list_by_date(&state.pool, pl_date).await?;
    let totals = LogisticTotals::from_fees(rows.iter().map(|r| (r.box_fee, r.is_paid)));
    Ok(Json(LogisticPaymentsByDate {
        pl_date,
        rows,
        totals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_code_must_match_item() {
        assert!(validate_same_packing_code("B-7", "B-7").is_ok());
        assert!(validate_same_packing_code(" B-7 ", "B-7").is_ok());

        let msg = validate_same_packing_code("Z-9", "B-7").unwrap_err();
        assert!(msg.contains("'Z-9'") && msg.contains("'B-7'"), "{msg}");
    }
}
