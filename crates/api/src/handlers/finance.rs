//! Finance summary over all projects and logistics fees.

use axum::extract::State;
use axum::Json;
use mj_core::finance::{summarize, FinanceSummary, LogisticTotals, ProjectLedgerLine};
use mj_db::repositories::{LogisticPaymentRepo, ProjectRepo};
use rust_decimal::Decimal;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/finance/summary
pub async fn summary(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<FinanceSummary>> {
    let lines: Vec<ProjectLedgerLine> = ProjectRepo::ledger_rows(&state.pool)
        .await?
        .into_iter()
        .map(|row| ProjectLedgerLine {
            total_amount: row.total_amount.unwrap_or(Decimal::ZERO),
            schedule: row.payment_schedule.0,
        })
        .collect();
    let fees = LogisticPaymentRepo::all_fees(&state.pool).await?;

    Ok(Json(summarize(&lines, LogisticTotals::from_fees(fees))))
}
