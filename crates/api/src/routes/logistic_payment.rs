use axum::routing::{get, put};
use axum::Router;

use crate::handlers::logistic_payment;
use crate::state::AppState;

/// Routes mounted at `/logistic-payment`.
///
/// ```text
/// PUT /update             -> update (admin, batch upsert)
/// GET /by-date/{date}     -> by_date
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update", put(logistic_payment::update))
        .route("/by-date/{date}", get(logistic_payment::by_date))
}
