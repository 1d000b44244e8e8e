use axum::routing::get;
use axum::Router;

use crate::handlers::finance;
use crate::state::AppState;

/// Routes mounted at `/finance`.
///
/// ```text
/// GET /summary -> summary (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(finance::summary))
}
