pub mod auth;
pub mod finance;
pub mod health;
pub mod logistic_payment;
pub mod mj_project;
pub mod packing_list;
pub mod users;
pub mod warehouse;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/register, /auth/login, /auth/me
/// /users, /users/{id}                              admin
/// /mj-project ...                                   projects, payment, delivery, images, calendar
/// /finance/summary                                  admin
/// /packing-list ...                                 rows, auto-save, group delete
/// /logistic-payment/update, /by-date/{date}         box fees
/// /warehouse/entries, /upload-images, /images       receipts and photos
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/mj-project", mj_project::router())
        .nest("/finance", finance::router())
        .nest("/packing-list", packing_list::router())
        .nest("/logistic-payment", logistic_payment::router())
        .nest("/warehouse", warehouse::router())
}
