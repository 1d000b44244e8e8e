//! Route definitions for the `/mj-project` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{mj_project, project_images};
use crate::state::AppState;

/// Routes mounted at `/mj-project`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create (admin)
/// GET    /calendar?from=&to=      -> calendar
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update (admin)
/// DELETE /{id}                    -> delete (admin)
/// POST   /{id}/payment            -> save_payment (admin)
/// POST   /{id}/delivery           -> save_delivery (admin)
/// POST   /{id}/images             -> upload images (admin, multipart)
/// DELETE /{id}/images/{image_id}  -> delete image (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(mj_project::list).post(mj_project::create))
        .route("/calendar", get(mj_project::calendar))
        .route(
            "/{id}",
            get(mj_project::get_by_id)
                .patch(mj_project::update)
                .delete(mj_project::delete),
        )
        .route("/{id}/payment", post(mj_project::save_payment))
        .route("/{id}/delivery", post(mj_project::save_delivery))
        .route("/{id}/images", post(project_images::upload))
        .route("/{id}/images/{image_id}", delete(project_images::delete))
}
