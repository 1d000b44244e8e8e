use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::warehouse;
use crate::state::AppState;

/// Routes mounted at `/warehouse`.
///
/// ```text
/// POST   /entries                  -> create_entry (admin)
/// GET    /entries?project_id=      -> list_entries
/// DELETE /entries/{id}             -> delete_entry (admin)
/// POST   /upload-images            -> upload_images (admin, multipart)
/// GET    /images?project_id=       -> list_images
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            post(warehouse::create_entry).get(warehouse::list_entries),
        )
        .route("/entries/{id}", delete(warehouse::delete_entry))
        .route("/upload-images", post(warehouse::upload_images))
        .route("/images", get(warehouse::list_images))
}
