use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::packing_list;
use crate::state::AppState;

/// Routes mounted at `/packing-list`.
///
/// ```text
/// GET    /?pl_date=&project_id=         -> list (rows + grouped)
/// POST   /                              -> create_batch (admin)
/// DELETE /?pl_date=&packing_code=       -> delete_group (admin)
/// POST   /auto-save                     -> auto_save (admin)
/// DELETE /{id}                          -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(packing_list::list)
                .post(packing_list::create_batch)
                .delete(packing_list::delete_group),
        )
        .route("/auto-save", post(packing_list::auto_save))
        .route("/{id}", delete(packing_list::delete))
}
