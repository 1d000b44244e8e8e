//! Admin-only user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mj_core::error::CoreError;
use mj_core::types::DbId;
use mj_core::validation::validate_name;
use mj_db::models::user::{UpdateUser, UserResponse};
use mj_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/users
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PATCH /api/users/{id}
///
/// Admins cannot revoke their own admin flag, so there is always at least
/// one administrator left.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if id == admin.user_id && input.is_admin == Some(false) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot remove your own admin role".into(),
        )));
    }
    if let Some(name) = input.name.as_deref() {
        validate_name("Name", name).map_err(CoreError::Validation)?;
    }
    input.name = input.name.map(|n| n.trim().to_string());

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "Updated user");
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot delete your own account".into(),
        )));
    }

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, deleted_by = admin.user_id, "Deleted user");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}
