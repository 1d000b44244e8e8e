//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement, so authorization is enforced by handler signatures.
//!
//! The role claim alone is not trusted for writes: [`RequireAdmin`] confirms
//! against the `users` table, so demoting or deleting an account takes effect
//! before its tokens expire.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mj_core::error::CoreError;
use mj_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise, and with
/// 401 when the account behind the token no longer exists.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(admin_required());
        }

        let account = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Account no longer exists".into()))
            })?;
        if !account.is_admin {
            tracing::debug!(user_id = user.user_id, "Admin token for a demoted account");
            return Err(admin_required());
        }
        Ok(RequireAdmin(user))
    }
}

fn admin_required() -> AppError {
    AppError::Core(CoreError::Forbidden("Admin role required".into()))
}

/// Requires any authenticated user.
///
/// Equivalent to [`AuthUser`], named so that read-only routes document that
/// they still need a login.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
