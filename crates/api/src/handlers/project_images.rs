//! Photo uploads attached to a project.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use mj_core::error::CoreError;
use mj_core::types::DbId;
use mj_core::upload::UploadKind;
use mj_db::models::project_image::{CreateProjectImage, ProjectImage};
use mj_db::repositories::{ProjectImageRepo, ProjectRepo};

use super::mj_project::not_found;
use super::upload_form::{relative_paths, UploadForm};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/mj-project/{id}/images
///
/// Every file part of the multipart form is stored as one photo. The rows are
/// recorded in one transaction; if any file is rejected or the insert fails,
/// nothing is recorded and the written files are removed.
pub async fn upload(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ProjectImage>>>)> {
    if ProjectRepo::find_by_id(&state.pool, project_id).await?.is_none() {
        return Err(not_found(project_id));
    }
    let form = UploadForm::read(&mut multipart).await?;
    let stored = form
        .store_all(&state, project_id, UploadKind::ProjectImage)
        .await?;

    let inputs: Vec<CreateProjectImage> = stored
        .iter()
        .map(|file| CreateProjectImage {
            project_id,
            file_name: file.file_name.clone(),
            original_name: file.original_name.clone(),
            file_path: file.relative_path.clone(),
            file_size: file.file_size,
            sha256: file.sha256.clone(),
        })
        .collect();
    let images = match ProjectImageRepo::create_many(&state.pool, &inputs).await {
        Ok(images) => images,
        Err(e) => {
            state.storage.remove_all(&relative_paths(&stored)).await;
            return Err(e.into());
        }
    };

    tracing::info!(project_id, count = images.len(), "Uploaded project images");
    Ok((StatusCode::CREATED, Json(DataResponse { data: images })))
}

/// DELETE /api/mj-project/{id}/images/{image_id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let image = ProjectImageRepo::find_by_id(&state.pool, image_id)
        .await?
        .filter(|img| img.project_id == project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectImage",
            id: image_id,
        }))?;

    if ProjectImageRepo::delete(&state.pool, project_id, image_id).await? {
        state.storage.remove(&image.file_path).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
