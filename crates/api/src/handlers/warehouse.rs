//! Handlers for warehouse receipts and their photos.
//!
//! Every change to the received quantity refreshes the project's cached
//! delivery status, since "receiving" and "received" depend on it.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mj_core::delivery::DeliveryStatus;
use mj_core::error::CoreError;
use mj_core::types::DbId;
use mj_core::upload::UploadKind;
use mj_core::warehouse::{validate_entry_quantity, WarehouseProgress};
use mj_db::models::warehouse::{
    CreateWarehouseEntry, CreateWarehouseImage, WarehouseEntry, WarehouseImage,
};
use mj_db::repositories::{ProjectRepo, WarehouseRepo};
use serde::Serialize;

use super::mj_project::{not_found, refreshed_view, ProjectView};
use super::upload_form::{relative_paths, UploadForm};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::ProjectIdParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A saved receipt together with the project's new progress.
#[derive(Debug, Serialize)]
pub struct EntryCreated {
    pub entry: WarehouseEntry,
    pub progress: WarehouseProgress,
    pub delivery_status: Option<DeliveryStatus>,
}

#[derive(Debug, Serialize)]
pub struct EntryList {
    pub entries: Vec<WarehouseEntry>,
    pub progress: WarehouseProgress,
}

/// POST /api/warehouse/entries
pub async fn create_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseEntry>,
) -> AppResult<(StatusCode, Json<EntryCreated>)> {
    validate_entry_quantity(input.quantity).map_err(CoreError::Validation)?;
    ensure_project(&state, input.project_id).await?;

    let entry = WarehouseRepo::create_entry(&state.pool, &input, admin.user_id).await?;
    let view = refresh_project(&state, input.project_id).await?;

    tracing::info!(
        project_id = input.project_id,
        quantity = input.quantity,
        received = view.warehouse.received,
        "Recorded warehouse receipt"
    );
    Ok((
        StatusCode::CREATED,
        Json(EntryCreated {
            entry,
            progress: view.warehouse,
            delivery_status: view.project.cached_delivery_status(),
        }),
    ))
}

/// GET /api/warehouse/entries?project_id=
pub async fn list_entries(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<EntryList>> {
    let project = ensure_project(&state, params.project_id).await?;
    let entries = WarehouseRepo::list_entries(&state.pool, params.project_id).await?;
    let received: i64 = entries.iter().map(|e| i64::from(e.quantity)).sum();

    Ok(Json(EntryList {
        entries,
        progress: WarehouseProgress::compute(i64::from(project.quantity), received),
    }))
}

/// DELETE /api/warehouse/entries/{id}
///
/// Removes the entry and any photos attached to it.
pub async fn delete_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let entry_not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "WarehouseEntry",
            id,
        })
    };
    let entry = WarehouseRepo::find_entry(&state.pool, id)
        .await?
        .ok_or_else(entry_not_found)?;

    let paths = WarehouseRepo::delete_entry(&state.pool, id)
        .await?
        .ok_or_else(entry_not_found)?;
    state.storage.remove_all(&paths).await;
    refresh_project(&state, entry.project_id).await?;

    tracing::info!(entry_id = id, project_id = entry.project_id, deleted_by = admin.user_id, "Deleted warehouse entry");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/warehouse/upload-images
///
/// Multipart form with a `project_id` field, an optional `entry_id` field,
/// and one or more image files. All photos are recorded or none are.
pub async fn upload_images(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<WarehouseImage>>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let project_id: DbId = form
        .parse_field("project_id")?
        .ok_or_else(|| CoreError::Validation("Field 'project_id' is required".into()))?;
    let entry_id: Option<DbId> = form.parse_field("entry_id")?;

    ensure_project(&state, project_id).await?;
    if let Some(entry_id) = entry_id {
        let belongs = WarehouseRepo::find_entry(&state.pool, entry_id)
            .await?
            .is_some_and(|e| e.project_id == project_id);
        if !belongs {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Warehouse entry {entry_id} does not belong to project {project_id}"
            ))));
        }
    }

    let stored = form
        .store_all(&state, project_id, UploadKind::WarehouseImage)
        .await?;
    let inputs: Vec<CreateWarehouseImage> = stored
        .iter()
        .map(|file| CreateWarehouseImage {
            project_id,
            entry_id,
            file_name: file.file_name.clone(),
            original_name: file.original_name.clone(),
            file_path: file.relative_path.clone(),
            file_size: file.file_size,
            sha256: file.sha256.clone(),
        })
        .collect();
    let images = match WarehouseRepo::create_images(&state.pool, &inputs).await {
        Ok(images) => images,
        Err(e) => {
            state.storage.remove_all(&relative_paths(&stored)).await;
            return Err(e.into());
        }
    };

    tracing::info!(project_id, count = images.len(), "Uploaded warehouse images");
    Ok((StatusCode::CREATED, Json(DataResponse { data: images })))
}

/// GET /api/warehouse/images?project_id=
pub async fn list_images(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<DataResponse<Vec<WarehouseImage>>>> {
    ensure_project(&state, params.project_id).await?;
    let images = WarehouseRepo::list_images(&state.pool, params.project_id).await?;
    Ok(Json(DataResponse { data: images }))
}

async fn ensure_project(
    state: &AppState,
    project_id: DbId,
) -> AppResult<mj_db::models::project::Project> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| not_found(project_id))
}

async fn refresh_project(state: &AppState, project_id: DbId) -> AppResult<ProjectView> {
    let project = ensure_project(state, project_id).await?;
    refreshed_view(state, project).await
}
