//! Handlers for the `/packing-list` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use mj_core::error::CoreError;
use mj_core::packing::{
    group_by_date, validate_packing_code, validate_packing_item, AutoSaveKey, PackingDay,
};
use mj_core::types::DbId;
use mj_core::validation::ValidationErrors;
use mj_db::models::packing_list::{
    AutoSaveResult, CreatePackingListItem, PackingListFilter, PackingListItem,
};
use mj_db::repositories::PackingListRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::{AffectedResponse, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `GET /packing-list` body: flat rows plus the same rows grouped by date and
/// packing code.
#[derive(Debug, Serialize)]
pub struct PackingListResponse {
    pub items: Vec<PackingListItem>,
    pub days: Vec<PackingDay<PackingListItem>>,
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub items: Vec<CreatePackingListItem>,
}

#[derive(Debug, Deserialize)]
pub struct AutoSaveRequest {
    #[serde(flatten)]
    pub item: CreatePackingListItem,
    /// Insert a new row even if one with the same identity exists.
    #[serde(default)]
    pub force_insert: bool,
}

/// `?pl_date=&packing_code=` identifying one packing group.
#[derive(Debug, Deserialize)]
pub struct PackingGroupParams {
    pub pl_date: NaiveDate,
    pub packing_code: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/packing-list?pl_date=&project_id=
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<PackingListFilter>,
) -> AppResult<Json<PackingListResponse>> {
    let items = PackingListRepo::list(&state.pool, &filter).await?;
    let days = group_by_date(items.clone());
    Ok(Json(PackingListResponse { items, days }))
}

/// POST /api/packing-list
///
/// Insert several rows at once; either all are stored or none.
pub async fn create_batch(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BatchCreateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<PackingListItem>>>)> {
    if input.items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one packing-list item is required".into(),
        )));
    }

    let mut errors = ValidationErrors::new();
    for (idx, item) in input.items.iter().enumerate() {
        if let Err(item_errors) = validate_item(item) {
            errors.check(Err(format!("Item #{}: {item_errors}", idx + 1)));
        }
    }
    errors.into_result()?;

    let created = PackingListRepo::create_many(&state.pool, &input.items, admin.user_id).await?;
    tracing::info!(count = created.len(), created_by = admin.user_id, "Created packing-list rows");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/packing-list/auto-save
///
/// Idempotent save of one row while the user is typing. The row is matched
/// by its client id, or by date + packing code + product name when the client
/// sent none. Returns 201 when a row was inserted and 200 when one was updated.
pub async fn auto_save(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<AutoSaveRequest>,
) -> AppResult<(StatusCode, Json<AutoSaveResult>)> {
    let item = &input.item;
    validate_item(item)?;

    let key = AutoSaveKey::resolve(
        item.client_id,
        item.pl_date,
        &item.packing_code,
        &item.product_name,
    );
    let result =
        PackingListRepo::auto_save(&state.pool, &key, item, input.force_insert, admin.user_id)
            .await?;

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result)))
}

/// DELETE /api/packing-list/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PackingListRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PackingListItem",
            id,
        }))
    }
}

/// DELETE /api/packing-list?pl_date=&packing_code=
///
/// Remove every row of one packing group, with their box fees.
pub async fn delete_group(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PackingGroupParams>,
) -> AppResult<Json<AffectedResponse>> {
    validate_packing_code(&params.packing_code).map_err(CoreError::Validation)?;

    let affected =
        PackingListRepo::delete_group(&state.pool, params.pl_date, &params.packing_code).await?;
    tracing::info!(
        pl_date = %params.pl_date,
        packing_code = %params.packing_code.trim(),
        affected,
        deleted_by = admin.user_id,
        "Deleted packing group"
    );
    Ok(Json(AffectedResponse { affected }))
}

fn validate_item(item: &CreatePackingListItem) -> Result<(), ValidationErrors> {
    validate_packing_item(
        &item.packing_code,
        &item.product_name,
        item.box_count,
        item.packaging_count,
        item.quantity_per_box,
    )
}
