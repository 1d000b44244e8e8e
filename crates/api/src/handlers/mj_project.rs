//! Handlers for the `/mj-project` resource.
//!
//! Money and delivery status are always derived here from the submitted
//! inputs; clients never send `fee`, `subtotal`, `total_amount` or a status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use mj_core::calendar::{build_events, validate_range, CalendarEvent, PackingDate, ProjectDates};
use mj_core::delivery::{derive_delivery_status, validate_delivery_dates, DeliveryFacts};
use mj_core::error::CoreError;
use mj_core::payment::{
    AdditionalCostItem, PaymentBreakdown, PaymentInput, PaymentSchedule, PaymentStatus,
    round_money,
};
use mj_core::types::DbId;
use mj_core::validation::{
    validate_money_amount, validate_name, validate_positive_quantity, ValidationErrors,
};
use mj_core::warehouse::WarehouseProgress;
use mj_db::models::project::{
    CreateProject, DeliveryUpdate, PaymentUpdate, Project, UpdateOutcome, UpdateProject,
};
use mj_db::models::project_image::ProjectImage;
use mj_db::repositories::{PackingListRepo, ProjectImageRepo, ProjectRepo, WarehouseRepo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A project as shown to clients, with every derived field filled in.
///
/// `delivery_status` in the flattened project is replaced by the value
/// derived for today, so a passed shipping date shows as delayed even if
/// nothing was written since.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub delivery_status_label: &'static str,
    pub payment_status: PaymentStatus,
    pub payment_status_label: &'static str,
    pub warehouse: WarehouseProgress,
}

impl ProjectView {
    pub fn build(mut project: Project, received_quantity: i64, today: NaiveDate) -> Self {
        let status = derive_delivery_status(&project.delivery_facts(received_quantity), today);
        project.delivery_status = status.code().to_string();
        let payment_status = project.payment_schedule.status();
        let warehouse = WarehouseProgress::compute(i64::from(project.quantity), received_quantity);
        Self {
            project,
            delivery_status_label: status.label(),
            payment_status,
            payment_status_label: payment_status.label(),
            warehouse,
        }
    }
}

/// `GET /mj-project/{id}` body: the project plus its photos.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub view: ProjectView,
    pub images: Vec<ProjectImage>,
}

/// Payment form. Derived amounts are computed from these inputs.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub unit_price: Decimal,
    pub fee_rate: Decimal,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub additional_costs: Vec<AdditionalCostItem>,
    #[serde(default)]
    pub payment_schedule: PaymentSchedule,
    pub version: Option<i32>,
}

/// `POST /mj-project/{id}/payment` body: the saved project and the breakdown
/// that was stored.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub view: ProjectView,
    pub breakdown: PaymentBreakdown,
}

/// Delivery form. Omitted dates are cleared.
#[derive(Debug, Deserialize)]
pub struct DeliveryRequest {
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_factory_shipping_completed: bool,
    pub version: Option<i32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/mj-project
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectView>>>> {
    let today = today();
    let projects = ProjectRepo::list(&state.pool).await?;
    let views = projects
        .into_iter()
        .map(|p| ProjectView::build(p.project, p.received_quantity, today))
        .collect();
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/mj-project
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<ProjectView>)> {
    let mut errors = ValidationErrors::new();
    errors
        .check(validate_name("Project name", &input.name))
        .check(validate_positive_quantity("Quantity", input.quantity));
    if let Some(price) = input.target_price {
        errors.check(validate_money_amount("Target price", price));
    }
    errors.into_result()?;

    let project = ProjectRepo::create(&state.pool, &input, admin.user_id).await?;
    Ok((StatusCode::CREATED, Json(ProjectView::build(project, 0, today()))))
}

/// GET /api/mj-project/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let found = ProjectRepo::find_with_received(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let images = ProjectImageRepo::list_by_project(&state.pool, id).await?;

    Ok(Json(ProjectDetail {
        view: ProjectView::build(found.project, found.received_quantity, today()),
        images,
    }))
}

/// PATCH /api/mj-project/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<ProjectView>> {
    let mut errors = ValidationErrors::new();
    if let Some(name) = input.name.as_deref() {
        errors.check(validate_name("Project name", name));
    }
    if let Some(quantity) = input.quantity {
        errors.check(validate_positive_quantity("Quantity", quantity));
    }
    if let Some(price) = input.target_price {
        errors.check(validate_money_amount("Target price", price));
    }
    errors.into_result()?;

    let outcome = ProjectRepo::update(&state.pool, id, &input).await?;
    let project = into_updated(id, outcome)?;
    tracing::info!(project_id = id, updated_by = admin.user_id, "Updated MJ project");

    // A quantity change can move the project into or out of "received";
    // the repository has already re-derived the payment amounts.
    refreshed_view(&state, project).await.map(Json)
}

/// DELETE /api/mj-project/{id}
///
/// Removes the project, its photos, warehouse entries and warehouse photos.
/// Packing-list rows survive with their project link cleared.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let paths = ProjectRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.storage.remove_all(&paths).await;

    tracing::info!(project_id = id, deleted_by = admin.user_id, "Deleted MJ project");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/mj-project/{id}/payment
///
/// Stores the payment inputs together with the fee, subtotal and total
/// derived from them and the project quantity.
pub async fn save_payment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PaymentRequest>,
) -> AppResult<Json<PaymentResponse>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    // Inputs are stored at column precision, so compute from the same values.
    let payment_input = PaymentInput {
        unit_price: round_money(input.unit_price),
        quantity: project.quantity,
        fee_rate: round_money(input.fee_rate),
        shipping_cost: round_money(input.shipping_cost),
        additional_costs: input.additional_costs,
    };
    let mut errors = match payment_input.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    errors.check(input.payment_schedule.validate());
    errors.into_result()?;

    let breakdown = PaymentBreakdown::compute(&payment_input)?;
    let update = PaymentUpdate {
        quantity: payment_input.quantity,
        unit_price: payment_input.unit_price,
        fee_rate: payment_input.fee_rate,
        fee: breakdown.fee,
        subtotal: breakdown.subtotal,
        shipping_cost: payment_input.shipping_cost,
        total_amount: breakdown.total,
        additional_costs: payment_input.additional_costs,
        payment_schedule: input.payment_schedule,
        version: input.version,
    };

    let outcome = ProjectRepo::update_payment(&state.pool, id, &update).await?;
    let project = into_updated(id, outcome)?;
    let received = WarehouseRepo::received_total(&state.pool, id).await?;

    tracing::info!(
        project_id = id,
        total = %breakdown.total,
        updated_by = admin.user_id,
        "Saved project payment"
    );
    Ok(Json(PaymentResponse {
        view: ProjectView::build(project, received, today()),
        breakdown,
    }))
}

/// POST /api/mj-project/{id}/delivery
pub async fn save_delivery(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DeliveryRequest>,
) -> AppResult<Json<ProjectView>> {
    let found = ProjectRepo::find_with_received(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let facts = DeliveryFacts {
        order_date: input.order_date,
        is_order_completed: input.is_order_completed,
        factory_shipping_date: input.factory_shipping_date,
        is_factory_shipping_completed: input.is_factory_shipping_completed,
        ordered_quantity: i64::from(found.project.quantity),
        received_quantity: found.received_quantity,
    };
    validate_delivery_dates(&facts).map_err(CoreError::Validation)?;
    let status = derive_delivery_status(&facts, today());

    let update = DeliveryUpdate {
        order_date: facts.order_date,
        is_order_completed: facts.is_order_completed,
        factory_shipping_date: facts.factory_shipping_date,
        is_factory_shipping_completed: facts.is_factory_shipping_completed,
        delivery_status: status,
        version: input.version,
    };
    let outcome = ProjectRepo::update_delivery(&state.pool, id, &update).await?;
    let project = into_updated(id, outcome)?;

    tracing::info!(
        project_id = id,
        status = status.code(),
        updated_by = admin.user_id,
        "Saved project delivery"
    );
    Ok(Json(ProjectView::build(project, found.received_quantity, today())))
}

/// GET /api/mj-project/calendar?from=&to=
pub async fn calendar(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<CalendarEvent>>>> {
    validate_range(params.from, params.to).map_err(CoreError::Validation)?;

    let projects: Vec<ProjectDates> = ProjectRepo::calendar_rows(&state.pool, params.from, params.to)
        .await?
        .into_iter()
        .map(|row| ProjectDates {
            project_id: row.id,
            name: row.name,
            order_date: row.order_date,
            is_order_completed: row.is_order_completed,
            factory_shipping_date: row.factory_shipping_date,
            is_factory_shipping_completed: row.is_factory_shipping_completed,
        })
        .collect();
    let packings: Vec<PackingDate> =
        PackingListRepo::dates_between(&state.pool, params.from, params.to)
            .await?
            .into_iter()
            .map(|row| PackingDate {
                pl_date: row.pl_date,
                packing_code: row.packing_code,
                project_id: row.project_id,
            })
            .collect();

    let events = build_events(&projects, &packings, params.from, params.to);
    Ok(Json(DataResponse { data: events }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Business date used for "is the shipping date overdue".
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "MjProject",
        id,
    })
}

fn into_updated(id: DbId, outcome: UpdateOutcome) -> AppResult<Project> {
    match outcome {
        UpdateOutcome::Updated(project) => Ok(project),
        UpdateOutcome::NotFound => Err(not_found(id)),
        UpdateOutcome::VersionConflict { current_version } => {
            Err(AppError::Core(CoreError::Conflict(format!(
                "Project {id} was modified by someone else (current version {current_version}); reload and try again"
            ))))
        }
        UpdateOutcome::Invalid(errors) => Err(errors.into()),
    }
}

/// Build the view for `project`, rewriting the cached delivery status when
/// it no longer matches the derived one.
pub(crate) async fn refreshed_view(state: &AppState, project: Project) -> AppResult<ProjectView> {
    let received = WarehouseRepo::received_total(&state.pool, project.id).await?;
    let stored = project.cached_delivery_status();
    let view = ProjectView::build(project, received, today());

    if let Some(derived) = view.project.cached_delivery_status() {
        if Some(derived) != stored {
            ProjectRepo::set_delivery_status(&state.pool, view.project.id, derived).await?;
            tracing::debug!(
                project_id = view.project.id,
                status = derived.code(),
                "Refreshed cached delivery status"
            );
        }
    }
    Ok(view)
}
