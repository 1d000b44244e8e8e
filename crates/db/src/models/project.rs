//! MJ project entity model and DTOs.

use chrono::NaiveDate;
use mj_core::delivery::{DeliveryFacts, DeliveryStatus};
use mj_core::payment::{AdditionalCostItem, PaymentInput, PaymentSchedule};
use mj_core::types::{DbId, Timestamp};
use mj_core::validation::ValidationErrors;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `mj_project` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub quantity: i32,
    pub target_price: Option<Decimal>,
    pub description: Option<String>,
    pub user_id: Option<DbId>,
    pub created_by: Option<DbId>,

    pub unit_price: Option<Decimal>,
    pub fee_rate: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub additional_costs: Json<Vec<AdditionalCostItem>>,
    pub payment_schedule: Json<PaymentSchedule>,

    pub order_date: Option<NaiveDate>,
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    pub is_factory_shipping_completed: bool,
    /// Cached [`DeliveryStatus`] code; refreshed by the API on every change.
    pub delivery_status: String,

    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Delivery inputs of this project combined with the warehouse total.
    pub fn delivery_facts(&self, received_quantity: i64) -> DeliveryFacts {
        DeliveryFacts {
            order_date: self.order_date,
            is_order_completed: self.is_order_completed,
            factory_shipping_date: self.factory_shipping_date,
            is_factory_shipping_completed: self.is_factory_shipping_completed,
            ordered_quantity: i64::from(self.quantity),
            received_quantity,
        }
    }

    pub fn cached_delivery_status(&self) -> Option<DeliveryStatus> {
        DeliveryStatus::from_code(&self.delivery_status)
    }

    /// The stored payment inputs applied to `quantity`, or `None` while no
    /// payment has been saved.
    pub fn payment_input(&self, quantity: i32) -> Option<PaymentInput> {
        Some(PaymentInput {
            unit_price: self.unit_price?,
            quantity,
            fee_rate: self.fee_rate.unwrap_or_default(),
            shipping_cost: self.shipping_cost.unwrap_or_default(),
            additional_costs: self.additional_costs.0.clone(),
        })
    }
}

/// A project with the quantity received at the warehouse so far.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectWithReceived {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub received_quantity: i64,
}

/// DTO for registering a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub quantity: i32,
    pub target_price: Option<Decimal>,
    pub description: Option<String>,
    /// Owner; defaults to the registering user.
    pub user_id: Option<DbId>,
}

/// DTO for a partial update. All fields are optional.
///
/// When `version` is present the update only applies if it still matches the
/// stored row, otherwise the caller gets a conflict.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub target_price: Option<Decimal>,
    pub description: Option<String>,
    pub user_id: Option<DbId>,
    pub version: Option<i32>,
}

/// Server-computed payment columns written by the payment endpoint.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    /// Quantity the amounts were derived from; the write is refused if the
    /// stored quantity has changed since.
    pub quantity: i32,
    pub unit_price: Decimal,
    pub fee_rate: Decimal,
    pub fee: Decimal,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
    pub additional_costs: Vec<AdditionalCostItem>,
    pub payment_schedule: PaymentSchedule,
    pub version: Option<i32>,
}

/// Delivery columns written by the delivery endpoint. Dates are replaced
/// wholesale so a cleared date becomes `NULL`.
#[derive(Debug, Clone)]
pub struct DeliveryUpdate {
    pub order_date: Option<NaiveDate>,
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    pub is_factory_shipping_completed: bool,
    pub delivery_status: DeliveryStatus,
    pub version: Option<i32>,
}

/// Result of a version-checked update.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Project),
    NotFound,
    /// The row exists but its version moved on.
    VersionConflict { current_version: i32 },
    /// The change would push a derived amount out of range.
    Invalid(ValidationErrors),
}

/// Payment columns needed for the finance summary.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectLedgerRow {
    pub id: DbId,
    pub total_amount: Option<Decimal>,
    pub payment_schedule: Json<PaymentSchedule>,
}

/// Date columns needed for the calendar.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectCalendarRow {
    pub id: DbId,
    pub name: String,
    pub order_date: Option<NaiveDate>,
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    pub is_factory_shipping_completed: bool,
}
