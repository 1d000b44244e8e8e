//! Repository for the `mj_project` table.

use chrono::NaiveDate;
use mj_core::delivery::DeliveryStatus;
use mj_core::payment::{AdditionalCostItem, PaymentBreakdown, PaymentSchedule};
use mj_core::types::DbId;
use sqlx::types::Json;
use sqlx::MySqlPool;

use crate::models::project::{
    CreateProject, DeliveryUpdate, PaymentUpdate, Project, ProjectCalendarRow, ProjectLedgerRow,
    ProjectWithReceived, UpdateOutcome, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, quantity, target_price, description, user_id, created_by, \
                       unit_price, fee_rate, fee, subtotal, shipping_cost, total_amount, \
                       additional_costs, payment_schedule, \
                       order_date, is_order_completed, factory_shipping_date, \
                       is_factory_shipping_completed, delivery_status, \
                       version, created_at, updated_at";

/// Correlated sum of warehouse receipts, cast so MySQL returns BIGINT rather
/// than DECIMAL.
const RECEIVED_QUANTITY: &str = "CAST(COALESCE((SELECT SUM(w.quantity) FROM warehouse_entries w \
                                 WHERE w.project_id = mj_project.id), 0) AS SIGNED) AS received_quantity";

/// Provides CRUD operations for MJ projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Register a new project, returning the created row.
    ///
    /// Payment and delivery columns start empty; the delivery status starts at
    /// `awaiting_order`.
    pub async fn create(
        pool: &MySqlPool,
        input: &CreateProject,
        created_by: DbId,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO mj_project
                (name, quantity, target_price, description, user_id, created_by,
                 additional_costs, payment_schedule, delivery_status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.target_price)
        .bind(&input.description)
        .bind(input.user_id.unwrap_or(created_by))
        .bind(created_by)
        .bind(Json(Vec::<AdditionalCostItem>::new()))
        .bind(Json(PaymentSchedule::default()))
        .bind(DeliveryStatus::AwaitingOrder.code())
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_id() as DbId;
        let query = format!("SELECT {COLUMNS} FROM mj_project WHERE id = ?");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(project_id = id, created_by, "Registered MJ project");
        Ok(project)
    }

    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mj_project WHERE id = ?");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project together with its received warehouse quantity.
    pub async fn find_with_received(
        pool: &MySqlPool,
        id: DbId,
    ) -> Result<Option<ProjectWithReceived>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS}, {RECEIVED_QUANTITY} FROM mj_project WHERE id = ?");
        sqlx::query_as::<_, ProjectWithReceived>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects, most recently registered first.
    pub async fn list(pool: &MySqlPool) -> Result<Vec<ProjectWithReceived>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {RECEIVED_QUANTITY} FROM mj_project ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectWithReceived>(&query)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Only non-`None` fields in `input` are applied.
    ///
    /// A quantity change re-derives subtotal, fee and total from the stored
    /// payment inputs under the same row lock, so the amounts never describe
    /// a quantity the project no longer has.
    pub async fn update(
        pool: &MySqlPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM mj_project WHERE id = ? FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateOutcome::NotFound);
        };
        if input.version.is_some_and(|v| v != current.version) {
            return Ok(UpdateOutcome::VersionConflict {
                current_version: current.version,
            });
        }

        let repriced = match input.quantity {
            Some(quantity) if quantity != current.quantity => {
                match current.payment_input(quantity).map(|p| PaymentBreakdown::compute(&p)) {
                    Some(Ok(breakdown)) => Some(breakdown),
                    Some(Err(errors)) => return Ok(UpdateOutcome::Invalid(errors)),
                    None => None,
                }
            }
            _ => None,
        };

        sqlx::query(
            "UPDATE mj_project SET
                name = COALESCE(?, name),
                quantity = COALESCE(?, quantity),
                target_price = COALESCE(?, target_price),
                description = COALESCE(?, description),
                user_id = COALESCE(?, user_id),
                subtotal = COALESCE(?, subtotal),
                fee = COALESCE(?, fee),
                total_amount = COALESCE(?, total_amount),
                version = version + 1
             WHERE id = ?",
        )
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.quantity)
        .bind(input.target_price)
        .bind(&input.description)
        .bind(input.user_id)
        .bind(repriced.map(|b| b.subtotal))
        .bind(repriced.map(|b| b.fee))
        .bind(repriced.map(|b| b.total))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM mj_project WHERE id = ?");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        if let Some(breakdown) = repriced {
            tracing::info!(
                project_id = id,
                quantity = project.quantity,
                total = %breakdown.total,
                "Re-derived payment amounts after quantity change"
            );
        }
        Ok(UpdateOutcome::Updated(project))
    }

    /// Overwrite the payment columns with server-computed values.
    pub async fn update_payment(
        pool: &MySqlPool,
        id: DbId,
        input: &PaymentUpdate,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE mj_project SET
                unit_price = ?,
                fee_rate = ?,
                fee = ?,
                subtotal = ?,
                shipping_cost = ?,
                total_amount = ?,
                additional_costs = ?,
                payment_schedule = ?,
                version = version + 1
             WHERE id = ? AND quantity = ? AND (? IS NULL OR version = ?)",
        )
        .bind(input.unit_price)
        .bind(input.fee_rate)
        .bind(input.fee)
        .bind(input.subtotal)
        .bind(input.shipping_cost)
        .bind(input.total_amount)
        .bind(Json(&input.additional_costs))
        .bind(Json(&input.payment_schedule))
        .bind(id)
        .bind(input.quantity)
        .bind(input.version)
        .bind(input.version)
        .execute(pool)
        .await?;

        Self::outcome(pool, id, result.rows_affected()).await
    }

    /// Overwrite the delivery columns and the cached status.
    pub async fn update_delivery(
        pool: &MySqlPool,
        id: DbId,
        input: &DeliveryUpdate,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE mj_project SET
                order_date = ?,
                is_order_completed = ?,
                factory_shipping_date = ?,
                is_factory_shipping_completed = ?,
                delivery_status = ?,
                version = version + 1
             WHERE id = ? AND (? IS NULL OR version = ?)",
        )
        .bind(input.order_date)
        .bind(input.is_order_completed)
        .bind(input.factory_shipping_date)
        .bind(input.is_factory_shipping_completed)
        .bind(input.delivery_status.code())
        .bind(id)
        .bind(input.version)
        .bind(input.version)
        .execute(pool)
        .await?;

        Self::outcome(pool, id, result.rows_affected()).await
    }

    /// Refresh the cached delivery status without bumping the version.
    pub async fn set_delivery_status(
        pool: &MySqlPool,
        id: DbId,
        status: DeliveryStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE mj_project SET delivery_status = ? WHERE id = ?")
            .bind(status.code())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a project and, via foreign-key cascades, its images and
    /// warehouse rows.
    ///
    /// Returns the relative paths of every stored file that belonged to the
    /// project so the caller can remove them from disk, or `None` if no such
    /// project exists.
    pub async fn delete(pool: &MySqlPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut paths: Vec<String> =
            sqlx::query_scalar("SELECT file_path FROM mj_project_images WHERE project_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        let warehouse_paths: Vec<String> =
            sqlx::query_scalar("SELECT file_path FROM warehouse_images WHERE project_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        paths.extend(warehouse_paths);

        let result = sqlx::query("DELETE FROM mj_project WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        tracing::info!(project_id = id, files = paths.len(), "Deleted MJ project");
        Ok(Some(paths))
    }

    /// Payment columns of every project, for the finance summary.
    pub async fn ledger_rows(pool: &MySqlPool) -> Result<Vec<ProjectLedgerRow>, sqlx::Error> {
        sqlx::query_as::<_, ProjectLedgerRow>(
            "SELECT id, total_amount, payment_schedule FROM mj_project ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Projects with an order or factory-shipping date inside `[from, to]`.
    pub async fn calendar_rows(
        pool: &MySqlPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProjectCalendarRow>, sqlx::Error> {
        sqlx::query_as::<_, ProjectCalendarRow>(
            "SELECT id, name, order_date, is_order_completed,
                    factory_shipping_date, is_factory_shipping_completed
             FROM mj_project
             WHERE order_date BETWEEN ? AND ?
                OR factory_shipping_date BETWEEN ? AND ?
             ORDER BY id",
        )
        .bind(from)
        .bind(to)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Classify a version-checked update by re-reading the row.
    async fn outcome(
        pool: &MySqlPool,
        id: DbId,
        rows_affected: u64,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        Ok(match Self::find_by_id(pool, id).await? {
            None => UpdateOutcome::NotFound,
            Some(project) if rows_affected == 0 => UpdateOutcome::VersionConflict {
                current_version: project.version,
            },
            Some(project) => UpdateOutcome::Updated(project),
        })
    }
}
