//! Repository for the `mj_packing_list` table.

use chrono::NaiveDate;
use mj_core::packing::AutoSaveKey;
use mj_core::types::DbId;
use sqlx::{MySql, MySqlConnection, MySqlPool, QueryBuilder};

use crate::models::packing_list::{
    AutoSaveResult, CreatePackingListItem, PackingDateRow, PackingListFilter, PackingListItem,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, client_id, project_id, pl_date, packing_code, box_count, \
                       product_name, product_sku, product_image, packaging_method, \
                       packaging_count, quantity_per_box, logistic_company, created_by, \
                       created_at, updated_at";

/// Provides CRUD and auto-save operations for packing-list rows.
pub struct PackingListRepo;

impl PackingListRepo {
    pub async fn find_by_id(
        pool: &MySqlPool,
        id: DbId,
    ) -> Result<Option<PackingListItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mj_packing_list WHERE id = ?");
        sqlx::query_as::<_, PackingListItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several rows by id. Missing ids are simply absent from the result.
    pub async fn find_many(
        pool: &MySqlPool,
        ids: &[DbId],
    ) -> Result<Vec<PackingListItem>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<'_, MySql> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM mj_packing_list WHERE id IN ("));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        qb.build_query_as::<PackingListItem>().fetch_all(pool).await
    }

    /// List rows ordered by date, packing code, then insertion order.
    pub async fn list(
        pool: &MySqlPool,
        filter: &PackingListFilter,
    ) -> Result<Vec<PackingListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mj_packing_list
             WHERE (? IS NULL OR pl_date = ?)
               AND (? IS NULL OR project_id = ?)
             ORDER BY pl_date, packing_code, id"
        );
        sqlx::query_as::<_, PackingListItem>(&query)
            .bind(filter.pl_date)
            .bind(filter.pl_date)
            .bind(filter.project_id)
            .bind(filter.project_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a batch of rows in one transaction, returning them in input order.
    pub async fn create_many(
        pool: &MySqlPool,
        items: &[CreatePackingListItem],
        created_by: DbId,
    ) -> Result<Vec<PackingListItem>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let id = insert(&mut tx, item, created_by).await?;
            created.push(fetch(&mut tx, id).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find-or-insert a single row.
    ///
    /// The row is matched by `key` (client id, or date + code + product name)
    /// under a row lock; a match is updated in place, otherwise a new row is
    /// inserted. `force_insert` skips the lookup, for the case where the user
    /// deliberately enters two rows with the same product name.
    pub async fn auto_save(
        pool: &MySqlPool,
        key: &AutoSaveKey,
        item: &CreatePackingListItem,
        force_insert: bool,
        created_by: DbId,
    ) -> Result<AutoSaveResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing = if force_insert {
            None
        } else {
            find_for_update(&mut tx, key).await?
        };

        let (id, created) = match existing {
            Some(id) => {
                update(&mut tx, id, item).await?;
                (id, false)
            }
            None => (insert(&mut tx, item, created_by).await?, true),
        };

        let stored = fetch(&mut tx, id).await?;
        tx.commit().await?;

        tracing::debug!(packing_list_id = id, created, "Auto-saved packing-list row");
        Ok(AutoSaveResult {
            item: stored,
            created,
        })
    }

    /// Delete one row. Returns `true` if a row was removed.
    pub async fn delete(pool: &MySqlPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mj_packing_list WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every row of one packing group. Returns the number removed.
    pub async fn delete_group(
        pool: &MySqlPool,
        pl_date: NaiveDate,
        packing_code: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mj_packing_list WHERE pl_date = ? AND packing_code = ?")
            .bind(pl_date)
            .bind(packing_code.trim())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Distinct shipments with a date inside `[from, to]`.
    pub async fn dates_between(
        pool: &MySqlPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PackingDateRow>, sqlx::Error> {
        sqlx::query_as::<_, PackingDateRow>(
            "SELECT pl_date, packing_code, MIN(project_id) AS project_id
             FROM mj_packing_list
             WHERE pl_date BETWEEN ? AND ?
             GROUP BY pl_date, packing_code
             ORDER BY pl_date, packing_code",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}

async fn find_for_update(
    conn: &mut MySqlConnection,
    key: &AutoSaveKey,
) -> Result<Option<DbId>, sqlx::Error> {
    match key {
        AutoSaveKey::ClientId(client_id) => {
            sqlx::query_scalar("SELECT id FROM mj_packing_list WHERE client_id = ? FOR UPDATE")
                .bind(client_id.to_string())
                .fetch_optional(&mut *conn)
                .await
        }
        AutoSaveKey::Natural {
            pl_date,
            packing_code,
            product_name,
        } => {
            sqlx::query_scalar(
                "SELECT id FROM mj_packing_list
                 WHERE pl_date = ? AND packing_code = ? AND product_name = ?
                 ORDER BY id LIMIT 1 FOR UPDATE",
            )
            .bind(pl_date)
            .bind(packing_code)
            .bind(product_name)
            .fetch_optional(&mut *conn)
            .await
        }
    }
}

async fn insert(
    conn: &mut MySqlConnection,
    item: &CreatePackingListItem,
    created_by: DbId,
) -> Result<DbId, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO mj_packing_list
            (client_id, project_id, pl_date, packing_code, box_count, product_name,
             product_sku, product_image, packaging_method, packaging_count,
             quantity_per_box, logistic_company, created_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.client_id.map(|id| id.to_string()))
    .bind(item.project_id)
    .bind(item.pl_date)
    .bind(item.packing_code.trim())
    .bind(item.box_count)
    .bind(item.product_name.trim())
    .bind(&item.product_sku)
    .bind(&item.product_image)
    .bind(&item.packaging_method)
    .bind(item.packaging_count)
    .bind(item.quantity_per_box)
    .bind(&item.logistic_company)
    .bind(created_by)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_id() as DbId)
}

async fn update(
    conn: &mut MySqlConnection,
    id: DbId,
    item: &CreatePackingListItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE mj_packing_list SET
            project_id = ?,
            pl_date = ?,
            packing_code = ?,
            box_count = ?,
            product_name = ?,
            product_sku = ?,
            product_image = ?,
            packaging_method = ?,
            packaging_count = ?,
            quantity_per_box = ?,
            logistic_company = ?
         WHERE id = ?",
    )
    .bind(item.project_id)
    .bind(item.pl_date)
    .bind(item.packing_code.trim())
    .bind(item.box_count)
    .bind(item.product_name.trim())
    .bind(&item.product_sku)
    .bind(&item.product_image)
    .bind(&item.packaging_method)
    .bind(item.packaging_count)
    .bind(item.quantity_per_box)
    .bind(&item.logistic_company)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    // Fee rows follow the row: boxes past the new count go, the code is kept in step.
    let pruned = sqlx::query("DELETE FROM logistic_payment WHERE packing_list_id = ? AND box_no > ?")
        .bind(id)
        .bind(item.box_count)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    sqlx::query("UPDATE logistic_payment SET packing_code = ? WHERE packing_list_id = ?")
        .bind(item.packing_code.trim())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if pruned > 0 {
        tracing::debug!(packing_list_id = id, pruned, "Removed fees for boxes no longer packed");
    }
    Ok(())
}

async fn fetch(conn: &mut MySqlConnection, id: DbId) -> Result<PackingListItem, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM mj_packing_list WHERE id = ?");
    sqlx::query_as::<_, PackingListItem>(&query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}
