//! Repository for `warehouse_entries` and `warehouse_images`.

use mj_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::warehouse::{
    CreateWarehouseEntry, CreateWarehouseImage, WarehouseEntry, WarehouseImage,
};

const ENTRY_COLUMNS: &str = "id, project_id, entry_date, quantity, note, created_by, created_at";

const IMAGE_COLUMNS: &str = "id, project_id, entry_id, file_name, original_name, file_path, \
                             file_size, sha256, created_at";

/// Provides CRUD operations for warehouse receipts and their photos.
pub struct WarehouseRepo;

impl WarehouseRepo {
    pub async fn create_entry(
        pool: &MySqlPool,
        input: &CreateWarehouseEntry,
        created_by: DbId,
    ) -> Result<WarehouseEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO warehouse_entries (project_id, entry_date, quantity, note, created_by)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(input.project_id)
        .bind(input.entry_date)
        .bind(input.quantity)
        .bind(&input.note)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {ENTRY_COLUMNS} FROM warehouse_entries WHERE id = ?");
        let entry = sqlx::query_as::<_, WarehouseEntry>(&query)
            .bind(result.last_insert_id() as DbId)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn find_entry(
        pool: &MySqlPool,
        id: DbId,
    ) -> Result<Option<WarehouseEntry>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM warehouse_entries WHERE id = ?");
        sqlx::query_as::<_, WarehouseEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Entries for one project, newest receipt first.
    pub async fn list_entries(
        pool: &MySqlPool,
        project_id: DbId,
    ) -> Result<Vec<WarehouseEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM warehouse_entries
             WHERE project_id = ?
             ORDER BY entry_date DESC, id DESC"
        );
        sqlx::query_as::<_, WarehouseEntry>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an entry and its photos.
    ///
    /// Returns the relative paths of the removed photos so the caller can
    /// delete the files, or `None` if the entry did not exist.
    pub async fn delete_entry(
        pool: &MySqlPool,
        id: DbId,
    ) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let paths: Vec<String> =
            sqlx::query_scalar("SELECT file_path FROM warehouse_images WHERE entry_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM warehouse_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(paths))
    }

    /// Total received quantity for a project (0 when nothing was received).
    pub async fn received_total(pool: &MySqlPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(quantity), 0) AS SIGNED)
             FROM warehouse_entries WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Record a batch of stored photos in one transaction, in input order.
    pub async fn create_images(
        pool: &MySqlPool,
        inputs: &[CreateWarehouseImage],
    ) -> Result<Vec<WarehouseImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let select = format!("SELECT {IMAGE_COLUMNS} FROM warehouse_images WHERE id = ?");
        let mut images = Vec::with_capacity(inputs.len());

        for input in inputs {
            let result = sqlx::query(
                "INSERT INTO warehouse_images
                    (project_id, entry_id, file_name, original_name, file_path, file_size, sha256)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(input.project_id)
            .bind(input.entry_id)
            .bind(&input.file_name)
            .bind(&input.original_name)
            .bind(&input.file_path)
            .bind(input.file_size)
            .bind(&input.sha256)
            .execute(&mut *tx)
            .await?;

            let image = sqlx::query_as::<_, WarehouseImage>(&select)
                .bind(result.last_insert_id() as DbId)
                .fetch_one(&mut *tx)
                .await?;
            images.push(image);
        }

        tx.commit().await?;
        Ok(images)
    }

    pub async fn list_images(
        pool: &MySqlPool,
        project_id: DbId,
    ) -> Result<Vec<WarehouseImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM warehouse_images WHERE project_id = ? ORDER BY id"
        );
        sqlx::query_as::<_, WarehouseImage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
