//! Repository for the `mj_project_images` table.

use mj_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::project_image::{CreateProjectImage, ProjectImage};

const COLUMNS: &str =
    "id, project_id, file_name, original_name, file_path, file_size, sha256, created_at";

pub struct ProjectImageRepo;

impl ProjectImageRepo {
    /// Record a batch of stored photos in one transaction, in input order.
    pub async fn create_many(
        pool: &MySqlPool,
        inputs: &[CreateProjectImage],
    ) -> Result<Vec<ProjectImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let select = format!("SELECT {COLUMNS} FROM mj_project_images WHERE id = ?");
        let mut images = Vec::with_capacity(inputs.len());

        for input in inputs {
            let result = sqlx::query(
                "INSERT INTO mj_project_images
                    (project_id, file_name, original_name, file_path, file_size, sha256)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(input.project_id)
            .bind(&input.file_name)
            .bind(&input.original_name)
            .bind(&input.file_path)
            .bind(input.file_size)
            .bind(&input.sha256)
            .execute(&mut *tx)
            .await?;

            let image = sqlx::query_as::<_, ProjectImage>(&select)
                .bind(result.last_insert_id() as DbId)
                .fetch_one(&mut *tx)
                .await?;
            images.push(image);
        }

        tx.commit().await?;
        Ok(images)
    }

    pub async fn find_by_id(
        pool: &MySqlPool,
        id: DbId,
    ) -> Result<Option<ProjectImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mj_project_images WHERE id = ?");
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &MySqlPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectImage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM mj_project_images WHERE project_id = ? ORDER BY id");
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an image row scoped to its project. Returns `true` if removed.
    pub async fn delete(pool: &MySqlPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mj_project_images WHERE id = ? AND project_id = ?")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
