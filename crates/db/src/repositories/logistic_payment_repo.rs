//! Repository for the `logistic_payment` table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::models::logistic_payment::{LogisticPaymentRow, UpsertLogisticPayment};

const SELECT_JOINED: &str = "SELECT lp.id, lp.packing_list_id, lp.packing_code, lp.box_no, \
                             lp.box_fee, lp.is_paid, pl.product_name, pl.pl_date, lp.updated_at \
                             FROM logistic_payment lp \
                             JOIN mj_packing_list pl ON pl.id = lp.packing_list_id";

/// Provides batch upsert and lookup for per-box shipping fees.
pub struct LogisticPaymentRepo;

impl LogisticPaymentRepo {
    /// Insert or overwrite every row in one transaction.
    ///
    /// A row is identified by `(packing_list_id, box_no)`. Either all rows are
    /// written or none are.
    pub async fn upsert_many(
        pool: &MySqlPool,
        rows: &[UpsertLogisticPayment],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut written = 0;

        for row in rows {
            sqlx::query(
                "INSERT INTO logistic_payment (packing_list_id, packing_code, box_no, box_fee, is_paid)
                 VALUES (?, ?, ?, ?, ?)
                 ON DUPLICATE KEY UPDATE
                    packing_code = VALUES(packing_code),
                    box_fee = VALUES(box_fee),
                    is_paid = VALUES(is_paid)",
            )
            .bind(row.packing_list_id)
            .bind(row.packing_code.trim())
            .bind(row.box_no)
            .bind(row.box_fee)
            .bind(row.is_paid)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;
        Ok(written)
    }

    /// All fee rows for packing-list items shipped on `pl_date`.
    pub async fn list_by_date(
        pool: &MySqlPool,
        pl_date: NaiveDate,
    ) -> Result<Vec<LogisticPaymentRow>, sqlx::Error> {
        let query = format!(
            "{SELECT_JOINED} WHERE pl.pl_date = ? ORDER BY lp.packing_code, lp.packing_list_id, lp.box_no"
        );
        sqlx::query_as::<_, LogisticPaymentRow>(&query)
            .bind(pl_date)
            .fetch_all(pool)
            .await
    }

    /// Every `(box_fee, is_paid)` pair, for the finance summary.
    pub async fn all_fees(pool: &MySqlPool) -> Result<Vec<(Decimal, bool)>, sqlx::Error> {
        sqlx::query_as::<_, (Decimal, bool)>("SELECT box_fee, is_paid FROM logistic_payment")
            .fetch_all(pool)
            .await
    }
}
