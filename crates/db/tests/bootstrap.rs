use sqlx::MySqlPool;

/// Connect, migrate, and verify every table exists and starts empty.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a MySQL DATABASE_URL"]
async fn test_full_bootstrap(pool: MySqlPool) {
    mj_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "mj_project",
        "mj_project_images",
        "mj_packing_list",
        "logistic_payment",
        "warehouse_entries",
        "warehouse_images",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
