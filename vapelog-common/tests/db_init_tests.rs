//! Database initialization on first run and reopen

use tempfile::TempDir;
use vapelog_common::db::{get_schema_version, init_database, CURRENT_SCHEMA_VERSION};
use vapelog_common::models::{ConsumptionRoute, Product, ProductType};
use vapelog_common::{EntityStore, SqliteStore};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("vapelog.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_schema_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("vapelog.db")).await.unwrap();

    for table in ["products", "sessions", "check_ins", "schema_version"] {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1, "table {} missing", table);
    }

    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

    let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[tokio::test]
async fn test_database_reopen_keeps_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("vapelog.db");

    let pool = init_database(&db_path).await.unwrap();
    let store = SqliteStore::new(pool.clone());
    let product = Product::new("Persisted", ProductType::Flower, ConsumptionRoute::Inhalation);
    let id = store.insert_product(&product).await.unwrap().id.unwrap();
    pool.close().await;

    let reopened = SqliteStore::new(init_database(&db_path).await.unwrap());
    assert_eq!(reopened.get_product(id).await.unwrap().name, "Persisted");
    assert_eq!(get_schema_version(reopened.pool()).await.unwrap(), CURRENT_SCHEMA_VERSION);
}
