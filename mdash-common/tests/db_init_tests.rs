//! Tests for database initialization and the entity/metric row mappings

use mdash_common::db::{
    init_database, init_memory_database, insert_entity, insert_metric, Entity, MetricRow,
    ENTITY_COLUMNS,
};
use uuid::Uuid;

fn entity(name: &str, entity_type: &str, parent_id: Option<Uuid>) -> Entity {
    Entity {
        id: Uuid::new_v4(),
        parent_id,
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        has_child: false,
        deep_link_id: format!("dl-{}", name),
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("mdash.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("mdash.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Schema creation is idempotent
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_entity_roundtrip_through_table() {
    let pool = init_memory_database().await.unwrap();
    let root = entity("root", "framework", None);
    let child = entity("child", "service", Some(root.id));

    insert_entity(&pool, &root).await.unwrap();
    insert_entity(&pool, &child).await.unwrap();

    let row = sqlx::query(&format!(
        "SELECT {} FROM entity_info WHERE entity_id = ?",
        ENTITY_COLUMNS
    ))
    .bind(child.id.to_string())
    .fetch_one(&pool)
    .await
    .unwrap();

    let loaded = Entity::from_row(&row).unwrap();
    assert_eq!(loaded, child);
    assert!(!loaded.is_framework());
}

#[tokio::test]
async fn test_metric_requires_existing_entity() {
    let pool = init_memory_database().await.unwrap();

    let orphan = MetricRow {
        metric_id: "m1".to_string(),
        text: "Orphan".to_string(),
        parent_entity_id: Uuid::new_v4(),
        entity_name: String::new(),
        entity_type: String::new(),
        has_child: false,
        deep_link_id: String::new(),
        metric_name: "latency".to_string(),
        metric_type: "gauge".to_string(),
        metric_unit: "ms".to_string(),
        min_threshold: 0.0,
        max_threshold: 100.0,
        sort: 1,
        graph_layout_json: "[]".to_string(),
    };

    // Foreign keys are enforced
    assert!(insert_metric(&pool, &orphan).await.is_err());
}
