//! Row insertion helpers
//!
//! The services only read; these exist for loading fixtures and test data.

use crate::db::models::{Entity, MetricRow};
use crate::Result;
use sqlx::SqlitePool;

/// Insert one `entity_info` row
pub async fn insert_entity(pool: &SqlitePool, entity: &Entity) -> Result<()> {
    sqlx::query(
        "INSERT INTO entity_info (entity_id, parent_entity_id, entity_name, entity_type, has_child, deep_link_id)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entity.id.to_string())
    .bind(entity.parent_id.map(|p| p.to_string()))
    .bind(&entity.name)
    .bind(&entity.entity_type)
    .bind(entity.has_child as i64)
    .bind(&entity.deep_link_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert one `metric` row
///
/// Entity descriptive fields on `metric` are ignored; they come from the
/// join with `entity_info` on read.
pub async fn insert_metric(pool: &SqlitePool, metric: &MetricRow) -> Result<()> {
    sqlx::query(
        "INSERT INTO metric (metric_id, parent_entity_id, text, metric_name, metric_type, metric_unit,
                             min_threshold, max_threshold, sort, graph_layout)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&metric.metric_id)
    .bind(metric.parent_entity_id.to_string())
    .bind(&metric.text)
    .bind(&metric.metric_name)
    .bind(&metric.metric_type)
    .bind(&metric.metric_unit)
    .bind(metric.min_threshold)
    .bind(metric.max_threshold)
    .bind(metric.sort)
    .bind(&metric.graph_layout_json)
    .execute(pool)
    .await?;
    Ok(())
}
