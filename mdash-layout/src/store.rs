//! Store capability consumed by the layout core
//!
//! [`LayoutStore`] is the only way the aggregator, breadcrumb resolver and
//! component facade reach data. [`SqliteLayoutStore`] backs it with the
//! `entity_info` and `metric` tables.

use async_trait::async_trait;
use mdash_common::db::{Entity, MetricRow, ENTITY_COLUMNS};
use mdash_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Read-only queries the layout core needs
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Distinct ids of entities whose parent is `parent_id`
    ///
    /// The nil UUID selects top-level entities (those without a parent).
    async fn fetch_child_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>>;

    /// Single entity by id, `None` when no row exists
    async fn fetch_entity(&self, entity_id: Uuid) -> Result<Option<Entity>>;

    /// Metrics owned by `parent_id`, joined with entity info, `sort` ascending
    async fn fetch_metrics(&self, parent_id: Uuid) -> Result<Vec<MetricRow>>;
}

/// SQLite implementation of [`LayoutStore`]
#[derive(Clone)]
pub struct SqliteLayoutStore {
    pool: SqlitePool,
}

impl SqliteLayoutStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LayoutStore for SqliteLayoutStore {
    async fn fetch_child_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<String> = if parent_id.is_nil() {
            sqlx::query_scalar(
                "SELECT DISTINCT entity_id FROM entity_info
                 WHERE parent_entity_id IS NULL
                 ORDER BY entity_id",
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT DISTINCT entity_id FROM entity_info
                 WHERE parent_entity_id = ?
                 ORDER BY entity_id",
            )
            .bind(parent_id.to_string())
            .fetch_all(&self.pool)
            .await?
        };

        ids.iter()
            .map(|s| {
                Uuid::parse_str(s).map_err(|e| {
                    mdash_common::Error::Internal(format!("Corrupt entity_id {:?}: {}", s, e))
                })
            })
            .collect()
    }

    async fn fetch_entity(&self, entity_id: Uuid) -> Result<Option<Entity>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entity_info WHERE entity_id = ? LIMIT 1",
            ENTITY_COLUMNS
        ))
        .bind(entity_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Entity::from_row).transpose()
    }

    async fn fetch_metrics(&self, parent_id: Uuid) -> Result<Vec<MetricRow>> {
        let rows = sqlx::query(
            "SELECT m.metric_id, m.text, m.parent_entity_id,
                    e.entity_name, e.entity_type, e.has_child, e.deep_link_id,
                    m.metric_name, m.metric_type, m.metric_unit,
                    m.min_threshold, m.max_threshold, m.sort, m.graph_layout
             FROM metric m
             JOIN entity_info e ON e.entity_id = m.parent_entity_id
             WHERE m.parent_entity_id = ?
             GROUP BY e.entity_id, m.metric_id, m.sort
             ORDER BY m.sort ASC, m.metric_id ASC",
        )
        .bind(parent_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(MetricRow::from_row).collect()
    }
}
