//! In-memory [`LayoutStore`] for integration tests
//!
//! Holds entities and metrics in `tokio::sync::RwLock` maps, counts calls per
//! query, and can be told to fail any single query.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use mdash_common::db::{Entity, MetricRow};
use mdash_common::{Error, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use mdash_layout::store::LayoutStore;

/// In-memory mock implementation of [`LayoutStore`]
#[derive(Default)]
pub struct MockLayoutStore {
    entities: RwLock<HashMap<Uuid, Entity>>,
    metrics: RwLock<Vec<MetricRow>>,

    pub fail_child_ids: AtomicBool,
    pub fail_entity: AtomicBool,
    pub fail_metrics: AtomicBool,

    pub child_id_calls: AtomicUsize,
    pub entity_calls: AtomicUsize,
    pub metric_calls: AtomicUsize,
}

impl MockLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_entity(&self, entity: Entity) {
        self.entities.write().await.insert(entity.id, entity);
    }

    /// Add a metric; entity descriptive fields are filled from the owner on read
    pub async fn add_metric(&self, metric: MetricRow) {
        self.metrics.write().await.push(metric);
    }

    fn injected(flag: &AtomicBool, query: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(Error::Internal(format!("injected {} failure", query)));
        }
        Ok(())
    }
}

#[async_trait]
impl LayoutStore for MockLayoutStore {
    async fn fetch_child_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>> {
        self.child_id_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_child_ids, "child ids")?;

        let wanted = if parent_id.is_nil() { None } else { Some(parent_id) };
        let mut ids: Vec<Uuid> = self
            .entities
            .read()
            .await
            .values()
            .filter(|e| e.parent_id == wanted)
            .map(|e| e.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn fetch_entity(&self, entity_id: Uuid) -> Result<Option<Entity>> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_entity, "entity")?;

        Ok(self.entities.read().await.get(&entity_id).cloned())
    }

    async fn fetch_metrics(&self, parent_id: Uuid) -> Result<Vec<MetricRow>> {
        self.metric_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_metrics, "metrics")?;

        let entities = self.entities.read().await;
        let owner = match entities.get(&parent_id) {
            Some(owner) => owner,
            None => return Ok(Vec::new()),
        };

        let mut rows: Vec<MetricRow> = self
            .metrics
            .read()
            .await
            .iter()
            .filter(|m| m.parent_entity_id == parent_id)
            .map(|m| MetricRow {
                entity_name: owner.name.clone(),
                entity_type: owner.entity_type.clone(),
                has_child: owner.has_child,
                deep_link_id: owner.deep_link_id.clone(),
                ..m.clone()
            })
            .collect();
        rows.sort_by(|a, b| a.sort.cmp(&b.sort).then_with(|| a.metric_id.cmp(&b.metric_id)));
        Ok(rows)
    }
}
