//! Breadcrumb resolution
//!
//! Walks parent pointers from an entity up to its `framework` root and
//! returns the trail root-first. Navigation degrades gracefully: a missing
//! starting entity gives an empty trail, never an error.

use std::collections::HashSet;
use std::sync::Arc;

use mdash_common::db::Entity;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::LayoutError;
use crate::reporter::ErrorReporter;
use crate::store::LayoutStore;

/// Ordered ancestor path, root first, leaf last
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationTrail {
    pub entities: Vec<Entity>,
    pub depth: usize,
}

impl NavigationTrail {
    fn from_root_first(entities: Vec<Entity>) -> Self {
        let depth = entities.len();
        Self { entities, depth }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Resolves navigation trails through a [`LayoutStore`]
pub struct BreadcrumbResolver {
    store: Arc<dyn LayoutStore>,
    reporter: Arc<dyn ErrorReporter>,
    max_depth: usize,
}

impl BreadcrumbResolver {
    pub fn new(
        store: Arc<dyn LayoutStore>,
        reporter: Arc<dyn ErrorReporter>,
        max_depth: usize,
    ) -> Self {
        Self {
            store,
            reporter,
            max_depth: max_depth.max(1),
        }
    }

    /// Resolve the trail ending at `entity_id`
    ///
    /// One store round trip per level. The walk stops at the first
    /// `framework` entity, at an unresolvable ancestor, at a repeated id, or
    /// after `max_depth` levels; whatever was resolved up to that point is
    /// returned.
    pub async fn resolve(&self, entity_id: Uuid) -> NavigationTrail {
        let mut leaf_first: Vec<Entity> = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(entity_id);

        while let Some(id) = next {
            if leaf_first.len() >= self.max_depth {
                warn!(
                    entity_id = %entity_id,
                    max_depth = self.max_depth,
                    "Breadcrumb depth limit reached, trail truncated"
                );
                break;
            }
            if !visited.insert(id) {
                warn!(entity_id = %entity_id, repeated = %id, "Cycle in parent chain");
                break;
            }

            match self.fetch_level(id).await {
                Ok(entity) => {
                    next = if entity.is_framework() {
                        None
                    } else {
                        entity.parent_id
                    };
                    leaf_first.push(entity);
                }
                Err(LayoutError::NotFound(missing)) => {
                    debug!(entity_id = %entity_id, missing = %missing, "Breadcrumb ends at missing entity");
                    break;
                }
                Err(err) => {
                    self.reporter.report("resolve_breadcrumb", &err);
                    break;
                }
            }
        }

        leaf_first.reverse();
        NavigationTrail::from_root_first(leaf_first)
    }

    async fn fetch_level(&self, id: Uuid) -> Result<Entity, LayoutError> {
        self.store
            .fetch_entity(id)
            .await
            .map_err(|e| LayoutError::query("fetch_entity", e))?
            .ok_or(LayoutError::NotFound(id))
    }
}
