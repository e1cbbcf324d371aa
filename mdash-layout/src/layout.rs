//! Layout aggregation
//!
//! Given a parent entity id, the aggregator runs three sequential store
//! steps (child ids, child metadata, metrics) and projects every metric row
//! into a [`LayoutEntry`]. Any store failure aborts the call with
//! [`LayoutError::Query`]; there are no retries and no partial layouts.

use std::sync::Arc;

use mdash_common::db::{Entity, MetricRow};
use mdash_common::uuid_utils;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::LayoutError;
use crate::reporter::ErrorReporter;
use crate::store::LayoutStore;

/// What to do when a metric's graph layout JSON does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Keep the entry with an empty graph layout and log a warning
    #[default]
    SkipRow,
    /// Fail the whole call with [`LayoutError::Decode`]
    Strict,
}

/// One element of the embedded graph layout array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    #[serde(rename = "graphType", default)]
    pub graph_type: GraphType,
}

/// Rendering hints for one metric tile
///
/// `sort` and `pageSort` are kept as strings: producers emit both numbers
/// and numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphType {
    pub col_span: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub sort: String,
    #[serde(deserialize_with = "string_or_number")]
    pub page_sort: String,
    pub container_class: String,
    pub is_collapsible: bool,
    pub container_name: String,
    pub page_class: String,
    pub page_title: String,
    pub metric_type: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(number_sort_key(&n)),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Integral floats (`2.0`) render as integers so they parse as sort keys
fn number_sort_key(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                return (f as i64).to_string();
            }
        }
    }
    n.to_string()
}

/// Decode a `graph_layout` column; blank text counts as an empty array
pub fn parse_graph_layout(json: &str) -> Result<Vec<GraphLayout>, serde_json::Error> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json)
}

/// One rendered tile: a metric plus its owning entity's descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    pub metric_id: String,
    pub text: String,
    pub parent_entity_id: Uuid,
    pub entity_name: String,
    pub entity_type: String,
    pub has_child: bool,
    pub deep_link_id: String,
    pub metric_name: String,
    pub metric_type: String,
    pub metric_unit: String,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub sort: i64,
    pub graph_layout: Vec<GraphLayout>,
}

impl LayoutEntry {
    fn from_metric(row: MetricRow, graph_layout: Vec<GraphLayout>) -> Self {
        Self {
            metric_id: row.metric_id,
            text: row.text,
            parent_entity_id: row.parent_entity_id,
            entity_name: row.entity_name,
            entity_type: row.entity_type,
            has_child: row.has_child,
            deep_link_id: row.deep_link_id,
            metric_name: row.metric_name,
            metric_type: row.metric_type,
            metric_unit: row.metric_unit,
            min_threshold: row.min_threshold,
            max_threshold: row.max_threshold,
            sort: row.sort,
            graph_layout,
        }
    }
}

/// Full aggregation result for one parent entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutData {
    /// Resolved parent id (nil for the root sentinel)
    pub parent_id: Uuid,
    /// Direct children with their metadata
    pub children: Vec<Entity>,
    /// Metric tiles in store `sort` order
    pub entries: Vec<LayoutEntry>,
}

/// Child entity together with the ids of the metrics it owns
#[derive(Debug, Clone, PartialEq)]
pub struct ChildMetrics {
    pub entity: Entity,
    pub metric_ids: Vec<String>,
}

/// Assembles layout data from a [`LayoutStore`]
pub struct LayoutAggregator {
    store: Arc<dyn LayoutStore>,
    reporter: Arc<dyn ErrorReporter>,
    decode_policy: DecodePolicy,
}

impl LayoutAggregator {
    pub fn new(store: Arc<dyn LayoutStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            store,
            reporter,
            decode_policy: DecodePolicy::default(),
        }
    }

    pub fn with_decode_policy(mut self, decode_policy: DecodePolicy) -> Self {
        self.decode_policy = decode_policy;
        self
    }

    /// Layout entries for `parent_entity_id` (empty string = root sentinel)
    pub async fn get_layout_data(
        &self,
        parent_entity_id: &str,
    ) -> Result<Vec<LayoutEntry>, LayoutError> {
        Ok(self.get_layout(parent_entity_id).await?.entries)
    }

    /// Children and layout entries for `parent_entity_id`
    pub async fn get_layout(&self, parent_entity_id: &str) -> Result<LayoutData, LayoutError> {
        let parent_id = self.parse_key(parent_entity_id)?;

        let children = self.child_entities(parent_id).await?;

        let rows = self
            .store
            .fetch_metrics(parent_id)
            .await
            .map_err(|e| self.fail("fetch_metrics", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let graph_layout = self.decode_graph_layout(&row)?;
            entries.push(LayoutEntry::from_metric(row, graph_layout));
        }

        debug!(
            parent_id = %parent_id,
            children = children.len(),
            entries = entries.len(),
            "Layout assembled"
        );

        Ok(LayoutData {
            parent_id,
            children,
            entries,
        })
    }

    /// Children of `parent_entity_id`, each with the ids of its own metrics
    pub async fn get_child_metrics(
        &self,
        parent_entity_id: &str,
    ) -> Result<Vec<ChildMetrics>, LayoutError> {
        let parent_id = self.parse_key(parent_entity_id)?;
        let children = self.child_entities(parent_id).await?;

        let mut result = Vec::with_capacity(children.len());
        for entity in children {
            let metric_ids = self
                .store
                .fetch_metrics(entity.id)
                .await
                .map_err(|e| self.fail("fetch_metrics", e))?
                .into_iter()
                .map(|row| row.metric_id)
                .collect();
            result.push(ChildMetrics { entity, metric_ids });
        }
        Ok(result)
    }

    /// Steps 1 and 2: child ids, then metadata for each
    async fn child_entities(&self, parent_id: Uuid) -> Result<Vec<Entity>, LayoutError> {
        let child_ids = self
            .store
            .fetch_child_ids(parent_id)
            .await
            .map_err(|e| self.fail("fetch_child_ids", e))?;

        let mut children = Vec::with_capacity(child_ids.len());
        for child_id in child_ids {
            match self
                .store
                .fetch_entity(child_id)
                .await
                .map_err(|e| self.fail("fetch_entity", e))?
            {
                Some(entity) => children.push(entity),
                None => warn!(child_id = %child_id, "Child entity vanished between queries"),
            }
        }
        Ok(children)
    }

    fn parse_key(&self, key: &str) -> Result<Uuid, LayoutError> {
        uuid_utils::parse_entity_key(key).map_err(|_| {
            debug!(key, "Rejected malformed entity key");
            LayoutError::InvalidEntityId(key.to_string())
        })
    }

    fn decode_graph_layout(&self, row: &MetricRow) -> Result<Vec<GraphLayout>, LayoutError> {
        match parse_graph_layout(&row.graph_layout_json) {
            Ok(layout) => Ok(layout),
            Err(source) => match self.decode_policy {
                DecodePolicy::SkipRow => {
                    warn!(
                        metric_id = %row.metric_id,
                        error = %source,
                        "Malformed graph layout, rendering metric without it"
                    );
                    Ok(Vec::new())
                }
                DecodePolicy::Strict => {
                    let err = LayoutError::Decode {
                        metric_id: row.metric_id.clone(),
                        source,
                    };
                    self.reporter.report("decode_graph_layout", &err);
                    Err(err)
                }
            },
        }
    }

    fn fail(&self, step: &'static str, source: mdash_common::Error) -> LayoutError {
        let err = LayoutError::query(step, source);
        self.reporter.report("get_layout", &err);
        err
    }
}
