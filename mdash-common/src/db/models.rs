//! Database models
//!
//! Entities form a forest: roots carry `parent_id = None`. Metrics hang off
//! exactly one entity through `parent_entity_id`.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{Error, Result};

/// Entity type marking the top of a navigation trail
pub const FRAMEWORK_ENTITY_TYPE: &str = "framework";

/// Node of the application/component hierarchy (`entity_info` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub has_child: bool,
    pub deep_link_id: String,
}

impl Entity {
    /// Whether this entity terminates a breadcrumb walk
    pub fn is_framework(&self) -> bool {
        self.entity_type == FRAMEWORK_ENTITY_TYPE
    }

    /// Map a row selected with [`ENTITY_COLUMNS`]
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let parent: Option<String> = row.try_get("parent_entity_id")?;
        Ok(Self {
            id: decode_uuid(&row.try_get::<String, _>("entity_id")?)?,
            parent_id: parent.as_deref().map(decode_uuid).transpose()?,
            name: row.try_get("entity_name")?,
            entity_type: row.try_get("entity_type")?,
            has_child: row.try_get::<i64, _>("has_child")? != 0,
            deep_link_id: row
                .try_get::<Option<String>, _>("deep_link_id")?
                .unwrap_or_default(),
        })
    }
}

/// Column list matching [`Entity::from_row`]
pub const ENTITY_COLUMNS: &str =
    "entity_id, parent_entity_id, entity_name, entity_type, has_child, deep_link_id";

/// Metric row joined with its owning entity's descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
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
    /// Raw `graph_layout` JSON array, decoded by the layout aggregator
    pub graph_layout_json: String,
}

impl MetricRow {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            metric_id: row.try_get("metric_id")?,
            text: row.try_get::<Option<String>, _>("text")?.unwrap_or_default(),
            parent_entity_id: decode_uuid(&row.try_get::<String, _>("parent_entity_id")?)?,
            entity_name: row.try_get("entity_name")?,
            entity_type: row.try_get("entity_type")?,
            has_child: row.try_get::<i64, _>("has_child")? != 0,
            deep_link_id: row
                .try_get::<Option<String>, _>("deep_link_id")?
                .unwrap_or_default(),
            metric_name: row.try_get("metric_name")?,
            metric_type: row.try_get("metric_type")?,
            metric_unit: row
                .try_get::<Option<String>, _>("metric_unit")?
                .unwrap_or_default(),
            min_threshold: row.try_get::<Option<f64>, _>("min_threshold")?.unwrap_or(0.0),
            max_threshold: row.try_get::<Option<f64>, _>("max_threshold")?.unwrap_or(0.0),
            sort: row.try_get("sort")?,
            graph_layout_json: row
                .try_get::<Option<String>, _>("graph_layout")?
                .unwrap_or_else(|| "[]".to_string()),
        })
    }
}

fn decode_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Corrupt UUID {:?}: {}", s, e)))
}
