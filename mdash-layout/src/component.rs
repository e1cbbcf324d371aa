//! Component repository facade
//!
//! Resolves the request key (`app_id`, falling back to `component_id`) and
//! delegates to the [`LayoutAggregator`]. Errors from the aggregator pass
//! through untouched.

use std::sync::Arc;

use async_trait::async_trait;
use mdash_common::db::Entity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LayoutError;
use crate::layout::{LayoutAggregator, LayoutEntry};
use crate::ordering::{remove_at, sort_index, SortValue};

/// Query parameters for `GET /appcomponent`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComponentQuery {
    pub app_id: Option<String>,
    pub component_id: Option<String>,
    pub time_range: Option<String>,
    pub drill_level: Option<String>,
}

impl ComponentQuery {
    pub fn entity_key(&self) -> &str {
        resolve_entity_key(self.app_id.as_deref(), self.component_id.as_deref())
    }
}

/// Query parameters for `GET /appinfo`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppInfoQuery {
    pub app_id: Option<String>,
    pub level: Option<String>,
    pub component_id: Option<String>,
    pub metric_id: Option<String>,
}

impl AppInfoQuery {
    pub fn entity_key(&self) -> &str {
        resolve_entity_key(self.app_id.as_deref(), self.component_id.as_deref())
    }
}

/// `app_id` when present and non-blank, else `component_id`, else `""`
///
/// Blank means empty after trimming, matching the aggregator's key parsing.
/// The empty result is the root sentinel for the aggregator.
pub fn resolve_entity_key<'a>(app_id: Option<&'a str>, component_id: Option<&'a str>) -> &'a str {
    match app_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => component_id.unwrap_or(""),
    }
}

/// Container grouping the tiles that share a `containerName`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppComponentLayout {
    pub container_name: String,
    pub container_class: String,
    pub is_collapsible: bool,
    pub page_title: String,
    pub page_class: String,
    pub page_sort: String,
    /// Lowest parsed `sort` seen for this container
    pub sort: Option<i64>,
    pub metric_ids: Vec<String>,
}

impl SortValue for AppComponentLayout {
    fn sort_value(&self) -> Option<i64> {
        self.sort
    }
}

/// Group graph descriptors into containers ordered by ascending sort
///
/// Containers are created at the position [`sort_index`] gives for the
/// first descriptor naming them. A later descriptor with a lower sort moves
/// the container forward. Descriptors without a usable sort leave the
/// container where it is.
pub fn assemble_containers(entries: &[LayoutEntry]) -> Vec<AppComponentLayout> {
    let mut containers: Vec<AppComponentLayout> = Vec::new();

    for entry in entries {
        for graph in &entry.graph_layout {
            let hint = &graph.graph_type;
            let candidate = hint.sort.parse::<i64>().ok();

            let Some(pos) = containers
                .iter()
                .position(|c| c.container_name == hint.container_name)
            else {
                let index = sort_index(&containers, &hint.sort);
                containers.insert(
                    index,
                    AppComponentLayout {
                        container_name: hint.container_name.clone(),
                        container_class: hint.container_class.clone(),
                        is_collapsible: hint.is_collapsible,
                        page_title: hint.page_title.clone(),
                        page_class: hint.page_class.clone(),
                        page_sort: hint.page_sort.clone(),
                        sort: candidate,
                        metric_ids: vec![entry.metric_id.clone()],
                    },
                );
                continue;
            };

            let mut container = containers[pos].clone();
            if !container.metric_ids.contains(&entry.metric_id) {
                container.metric_ids.push(entry.metric_id.clone());
            }

            match candidate {
                Some(new_sort) if container.sort.map_or(true, |cur| new_sort < cur) => {
                    container.sort = Some(new_sort);
                    containers = remove_at(containers, pos);
                    let index = sort_index(&containers, &hint.sort);
                    containers.insert(index, container);
                }
                _ => containers[pos] = container,
            }
        }
    }

    containers
}

/// Response body of `GET /appcomponent`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppComponent {
    pub entity_id: Uuid,
    pub time_range: Option<String>,
    pub drill_level: Option<String>,
    pub children: Vec<Entity>,
    pub layout: Vec<LayoutEntry>,
    pub containers: Vec<AppComponentLayout>,
}

/// Drill-down row of `GET /appinfo`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppInfo {
    pub entity_id: Uuid,
    pub parent_entity_id: Option<Uuid>,
    pub entity_name: String,
    pub entity_type: String,
    pub has_child: bool,
    pub deep_link_id: String,
    pub level: Option<String>,
    pub metric_ids: Vec<String>,
}

/// Source of component layouts
#[async_trait]
pub trait ComponentRepository: Send + Sync {
    async fn find_all_app_components(
        &self,
        query: &ComponentQuery,
    ) -> Result<AppComponent, LayoutError>;

    async fn find_app_info(&self, query: &AppInfoQuery) -> Result<Vec<AppInfo>, LayoutError>;
}

/// [`ComponentRepository`] backed by the layout aggregator
pub struct LayoutComponentRepository {
    aggregator: LayoutAggregator,
}

impl LayoutComponentRepository {
    pub fn new(aggregator: LayoutAggregator) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl ComponentRepository for LayoutComponentRepository {
    async fn find_all_app_components(
        &self,
        query: &ComponentQuery,
    ) -> Result<AppComponent, LayoutError> {
        let data = self.aggregator.get_layout(query.entity_key()).await?;
        let containers = assemble_containers(&data.entries);

        Ok(AppComponent {
            entity_id: data.parent_id,
            time_range: query.time_range.clone(),
            drill_level: query.drill_level.clone(),
            children: data.children,
            layout: data.entries,
            containers,
        })
    }

    async fn find_app_info(&self, query: &AppInfoQuery) -> Result<Vec<AppInfo>, LayoutError> {
        let children = self.aggregator.get_child_metrics(query.entity_key()).await?;
        let metric_filter = query.metric_id.as_deref().filter(|m| !m.is_empty());

        Ok(children
            .into_iter()
            .filter(|child| metric_filter.map_or(true, |m| child.metric_ids.iter().any(|id| id == m)))
            .map(|child| AppInfo {
                entity_id: child.entity.id,
                parent_entity_id: child.entity.parent_id,
                entity_name: child.entity.name,
                entity_type: child.entity.entity_type,
                has_child: child.entity.has_child,
                deep_link_id: child.entity.deep_link_id,
                level: query.level.clone(),
                metric_ids: child.metric_ids,
            })
            .collect())
    }
}

/// Service layer in front of a [`ComponentRepository`]
#[derive(Clone)]
pub struct ComponentApi {
    repo: Arc<dyn ComponentRepository>,
}

impl ComponentApi {
    pub fn new(repo: Arc<dyn ComponentRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_app_components(
        &self,
        query: &ComponentQuery,
    ) -> Result<AppComponent, LayoutError> {
        self.repo.find_all_app_components(query).await
    }

    pub async fn get_app_info(&self, query: &AppInfoQuery) -> Result<Vec<AppInfo>, LayoutError> {
        self.repo.find_app_info(query).await
    }
}
