//! mdash-layout library - metrics dashboard layout service
//!
//! Resolves entity hierarchies into dashboard layouts: metric tiles grouped
//! into ordered containers, plus breadcrumb navigation trails.

use std::sync::Arc;

use axum::Router;
use mdash_common::config::ServiceConfig;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod breadcrumb;
pub mod component;
pub mod db;
pub mod error;
pub mod layout;
pub mod ordering;
pub mod reporter;
pub mod store;

use breadcrumb::BreadcrumbResolver;
use component::{ComponentApi, LayoutComponentRepository};
use layout::{DecodePolicy, LayoutAggregator};
use reporter::{ErrorReporter, TracingReporter};
use store::LayoutStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub components: ComponentApi,
    pub breadcrumbs: Arc<BreadcrumbResolver>,
}

impl AppState {
    /// Wire the production components around `store`
    pub fn new(store: Arc<dyn LayoutStore>, config: &ServiceConfig) -> Self {
        Self::with_reporter(store, Arc::new(TracingReporter), config)
    }

    pub fn with_reporter(
        store: Arc<dyn LayoutStore>,
        reporter: Arc<dyn ErrorReporter>,
        config: &ServiceConfig,
    ) -> Self {
        let decode_policy = if config.strict_graph_layout {
            DecodePolicy::Strict
        } else {
            DecodePolicy::SkipRow
        };

        let aggregator = LayoutAggregator::new(store.clone(), reporter.clone())
            .with_decode_policy(decode_policy);
        let components = ComponentApi::new(Arc::new(LayoutComponentRepository::new(aggregator)));
        let breadcrumbs = Arc::new(BreadcrumbResolver::new(
            store,
            reporter,
            config.max_breadcrumb_depth,
        ));

        Self {
            components,
            breadcrumbs,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/appcomponent", get(api::get_app_component))
        .route("/appinfo", get(api::get_app_info))
        .route("/breadcrumb", get(api::get_breadcrumb))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
