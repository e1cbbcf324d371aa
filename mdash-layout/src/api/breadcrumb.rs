//! Breadcrumb endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use mdash_common::uuid_utils;
use serde::Deserialize;

use super::envelope::ResponseEnvelope;
use crate::breadcrumb::NavigationTrail;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BreadcrumbQuery {
    #[serde(default)]
    pub entity_id: String,
}

/// GET /breadcrumb?entity_id=
///
/// Unknown entities yield an empty trail with status 200.
pub async fn get_breadcrumb(
    State(state): State<AppState>,
    Query(query): Query<BreadcrumbQuery>,
) -> Json<ResponseEnvelope<NavigationTrail>> {
    let entity_id = match uuid_utils::parse(query.entity_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            return Json(ResponseEnvelope::failure(
                StatusCode::BAD_REQUEST,
                format!("Invalid entity id: {}", query.entity_id),
            ))
        }
    };

    Json(ResponseEnvelope::success(state.breadcrumbs.resolve(entity_id).await))
}
