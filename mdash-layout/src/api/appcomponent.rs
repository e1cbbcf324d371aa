//! Component layout endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{debug, warn};

use super::envelope::ResponseEnvelope;
use crate::component::{AppComponent, ComponentQuery};
use crate::AppState;

/// GET /appcomponent?app_id=&component_id=&time_range=&drill_level=
///
/// Always HTTP 200; failures show up in the envelope `status`.
pub async fn get_app_component(
    State(state): State<AppState>,
    Query(query): Query<ComponentQuery>,
) -> Json<ResponseEnvelope<AppComponent>> {
    debug!(key = query.entity_key(), "appcomponent request");

    match state.components.get_all_app_components(&query).await {
        Ok(component) => Json(ResponseEnvelope::success(component)),
        Err(err) => {
            warn!(error = %err, "appcomponent request failed");
            Json(ResponseEnvelope::from_error(&err))
        }
    }
}
