//! Drill-down listing endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::component::{AppInfo, AppInfoQuery};
use crate::error::ApiResult;
use crate::AppState;

/// GET /appinfo?app_id=&level=&component_id=&metric_id=
///
/// Unlike `/appcomponent`, failures map to real HTTP status codes.
pub async fn get_app_info(
    State(state): State<AppState>,
    Query(query): Query<AppInfoQuery>,
) -> ApiResult<Json<Vec<AppInfo>>> {
    let info = state.components.get_app_info(&query).await?;
    Ok(Json(info))
}
