use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::services::content_service::{clean_content, ProviderError};
use crate::services::AppState;

/// Content-provider pass-through so the widget talks to one origin. The
/// body text comes back cleaned, ready for display or a generate call.
pub async fn get_tutorial(
    State(state): State<Arc<AppState>>,
    Path(tutorial_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    tracing::info!("Fetching tutorial: {}", tutorial_id);

    match state.content.fetch_tutorial(&tutorial_id).await {
        Ok(mut tutorial) => {
            tutorial.content = clean_content(&tutorial.content);
            Ok((StatusCode::OK, Json(json!({
                "success": true,
                "data": tutorial,
            }))))
        }
        Err(ProviderError::NotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": format!("Tutorial {} not found", id),
            })),
        )),
        Err(e) => {
            tracing::error!("Content provider failed for {}: {}", tutorial_id, e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "success": false,
                    "error": "Content provider unavailable",
                })),
            ))
        }
    }
}
