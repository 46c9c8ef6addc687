//! Mood resolution endpoint
//!
//! **Request:** `{"primary": "serene", "intensity": 35}` (`intensity` optional, default 50)
//! **Response:** `{"requestId", "description", "tracks": [{"track", "video"}], "params", ...}`

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::mood::MoodSelection;
use crate::pipeline::MusicResolution;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/resolve
///
/// **Errors:**
/// - 400 Bad Request: body is not a mood selection
/// - 502/503: catalog credentials missing or rejected, catalog down
///
/// Unknown moods are not an error; they resolve with the default mood and
/// `fallbackUsed: true`.
pub async fn resolve_music(
    State(state): State<AppState>,
    payload: Result<Json<MoodSelection>, JsonRejection>,
) -> ApiResult<Json<MusicResolution>> {
    let Json(selection) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let resolution = state.pipeline.resolve_music(&selection).await?;
    Ok(Json(resolution))
}

pub fn resolve_routes() -> Router<AppState> {
    Router::new().route("/api/resolve", post(resolve_music))
}
