//! Mood listing endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::mood::MoodId;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MoodSummary {
    pub id: MoodId,
    pub description: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub moods: Vec<MoodSummary>,
    pub default: MoodId,
}

/// GET /api/moods
///
/// Known moods in display order.
pub async fn list_moods(State(state): State<AppState>) -> Json<MoodsResponse> {
    let moods = state
        .pipeline
        .mapper()
        .table()
        .iter()
        .map(|(id, profile)| MoodSummary {
            id: id.clone(),
            description: profile.description.clone(),
            genres: profile.genres.clone(),
        })
        .collect();

    Json(MoodsResponse {
        moods,
        default: MoodId::DEFAULT,
    })
}

pub fn mood_routes() -> Router<AppState> {
    Router::new().route("/api/moods", get(list_moods))
}
