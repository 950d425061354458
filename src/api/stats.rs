//! User statistics API endpoints.
//!
//! Stats are caller-managed: completing a quest does not award XP here;
//! the client updates the counters explicitly.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{StatsPatch, UserStats, DEFAULT_USER_ID};

use super::routes::AppState;
use super::MessageResponse;

/// Create stats routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_stats).put(update_stats))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub user_id: Option<String>,
}

/// GET /api/stats - Fetch a user's stats, creating the row on first read.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<UserStats>, (StatusCode, String)> {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);

    state.db.get_user_stats(user_id).await.map(Json).map_err(|e| {
        tracing::error!("Error getting stats: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve stats".to_string(),
        )
    })
}

/// PUT /api/stats - Apply a partial update to a user's stats.
///
/// Unlike the quest endpoints, an unmatched row is reported as a 500
/// rather than a 404; success and not-found are not distinguished here.
async fn update_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
    Json(patch): Json<StatsPatch>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);

    let updated = state
        .db
        .update_user_stats(user_id, patch)
        .await
        .map_err(|e| {
            tracing::error!("Error updating stats: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update stats".to_string(),
            )
        })?;

    if updated {
        Ok(Json(MessageResponse::new("Stats updated successfully")))
    } else {
        Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update stats".to_string(),
        ))
    }
}
