//! Quest management API endpoints.
//!
//! Provides endpoints for the quest lifecycle:
//! - List quests (filtered by user and status)
//! - Create quest
//! - Update quest (partial patch)
//! - Delete quest

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{self, Quest, QuestPatch, Subtask, DEFAULT_USER_ID, STATUS_ACTIVE};

use super::routes::AppState;
use super::MessageResponse;

/// Create quest routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_quests).post(create_quest))
        .route("/:id", axum::routing::put(update_quest).delete(delete_quest))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListQuestsQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub due_date: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Owner of the quest; defaults to the single implicit user.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateQuestResponse {
    pub id: String,
    pub message: String,
}

/// Partial quest patch. Unset fields are left untouched; a supplied
/// subtasks list is serialized here before it reaches the store.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub subtasks: Option<Vec<Subtask>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/quests - List quests for a user, newest first.
async fn list_quests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuestsQuery>,
) -> Result<Json<Vec<Quest>>, (StatusCode, String)> {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);

    state
        .db
        .get_quests(user_id, query.status.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Error getting quests: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve quests".to_string(),
            )
        })
}

/// POST /api/quests - Create a new quest.
///
/// The server assigns the id, creation timestamp and `active` status.
async fn create_quest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuestRequest>,
) -> Result<Json<CreateQuestResponse>, (StatusCode, String)> {
    let quest = Quest {
        id: format!("quest_{}", Uuid::new_v4()),
        title: req.title,
        description: req.description,
        category: req.category,
        difficulty: req.difficulty,
        status: STATUS_ACTIVE.to_string(),
        due_date: req.due_date,
        created_at: db::now_timestamp(),
        completed_at: None,
        subtasks: req.subtasks,
        user_id: req.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
    };

    let id = state.db.create_quest(quest).await.map_err(|e| {
        tracing::error!("Error creating quest: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create quest".to_string(),
        )
    })?;

    tracing::info!("Created quest {}", id);

    Ok(Json(CreateQuestResponse {
        id,
        message: "Quest created successfully".to_string(),
    }))
}

/// PUT /api/quests/:id - Apply a partial update to a quest.
async fn update_quest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuestRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let subtasks = req
        .subtasks
        .map(|subtasks| serde_json::to_string(&subtasks))
        .transpose()
        .map_err(|e| {
            tracing::error!("Error serializing subtasks: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update quest".to_string(),
            )
        })?;

    let patch = QuestPatch {
        title: req.title,
        description: req.description,
        category: req.category,
        difficulty: req.difficulty,
        status: req.status,
        due_date: req.due_date,
        completed_at: req.completed_at,
        subtasks,
    };

    let updated = state.db.update_quest(&id, patch).await.map_err(|e| {
        tracing::error!("Error updating quest: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update quest".to_string(),
        )
    })?;

    if updated {
        Ok(Json(MessageResponse::new("Quest updated successfully")))
    } else {
        Err((StatusCode::NOT_FOUND, "Quest not found".to_string()))
    }
}

/// DELETE /api/quests/:id - Delete a quest and its subtask rows.
async fn delete_quest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let deleted = state.db.delete_quest(&id).await.map_err(|e| {
        tracing::error!("Error deleting quest: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to delete quest".to_string(),
        )
    })?;

    if deleted {
        Ok(Json(MessageResponse::new("Quest deleted successfully")))
    } else {
        Err((StatusCode::NOT_FOUND, "Quest not found".to_string()))
    }
}
