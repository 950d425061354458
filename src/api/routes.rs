//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::QuestDb;
use crate::generator::{GenerateRequest, Provenance, QuestDraft, QuestGenerator};

use super::quests;
use super::stats;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Quest, subtask and user-stat persistence
    pub db: QuestDb,
    /// AI quest generator with deterministic fallback
    pub generator: QuestGenerator,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let db = QuestDb::new(config.database_path.clone()).await?;
    let generator = QuestGenerator::new(&config);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        generator,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/generate-quest", post(generate_quest))
        .nest("/api/quests", quests::routes())
        .nest("/api/stats", stats::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    ai_available: bool,
    database_connected: bool,
}

/// GET /health - Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: crate::db::now_timestamp(),
        ai_available: state.generator.is_available(),
        database_connected: state.db.exists(),
    })
}

/// Body for quest generation. All fields optional so that missing ones
/// can be reported by name instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuestRequest {
    pub task: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub due_date: Option<String>,
}

/// Check required fields, naming the first missing one.
fn validate_generate_request(req: GenerateQuestRequest) -> Result<GenerateRequest, String> {
    let missing = |field: &str| format!("Missing required field: {}", field);

    Ok(GenerateRequest {
        task: req.task.ok_or_else(|| missing("task"))?,
        category: req.category.ok_or_else(|| missing("category"))?,
        difficulty: req.difficulty.ok_or_else(|| missing("difficulty"))?,
        due_date: req.due_date,
    })
}

/// POST /api/generate-quest - Generate a quest draft.
///
/// Backend failures never surface here; the fallback generator always
/// produces a draft.
async fn generate_quest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateQuestRequest>,
) -> Result<Json<QuestDraft>, (StatusCode, String)> {
    let request =
        validate_generate_request(req).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let (draft, provenance) = state.generator.generate(&request).await;

    match provenance {
        Provenance::Ai => tracing::debug!("Generated quest via AI backend"),
        Provenance::Fallback(reason) => {
            tracing::info!("Generated quest via fallback ({:?})", reason)
        }
    }

    Ok(Json(draft))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_names_the_missing_field() {
        let req = GenerateQuestRequest {
            task: Some("build a website".to_string()),
            category: Some("work".to_string()),
            difficulty: None,
            due_date: None,
        };
        let err = validate_generate_request(req).unwrap_err();
        assert_eq!(err, "Missing required field: difficulty");

        let err = validate_generate_request(GenerateQuestRequest::default()).unwrap_err();
        assert_eq!(err, "Missing required field: task");
    }

    #[test]
    fn test_validation_passes_through_complete_requests() {
        let req = GenerateQuestRequest {
            task: Some("build a website".to_string()),
            category: Some("work".to_string()),
            difficulty: Some("easy".to_string()),
            due_date: Some("2024-12-31".to_string()),
        };
        let request = validate_generate_request(req).unwrap();
        assert_eq!(request.task, "build a website");
        assert_eq!(request.due_date.as_deref(), Some("2024-12-31"));
    }
}
