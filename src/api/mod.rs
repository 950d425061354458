//! HTTP API.

pub mod quests;
pub mod routes;
pub mod stats;

pub use routes::{serve, AppState};

use serde::Serialize;

/// Plain confirmation body returned by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
