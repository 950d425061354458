//! Quest store types.

use serde::{Deserialize, Serialize};

/// Owner used when a request does not name a user.
pub const DEFAULT_USER_ID: &str = "default";

/// Status assigned to newly created quests.
pub const STATUS_ACTIVE: &str = "active";

/// A gamified representation of a task with an ordered subtask checklist.
///
/// All timestamps are RFC 3339 strings; `difficulty` is a free-text
/// classification later used as a multiplier lookup key
/// (`easy|medium|hard|epic`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub subtasks: Vec<Subtask>,
    pub user_id: String,
}

/// One checklist step belonging to a quest, independently completable.
///
/// `id` is the 0-based position within the quest, not a global identifier.
/// `text` conventionally starts with a `Step N:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: usize,
    pub text: String,
    pub completed: bool,
}

/// Per-user gamification counters. One row per user, created lazily on
/// first read and never deleted. All counters are caller-managed; nothing
/// here is derived from quest state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub level: i64,
    pub xp: i64,
    pub completed_quests: i64,
    pub active_quests: i64,
    pub last_updated: String,
}

impl UserStats {
    /// Zeroed stats for a never-seen user.
    pub fn new(user_id: &str, now: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            level: 1,
            xp: 0,
            completed_quests: 0,
            active_quests: 0,
            last_updated: now,
        }
    }
}

/// Partial quest update. Unset fields are left untouched.
///
/// `subtasks` carries the pre-serialized JSON list; updating it touches only
/// the serialized column on the quest row, not the subtask relation.
#[derive(Debug, Clone, Default)]
pub struct QuestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub subtasks: Option<String>,
}

impl QuestPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.difficulty.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.completed_at.is_none()
            && self.subtasks.is_none()
    }
}

/// Partial user-stats update. `last_updated` is always stamped by the store
/// and cannot be supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsPatch {
    pub level: Option<i64>,
    pub xp: Option<i64>,
    pub completed_quests: Option<i64>,
    pub active_quests: Option<i64>,
}
