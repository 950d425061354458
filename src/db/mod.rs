//! SQLite quest store.
//!
//! Provides durable CRUD for quests, their subtask rows and per-user stats,
//! scoped by `user_id`. Every operation opens its own connection and releases
//! it when the operation ends; the driver is synchronous, so each operation
//! runs on the blocking thread pool.

mod types;

pub use types::{Quest, QuestPatch, StatsPatch, Subtask, UserStats, DEFAULT_USER_ID, STATUS_ACTIVE};

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use std::path::{Path, PathBuf};

/// Current time as an RFC 3339 string, the format used for every timestamp
/// column in the store.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Handle to the quest database. Cheap to clone; connections are opened
/// per operation, never held.
#[derive(Debug, Clone)]
pub struct QuestDb {
    db_path: PathBuf,
}

impl QuestDb {
    /// Open the store at `db_path`, creating the parent directory and the
    /// schema if they do not exist yet.
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let db = Self { db_path };

        let path = db.db_path.clone();
        tokio::task::spawn_blocking(move || init_schema(&path))
            .await
            .context("schema init task failed")??;

        Ok(db)
    }

    /// Whether the database file exists on disk.
    pub fn exists(&self) -> bool {
        self.db_path.exists()
    }

    /// Insert a quest row plus one row per subtask.
    ///
    /// The quest's subtask list is also serialized into the `subtasks`
    /// column on the quest row. The two writes are a plain statement
    /// sequence, not a transaction. A primary-key collision on `id`
    /// surfaces as a storage error.
    pub async fn create_quest(&self, quest: Quest) -> Result<String> {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            let serialized = serde_json::to_string(&quest.subtasks)
                .context("Failed to serialize subtasks")?;

            conn.execute(
                "INSERT INTO quests (id, title, description, category, difficulty,
                                     status, due_date, created_at, subtasks, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    quest.id,
                    quest.title,
                    quest.description,
                    quest.category,
                    quest.difficulty,
                    quest.status,
                    quest.due_date,
                    quest.created_at,
                    serialized,
                    quest.user_id,
                ],
            )
            .context("Failed to insert quest")?;

            for subtask in &quest.subtasks {
                conn.execute(
                    "INSERT INTO subtasks (quest_id, text, completed, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![quest.id, subtask.text, subtask.completed, now_timestamp()],
                )
                .context("Failed to insert subtask")?;
            }

            Ok(quest.id)
        })
        .await
        .context("create_quest task failed")?
    }

    /// List quests for a user, newest first, optionally filtered by exact
    /// status. The serialized subtasks column is deserialized back into a
    /// structured list (empty when NULL).
    pub async fn get_quests(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Quest>> {
        let path = self.db_path.clone();
        let user_id = user_id.to_string();
        let status = status.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            let mut sql = String::from(
                "SELECT id, title, description, category, difficulty, status,
                        due_date, created_at, completed_at, subtasks, user_id
                 FROM quests WHERE user_id = ?1",
            );
            if status.is_some() {
                sql.push_str(" AND status = ?2");
            }
            sql.push_str(" ORDER BY created_at DESC");

            let mut stmt = conn.prepare(&sql)?;
            let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(Quest, Option<String>)> {
                Ok((
                    Quest {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        category: row.get(3)?,
                        difficulty: row.get(4)?,
                        status: row.get(5)?,
                        due_date: row.get(6)?,
                        created_at: row.get(7)?,
                        completed_at: row.get(8)?,
                        subtasks: Vec::new(),
                        user_id: row.get(10)?,
                    },
                    row.get::<_, Option<String>>(9)?,
                ))
            };

            let rows: Vec<(Quest, Option<String>)> = if let Some(status) = &status {
                stmt.query_map(params![user_id, status], map_row)?
                    .collect::<rusqlite::Result<_>>()?
            } else {
                stmt.query_map(params![user_id], map_row)?
                    .collect::<rusqlite::Result<_>>()?
            };

            rows.into_iter()
                .map(|(mut quest, serialized)| {
                    quest.subtasks = match serialized {
                        Some(json) => serde_json::from_str(&json)
                            .context("Failed to deserialize subtasks")?,
                        None => Vec::new(),
                    };
                    Ok(quest)
                })
                .collect()
        })
        .await
        .context("get_quests task failed")?
    }

    /// Apply a partial update to a quest. Returns false when no row
    /// matched the id (or the patch was empty).
    ///
    /// A patched subtasks list updates only the serialized column on the
    /// quest row; the subtask relation written at create time is left as is.
    pub async fn update_quest(&self, quest_id: &str, patch: QuestPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let path = self.db_path.clone();
        let quest_id = quest_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            let mut columns: Vec<&str> = Vec::new();
            let mut values: Vec<String> = Vec::new();
            let mut push = |column: &'static str, value: Option<String>| {
                if let Some(value) = value {
                    columns.push(column);
                    values.push(value);
                }
            };
            push("title", patch.title);
            push("description", patch.description);
            push("category", patch.category);
            push("difficulty", patch.difficulty);
            push("status", patch.status);
            push("due_date", patch.due_date);
            push("completed_at", patch.completed_at);
            push("subtasks", patch.subtasks);

            let set_clause = columns
                .iter()
                .enumerate()
                .map(|(i, col)| format!("{} = ?{}", col, i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE quests SET {} WHERE id = ?{}",
                set_clause,
                values.len() + 1
            );
            values.push(quest_id);

            let changed = conn
                .execute(&sql, params_from_iter(values.iter()))
                .context("Failed to update quest")?;

            Ok(changed > 0)
        })
        .await
        .context("update_quest task failed")?
    }

    /// Delete a quest and its subtask rows. Returns false when the quest
    /// did not exist. User stats are never touched.
    pub async fn delete_quest(&self, quest_id: &str) -> Result<bool> {
        let path = self.db_path.clone();
        let quest_id = quest_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            conn.execute("DELETE FROM subtasks WHERE quest_id = ?1", params![quest_id])
                .context("Failed to delete subtasks")?;
            let changed = conn
                .execute("DELETE FROM quests WHERE id = ?1", params![quest_id])
                .context("Failed to delete quest")?;

            Ok(changed > 0)
        })
        .await
        .context("delete_quest task failed")?
    }

    /// Fetch a user's stats, lazily inserting a zeroed level-1 row on
    /// first read. Idempotent: a second call returns the persisted row.
    pub async fn get_user_stats(&self, user_id: &str) -> Result<UserStats> {
        let path = self.db_path.clone();
        let user_id = user_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            let existing = conn
                .query_row(
                    "SELECT user_id, level, xp, completed_quests, active_quests, last_updated
                     FROM user_stats WHERE user_id = ?1",
                    params![user_id],
                    |row| {
                        Ok(UserStats {
                            user_id: row.get(0)?,
                            level: row.get(1)?,
                            xp: row.get(2)?,
                            completed_quests: row.get(3)?,
                            active_quests: row.get(4)?,
                            last_updated: row.get(5)?,
                        })
                    },
                )
                .optional()
                .context("Failed to query user stats")?;

            if let Some(stats) = existing {
                return Ok(stats);
            }

            let stats = UserStats::new(&user_id, now_timestamp());
            conn.execute(
                "INSERT INTO user_stats (user_id, level, xp, completed_quests,
                                         active_quests, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    stats.user_id,
                    stats.level,
                    stats.xp,
                    stats.completed_quests,
                    stats.active_quests,
                    stats.last_updated,
                ],
            )
            .context("Failed to insert default user stats")?;

            Ok(stats)
        })
        .await
        .context("get_user_stats task failed")?
    }

    /// Apply a partial update to a user's stats. `last_updated` is always
    /// stamped to the current time, regardless of the patch contents.
    /// Returns false when no row matched the user.
    pub async fn update_user_stats(&self, user_id: &str, patch: StatsPatch) -> Result<bool> {
        let path = self.db_path.clone();
        let user_id = user_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;

            let mut columns: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            let mut push = |column: &'static str, value: Option<i64>| {
                if let Some(value) = value {
                    columns.push(column);
                    values.push(Box::new(value));
                }
            };
            push("level", patch.level);
            push("xp", patch.xp);
            push("completed_quests", patch.completed_quests);
            push("active_quests", patch.active_quests);

            columns.push("last_updated");
            values.push(Box::new(now_timestamp()));

            let set_clause = columns
                .iter()
                .enumerate()
                .map(|(i, col)| format!("{} = ?{}", col, i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE user_stats SET {} WHERE user_id = ?{}",
                set_clause,
                values.len() + 1
            );
            values.push(Box::new(user_id));

            let changed = conn
                .execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))
                .context("Failed to update user stats")?;

            Ok(changed > 0)
        })
        .await
        .context("update_user_stats task failed")?
    }
}

/// Open a connection to the database file.
fn open(path: &Path) -> Result<Connection> {
    Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Create the schema: quests, subtask rows and user stats.
fn init_schema(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let conn = open(path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS quests (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            difficulty TEXT NOT NULL,
            status TEXT DEFAULT 'active',
            due_date TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT,
            subtasks TEXT,
            user_id TEXT DEFAULT 'default'
        )",
        [],
    )
    .context("Failed to create quests table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subtasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            quest_id TEXT NOT NULL,
            text TEXT NOT NULL,
            completed BOOLEAN DEFAULT FALSE,
            created_at TEXT NOT NULL,
            FOREIGN KEY (quest_id) REFERENCES quests (id)
        )",
        [],
    )
    .context("Failed to create subtasks table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_stats (
            user_id TEXT PRIMARY KEY,
            level INTEGER DEFAULT 1,
            xp INTEGER DEFAULT 0,
            completed_quests INTEGER DEFAULT 0,
            active_quests INTEGER DEFAULT 0,
            last_updated TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create user_stats table")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_db() -> (tempfile::TempDir, QuestDb) {
        let temp = tempdir().unwrap();
        let db = QuestDb::new(temp.path().join("quests.db")).await.unwrap();
        (temp, db)
    }

    fn sample_quest(id: &str, user_id: &str, created_at: &str) -> Quest {
        Quest {
            id: id.to_string(),
            title: "Quest: Website".to_string(),
            description: "Complete the task: build a website".to_string(),
            category: "work".to_string(),
            difficulty: "medium".to_string(),
            status: STATUS_ACTIVE.to_string(),
            due_date: None,
            created_at: created_at.to_string(),
            completed_at: None,
            subtasks: vec![
                Subtask {
                    id: 0,
                    text: "Step 1: Research and plan the requirements".to_string(),
                    completed: false,
                },
                Subtask {
                    id: 1,
                    text: "Step 2: Set up the necessary tools and environment".to_string(),
                    completed: false,
                },
            ],
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_round_trip() {
        let (_temp, db) = test_db().await;

        let quest = sample_quest("quest_a", "default", "2024-01-01T00:00:00+00:00");
        let id = db.create_quest(quest.clone()).await.unwrap();
        assert_eq!(id, "quest_a");

        let quests = db.get_quests("default", None).await.unwrap();
        assert_eq!(quests.len(), 1);
        assert_eq!(quests[0].title, quest.title);
        assert_eq!(quests[0].subtasks, quest.subtasks);

        // Scoped by user
        assert!(db.get_quests("someone-else", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_an_error() {
        let (_temp, db) = test_db().await;

        let quest = sample_quest("quest_dup", "default", "2024-01-01T00:00:00+00:00");
        db.create_quest(quest.clone()).await.unwrap();
        assert!(db.create_quest(quest).await.is_err());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_filters_status() {
        let (_temp, db) = test_db().await;

        let mut older = sample_quest("quest_old", "default", "2024-01-01T00:00:00+00:00");
        older.status = "completed".to_string();
        let newer = sample_quest("quest_new", "default", "2024-06-01T00:00:00+00:00");

        db.create_quest(older).await.unwrap();
        db.create_quest(newer).await.unwrap();

        let all = db.get_quests("default", None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "quest_new");
        assert_eq!(all[1].id, "quest_old");

        let completed = db.get_quests("default", Some("completed")).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, "quest_old");
    }

    #[tokio::test]
    async fn test_update_patches_only_named_fields() {
        let (_temp, db) = test_db().await;

        let quest = sample_quest("quest_b", "default", "2024-01-01T00:00:00+00:00");
        db.create_quest(quest.clone()).await.unwrap();

        let patch = QuestPatch {
            status: Some("completed".to_string()),
            completed_at: Some("2024-02-01T00:00:00+00:00".to_string()),
            ..Default::default()
        };
        assert!(db.update_quest("quest_b", patch).await.unwrap());

        let quests = db.get_quests("default", None).await.unwrap();
        assert_eq!(quests[0].status, "completed");
        assert_eq!(
            quests[0].completed_at.as_deref(),
            Some("2024-02-01T00:00:00+00:00")
        );
        // Unpatched fields are unchanged
        assert_eq!(quests[0].title, quest.title);
        assert_eq!(quests[0].difficulty, quest.difficulty);
        assert_eq!(quests[0].subtasks, quest.subtasks);
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_false() {
        let (_temp, db) = test_db().await;

        let patch = QuestPatch {
            status: Some("completed".to_string()),
            ..Default::default()
        };
        assert!(!db.update_quest("no-such-quest", patch).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_serialized_subtasks() {
        let (_temp, db) = test_db().await;

        let quest = sample_quest("quest_c", "default", "2024-01-01T00:00:00+00:00");
        db.create_quest(quest).await.unwrap();

        let new_subtasks = vec![Subtask {
            id: 0,
            text: "Step 1: Research and plan the requirements".to_string(),
            completed: true,
        }];
        let patch = QuestPatch {
            subtasks: Some(serde_json::to_string(&new_subtasks).unwrap()),
            ..Default::default()
        };
        assert!(db.update_quest("quest_c", patch).await.unwrap());

        let quests = db.get_quests("default", None).await.unwrap();
        assert_eq!(quests[0].subtasks, new_subtasks);
    }

    #[tokio::test]
    async fn test_delete_removes_quest_and_second_delete_is_false() {
        let (_temp, db) = test_db().await;

        let quest = sample_quest("quest_d", "default", "2024-01-01T00:00:00+00:00");
        db.create_quest(quest).await.unwrap();

        assert!(db.delete_quest("quest_d").await.unwrap());
        assert!(db.get_quests("default", None).await.unwrap().is_empty());
        assert!(!db.delete_quest("quest_d").await.unwrap());
    }

    #[tokio::test]
    async fn test_stats_lazily_created_and_idempotent() {
        let (_temp, db) = test_db().await;

        let first = db.get_user_stats("fresh-user").await.unwrap();
        assert_eq!(first.level, 1);
        assert_eq!(first.xp, 0);
        assert_eq!(first.completed_quests, 0);
        assert_eq!(first.active_quests, 0);

        // The row was persisted, not recreated
        let second = db.get_user_stats("fresh-user").await.unwrap();
        assert_eq!(second.last_updated, first.last_updated);
    }

    #[tokio::test]
    async fn test_stats_update_stamps_last_updated() {
        let (_temp, db) = test_db().await;

        let before = db.get_user_stats("player").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let patch = StatsPatch {
            xp: Some(150),
            level: Some(2),
            ..Default::default()
        };
        assert!(db.update_user_stats("player", patch).await.unwrap());

        let after = db.get_user_stats("player").await.unwrap();
        assert_eq!(after.xp, 150);
        assert_eq!(after.level, 2);
        assert_eq!(after.completed_quests, 0);
        assert_ne!(after.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn test_stats_update_unknown_user_returns_false() {
        let (_temp, db) = test_db().await;

        let patch = StatsPatch {
            xp: Some(10),
            ..Default::default()
        };
        assert!(!db.update_user_stats("nobody", patch).await.unwrap());
    }
}
