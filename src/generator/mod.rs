//! Quest generation.
//!
//! Turns a task description into a structured quest with an ordered,
//! numbered subtask list. Delegates to the text-generation backend when
//! one is configured; on any failure (network error, malformed response,
//! no credential) it degrades to the deterministic fallback. Generation
//! never fails outwardly.

pub mod fallback;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::Subtask;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, LlmErrorKind, OpenAiClient, Role};
use crate::Config;

const MAX_TOKENS: u64 = 500;
const TEMPERATURE: f64 = 0.7;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that breaks down tasks into \
    manageable subtasks for a gamified productivity app. Return only valid JSON.";

/// Input to quest generation.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub task: String,
    pub category: String,
    pub difficulty: String,
    pub due_date: Option<String>,
}

/// A generated quest, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub due_date: Option<String>,
    pub subtasks: Vec<Subtask>,
}

/// Why the fallback path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No backend credential is configured.
    Disabled,
    /// The backend call failed (network, timeout, non-success status).
    RequestFailed,
    /// The backend responded with something that is not a quest.
    MalformedResponse,
}

/// How a quest draft was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The text-generation backend produced the draft.
    Ai,
    /// The deterministic fallback produced the draft.
    Fallback(FallbackReason),
}

/// Shape of the JSON the backend is asked to return.
#[derive(Debug, Deserialize)]
struct AiQuest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    subtasks: Vec<String>,
}

/// AI-backed quest generator with a deterministic fallback.
pub struct QuestGenerator {
    client: Option<Arc<dyn LlmClient>>,
}

impl QuestGenerator {
    /// Build a generator from config. A missing API key disables the AI
    /// path entirely.
    pub fn new(config: &Config) -> Self {
        let client = config
            .openai_api_key
            .clone()
            .map(|key| Arc::new(OpenAiClient::new(key)) as Arc<dyn LlmClient>);
        Self { client }
    }

    /// Build a generator around an explicit client. Used in tests.
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Whether the AI path is configured.
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Generate a quest draft. Never fails: every internal failure
    /// resolves to the fallback generator.
    pub async fn generate(&self, request: &GenerateRequest) -> (QuestDraft, Provenance) {
        let Some(client) = &self.client else {
            return (
                fallback::generate(request),
                Provenance::Fallback(FallbackReason::Disabled),
            );
        };

        let messages = [
            ChatMessage::new(Role::System, SYSTEM_PROMPT),
            ChatMessage::new(Role::User, build_prompt(request)),
        ];
        let options = ChatOptions {
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        };

        let content = match client.chat_completion(&messages, options).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("AI generation failed: {}", e);
                let reason = match e.kind {
                    LlmErrorKind::Parse => FallbackReason::MalformedResponse,
                    _ => FallbackReason::RequestFailed,
                };
                return (fallback::generate(request), Provenance::Fallback(reason));
            }
        };

        match serde_json::from_str::<AiQuest>(content.trim()) {
            Ok(ai_quest) => (normalize(ai_quest, request), Provenance::Ai),
            Err(_) => {
                tracing::warn!("AI returned invalid JSON, using fallback");
                (
                    fallback::generate(request),
                    Provenance::Fallback(FallbackReason::MalformedResponse),
                )
            }
        }
    }
}

/// Fixed-template prompt asking the backend for a quest as JSON, with
/// mandatory `Step N:` subtask prefixes.
fn build_prompt(request: &GenerateRequest) -> String {
    format!(
        r#"Create a gamified quest for the following task:

Task: {task}
Category: {category}
Difficulty: {difficulty}
Due Date: {due_date}

Please return a JSON object with the following structure:
{{
    "title": "A catchy quest title (max 60 characters)",
    "description": "A brief description of the quest",
    "subtasks": [
        "Step 1: First actionable step to complete the task",
        "Step 2: Second actionable step to complete the task",
        "Step 3: Third actionable step to complete the task",
        "Step 4: Fourth actionable step to complete the task",
        "Step 5: Fifth actionable step to complete the task"
    ]
}}

Requirements:
- Make the title engaging and game-like
- Create 4-6 specific, actionable subtasks that break down the main task into clear steps
- Each subtask should be a single, clear action that moves you closer to completing the main task
- Subtasks should be ordered logically from first to last
- CRITICAL: Each subtask MUST start with "Step 1:", "Step 2:", "Step 3:", etc. - this is mandatory
- Make it fun and motivating while being practical
- Focus on concrete actions, not vague concepts
- Example format: "Step 1: Research the topic thoroughly""#,
        task = request.task,
        category = request.category,
        difficulty = request.difficulty,
        due_date = request.due_date.as_deref().unwrap_or("Not specified"),
    )
}

/// Validate and normalize the backend's quest. Category, difficulty and
/// due date always come from the input, never from the response.
fn normalize(ai_quest: AiQuest, request: &GenerateRequest) -> QuestDraft {
    let title = ai_quest.title.unwrap_or_else(|| {
        format!("Quest: {}", request.task.chars().take(50).collect::<String>())
    });
    let description = ai_quest
        .description
        .unwrap_or_else(|| request.task.clone());

    let subtasks = ai_quest
        .subtasks
        .into_iter()
        .enumerate()
        .map(|(i, text)| Subtask {
            id: i,
            text: ensure_step_prefix(text, i),
            completed: false,
        })
        .collect();

    QuestDraft {
        title,
        description,
        category: request.category.clone(),
        difficulty: request.difficulty.clone(),
        due_date: request.due_date.clone(),
        subtasks,
    }
}

/// Prepend a `Step N:` prefix (1-based) unless the text already starts
/// with `Step N:` or `N.` for its own position. Case-sensitive, anchored.
fn ensure_step_prefix(text: String, index: usize) -> String {
    let step_prefix = format!("Step {}:", index + 1);
    let number_prefix = format!("{}.", index + 1);

    if text.starts_with(&step_prefix) || text.starts_with(&number_prefix) {
        text
    } else {
        format!("{} {}", step_prefix, text)
    }
}
