//! Deterministic quest generation.
//!
//! Used when no text-generation backend is configured or the backend
//! fails. Picks a canned 6-step template by keyword match on the task
//! text, then scales the step count by difficulty. Identical inputs
//! always produce identical output.

use crate::db::Subtask;

use super::{GenerateRequest, QuestDraft};

/// Words too generic to name a quest after.
const STOP_WORDS: [&str; 4] = ["the", "and", "for", "with"];

/// Keyword sets and their step templates, in priority order. The first
/// set with any keyword contained in the lowercased task wins.
const TEMPLATES: [(&[&str], [&str; 6]); 5] = [
    (
        &["build", "create", "make", "develop"],
        [
            "Step 1: Research and plan the requirements",
            "Step 2: Set up the necessary tools and environment",
            "Step 3: Create the initial structure or foundation",
            "Step 4: Implement the core functionality",
            "Step 5: Test and debug the implementation",
            "Step 6: Finalize and polish the result",
        ],
    ),
    (
        &["learn", "study", "understand"],
        [
            "Step 1: Find reliable learning resources",
            "Step 2: Create a structured study plan",
            "Step 3: Set aside dedicated learning time",
            "Step 4: Take notes and practice regularly",
            "Step 5: Test your understanding with exercises",
            "Step 6: Apply what you've learned",
        ],
    ),
    (
        &["plan", "organize", "prepare"],
        [
            "Step 1: Define the scope and objectives",
            "Step 2: Break down into manageable components",
            "Step 3: Set realistic timelines and milestones",
            "Step 4: Identify required resources",
            "Step 5: Create a detailed action plan",
            "Step 6: Review and adjust the plan as needed",
        ],
    ),
    (
        &["write", "document", "report"],
        [
            "Step 1: Research and gather information",
            "Step 2: Create an outline and structure",
            "Step 3: Write the first draft",
            "Step 4: Review and revise the content",
            "Step 5: Proofread and edit for clarity",
            "Step 6: Finalize and format the document",
        ],
    ),
    (
        &["present", "presentation", "speak"],
        [
            "Step 1: Research and gather information",
            "Step 2: Create an outline and structure",
            "Step 3: Design visual aids and slides",
            "Step 4: Practice the presentation multiple times",
            "Step 5: Prepare for questions and feedback",
            "Step 6: Deliver the final presentation",
        ],
    ),
];

/// Template used when no keyword set matches.
const GENERIC_TEMPLATE: [&str; 6] = [
    "Step 1: Research and gather information",
    "Step 2: Plan your approach and strategy",
    "Step 3: Take the first concrete steps",
    "Step 4: Continue making steady progress",
    "Step 5: Review and refine your work",
    "Step 6: Complete and finalize the task",
];

/// Step-count multiplier per difficulty tier; unrecognized tiers get 1.
fn difficulty_multiplier(difficulty: &str) -> f64 {
    match difficulty {
        "easy" => 1.0,
        "medium" => 1.2,
        "hard" => 1.5,
        "epic" => 2.0,
        _ => 1.0,
    }
}

/// Generate a quest draft without the text-generation backend.
pub fn generate(request: &GenerateRequest) -> QuestDraft {
    QuestDraft {
        title: make_title(&request.task),
        description: format!("Complete the task: {}", request.task),
        category: request.category.clone(),
        difficulty: request.difficulty.clone(),
        due_date: request.due_date.clone(),
        subtasks: make_subtasks(&request.task, &request.difficulty),
    }
}

/// Title from the first meaningful word of the task, or the task's first
/// 30 characters when nothing qualifies.
fn make_title(task: &str) -> String {
    let lowered = task.to_lowercase();
    let key_word = lowered
        .split_whitespace()
        .find(|w| w.len() > 3 && !STOP_WORDS.contains(w));

    match key_word {
        Some(word) => format!("Quest: {}", capitalize(word)),
        None => format!("Quest: {}", task.chars().take(30).collect::<String>()),
    }
}

/// Uppercase the first character; the word is already lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick a step template by keyword, scale the count by difficulty and
/// cycle through the template with wraparound. Counts above the template
/// length intentionally repeat earlier step text verbatim.
fn make_subtasks(task: &str, difficulty: &str) -> Vec<Subtask> {
    let task_lower = task.to_lowercase();
    let template = TEMPLATES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| task_lower.contains(k)))
        .map(|(_, steps)| steps)
        .unwrap_or(&GENERIC_TEMPLATE);

    let multiplier = difficulty_multiplier(difficulty);
    // Truncation toward zero, matching int() conversion: 6 * 1.2 -> 7
    let scaled = (template.len() as f64 * multiplier) as usize;
    let count = scaled.clamp(4, 8);

    (0..count)
        .map(|i| Subtask {
            id: i,
            text: template[i % template.len()].to_string(),
            completed: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(task: &str, difficulty: &str) -> GenerateRequest {
        GenerateRequest {
            task: task.to_string(),
            category: "work".to_string(),
            difficulty: difficulty.to_string(),
            due_date: None,
        }
    }

    #[test]
    fn test_easy_build_task_uses_full_build_template() {
        let draft = generate(&request("build a website", "easy"));

        assert_eq!(draft.title, "Quest: Build");
        assert_eq!(draft.description, "Complete the task: build a website");
        assert_eq!(draft.subtasks.len(), 6);
        for (i, subtask) in draft.subtasks.iter().enumerate() {
            assert_eq!(subtask.id, i);
            assert!(!subtask.completed);
            assert_eq!(subtask.text, TEMPLATES[0].1[i]);
        }
    }

    #[test]
    fn test_epic_difficulty_clamps_to_eight_with_wraparound() {
        let draft = generate(&request("build a website", "epic"));

        // 6 * 2 = 12, clamped to 8
        assert_eq!(draft.subtasks.len(), 8);
        assert_eq!(draft.subtasks[6].text, TEMPLATES[0].1[0]);
        assert_eq!(draft.subtasks[7].text, TEMPLATES[0].1[1]);
        assert_eq!(draft.subtasks[7].id, 7);
    }

    #[test]
    fn test_medium_difficulty_truncates_to_seven() {
        let draft = generate(&request("build a website", "medium"));

        // 6 * 1.2 = 7.2, truncated to 7
        assert_eq!(draft.subtasks.len(), 7);
        assert_eq!(draft.subtasks[6].text, TEMPLATES[0].1[0]);
    }

    #[test]
    fn test_hard_difficulty_truncates_to_nine_then_clamps() {
        let draft = generate(&request("learn rust properly", "hard"));

        // 6 * 1.5 = 9, clamped to 8; study template matched on "learn"
        assert_eq!(draft.subtasks.len(), 8);
        assert_eq!(draft.subtasks[0].text, TEMPLATES[1].1[0]);
    }

    #[test]
    fn test_unrecognized_difficulty_defaults_to_one() {
        let draft = generate(&request("build a website", "legendary"));
        assert_eq!(draft.subtasks.len(), 6);
    }

    #[test]
    fn test_keyword_priority_order() {
        // "build" and "plan" both match; the build set is tested first
        let draft = generate(&request("plan how to build a shed", "easy"));
        assert_eq!(draft.subtasks[0].text, TEMPLATES[0].1[0]);
    }

    #[test]
    fn test_no_keyword_uses_generic_template() {
        let draft = generate(&request("water every houseplant", "easy"));
        assert_eq!(draft.subtasks[0].text, GENERIC_TEMPLATE[0]);
        assert_eq!(draft.subtasks[5].text, GENERIC_TEMPLATE[5]);
    }

    #[test]
    fn test_title_skips_stop_words_and_short_words() {
        let draft = generate(&request("for the with and document stuff", "easy"));
        assert_eq!(draft.title, "Quest: Document");
    }

    #[test]
    fn test_title_falls_back_to_task_prefix() {
        let draft = generate(&request("do it now", "easy"));
        assert_eq!(draft.title, "Quest: do it now");
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let a = generate(&request("write the annual report", "hard"));
        let b = generate(&request("write the annual report", "hard"));
        assert_eq!(a.title, b.title);
        assert_eq!(a.description, b.description);
        assert_eq!(a.subtasks, b.subtasks);
    }
}
