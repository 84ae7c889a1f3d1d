use once_cell::sync::Lazy;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use regex::Regex;

/// Transcripts longer than this are truncated before prompting.
pub const MAX_TRANSCRIPT_CHARS: usize = 100_000;

/// Soft lower bound on the number of tasks the model is asked for.
pub const MIN_SUGGESTED_TASKS: usize = 3;

pub const TASK_EXTRACTION_INSTRUCTIONS: &str = "You are a task extraction assistant. \
Analyze the given transcription and extract actionable tasks for the project discussed. \
─────────────── RULES ─────────────── \
1. Return the tasks as a JSON array of objects. Each object has exactly two string fields: \
\"title\" and \"description\". Because the response must be a JSON object, wrap the array \
under the key \"tasks\", for example: \
{\"tasks\": [{\"title\": \"Build Landing Page\", \"description\": \"Create the main landing page with company information\"}]} \
2. Break large pieces of work into smaller, actionable subtasks. \
3. Aim for at least 3 tasks. \
4. Each task must be clear, specific, and directly related to the project discussed. \
5. Output only the JSON. No commentary.";

/// Removes control characters (newlines and tabs survive) and hard-truncates.
#[must_use]
pub fn sanitize_transcript(raw: &str) -> String {
    raw.chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .take(MAX_TRANSCRIPT_CHARS)
        .collect()
}

/// Builds the two-message prompt for task extraction.
#[must_use]
pub fn build_task_prompt(transcript: &str, deadline: Option<&str>) -> Vec<ChatCompletionMessage> {
    let mut user_text = format!("Transcription: {}", sanitize_transcript(transcript));
    if let Some(d) = deadline {
        user_text.push_str(&format!("\nDeadline: {d}"));
    }

    vec![
        ChatCompletionMessage {
            role: MessageRole::system,
            content: Content::Text(TASK_EXTRACTION_INSTRUCTIONS.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
        ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(user_text),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
    ]
}

/// Strips one surrounding Markdown code fence, if present.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```\s*$").expect("static regex compile")
    });

    match FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => raw.trim(),
    }
}
