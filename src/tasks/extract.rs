//! Transcript-to-task extraction.
//!
//! One completion call per transcript. The model's reply is decoded in full
//! before any task is produced, so a malformed reply never yields a partial
//! list.

use serde_json::Value;
use tracing::{info, warn};

use crate::ai::client::CompletionProvider;
use crate::ai::prompt_builder::{build_task_prompt, sanitize_transcript, strip_code_fence};
use crate::core::models::Task;
use crate::errors::BookingError;

/// Title and description as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTask {
    pub title: String,
    pub description: String,
}

/// The two reply shapes accepted from the model, tried in this order.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// `[{...}, ...]`
    Bare(Vec<Value>),
    /// `{"tasks": [{...}, ...]}`
    Wrapped(Vec<Value>),
}

impl ModelOutput {
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::Wrapped(items) => items,
        }
    }
}

/// Classifies the model reply.
///
/// # Errors
///
/// Returns `ExtractionFormatError` if the text is not JSON, or is JSON of any
/// shape other than a bare array or an object with a `tasks` array.
pub fn decode_model_output(raw: &str) -> Result<ModelOutput, BookingError> {
    let body = strip_code_fence(raw);
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| BookingError::ExtractionFormatError(format!("reply is not JSON: {e}")))?;

    match parsed {
        Value::Array(items) => Ok(ModelOutput::Bare(items)),
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(items)) => Ok(ModelOutput::Wrapped(items)),
            Some(_) => Err(BookingError::ExtractionFormatError(
                "'tasks' is not an array".to_string(),
            )),
            None => Err(BookingError::ExtractionFormatError(
                "object reply has no 'tasks' field".to_string(),
            )),
        },
        other => Err(BookingError::ExtractionFormatError(format!(
            "unexpected reply type: {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_text(item: &Value, index: usize, field: &str) -> Result<String, BookingError> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(std::string::ToString::to_string)
        .ok_or_else(|| {
            BookingError::ExtractionFormatError(format!(
                "task {index} is missing a non-empty '{field}' string"
            ))
        })
}

/// Decodes every item of the reply, failing on the first malformed one.
///
/// # Errors
///
/// Returns `ExtractionFormatError` for any shape problem.
pub fn parse_tasks(raw: &str) -> Result<Vec<RawTask>, BookingError> {
    decode_model_output(raw)?
        .into_items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(BookingError::ExtractionFormatError(format!(
                    "task {index} is not an object"
                )));
            }
            Ok(RawTask {
                title: required_text(item, index, "title")?,
                description: required_text(item, index, "description")?,
            })
        })
        .collect()
}

/// Rejects a transcript that is empty once sanitized, so control characters
/// alone never reach the model.
///
/// # Errors
///
/// Returns `ValidationError` for a blank transcript.
pub fn ensure_transcript(transcript: &str) -> Result<(), BookingError> {
    if sanitize_transcript(transcript).trim().is_empty() {
        return Err(BookingError::ValidationError(
            "transcription is empty; nothing to extract".to_string(),
        ));
    }
    Ok(())
}

/// Turns transcripts into normalized backlog tasks.
pub struct TaskExtractor<P> {
    provider: P,
    initial_status: String,
}

impl<P: CompletionProvider> TaskExtractor<P> {
    #[must_use]
    pub fn new(provider: P, initial_status: impl Into<String>) -> Self {
        Self {
            provider,
            initial_status: initial_status.into(),
        }
    }

    #[must_use]
    pub fn initial_status(&self) -> &str {
        &self.initial_status
    }

    /// Extracts tasks from a transcript.
    ///
    /// A blank `deadline` is treated as absent.
    ///
    /// # Errors
    ///
    /// * `ValidationError` for a blank transcript; the model is not called.
    /// * `GenerationFailed` when the completion call fails.
    /// * `ExtractionFormatError` when the reply cannot be decoded.
    pub async fn extract(
        &self,
        transcript: &str,
        deadline: Option<&str>,
    ) -> Result<Vec<Task>, BookingError> {
        ensure_transcript(transcript)?;

        let deadline = deadline.map(str::trim).filter(|d| !d.is_empty());

        #[cfg(feature = "debug-logs")]
        info!("Extracting tasks from transcript:\n{}", transcript);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            transcript_chars = transcript.chars().count(),
            has_deadline = deadline.is_some(),
            "Extracting tasks from transcript"
        );

        let prompt = build_task_prompt(transcript, deadline);
        let raw = self.provider.complete(prompt).await?;

        let parsed = parse_tasks(&raw).inspect_err(|e| {
            warn!("Discarding model reply: {}", e);
        })?;

        info!(count = parsed.len(), "Extracted tasks");

        Ok(parsed
            .into_iter()
            .map(|raw_task| Task {
                title: raw_task.title,
                description: raw_task.description,
                status_key: self.initial_status.clone(),
                assignee: None,
                due_date: deadline.map(std::string::ToString::to_string),
                completed_date: None,
            })
            .collect())
    }
}
