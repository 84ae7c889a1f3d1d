//! Board persistence and the import pipeline that feeds it.
//!
//! The extractor never writes anything. [`import_transcript`] is the caller
//! that does: it extracts first and inserts only a complete task list.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use super::extract::{TaskExtractor, ensure_transcript};
use crate::ai::client::CompletionProvider;
use crate::core::config::StoreConfig;
use crate::core::models::Task;
use crate::errors::BookingError;

/// Retries applied to transient lookup and extraction failures by
/// [`import_transcript`].
pub const IMPORT_RETRIES: usize = 3;

/// Storage for board tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Status key assigned to new tasks: the first column of the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the board has no statuses or the lookup fails.
    async fn initial_status(&self) -> Result<String, BookingError>;

    /// Inserts all tasks as one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is rejected; nothing is inserted then.
    async fn insert_tasks(&self, tasks: &[Task]) -> Result<usize, BookingError>;
}

#[derive(Debug, Serialize)]
struct TaskRow<'a> {
    title: &'a str,
    description: &'a str,
    status_id: &'a str,
    assignee: Option<&'a str>,
    due_date: Option<&'a str>,
    date_completed: Option<&'a str>,
}

impl<'a> From<&'a Task> for TaskRow<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            title: &task.title,
            description: &task.description,
            status_id: &task.status_key,
            assignee: task.assignee.as_deref(),
            due_date: task.due_date.as_deref(),
            date_completed: task.completed_date.as_deref(),
        }
    }
}

/// `TaskStore` backed by a hosted Postgres REST API (`kanban_statuses` and
/// `tasks` tables).
pub struct PostgrestStore {
    rest_base: String,
    service_key: String,
    http: Client,
}

impl PostgrestStore {
    /// # Errors
    ///
    /// Returns `HttpError` if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, BookingError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BookingError::HttpError(format!("Failed to build store client: {e}")))?;
        Ok(Self {
            rest_base: format!("{}/rest/v1", config.url.as_str().trim_end_matches('/')),
            service_key: config.service_key.clone(),
            http,
        })
    }

    #[must_use]
    pub fn statuses_url(&self) -> String {
        format!(
            "{}/kanban_statuses?select=id&order=position.asc&limit=1",
            self.rest_base
        )
    }

    #[must_use]
    pub fn tasks_url(&self) -> String {
        format!("{}/tasks", self.rest_base)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .text()
        .await
        .map(|body| format!("status {status}: {body}"))
        .unwrap_or_else(|e| format!("status {status}: unreadable body: {e}"))
}

#[async_trait]
impl TaskStore for PostgrestStore {
    async fn initial_status(&self) -> Result<String, BookingError> {
        let response = self
            .authorized(self.http.get(self.statuses_url()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BookingError::HttpError(format!(
                "status lookup failed ({})",
                error_body(response).await
            )));
        }

        let rows: Vec<Value> = response.json().await?;
        rows.first()
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
            .map(std::string::ToString::to_string)
            .ok_or_else(|| BookingError::ConfigError("board has no statuses".to_string()))
    }

    async fn insert_tasks(&self, tasks: &[Task]) -> Result<usize, BookingError> {
        if tasks.is_empty() {
            return Ok(0);
        }
        let rows: Vec<TaskRow<'_>> = tasks.iter().map(TaskRow::from).collect();

        let response = self
            .authorized(self.http.post(self.tasks_url()))
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BookingError::HttpError(format!(
                "task insert failed ({})",
                error_body(response).await
            )));
        }

        Ok(rows.len())
    }
}

fn backoff() -> impl Iterator<Item = Duration> {
    // 200ms, 400ms, 800ms before jitter
    ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(IMPORT_RETRIES)
}

/// Result of a successful [`import_transcript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub tasks: Vec<Task>,
    /// Row count reported by the store.
    pub inserted: usize,
}

/// Extracts tasks from a transcript and stores them on the board.
///
/// A blank transcript is rejected before any outbound call. Transient
/// failures (`GenerationFailed`, `HttpError`) of the status lookup and the
/// extraction are retried with jittered exponential backoff. The batch insert
/// is not idempotent and runs exactly once, only after the whole reply
/// decoded.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, the first
/// non-transient error immediately, or the insert error as is.
pub async fn import_transcript<P, S>(
    provider: &P,
    store: &S,
    transcript: &str,
    deadline: Option<&str>,
) -> Result<Imported, BookingError>
where
    P: CompletionProvider + ?Sized,
    S: TaskStore + ?Sized,
{
    ensure_transcript(transcript)?;

    let retryable = |e: &BookingError| {
        let transient = e.is_transient();
        if transient {
            warn!("Transient import failure, retrying: {}", e);
        }
        transient
    };

    let initial_status = RetryIf::spawn(backoff(), || store.initial_status(), retryable).await?;
    let extractor = TaskExtractor::new(provider, initial_status);

    let tasks = RetryIf::spawn(
        backoff(),
        || extractor.extract(transcript, deadline),
        retryable,
    )
    .await?;

    let inserted = store.insert_tasks(&tasks).await.inspect_err(|e| {
        warn!("Task insert failed, not retrying: {}", e);
    })?;
    info!(extracted = tasks.len(), inserted, "Imported transcript tasks");

    Ok(Imported { tasks, inserted })
}
