//! Tasks Lambda handler (`generate-tasks`).
//!
//! Parses `{transcription, deadline?, persist?}` and returns `{tasks}`.
//! Every error body also carries an empty `tasks` array.

use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::ai::client::{CompletionProvider, LlmClient};
use crate::core::config::AppConfig;
use crate::core::models::{TasksRequest, TasksResponse};
use crate::errors::BookingError;
use crate::tasks::{PostgrestStore, TaskExtractor, TaskStore, import_transcript};

pub use self::function_handler as handler;

/// Lambda handler for the tasks endpoint.
///
/// # Errors
///
/// Never fails at the Lambda level; configuration and request problems are
/// reported in the response payload.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    if parsing::is_preflight(&event.payload) {
        return Ok(helpers::preflight());
    }

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Config error: {}", e);
            let err = BookingError::ConfigError(e);
            return Ok(helpers::err_tasks_response(err.status_code(), &err.to_string()));
        }
    };

    let provider = LlmClient::from_config(&config);
    let store = match config.store.as_ref().map(PostgrestStore::new).transpose() {
        Ok(s) => s,
        Err(e) => {
            error!("Store setup failed: {}", e);
            return Ok(helpers::err_tasks_response(e.status_code(), &e.to_string()));
        }
    };

    Ok(handle_tasks(
        &event.payload,
        &provider,
        store.as_ref().map(|s| s as &dyn TaskStore),
        &config.initial_status_key,
    )
    .await)
}

/// Handles one API Gateway proxy payload with the given collaborators.
pub async fn handle_tasks<P>(
    payload: &Value,
    provider: &P,
    store: Option<&dyn TaskStore>,
    initial_status: &str,
) -> Value
where
    P: CompletionProvider + ?Sized,
{
    if parsing::is_preflight(payload) {
        return helpers::preflight();
    }

    let request_id = Uuid::new_v4();

    match run(payload, provider, store, initial_status).await {
        Ok(response) => {
            info!(
                %request_id,
                tasks = response.tasks.len(),
                inserted = ?response.inserted,
                "Task extraction succeeded"
            );
            helpers::ok_json(&response)
        }
        Err(e) => {
            error!(%request_id, "Task extraction failed: {}", e);
            helpers::err_tasks_response(e.status_code(), &e.to_string())
        }
    }
}

async fn run<P>(
    payload: &Value,
    provider: &P,
    store: Option<&dyn TaskStore>,
    initial_status: &str,
) -> Result<TasksResponse, BookingError>
where
    P: CompletionProvider + ?Sized,
{
    let req: TasksRequest = parsing::parse_json_body(payload)?;
    let deadline = req.deadline.as_deref();

    if req.persist {
        let store = store.ok_or_else(|| {
            BookingError::InvalidRequest("task persistence is not configured".to_string())
        })?;
        let imported = import_transcript(provider, store, &req.transcription, deadline).await?;
        return Ok(TasksResponse {
            tasks: imported.tasks,
            inserted: Some(imported.inserted),
        });
    }

    let tasks = TaskExtractor::new(provider, initial_status)
        .extract(&req.transcription, deadline)
        .await?;
    Ok(TasksResponse {
        tasks,
        inserted: None,
    })
}
