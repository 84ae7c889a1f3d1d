//! Dialogue Lambda handler (`generate-response`).
//!
//! Parses `{messages, bookingData}`, runs one intake step, and returns
//! `{message, options?, bookingData, completed}`. No configuration and no
//! outbound calls are needed.

use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::core::models::{DialogueRequest, DialogueResponse};
use crate::intake::advance;

pub use self::function_handler as handler;

/// Lambda handler for the dialogue endpoint.
///
/// # Errors
///
/// Never fails at the Lambda level; request problems become 4xx payloads.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    Ok(handle_dialogue(&event.payload))
}

/// Handles one API Gateway proxy payload.
#[must_use]
pub fn handle_dialogue(payload: &Value) -> Value {
    if parsing::is_preflight(payload) {
        return helpers::preflight();
    }

    let request_id = Uuid::new_v4();

    let result = parsing::parse_json_body::<DialogueRequest>(payload)
        .and_then(|req| advance(&req.messages, &req.booking_data));

    match result {
        Ok(step) => {
            info!(
                %request_id,
                filled = step.record.len(),
                completed = step.completed,
                "Dialogue step resolved"
            );
            helpers::ok_json(&DialogueResponse::from(step))
        }
        Err(e) => {
            error!(%request_id, "Dialogue request failed: {}", e);
            helpers::err_response(e.status_code(), &e.to_string())
        }
    }
}
