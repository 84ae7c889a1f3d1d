//! Common helper functions for API handlers.
//!
//! Every response is an API Gateway proxy payload carrying the CORS headers
//! the browser client needs.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

// ============================================================================
// Response Builders
// ============================================================================

#[must_use]
pub fn cors_headers() -> Value {
    json!({
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Headers": "authorization, x-client-info, apikey, content-type",
        "Content-Type": "application/json"
    })
}

/// Returns a 200 OK response with an empty body for CORS preflight.
#[must_use]
pub fn preflight() -> Value {
    json!({ "statusCode": 200, "headers": cors_headers(), "body": "" })
}

/// Returns a 200 OK response with `payload` serialized as the body.
#[must_use]
pub fn ok_json<T: Serialize>(payload: &T) -> Value {
    match serde_json::to_string(payload) {
        Ok(body) => json!({ "statusCode": 200, "headers": cors_headers(), "body": body }),
        Err(e) => {
            error!("Failed to serialize response body: {}", e);
            err_response(500, "Failed to serialize response")
        }
    }
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": cors_headers(),
        "body": json!({ "error": message }).to_string()
    })
}

/// Error response for the tasks endpoint, which always carries a `tasks`
/// array so callers can read the field unconditionally.
#[must_use]
pub fn err_tasks_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": cors_headers(),
        "body": json!({ "error": message, "tasks": [] }).to_string()
    })
}
