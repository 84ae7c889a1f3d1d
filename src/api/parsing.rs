use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::BookingError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// HTTP method of an API Gateway proxy event (HTTP API v2 or REST v1 shape).
pub fn http_method(payload: &Value) -> Option<&str> {
    v_str(payload, &["requestContext", "http", "method"]).or_else(|| v_str(payload, &["httpMethod"]))
}

pub fn is_preflight(payload: &Value) -> bool {
    http_method(payload).is_some_and(|m| m.eq_ignore_ascii_case("OPTIONS"))
}

pub fn extract_body(payload: &Value) -> Result<&str, BookingError> {
    let Some(body) = payload.get("body") else {
        return Err(BookingError::InvalidRequest("Missing body".to_string()));
    };

    let Some(body_str) = body.as_str() else {
        return Err(BookingError::InvalidRequest("Invalid body format".to_string()));
    };

    if payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(BookingError::InvalidRequest(
            "Binary bodies are not accepted; send application/json".to_string(),
        ));
    }

    Ok(body_str)
}

/// Deserializes the request body. Missing fields, wrong types and invalid
/// JSON all surface as `InvalidRequest`.
pub fn parse_json_body<T: DeserializeOwned>(payload: &Value) -> Result<T, BookingError> {
    let body = extract_body(payload)?;
    Ok(serde_json::from_str(body)?)
}
