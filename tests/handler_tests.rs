mod common;

use chatbook::api::{handle_dialogue, handle_tasks};
use chatbook::tasks::TaskStore;
use common::{FakeProvider, FakeStore, TWO_TASKS};
use serde_json::{Value, json};

fn post(body: &Value) -> Value {
    json!({
        "requestContext": { "http": { "method": "POST" } },
        "headers": { "content-type": "application/json" },
        "body": body.to_string()
    })
}

fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

#[test]
fn test_dialogue_first_turn() {
    let response = handle_dialogue(&post(&json!({
        "messages": [{ "role": "assistant", "content": "Hi! What's your business called?" }],
        "bookingData": {}
    })));

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
    let body = body_of(&response);
    assert_eq!(body["message"], "What's your business name?");
    assert_eq!(body["completed"], false);
    assert_eq!(body["bookingData"], json!({}));
    assert!(body.get("options").is_none());
}

#[test]
fn test_dialogue_answer_returns_options() {
    let response = handle_dialogue(&post(&json!({
        "messages": [
            { "role": "assistant", "content": "What's your business name?" },
            { "role": "user", "content": "Acme" }
        ],
        "bookingData": {}
    })));

    let body = body_of(&response);
    assert_eq!(body["bookingData"], json!({ "businessName": "Acme" }));
    assert_eq!(body["message"], "What industry is your business in?");
    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 6);
    assert_eq!(options[0], json!({ "label": "E-commerce", "value": "ecommerce" }));
}

#[test]
fn test_dialogue_completion() {
    let response = handle_dialogue(&post(&json!({
        "messages": [{ "role": "user", "content": "need_quote" }],
        "bookingData": {
            "businessName": "Acme",
            "industry": "ecommerce",
            "projectType": ["branding", "website"],
            "projectSize": "small",
            "timeline": "asap"
        }
    })));

    let body = body_of(&response);
    assert_eq!(body["completed"], true);
    assert_eq!(body["bookingData"]["budget"], "need_quote");
    assert_eq!(body["bookingData"]["projectType"], json!(["branding", "website"]));
    assert!(body["message"].as_str().unwrap().contains("Acme"));
}

#[test]
fn test_dialogue_rejects_malformed_requests() {
    let bad_bodies = [
        json!({ "bookingData": {} }),
        json!({ "messages": [], "bookingData": [] }),
        json!({ "messages": [], "bookingData": null }),
        json!({ "messages": [{ "role": "system", "content": "x" }], "bookingData": {} }),
        json!({ "messages": [], "bookingData": { "budget": "under_5k" } }),
    ];

    for bad in bad_bodies {
        let response = handle_dialogue(&post(&bad));
        assert_eq!(response["statusCode"], 400, "expected 400 for {bad}");
        let body = body_of(&response);
        assert!(body["error"].is_string());
        assert!(body.get("bookingData").is_none());
    }

    let response = handle_dialogue(&json!({ "requestContext": { "http": { "method": "POST" } } }));
    assert_eq!(response["statusCode"], 400);
}

#[test]
fn test_preflight() {
    let response = handle_dialogue(&json!({ "httpMethod": "OPTIONS" }));
    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["body"], "");
    assert_eq!(
        response["headers"]["Access-Control-Allow-Headers"],
        "authorization, x-client-info, apikey, content-type"
    );
}

#[tokio::test]
async fn test_tasks_success() {
    let provider = FakeProvider::replying(TWO_TASKS);
    let response = handle_tasks(
        &post(&json!({
            "transcription": "Client wants a logo and a website by June",
            "deadline": "2024-06-01"
        })),
        &provider,
        None,
        "not_started",
    )
    .await;

    assert_eq!(response["statusCode"], 200);
    let body = body_of(&response);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Design logo");
    assert_eq!(tasks[0]["statusKey"], "not_started");
    assert_eq!(tasks[0]["dueDate"], "2024-06-01");
    assert!(tasks[0]["assignee"].is_null());
    assert!(body.get("inserted").is_none());
}

#[tokio::test]
async fn test_tasks_errors_carry_empty_task_list() {
    let cases = [
        (json!({ "transcription": "" }), FakeProvider::replying(TWO_TASKS), 400),
        (json!({ "deadline": "2024-06-01" }), FakeProvider::replying(TWO_TASKS), 400),
        (json!({ "transcription": "Logo" }), FakeProvider::replying("no json here"), 502),
        (json!({ "transcription": "Logo" }), FakeProvider::failing("status 500"), 502),
    ];

    for (request, provider, status) in cases {
        let response = handle_tasks(&post(&request), &provider, None, "todo").await;
        assert_eq!(response["statusCode"], status, "status for {request}");
        let body = body_of(&response);
        assert!(body["error"].is_string());
        assert_eq!(body["tasks"], json!([]));
    }
}

#[tokio::test]
async fn test_tasks_persist_requires_store() {
    let provider = FakeProvider::replying(TWO_TASKS);
    let response = handle_tasks(
        &post(&json!({ "transcription": "Logo", "persist": true })),
        &provider,
        None,
        "todo",
    )
    .await;

    assert_eq!(response["statusCode"], 400);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_tasks_persist_inserts() {
    let provider = FakeProvider::replying(TWO_TASKS);
    let store = FakeStore::new("board-first-column");
    let response = handle_tasks(
        &post(&json!({ "transcription": "Logo and website", "persist": true })),
        &provider,
        Some(&store as &dyn TaskStore),
        "ignored",
    )
    .await;

    assert_eq!(response["statusCode"], 200);
    let body = body_of(&response);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["tasks"][0]["statusKey"], "board-first-column");
    assert_eq!(store.inserted().len(), 2);
}

#[tokio::test]
async fn test_tasks_persist_reports_store_count() {
    let provider = FakeProvider::replying(TWO_TASKS);
    let store = FakeStore::reporting("todo", 1);
    let response = handle_tasks(
        &post(&json!({ "transcription": "Logo and website", "persist": true })),
        &provider,
        Some(&store as &dyn TaskStore),
        "ignored",
    )
    .await;

    let body = body_of(&response);
    assert_eq!(body["inserted"], 1);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
}
