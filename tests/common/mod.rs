#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chatbook::ai::CompletionProvider;
use chatbook::core::models::Task;
use chatbook::errors::BookingError;
use chatbook::tasks::TaskStore;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content};

pub const TWO_TASKS: &str = r#"{"tasks": [
    {"title": "Design logo", "description": "Create a logo concept for the client"},
    {"title": "Build website", "description": "Build the marketing website"}
]}"#;

/// Completion provider that replays canned replies in order.
pub struct FakeProvider {
    replies: Mutex<VecDeque<Result<String, BookingError>>>,
    calls: AtomicUsize,
    last_user_message: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn replying(reply: &str) -> Self {
        Self::sequence(vec![Ok(reply.to_string())])
    }

    pub fn failing(message: &str) -> Self {
        Self::sequence(vec![Err(BookingError::GenerationFailed(message.to_string()))])
    }

    pub fn sequence(replies: Vec<Result<String, BookingError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_user_message: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_message(&self) -> Option<String> {
        self.last_user_message.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, prompt: Vec<ChatCompletionMessage>) -> Result<String, BookingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(Content::Text(t)) = prompt.last().map(|m| &m.content) {
            *self.last_user_message.lock().unwrap() = Some(t.clone());
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BookingError::GenerationFailed("no reply queued".to_string())))
    }
}

/// In-memory board.
pub struct FakeStore {
    pub status: String,
    pub inserted: Mutex<Vec<Task>>,
    pub status_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    /// Error returned once, after the rows were saved.
    fail_after_save: Mutex<Option<BookingError>>,
    /// Count reported instead of the batch length.
    reported_count: Option<usize>,
}

impl FakeStore {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            inserted: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            fail_after_save: Mutex::new(None),
            reported_count: None,
        }
    }

    pub fn failing_after_save(status: &str, error: BookingError) -> Self {
        let store = Self::new(status);
        *store.fail_after_save.lock().unwrap() = Some(error);
        store
    }

    pub fn reporting(status: &str, count: usize) -> Self {
        Self {
            reported_count: Some(count),
            ..Self::new(status)
        }
    }

    pub fn inserted(&self) -> Vec<Task> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskStore for FakeStore {
    async fn initial_status(&self) -> Result<String, BookingError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status.clone())
    }

    async fn insert_tasks(&self, tasks: &[Task]) -> Result<usize, BookingError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inserted.lock().unwrap().extend_from_slice(tasks);
        if let Some(err) = self.fail_after_save.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.reported_count.unwrap_or(tasks.len()))
    }
}
