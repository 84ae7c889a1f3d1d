use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// One selectable answer offered alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Choice>>,
}

impl Turn {
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            options: None,
        }
    }

    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            options: None,
        }
    }
}

/// A collected answer: free text, or several values for multi-select slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Many(Vec<String>),
}

impl SlotValue {
    /// Flattens the value for display, joining multi-select answers.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Many(items) => items.join(", "),
        }
    }
}

/// Answers collected so far, keyed by slot key.
///
/// Key order carries no meaning; progress through the intake is derived from
/// which schema keys are present (see `intake::engine`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingRecord(BTreeMap<String, SlotValue>);

impl BookingRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SlotValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns a copy of the record with `key` added. Existing keys are never
    /// replaced; `None` is returned if `key` is already present.
    #[must_use]
    pub fn with_answer(&self, key: &str, value: SlotValue) -> Option<Self> {
        if self.0.contains_key(key) {
            return None;
        }
        let mut next = self.0.clone();
        next.insert(key.to_string(), value);
        Some(Self(next))
    }
}

impl<K: Into<String>> FromIterator<(K, SlotValue)> for BookingRecord {
    fn from_iter<I: IntoIterator<Item = (K, SlotValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A backlog item produced from a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub description: String,
    pub status_key: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub completed_date: Option<String>,
}

// ============================================================================
// Endpoint payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DialogueRequest {
    pub messages: Vec<Turn>,
    #[serde(rename = "bookingData")]
    pub booking_data: BookingRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Choice>>,
    #[serde(rename = "bookingData")]
    pub booking_data: BookingRecord,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct TasksRequest {
    pub transcription: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
}
