//! Slot-filling step resolution.
//!
//! Each call receives the full conversation and the answers collected so far,
//! applies the user's latest message to the pending slot, and reports what to
//! ask next. Nothing is stored between calls.

use tracing::debug;

use super::schema::{BUSINESS_NAME, SCHEMA, Slot, position_of, slot_at};
use crate::core::models::{BookingRecord, Choice, DialogueResponse, Role, SlotValue, Turn};
use crate::errors::BookingError;

/// Minutes booked for the discovery call announced at the end of the intake.
pub const DISCOVERY_CALL_MINUTES: u32 = 30;

/// Outcome of one dialogue step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub prompt: String,
    pub choices: Option<Vec<Choice>>,
    pub record: BookingRecord,
    pub completed: bool,
}

impl From<Advance> for DialogueResponse {
    fn from(step: Advance) -> Self {
        Self {
            message: step.prompt,
            options: step.choices,
            booking_data: step.record,
            completed: step.completed,
        }
    }
}

/// Number of schema slots already answered.
///
/// The record must hold exactly the first `k` schema keys. Unknown keys or a
/// later slot filled ahead of an earlier one are rejected.
///
/// # Errors
///
/// Returns `InvalidRequest` when the record is not a schema prefix.
pub fn filled_slots(record: &BookingRecord) -> Result<usize, BookingError> {
    for key in record.keys() {
        if position_of(key).is_none() {
            return Err(BookingError::InvalidRequest(format!(
                "bookingData contains unknown field '{key}'"
            )));
        }
    }

    let filled = SCHEMA
        .iter()
        .take_while(|slot| record.contains_key(slot.key))
        .count();

    if filled != record.len() {
        let missing = SCHEMA[filled].key;
        return Err(BookingError::InvalidRequest(format!(
            "bookingData skips '{missing}' but contains later fields"
        )));
    }

    Ok(filled)
}

/// The slot to ask next, or `None` once every slot has an answer.
///
/// # Errors
///
/// Returns `InvalidRequest` when the record is not a schema prefix.
pub fn pending_slot(record: &BookingRecord) -> Result<Option<&'static Slot>, BookingError> {
    filled_slots(record).map(slot_at)
}

#[must_use]
pub fn is_complete(record: &BookingRecord) -> bool {
    matches!(filled_slots(record), Ok(n) if n == SCHEMA.len())
}

/// Confirmation shown once the intake is finished.
#[must_use]
pub fn completion_message(record: &BookingRecord) -> String {
    let greeting = match record.get(BUSINESS_NAME).map(SlotValue::display) {
        Some(name) if !name.trim().is_empty() => format!("Great! Thanks, {}.", name.trim()),
        _ => "Great!".to_string(),
    };
    format!(
        "{greeting} Now let's schedule your {DISCOVERY_CALL_MINUTES}-minute discovery call. \
         Please select from the available time slots:"
    )
}

/// Applies the latest user turn to the pending slot and resolves the next step.
///
/// The answer is stored verbatim. Values outside the slot's choice set are
/// accepted exactly like catalog values, and so are blank answers. When the
/// transcript does not end with a user turn (the opening greeting, or a
/// repeated call after completion) the record is returned unchanged.
///
/// # Errors
///
/// Returns `InvalidRequest` when the record is not a schema prefix. No
/// partially updated record is ever returned alongside an error.
pub fn advance(turns: &[Turn], record: &BookingRecord) -> Result<Advance, BookingError> {
    let pending = pending_slot(record)?;

    let answer = turns
        .last()
        .filter(|turn| turn.role == Role::User)
        .map(|turn| turn.content.as_str());

    let updated = match (pending, answer) {
        (Some(slot), Some(raw)) => {
            debug!(slot = slot.key, "Applying answer to pending slot");
            record
                .with_answer(slot.key, SlotValue::Text(raw.to_string()))
                .ok_or_else(|| {
                    BookingError::InvalidRequest(format!("slot '{}' is already filled", slot.key))
                })?
        }
        _ => record.clone(),
    };

    Ok(match pending_slot(&updated)? {
        Some(next) => Advance {
            prompt: next.prompt.to_string(),
            choices: next.choice_set(),
            record: updated,
            completed: false,
        },
        None => Advance {
            prompt: completion_message(&updated),
            choices: None,
            record: updated,
            completed: true,
        },
    })
}
