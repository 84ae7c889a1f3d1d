//! Calendar collaborator: meeting times, discovery-call events, and the
//! Google Calendar adapter.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::core::models::{BookingRecord, SlotValue};
use crate::errors::BookingError;
use crate::intake::engine::is_complete;
use crate::intake::schema::{BUSINESS_NAME, SCHEMA, Slot};

pub const GOOGLE_EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Start times offered to the client, host-local.
pub const TIME_SLOTS: &[&str] = &["09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00"];

/// Meeting lengths offered to the client, in minutes.
pub const MEETING_DURATIONS: &[u32] = &[30, 45, 60];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    /// RFC 3339, UTC.
    pub start_time: String,
    /// RFC 3339, UTC.
    pub end_time: String,
    pub attendees: Vec<String>,
}

/// Creates calendar events on behalf of the host.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Returns the provider's event identifier.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` when the host must re-authenticate, or
    /// `HttpError` for any other provider failure.
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, BookingError>;
}

fn check_duration(duration_minutes: u32) -> Result<(), BookingError> {
    if MEETING_DURATIONS.contains(&duration_minutes) {
        return Ok(());
    }
    Err(BookingError::ValidationError(format!(
        "meeting duration {duration_minutes} is not one of {MEETING_DURATIONS:?} minutes"
    )))
}

/// Start and end of a meeting as RFC 3339 UTC strings.
///
/// `time` is `HH:MM` in the host time zone `tz`.
///
/// # Errors
///
/// Returns `ValidationError` for a malformed time, a duration outside
/// [`MEETING_DURATIONS`], or a local time that does not exist in `tz`.
pub fn meeting_window(
    date: NaiveDate,
    time: &str,
    duration_minutes: u32,
    tz: Tz,
) -> Result<(String, String), BookingError> {
    let start_time = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|e| {
        BookingError::ValidationError(format!("meeting time '{time}' is not HH:MM: {e}"))
    })?;

    check_duration(duration_minutes)?;

    let local = tz
        .from_local_datetime(&date.and_time(start_time))
        .earliest()
        .ok_or_else(|| {
            BookingError::ValidationError(format!("{date} {time} does not exist in {tz}"))
        })?;

    let start = local.with_timezone(&Utc);
    let end = start + Duration::minutes(i64::from(duration_minutes));

    Ok((
        start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end.to_rfc3339_opts(SecondsFormat::Millis, true),
    ))
}

/// One offered start time and its meeting window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedSlot {
    pub time: &'static str,
    pub start_time: String,
    pub end_time: String,
}

/// Every [`TIME_SLOTS`] entry on `date` as a meeting window. Slots that do not
/// exist locally (DST gaps) are skipped.
///
/// # Errors
///
/// Returns `ValidationError` for a duration outside [`MEETING_DURATIONS`].
pub fn offered_slots(
    date: NaiveDate,
    duration_minutes: u32,
    tz: Tz,
) -> Result<Vec<OfferedSlot>, BookingError> {
    check_duration(duration_minutes)?;

    Ok(TIME_SLOTS
        .iter()
        .filter_map(|&time| {
            let (start_time, end_time) = meeting_window(date, time, duration_minutes, tz).ok()?;
            Some(OfferedSlot {
                time,
                start_time,
                end_time,
            })
        })
        .collect())
}

/// Catalog labels for an answer. Multi-select answers sent as one
/// comma-separated string are split first.
fn render_answer(slot: &Slot, value: &SlotValue) -> Result<String, BookingError> {
    let items: Vec<&str> = match value {
        SlotValue::Many(items) => items.iter().map(String::as_str).collect(),
        SlotValue::Text(text) if slot.multi_select => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect(),
        SlotValue::Text(text) => vec![text.as_str()],
    };

    let rendered = items
        .into_iter()
        .map(|item| match slot.label_for(item) {
            Some(label) => Ok(label.to_string()),
            None if slot.allows_custom_value => Ok(item.to_string()),
            None => Err(BookingError::ValidationError(format!(
                "'{item}' is not an offered {} choice",
                slot.key
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rendered.join(", "))
}

/// Event for the discovery call that follows a completed intake.
///
/// # Errors
///
/// Returns `ValidationError` if the intake is not complete, or if an answer
/// to a slot without custom values is off-catalog.
pub fn discovery_call_event(
    record: &BookingRecord,
    start_time: String,
    end_time: String,
    attendees: Vec<String>,
) -> Result<CalendarEvent, BookingError> {
    if !is_complete(record) {
        return Err(BookingError::ValidationError(
            "cannot schedule a call before the intake is complete".to_string(),
        ));
    }

    let business = record
        .get(BUSINESS_NAME)
        .map(SlotValue::display)
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(SCHEMA.len());
    for slot in SCHEMA {
        if let Some(value) = record.get(slot.key) {
            lines.push(format!("{}: {}", slot.label, render_answer(slot, value)?));
        }
    }
    let description = lines.join("\n");

    Ok(CalendarEvent {
        summary: format!("Discovery Call: {}", business.trim()),
        description,
        start_time,
        end_time,
        attendees,
    })
}

/// Google Calendar adapter using a host OAuth access token.
pub struct GoogleCalendarClient {
    access_token: String,
    time_zone: Tz,
    endpoint: String,
}

impl GoogleCalendarClient {
    #[must_use]
    pub fn new(access_token: String, time_zone: Tz) -> Self {
        Self {
            access_token,
            time_zone,
            endpoint: GOOGLE_EVENTS_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    #[must_use]
    pub fn build_request_body(&self, event: &CalendarEvent) -> Value {
        let tz = self.time_zone.name();
        json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": event.start_time, "timeZone": tz },
            "end": { "dateTime": event.end_time, "timeZone": tz },
            "attendees": event
                .attendees
                .iter()
                .map(|email| json!({ "email": email }))
                .collect::<Vec<_>>(),
            "reminders": { "useDefault": true },
            "guestsCanModify": false,
            "guestsCanInviteOthers": false
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, BookingError> {
        info!(
            summary = %event.summary,
            start = %event.start_time,
            attendees = event.attendees.len(),
            "Creating calendar event"
        );

        let response = Client::new()
            .post(format!("{}?sendUpdates=all", self.endpoint))
            .bearer_auth(&self.access_token)
            .json(&self.build_request_body(event))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        event_id_from_response(status, &body)
    }
}

/// Event id from a Google Calendar insert response.
///
/// # Errors
///
/// * `AuthExpired` for HTTP 401.
/// * `HttpError` carrying `error.message` for any other non-2xx status, or
///   when a successful body has no `id`.
pub fn event_id_from_response(status: StatusCode, body: &Value) -> Result<String, BookingError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(BookingError::AuthExpired(
            "calendar access token was rejected".to_string(),
        ));
    }

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Failed to create calendar event");
        error!("Calendar API error (status {}): {}", status, message);
        return Err(BookingError::HttpError(format!(
            "calendar API error (status {status}): {message}"
        )));
    }

    body.get("id")
        .and_then(Value::as_str)
        .map(std::string::ToString::to_string)
        .ok_or_else(|| BookingError::HttpError("calendar response has no event id".to_string()))
}
