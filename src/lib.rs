/// chatbook - Chat-driven project intake and transcript-to-task extraction.
///
/// This crate implements the two request handlers behind a booking site:
/// 1. A dialogue Lambda that walks a client through a fixed intake
///    questionnaire, one answer per call, holding no session state
/// 2. A tasks Lambda that turns a call transcript into backlog tasks with an
///    LLM and optionally stores them on the project board
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda behind API Gateway for serverless execution
/// - openai-api-rs message types and reqwest for the completion call
/// - tokio-retry for the caller-side import retry policy
/// - Tokio for async runtime
///
/// # Example
///
/// ```
/// use chatbook::core::models::{BookingRecord, Turn};
/// use chatbook::intake::advance;
///
/// let greeting = Turn::assistant("Hi! Let's get you booked in.");
/// let step = advance(&[greeting], &BookingRecord::new()).unwrap();
/// assert_eq!(step.prompt, "What's your business name?");
/// assert!(!step.completed);
///
/// let answer = Turn::user("Acme");
/// let step = advance(&[answer], &step.record).unwrap();
/// assert_eq!(step.prompt, "What industry is your business in?");
/// assert_eq!(step.record.len(), 1);
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod calendar;
pub mod core;
pub mod errors;
pub mod intake;
pub mod tasks;

pub use errors::BookingError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called once at the start of each
/// Lambda binary. Calling it again is harmless.
///
/// # Example
///
/// ```
/// chatbook::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
