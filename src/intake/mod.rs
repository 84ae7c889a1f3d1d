//! Chat-driven intake: the question schema and the step engine

pub mod engine;
pub mod schema;

pub use engine::{Advance, advance, completion_message, is_complete};
pub use schema::{SCHEMA, Slot};
