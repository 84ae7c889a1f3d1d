//! Lambda handlers and request processing

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod tasks_handler;

// Re-export the main handlers for convenience
pub use handler::{handle_dialogue, handler};
pub use tasks_handler::handle_tasks;
