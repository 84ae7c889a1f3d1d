//! Transcript-to-task extraction and board persistence

pub mod board;
pub mod extract;

pub use board::{Imported, PostgrestStore, TaskStore, import_transcript};
pub use extract::{
    ModelOutput, RawTask, TaskExtractor, decode_model_output, ensure_transcript, parse_tasks,
};
