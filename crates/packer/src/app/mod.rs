//! Application layer: selection strategies, formatting, and batch orchestration.

pub mod batch;
pub mod context;
pub mod engine;
pub mod format;
