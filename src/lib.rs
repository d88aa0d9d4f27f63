// TodoStore - To-do list state management with pluggable key-value persistence

pub mod codec;
pub mod config;
pub mod filter;
pub mod models;
pub mod sqlite;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use filter::Filter;
pub use models::{TodoItem, now_ms};
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Counts, EditState, TodoStore};
