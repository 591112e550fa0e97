// Tasklist - single-user task collection engine with local persistence

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod notify;
pub mod query;
pub mod record;
pub mod stats;
pub mod storage;
pub mod store;
pub mod templates;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::{Result, TodoError};
pub use export::{Snapshot, SnapshotStatistics};
pub use filter::{CategoryFilter, StatusFilter};
pub use models::{MAX_TEXT_LEN, Priority, Task, Theme, today};
pub use notify::{DueDateMonitor, DueReport, Level, MemoryNotifier, Notifier, TracingNotifier};
pub use query::{SortKey, ViewQuery};
pub use stats::{Statistics, compute_stats};
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use store::{BulkAction, TaskStore};
pub use templates::{Template, templates};
