// tasklist - In-memory to-do list state store

pub mod command;
pub mod config;
pub mod edit;
pub mod entry;
pub mod filter;
pub mod render;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::Config;
pub use edit::{CommitPolicy, EditState};
pub use entry::{Entry, EntryDefaults};
pub use filter::Filter;
pub use store::{Change, Counts, Snapshot, StoreOptions, SubscriptionId, TaskListStore, VisibleTasks};
pub use task::{Priority, Task, TaskId, now_ms};
