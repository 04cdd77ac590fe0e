//! In-memory task store for a categorized todo application.
//!
//! Categories own ordered tasks; tasks carry due dates, priorities, and
//! subtasks. Deleting a task is soft: it leaves its category immediately
//! but stays recoverable for [`UNDO_WINDOW`], after which a timer makes
//! the removal permanent. A broadcast channel tells subscribers about
//! state changes and lapsed undo windows.
//!
//! State is deliberately transient: nothing here touches disk or the
//! network, and everything is gone when the process exits. [`TaskStore`]
//! is an explicit, constructible handle (cheap to clone, safe to share)
//! so each embedder or test owns its own store instead of reaching for a
//! global.
//!
//! [`TaskStore::delete_task`] schedules its expiry timer on the ambient
//! tokio runtime, so it must be called from within one.

pub mod commands;
pub mod events;
mod expiry;
pub mod logging;
pub mod models;
pub mod store;

pub use events::StoreEvent;
pub use expiry::UNDO_WINDOW;
pub use models::{Category, Priority, Subtask, Task, TaskPatch, Timestamp};
pub use store::{DeleteOutcome, StoreError, TaskStore};
