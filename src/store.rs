use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, TimeZone};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

use crate::events::{StoreEvent, EVENT_BUFFER};
use crate::expiry::schedule_expiry;
use crate::models::{Category, Task, TaskPatch};

/// Outcome of [`TaskStore::delete_task`], resolved at call time. It answers
/// "can this still be undone", not "has the task expired yet"; permanent
/// expiry is reported later through [`StoreEvent::TaskExpired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The task was active and is now recoverable until the undo window
    /// lapses.
    TemporarilyDeleted,
    /// No active task had this id. Ids already pending deletion land here
    /// too, so a double delete never schedules a second timer.
    AlreadyGone,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StoreError {
    CategoryNotFound(String),
    DuplicateCategory(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::CategoryNotFound(name) => write!(f, "category not found: {name}"),
            StoreError::DuplicateCategory(name) => write!(f, "duplicate category: {name}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A soft-deleted task waiting out its undo window.
///
/// `category_name` is captured separately from `task.category` so a future
/// patch that mutates the task's own field cannot change where a restore
/// lands. `seq` is the ticket the expiry timer was issued for: the timer
/// only ever removes the record carrying its own ticket, so an aborted or
/// stale timer can never touch a later deletion that reuses the task id.
struct PendingDeletion {
    task: Task,
    category_name: String,
    seq: u64,
    abort: Option<AbortHandle>,
}

struct StoreData {
    categories: Vec<Category>,
    pending: Vec<PendingDeletion>,
    next_seq: u64,
}

/// Single source of truth for categories, tasks, and in-flight
/// soft-deletions. Cloning is cheap and every clone addresses the same
/// state, so one handle can live in the expiry timers while another serves
/// the presentation layer.
///
/// All state is in memory only and gone when the process exits.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<StoreData>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Mutex::new(StoreData {
                categories: Vec::new(),
                pending: Vec::new(),
                next_seq: 0,
            })),
            events,
        }
    }

    /// Subscribes to change notifications. Receivers that fall behind the
    /// buffer miss events; they never block the store.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Cloned snapshot of all categories with their active tasks, for
    /// rendering. Tasks pending deletion are not visible here.
    pub fn categories(&self) -> Vec<Category> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.categories.clone()
    }

    /// Number of soft-deleted tasks still inside their undo window.
    pub fn pending_count(&self) -> usize {
        let guard = self.inner.lock().expect("state poisoned");
        guard.pending.len()
    }

    /// Appends a new category. Existing categories and their tasks are
    /// untouched. A duplicate name is rejected: the name is the key tasks
    /// reference, so two entries under one name would make every lookup
    /// ambiguous.
    pub fn add_category(&self, category: Category) -> Result<(), StoreError> {
        {
            let mut guard = self.inner.lock().expect("state poisoned");
            if guard.categories.iter().any(|c| c.name == category.name) {
                return Err(StoreError::DuplicateCategory(category.name));
            }
            guard.categories.push(category);
        }
        self.emit(StoreEvent::StateUpdated);
        Ok(())
    }

    /// Appends a task to the category named by `task.category`. An unknown
    /// category is an error rather than a silent drop.
    pub fn add_task(&self, task: Task) -> Result<(), StoreError> {
        {
            let mut guard = self.inner.lock().expect("state poisoned");
            let category = guard
                .categories
                .iter_mut()
                .find(|c| c.name == task.category)
                .ok_or_else(|| StoreError::CategoryNotFound(task.category.clone()))?;
            category.tasks.push(task);
        }
        self.emit(StoreEvent::StateUpdated);
        Ok(())
    }

    /// Flips `completed` on the active task with this id, wherever it
    /// lives. Returns the updated snapshot, or `None` when no active task
    /// matches (callers race against deletion, so this stays a no-op).
    pub fn toggle_task_completion(&self, task_id: &str) -> Option<Task> {
        let toggled = {
            let mut guard = self.inner.lock().expect("state poisoned");
            find_active_mut(&mut guard.categories, task_id).map(|task| {
                task.completed = !task.completed;
                task.clone()
            })
        };
        if toggled.is_some() {
            self.emit(StoreEvent::StateUpdated);
        }
        toggled
    }

    /// Merges the patch into the active task with this id, preserving
    /// `id`, `completed`, and the owning category. Returns the updated
    /// snapshot, or `None` when no active task matches.
    pub fn update_task(&self, task_id: &str, patch: TaskPatch) -> Option<Task> {
        let updated = {
            let mut guard = self.inner.lock().expect("state poisoned");
            find_active_mut(&mut guard.categories, task_id).map(|task| {
                if let Some(title) = patch.title {
                    task.title = title;
                }
                if let Some(description) = patch.description {
                    task.description = Some(description);
                }
                if let Some(due_at) = patch.due_at {
                    task.due_at = due_at;
                }
                if let Some(priority) = patch.priority {
                    task.priority = Some(priority);
                }
                if let Some(subtasks) = patch.subtasks {
                    task.subtasks = subtasks;
                }
                task.clone()
            })
        };
        if updated.is_some() {
            self.emit(StoreEvent::StateUpdated);
        }
        updated
    }

    /// Soft-deletes the active task with this id: it leaves its category
    /// immediately and a one-shot timer makes the removal permanent after
    /// [`UNDO_WINDOW`](crate::UNDO_WINDOW) unless [`restore_task`] runs
    /// first.
    ///
    /// Must be called from within a tokio runtime; the expiry timer is
    /// spawned on it.
    ///
    /// [`restore_task`]: TaskStore::restore_task
    pub fn delete_task(&self, task_id: &str) -> DeleteOutcome {
        let seq = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let Some((task, category_name)) = remove_active(&mut guard.categories, task_id) else {
                return DeleteOutcome::AlreadyGone;
            };
            let seq = guard.next_seq;
            guard.next_seq += 1;
            guard.pending.push(PendingDeletion {
                task,
                category_name,
                seq,
                abort: None,
            });
            seq
        };

        let abort = schedule_expiry(self.clone(), task_id.to_string(), seq);
        {
            let mut guard = self.inner.lock().expect("state poisoned");
            match guard.pending.iter_mut().find(|p| p.seq == seq) {
                Some(entry) => entry.abort = Some(abort),
                // Restored or expired before the handle came back; the
                // timer must not outlive its record.
                None => abort.abort(),
            }
        }

        log::debug!("store: soft-deleted task id={task_id} seq={seq}");
        self.emit(StoreEvent::StateUpdated);
        DeleteOutcome::TemporarilyDeleted
    }

    /// Undoes a pending deletion: cancels the expiry timer and re-appends
    /// the snapshot to the end of the recorded category's task list (the
    /// original position is not kept). Returns `false` when nothing was
    /// pending under this id (already expired, already restored, or never
    /// deleted), so calling it twice is safe.
    pub fn restore_task(&self, task_id: &str) -> bool {
        let entry = {
            let mut guard = self.inner.lock().expect("state poisoned");
            match guard.pending.iter().position(|p| p.task.id == task_id) {
                Some(index) => guard.pending.remove(index),
                None => return false,
            }
        };
        if let Some(abort) = &entry.abort {
            abort.abort();
        }

        let restored = {
            let mut guard = self.inner.lock().expect("state poisoned");
            match guard
                .categories
                .iter_mut()
                .find(|c| c.name == entry.category_name)
            {
                Some(category) => {
                    category.tasks.push(entry.task);
                    true
                }
                None => false,
            }
        };

        if restored {
            log::debug!("store: restored task id={task_id}");
            self.emit(StoreEvent::StateUpdated);
        } else {
            // The category was deleted while the task sat in the undo
            // window; its cascade already ran, so the task stays gone.
            log::warn!(
                "store: dropped restore for id={task_id}, category {} no longer exists",
                entry.category_name
            );
        }
        restored
    }

    /// Removes a category and all of its active tasks permanently, with no
    /// undo window. Tasks of this category already pending deletion keep
    /// their own timers and expire independently.
    pub fn delete_category(&self, category_name: &str) -> bool {
        let removed = {
            let mut guard = self.inner.lock().expect("state poisoned");
            match guard
                .categories
                .iter()
                .position(|c| c.name == category_name)
            {
                Some(index) => Some(guard.categories.remove(index)),
                None => None,
            }
        };
        match removed {
            Some(category) => {
                log::info!(
                    "store: removed category name={category_name} tasks={}",
                    category.tasks.len()
                );
                self.emit(StoreEvent::StateUpdated);
                true
            }
            None => false,
        }
    }

    /// Active tasks whose due date falls on the given local calendar day,
    /// flattened across all categories. Recomputed on every call; no
    /// ordering is imposed, since completed-last / priority-first sorting
    /// is a presentation concern.
    pub fn tasks_due_on(&self, date: NaiveDate) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        let mut due = Vec::new();
        for category in &guard.categories {
            for task in &category.tasks {
                let day = Local
                    .timestamp_opt(task.due_at, 0)
                    .single()
                    .map(|dt| dt.date_naive());
                if day == Some(date) {
                    due.push(task.clone());
                }
            }
        }
        due
    }

    /// [`tasks_due_on`] at the current local date.
    ///
    /// [`tasks_due_on`]: TaskStore::tasks_due_on
    pub fn tasks_due_today(&self) -> Vec<Task> {
        self.tasks_due_on(Local::now().date_naive())
    }

    /// Removes the pending record issued under `seq`, making the deletion
    /// permanent. Called by the expiry timer; a record that was restored
    /// (or belongs to a newer deletion of the same id) carries a different
    /// ticket and is left alone.
    pub(crate) fn expire_pending(&self, task_id: &str, seq: u64) {
        let expired = {
            let mut guard = self.inner.lock().expect("state poisoned");
            match guard.pending.iter().position(|p| p.seq == seq) {
                Some(index) => Some(guard.pending.remove(index)),
                None => None,
            }
        };
        if expired.is_some() {
            log::info!("store: undo window lapsed, task permanently gone id={task_id}");
            self.emit(StoreEvent::TaskExpired {
                task_id: task_id.to_string(),
            });
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine; the store never depends on listeners.
        let _ = self.events.send(event);
    }
}

fn find_active_mut<'a>(categories: &'a mut [Category], task_id: &str) -> Option<&'a mut Task> {
    categories
        .iter_mut()
        .flat_map(|c| c.tasks.iter_mut())
        .find(|t| t.id == task_id)
}

fn remove_active(categories: &mut [Category], task_id: &str) -> Option<(Task, String)> {
    for category in categories.iter_mut() {
        if let Some(index) = category.tasks.iter().position(|t| t.id == task_id) {
            let task = category.tasks.remove(index);
            return Some((task, category.name.clone()));
        }
    }
    None
}
