use serde::{Deserialize, Serialize};

pub type Timestamp = i64;

/// Task urgency. A task without a priority sorts below all of these, so
/// there is no explicit "lowest" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Highest,
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Subtask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// A single unit of work. `category` names the owning [`Category`]; the
/// store enforces that it exists when the task is added. Completing all
/// subtasks does not complete the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_at: Timestamp,
    #[serde(default)]
    pub completed: bool,
    pub category: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// A named task list. `name` doubles as the identity that tasks point at,
/// so it must be unique across the store. `color` and `icon` are opaque
/// display tokens the presentation layer interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Partial update applied to an existing task. `None` leaves the field
/// untouched. The task's `id`, `completed` flag, and owning category are
/// never changed through a patch; moving a task between categories is
/// delete + re-add.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<Timestamp>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub subtasks: Option<Vec<Subtask>>,
}
