//! The function-call contract a presentation shell drives the store
//! through. Input validation that would otherwise be duplicated in every
//! screen lives here; the store itself only enforces structural
//! invariants.

use crate::models::{Category, Task, TaskPatch};
use crate::store::{DeleteOutcome, TaskStore};

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Payload for creating a new, initially empty category.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: String,
}

pub fn create_category(store: &TaskStore, input: NewCategory) -> CommandResult<Category> {
    let name = input.name.trim();
    if name.is_empty() {
        return err("category name is required");
    }
    if input.color.trim().is_empty() {
        return err("category color is required");
    }
    if input.icon.trim().is_empty() {
        return err("category icon is required");
    }
    let category = Category {
        name: name.to_string(),
        color: input.color.trim().to_string(),
        icon: input.icon.trim().to_string(),
        tasks: Vec::new(),
    };
    match store.add_category(category.clone()) {
        Ok(()) => ok(category),
        Err(error) => {
            log::warn!("commands: create_category rejected: {error}");
            err(&error.to_string())
        }
    }
}

pub fn create_task(store: &TaskStore, task: Task) -> CommandResult<Task> {
    if task.id.trim().is_empty() {
        return err("task id is required");
    }
    if task.title.trim().is_empty() {
        return err("task title is required");
    }
    match store.add_task(task.clone()) {
        Ok(()) => ok(task),
        Err(error) => {
            log::warn!("commands: create_task rejected: {error}");
            err(&error.to_string())
        }
    }
}

/// Flips completion on a task. A missing id is reported as `None` rather
/// than an error: the tap may have raced the task's own expiry.
pub fn toggle_task(store: &TaskStore, task_id: &str) -> CommandResult<Option<Task>> {
    ok(store.toggle_task_completion(task_id))
}

pub fn update_task(store: &TaskStore, task_id: &str, patch: TaskPatch) -> CommandResult<Option<Task>> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return err("task title is required");
        }
    }
    ok(store.update_task(task_id, patch))
}

/// Soft-deletes a task. The caller shows the undo affordance exactly when
/// the outcome is [`DeleteOutcome::TemporarilyDeleted`].
pub fn delete_task(store: &TaskStore, task_id: &str) -> CommandResult<DeleteOutcome> {
    ok(store.delete_task(task_id))
}

pub fn restore_task(store: &TaskStore, task_id: &str) -> CommandResult<bool> {
    ok(store.restore_task(task_id))
}

pub fn delete_category(store: &TaskStore, category_name: &str) -> CommandResult<bool> {
    ok(store.delete_category(category_name))
}

pub fn list_categories(store: &TaskStore) -> CommandResult<Vec<Category>> {
    ok(store.categories())
}

pub fn tasks_due_today(store: &TaskStore) -> CommandResult<Vec<Task>> {
    ok(store.tasks_due_today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn make_input(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            color: "#FF9500".to_string(),
            icon: "briefcase".to_string(),
        }
    }

    fn make_task(id: &str, category: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            description: None,
            due_at: 1_700_000_000,
            completed: false,
            category: category.to_string(),
            priority: None,
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn ok_and_err_helpers_construct_expected_shape() {
        let r = ok(123);
        assert!(r.ok);
        assert_eq!(r.data, Some(123));
        assert_eq!(r.error, None);

        let r: CommandResult<i32> = err("nope");
        assert!(!r.ok);
        assert_eq!(r.data, None);
        assert_eq!(r.error, Some("nope".to_string()));
    }

    #[test]
    fn create_category_validates_fields_and_trims_whitespace() {
        let store = TaskStore::new();

        let res = create_category(&store, make_input("   "));
        assert!(!res.ok);
        assert_eq!(res.error, Some("category name is required".to_string()));

        let mut no_color = make_input("Work");
        no_color.color = "  ".to_string();
        assert!(!create_category(&store, no_color).ok);

        let mut no_icon = make_input("Work");
        no_icon.icon = String::new();
        assert!(!create_category(&store, no_icon).ok);

        let res = create_category(&store, make_input("  Work "));
        assert!(res.ok);
        assert_eq!(res.data.unwrap().name, "Work");

        // Same trimmed name again collides in the store.
        let res = create_category(&store, make_input("Work"));
        assert!(!res.ok);
        assert_eq!(res.error, Some("duplicate category: Work".to_string()));
    }

    #[test]
    fn create_task_validates_and_reports_unknown_categories() {
        let store = TaskStore::new();
        create_category(&store, make_input("Work"));

        let mut blank_title = make_task("1", "Work");
        blank_title.title = " ".to_string();
        let res = create_task(&store, blank_title);
        assert_eq!(res.error, Some("task title is required".to_string()));

        let mut blank_id = make_task(" ", "Work");
        blank_id.title = "fine".to_string();
        assert!(!create_task(&store, blank_id).ok);

        let res = create_task(&store, make_task("1", "Nonexistent"));
        assert!(!res.ok);
        assert_eq!(
            res.error,
            Some("category not found: Nonexistent".to_string())
        );
        // The dropped task must not have landed anywhere.
        let categories = list_categories(&store).data.unwrap();
        assert!(categories.iter().all(|c| c.tasks.is_empty()));

        let res = create_task(&store, make_task("1", "Work"));
        assert!(res.ok);
        assert_eq!(res.data.unwrap().id, "1");
    }

    #[test]
    fn toggle_and_update_report_missing_tasks_as_none() {
        let store = TaskStore::new();
        create_category(&store, make_input("Work"));
        create_task(&store, make_task("1", "Work"));

        let res = toggle_task(&store, "1");
        assert!(res.ok);
        assert!(res.data.unwrap().unwrap().completed);

        let res = toggle_task(&store, "missing");
        assert!(res.ok);
        assert_eq!(res.data, Some(None));

        let patch = TaskPatch {
            priority: Some(Priority::Medium),
            ..TaskPatch::default()
        };
        let res = update_task(&store, "1", patch);
        assert_eq!(res.data.unwrap().unwrap().priority, Some(Priority::Medium));

        let res = update_task(&store, "missing", TaskPatch::default());
        assert_eq!(res.data, Some(None));

        // Patching the title to blank is rejected before it reaches the store.
        let blank = TaskPatch {
            title: Some("  ".to_string()),
            ..TaskPatch::default()
        };
        let res = update_task(&store, "1", blank);
        assert!(!res.ok);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_restore_and_category_commands_round_the_store() {
        let store = TaskStore::new();
        create_category(&store, make_input("Work"));
        create_task(&store, make_task("1", "Work"));

        let res = delete_task(&store, "1");
        assert_eq!(res.data, Some(DeleteOutcome::TemporarilyDeleted));
        let res = delete_task(&store, "1");
        assert_eq!(res.data, Some(DeleteOutcome::AlreadyGone));

        assert_eq!(restore_task(&store, "1").data, Some(true));
        assert_eq!(restore_task(&store, "1").data, Some(false));

        assert_eq!(delete_category(&store, "Work").data, Some(true));
        assert_eq!(delete_category(&store, "Work").data, Some(false));
        assert!(list_categories(&store).data.unwrap().is_empty());
    }

    #[test]
    fn tasks_due_today_reflects_the_current_local_day() {
        let store = TaskStore::new();
        create_category(&store, make_input("Work"));
        let mut task = make_task("1", "Work");
        task.due_at = chrono::Local::now().timestamp();
        create_task(&store, task);
        let mut next_week = make_task("2", "Work");
        next_week.due_at = chrono::Local::now().timestamp() + 7 * 24 * 3600;
        create_task(&store, next_week);

        let due = tasks_due_today(&store).data.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "1");
    }

    #[test]
    fn command_result_serializes_for_a_host_shell() {
        let res = ok("fine");
        let value = serde_json::to_value(&res).expect("serialize result");
        assert_eq!(
            value,
            serde_json::json!({ "ok": true, "data": "fine", "error": null })
        );
    }
}
