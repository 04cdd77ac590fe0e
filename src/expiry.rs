use std::time::Duration;

use tokio::task::AbortHandle;

use crate::store::TaskStore;

/// How long a soft-deleted task stays recoverable.
pub const UNDO_WINDOW: Duration = Duration::from_millis(5000);

/// Spawns the one-shot permanent-deletion timer for a soft-deleted task and
/// returns the handle that cancels it. The `seq` ticket scopes the removal
/// to the exact pending record this timer was issued for, so even a timer
/// that slips past an abort cannot touch a later deletion of the same id.
pub(crate) fn schedule_expiry(store: TaskStore, task_id: String, seq: u64) -> AbortHandle {
    let handle = tokio::spawn(async move {
        tokio::time::sleep(UNDO_WINDOW).await;
        log::debug!("expiry: timer fired id={task_id} seq={seq}");
        store.expire_pending(&task_id, seq);
    });
    handle.abort_handle()
}
