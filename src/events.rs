use serde::Serialize;

/// Capacity of the broadcast buffer handed to each subscriber. A slow
/// reader misses old events (`RecvError::Lagged`) rather than blocking
/// store mutations.
pub const EVENT_BUFFER: usize = 32;

/// Change notifications broadcast by the store. Permanent expiry of a
/// soft-deleted task is only observable here: `delete_task` resolves at
/// call time and never waits for the undo window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Categories or tasks changed; the presentation layer should re-read
    /// its snapshots.
    StateUpdated,
    /// The undo window for a soft-deleted task lapsed without a restore.
    TaskExpired { task_id: String },
}
