//! Durable queue of mutations made while offline.
//!
//! The queue holds at most one entry per event: a new operation on an event
//! that already has a pending one is merged into it, so replaying the queue
//! never sends work the server doesn't need (an event created and deleted
//! offline never reaches the server at all).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::store::{Storage, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            OperationKind::Create => "+",
            OperationKind::Update => "~",
            OperationKind::Delete => "-",
        }
    }

    /// Combine a pending operation with a newer one on the same event.
    /// `None` means the two cancel out.
    pub fn merge(pending: OperationKind, next: OperationKind) -> Option<OperationKind> {
        match (pending, next) {
            (OperationKind::Create, OperationKind::Delete) => None,
            (OperationKind::Create, _) => Some(OperationKind::Create),
            (_, OperationKind::Delete) => Some(OperationKind::Delete),
            // A recreate after delete is an update of the server's copy
            (OperationKind::Delete, _) => Some(OperationKind::Update),
            (OperationKind::Update, _) => Some(OperationKind::Update),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One pending mutation captured while offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub event_id: String,
    pub kind: OperationKind,
    /// Event snapshot; absent for deletions
    pub payload: Option<Event>,
    /// Position in the queue; kept when a later operation is merged in
    pub seq: u64,
    pub queued_at: DateTime<Utc>,
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(event) => write!(f, "{} {}", self.kind, event),
            None => write!(f, "{} {}", self.kind, self.event_id),
        }
    }
}

pub struct OperationQueue {
    store: Store<PendingOperation>,
}

impl OperationQueue {
    pub fn new(key: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        OperationQueue {
            store: Store::new(key, storage),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    /// Whether the pending operations can be read right now.
    pub fn is_readable(&self) -> bool {
        self.store.is_readable()
    }

    /// Record an operation, merging with any pending one for the same event.
    pub fn enqueue(&self, kind: OperationKind, event: &Event) {
        let mut items = self.store.get_items();

        let merged = match items.get(&event.id) {
            Some(pending) => OperationKind::merge(pending.kind, kind),
            None => Some(kind),
        };

        match merged {
            Some(kind) => {
                let payload = (kind != OperationKind::Delete).then(|| event.clone());
                let (seq, queued_at) = match items.get(&event.id) {
                    Some(pending) => (pending.seq, pending.queued_at),
                    None => {
                        let next = items.values().map(|p| p.seq + 1).max().unwrap_or(0);
                        (next, Utc::now())
                    }
                };
                items.insert(
                    event.id.clone(),
                    PendingOperation {
                        event_id: event.id.clone(),
                        kind,
                        payload,
                        seq,
                        queued_at,
                    },
                );
            }
            None => {
                items.remove(&event.id);
            }
        }

        tracing::debug!(event_id = %event.id, ?kind, pending = items.len(), "operation queued");
        self.store.set_items(items);
    }

    /// Pending operations, oldest first.
    pub fn pending(&self) -> Vec<PendingOperation> {
        let mut ops: Vec<_> = self.store.get_items().into_values().collect();
        ops.sort_by_key(|op| op.seq);
        ops
    }

    pub fn get(&self, event_id: &str) -> Option<PendingOperation> {
        self.store.get_item(event_id)
    }

    pub fn is_empty(&self) -> bool {
        self.store.get_items().is_empty()
    }

    pub fn len(&self) -> usize {
        self.store.get_items().len()
    }

    /// Drop the entry for one event (e.g. once the server acknowledged it).
    pub fn acknowledge(&self, event_id: &str) {
        self.store.remove_item(event_id);
    }

    /// Keep only the entries whose event id passes `keep`.
    pub fn retain(&self, keep: impl Fn(&str) -> bool) {
        let items = self
            .store
            .get_items()
            .into_iter()
            .filter(|(id, _)| keep(id))
            .collect();
        self.store.set_items(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use crate::testing::make_test_event;

    fn queue() -> OperationQueue {
        OperationQueue::new("trip-queue", Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_merge_rules() {
        use OperationKind::*;
        assert_eq!(OperationKind::merge(Create, Update), Some(Create));
        assert_eq!(OperationKind::merge(Create, Delete), None);
        assert_eq!(OperationKind::merge(Update, Update), Some(Update));
        assert_eq!(OperationKind::merge(Update, Delete), Some(Delete));
        assert_eq!(OperationKind::merge(Delete, Create), Some(Update));
    }

    #[test]
    fn test_create_then_update_keeps_create_with_new_payload() {
        let queue = queue();
        queue.enqueue(OperationKind::Create, &make_test_event("a", 10));
        queue.enqueue(OperationKind::Update, &make_test_event("a", 99));

        let pending = queue.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, OperationKind::Create);
        assert_eq!(pending[0].payload.as_ref().map(|e| e.price), Some(99));
    }

    #[test]
    fn test_create_then_delete_cancels_out() {
        let queue = queue();
        queue.enqueue(OperationKind::Create, &make_test_event("a", 10));
        queue.enqueue(OperationKind::Delete, &make_test_event("a", 10));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_update_then_delete_drops_payload() {
        let queue = queue();
        queue.enqueue(OperationKind::Update, &make_test_event("7", 10));
        queue.enqueue(OperationKind::Delete, &make_test_event("7", 10));

        let op = queue.get("7").unwrap();
        assert_eq!(op.kind, OperationKind::Delete);
        assert!(op.payload.is_none());
    }

    #[test]
    fn test_pending_is_oldest_first_and_merge_keeps_position() {
        let queue = queue();
        queue.enqueue(OperationKind::Update, &make_test_event("z", 1));
        queue.enqueue(OperationKind::Update, &make_test_event("a", 1));
        queue.enqueue(OperationKind::Update, &make_test_event("z", 2));

        let ids: Vec<_> = queue.pending().into_iter().map(|p| p.event_id).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_retain_and_acknowledge() {
        let queue = queue();
        queue.enqueue(OperationKind::Update, &make_test_event("1", 1));
        queue.enqueue(OperationKind::Update, &make_test_event("2", 1));
        queue.enqueue(OperationKind::Delete, &make_test_event("3", 1));

        queue.acknowledge("3");
        queue.retain(|id| id == "2");

        assert_eq!(queue.len(), 1);
        assert!(queue.get("2").is_some());
    }
}
