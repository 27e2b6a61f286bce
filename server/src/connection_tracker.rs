use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use lobby_common::ConnectionId;

/// Caps the number of simultaneously open sockets.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    open: Arc<Mutex<HashSet<ConnectionId>>>,
    max_connections: usize,
}

/// One reserved connection; dropping it frees the slot.
#[derive(Debug)]
pub struct ConnectionSlot {
    id: ConnectionId,
    open: Arc<Mutex<HashSet<ConnectionId>>>,
}

impl ConnectionSlot {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        if let Ok(mut open) = self.open.lock() {
            open.remove(&self.id);
        }
    }
}

impl ConnectionTracker {
    pub fn new(max_connections: usize) -> Self {
        Self {
            open: Arc::new(Mutex::new(HashSet::new())),
            max_connections,
        }
    }

    /// `None` when the limit is reached.
    pub fn try_acquire(&self) -> Option<ConnectionSlot> {
        let mut open = self.open.lock().ok()?;
        if open.len() >= self.max_connections {
            return None;
        }
        let id = ConnectionId::next();
        open.insert(id);
        Some(ConnectionSlot { id, open: self.open.clone() })
    }

    pub fn count(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_enforced() {
        let tracker = ConnectionTracker::new(2);
        let first = tracker.try_acquire();
        let second = tracker.try_acquire();
        let third = tracker.try_acquire();

        assert!(first.is_some());
        assert!(second.is_some());
        assert!(third.is_none());
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn test_dropping_slot_frees_capacity() {
        let tracker = ConnectionTracker::new(1);
        let slot = tracker.try_acquire().unwrap();
        assert!(tracker.try_acquire().is_none());

        drop(slot);

        assert_eq!(tracker.count(), 0);
        assert!(tracker.try_acquire().is_some());
    }

    #[test]
    fn test_slots_have_distinct_ids() {
        let tracker = ConnectionTracker::new(4);
        let a = tracker.try_acquire().unwrap();
        let b = tracker.try_acquire().unwrap();
        assert_ne!(a.id(), b.id());
    }
}
