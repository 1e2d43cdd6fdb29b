//! Shared highlight state for views rendering the same filtered dataset.
//!
//! The chart and the table each hold a subscription to one `SelectionSync`;
//! whichever view handles a click calls `select`, and every other view
//! observes the new state through its receiver. Ephemeral, scoped to a single
//! viewing session, never persisted.

use std::sync::Arc;

use tokio::sync::watch;

use crate::database::entities::measurements;

#[derive(Clone)]
pub struct SelectionSync {
    tx: Arc<watch::Sender<Option<i32>>>,
}

impl SelectionSync {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Click-to-toggle: selecting the already-highlighted id clears the
    /// highlight; selecting a different id replaces it. Returns the state
    /// after the transition.
    pub fn select(&self, id: i32) -> Option<i32> {
        let mut next = None;
        self.tx.send_modify(|state| {
            *state = if *state == Some(id) { None } else { Some(id) };
            next = *state;
        });
        next
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<i32> {
        *self.tx.borrow()
    }

    /// New observers see the current state immediately and every transition
    /// afterwards.
    pub fn subscribe(&self) -> watch::Receiver<Option<i32>> {
        self.tx.subscribe()
    }

    /// Position of the highlighted measurement within the currently filtered
    /// rows, for scroll-to-entry behavior. None when nothing is highlighted
    /// or the highlighted id fell out of the filter.
    pub fn visible_highlight(&self, rows: &[measurements::Model]) -> Option<usize> {
        let id = self.current()?;
        rows.iter().position(|m| m.id == id)
    }
}

impl Default for SelectionSync {
    fn default() -> Self {
        Self::new()
    }
}
