//! Per-key population slots.
//!
//! Callers missing on the same key share one `OnceCell`. The first caller to
//! reach `get_or_try_init` populates it; the rest wait on the same cell and
//! read its value. If the populating caller fails or is cancelled, the cell
//! stays empty and the next waiter takes over.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<String>>;

#[derive(Debug, Default)]
pub(crate) struct FlightGroup {
    slots: Mutex<HashMap<String, Slot>>,
}

impl FlightGroup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Joins the in-flight population for `key`, opening one if none exists.
    pub(crate) fn join(&self, key: &str) -> Flight<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        Flight {
            group: self,
            key: key.to_string(),
            slot,
        }
    }

    /// Number of keys with a population slot still registered.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Membership in one key's population. Leaving happens on drop.
pub(crate) struct Flight<'a> {
    group: &'a FlightGroup,
    key: String,
    slot: Slot,
}

impl Flight<'_> {
    pub(crate) fn cell(&self) -> &OnceCell<String> {
        &self.slot
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut slots = self.group.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = slots.get(&self.key) else {
            return;
        };
        if !Arc::ptr_eq(current, &self.slot) {
            return;
        }
        // An empty slot with other members waiting must survive so one of
        // them can retry; otherwise the next miss opens a fresh slot.
        if self.slot.initialized() || Arc::strong_count(&self.slot) <= 2 {
            slots.remove(&self.key);
        }
    }
}
