use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Depth-1 hand-off from the control loop to the inference worker.
///
/// `offer` returns `false` (dropping the new item) while the previous one
/// is still unconsumed. Freshness over completeness: a stale frame is never
/// queued behind a slow inference call.
pub struct FrameSlot<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Non-blocking put. `false` means the slot was full and the item was
    /// discarded.
    pub fn offer(&self, item: T) -> bool {
        let mut guard = lock(&self.slot);
        if guard.is_some() {
            return false;
        }
        *guard = Some(item);
        true
    }

    /// Non-blocking get.
    pub fn take(&self) -> Option<T> {
        lock(&self.slot).take()
    }
}

impl<T> Clone for FrameSlot<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-1 worker-to-loop result cell. Writes overwrite, reads consume.
/// The loop never blocks here: an empty cell just means "no new sample this
/// tick" and the last smoothed status keeps ruling.
pub struct LatestCell<T> {
    cell: Arc<Mutex<Option<T>>>,
}

impl<T> LatestCell<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Mutex::new(None)),
        }
    }

    pub fn publish(&self, item: T) {
        *lock(&self.cell) = Some(item);
    }

    pub fn take(&self) -> Option<T> {
        lock(&self.cell).take()
    }
}

impl<T> Clone for LatestCell<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Default for LatestCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
