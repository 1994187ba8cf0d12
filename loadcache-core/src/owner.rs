//! Redraw hints for callers waiting on a resource.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Notify, mpsc};

/// Something that wants to redraw once a resource it asked for settles.
///
/// `notify_dirty` is a scheduling hint: it is called once per completed
/// pending request and must be cheap and idempotent.
pub trait Owner: Send + Sync {
    /// Called once per queued request after its callback ran.
    fn notify_dirty(&self);
}

/// Owner that just records that it was dirtied.
#[derive(Debug, Default)]
pub struct DirtyFlag {
    dirty: AtomicBool,
    notifications: AtomicU64,
}

impl DirtyFlag {
    /// Clean flag with no notifications.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a notification arrived since the last [`take`](Self::take).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Total number of `notify_dirty` calls seen.
    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }
}

impl Owner for DirtyFlag {
    fn notify_dirty(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
    }
}

/// Wakes one task parked on `notified()`; repeated notifications coalesce
/// into a single stored permit.
impl Owner for Notify {
    fn notify_dirty(&self) {
        self.notify_one();
    }
}

/// Wake-up signal for a redraw loop draining an unbounded channel.
impl Owner for mpsc::UnboundedSender<()> {
    fn notify_dirty(&self) {
        match self.send(()) {
            Ok(_) => tracing::trace!("Sent redraw wake-up signal"),
            Err(e) => {
                tracing::debug!("Redraw receiver gone, dropping signal: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_flag_take_resets() {
        let flag = DirtyFlag::new();
        assert!(!flag.is_dirty());
        flag.notify_dirty();
        flag.notify_dirty();
        assert!(flag.take());
        assert!(!flag.take());
        assert_eq!(flag.notifications(), 2);
    }

    #[tokio::test]
    async fn channel_owner_sends_wake_up() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.notify_dirty();
        assert_eq!(rx.recv().await, Some(()));

        drop(rx);
        // A closed receiver is not an error for the owner.
        tx.notify_dirty();
    }
}
