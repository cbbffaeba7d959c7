//! Per-frame tick scheduling.
//!
//! The playback engine never sleeps or spawns; it asks a [`Scheduler`] for
//! a tick and the host delivers that tick back once the next frame comes
//! around. Cancelling a handle guarantees the host will not deliver it.

use std::collections::VecDeque;

/// Opaque handle for one requested tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host capability for "run again before the next frame"
pub trait Scheduler {
    /// Request a tick on the next frame
    fn request_tick(&mut self) -> TickHandle;

    /// Withdraw a previously requested tick
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Queue of requested ticks, drained by the host once per frame
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: VecDeque<TickHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every tick due this frame
    pub fn take_due(&mut self) -> Vec<TickHandle> {
        self.pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Scheduler for FrameScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.pending.retain(|h| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_take() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request_tick();
        let b = scheduler.request_tick();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(scheduler.take_due(), vec![a, b]);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_cancel_removes_handle() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request_tick();
        scheduler.cancel_tick(a);
        assert!(scheduler.take_due().is_empty());

        // Cancelling twice is harmless
        scheduler.cancel_tick(a);
    }
}
