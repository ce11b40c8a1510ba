use std::time::{Duration, Instant};

/// Token for one pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// The result of one clock tick: the frame timestamp and which requests fired
#[derive(Debug, Clone, Default)]
pub struct FrameTick {
    pub now: Duration,
    fired: Vec<FrameHandle>,
}

impl FrameTick {
    /// Whether `handle` was pending when this tick fired
    pub fn fired(&self, handle: Option<FrameHandle>) -> bool {
        handle.is_some_and(|h| self.fired.contains(&h))
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }
}

/// Frame-synchronised scheduler with one-shot, cancellable requests.
///
/// A component calls [`FrameClock::request`] to be called on the next
/// frame and keeps the returned handle; on teardown it calls
/// [`FrameClock::cancel`]. Each [`FrameClock::tick`] fires and clears
/// every pending request, so an animation re-requests from inside its
/// frame callback for as long as it wants to keep running.
pub struct FrameClock {
    origin: Instant,
    next_id: u64,
    pending: Vec<FrameHandle>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            next_id: 0,
            pending: Vec::new(),
            frames: 0,
        }
    }

    /// Time since the clock was created
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    /// Cancel a pending request; returns false if it had already fired
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        self.pending.len() != before
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of ticks so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fire everything pending at the current wall-clock time
    pub fn tick(&mut self) -> FrameTick {
        let now = self.now();
        self.tick_at(now)
    }

    /// Fire everything pending at an explicit timestamp (headless runs, tests)
    pub fn tick_at(&mut self, now: Duration) -> FrameTick {
        self.frames += 1;
        FrameTick {
            now,
            fired: std::mem::take(&mut self.pending),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fires_once() {
        let mut clock = FrameClock::new();
        let h = clock.request();
        assert!(clock.is_pending(h));

        let tick = clock.tick_at(Duration::from_millis(16));
        assert!(tick.fired(Some(h)));
        assert_eq!(tick.now, Duration::from_millis(16));
        assert!(!clock.is_pending(h));

        let tick = clock.tick_at(Duration::from_millis(32));
        assert!(!tick.fired(Some(h)));
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut clock = FrameClock::new();
        let a = clock.request();
        let b = clock.request();
        assert!(clock.cancel(a));
        assert!(!clock.cancel(a));

        let tick = clock.tick_at(Duration::ZERO);
        assert!(!tick.fired(Some(a)));
        assert!(tick.fired(Some(b)));
        assert_eq!(tick.fired_count(), 1);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut clock = FrameClock::new();
        let a = clock.request();
        clock.tick_at(Duration::ZERO);
        let b = clock.request();
        assert_ne!(a, b);
        assert!(!FrameTick::default().fired(None));
    }
}
