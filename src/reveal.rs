use std::time::Duration;

/// Cubic ease-out: fast start, gentle landing
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Where a run-once reveal animation is in its life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealState {
    /// Not yet triggered; draws at progress 0
    Waiting,
    /// Running since `start` on the frame clock
    Running { start: Duration },
    /// Finished; every later draw is at progress 1
    Done,
}

/// Run-once, fixed-duration reveal driven by the frame clock.
///
/// Triggered the first time the element's visible fraction reaches the
/// threshold. Progress is linear time clamped to `[0, 1]`; callers apply
/// the easing through [`Reveal::eased`].
#[derive(Debug, Clone)]
pub struct Reveal {
    pub duration: Duration,
    pub threshold: f32,
    state: RevealState,
}

impl Reveal {
    pub fn new(duration: Duration, threshold: f32) -> Self {
        Self {
            duration,
            threshold,
            state: RevealState::Waiting,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// The animation has been started at least once
    pub fn has_animated(&self) -> bool {
        !matches!(self.state, RevealState::Waiting)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RevealState::Running { .. })
    }

    /// Feed a visibility notification. Returns true only on the call that
    /// starts the animation.
    pub fn observe(&mut self, visible_fraction: f32, now: Duration) -> bool {
        if self.has_animated() || visible_fraction < self.threshold {
            return false;
        }
        self.state = RevealState::Running { start: now };
        true
    }

    /// Linear progress at `now`, clamped to `[0, 1]`
    pub fn progress(&self, now: Duration) -> f32 {
        match self.state {
            RevealState::Waiting => 0.0,
            RevealState::Done => 1.0,
            RevealState::Running { start } => {
                if self.duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_sub(start);
                (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    /// Eased progress at `now`
    pub fn eased(&self, now: Duration) -> f32 {
        ease_out_cubic(self.progress(now))
    }

    /// Advance to `Done` once the duration has elapsed; returns true while
    /// more frames are needed
    pub fn advance(&mut self, now: Duration) -> bool {
        if let RevealState::Running { .. } = self.state {
            if self.progress(now) >= 1.0 {
                self.state = RevealState::Done;
                return false;
            }
            return true;
        }
        false
    }
}
