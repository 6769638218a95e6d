//! Relayout scheduling that follows externally driven transitions.
//!
//! When the sidebar toggles, a CSS width transition moves the track edge for
//! a bounded time; the layout is recomputed on a short fixed interval until
//! the transition has certainly finished. Entering the video view mode
//! settles once after a fixed delay instead. Both are bounded series of
//! idempotent recomputations, driven by the host polling with its own clock;
//! nothing here spawns threads or timers.

use std::time::{Duration, Instant};

/// Relayout cadence while a sidebar transition is in flight.
pub const SIDEBAR_RELAYOUT_INTERVAL: Duration = Duration::from_millis(40);

/// Upper bound of the sidebar width transition.
pub const SIDEBAR_TRANSITION_MAX: Duration = Duration::from_millis(280);

/// Settle delay before the one-shot relayout after a view-mode switch.
pub const VIEW_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// A pending series of relayouts (repeating until a deadline) or a single
/// deferred one (one-shot at the deadline).
///
/// Replacing the controller's follower with a new one is the cancellation
/// path: a transition restarted before the previous deadline simply drops
/// the old follower, so concurrent timers cannot pile up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFollower {
    deadline: Instant,
    interval: Option<Duration>,
    next_fire: Instant,
    fired: bool,
}

impl TransitionFollower {
    /// Fire every `interval` from `now` until `now + max`.
    pub fn repeating(now: Instant, interval: Duration, max: Duration) -> Self {
        Self {
            deadline: now + max,
            interval: Some(interval),
            next_fire: now + interval,
            fired: false,
        }
    }

    /// Fire exactly once at `now + delay`.
    pub fn one_shot(now: Instant, delay: Duration) -> Self {
        Self {
            deadline: now + delay,
            interval: None,
            next_fire: now + delay,
            fired: false,
        }
    }

    /// Whether a relayout is due at `now`. Repeating followers re-arm for
    /// the next interval; missed ticks collapse into one, since relayout is
    /// idempotent.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.interval {
            Some(interval) => {
                if now >= self.deadline || now < self.next_fire {
                    return false;
                }
                self.next_fire = now + interval;
                true
            }
            None => {
                if self.fired || now < self.deadline {
                    return false;
                }
                self.fired = true;
                true
            }
        }
    }

    /// Whether the follower has run its course and can be dropped.
    pub fn finished(&self, now: Instant) -> bool {
        match self.interval {
            Some(_) => now >= self.deadline,
            None => self.fired,
        }
    }
}
