//! Fixed-interval tick scheduling that never runs two ticks back to back.

use std::time::{Duration, Instant};

use tracing::debug;

/// Decision returned by [`FixedTick::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickDecision {
    /// One tick should run now.
    Due {
        /// Whole intervals that elapsed unserved and were dropped.
        missed: u64,
    },
    /// The next tick is due after the provided delay.
    Wait(Duration),
    /// The scheduler was stopped and will never fire again.
    Stopped,
}

/// Fixed-delay repeating timer driven by caller-supplied instants.
#[derive(Clone, Copy, Debug)]
pub struct FixedTick {
    interval: Duration,
    next_deadline: Option<Instant>,
    stopped: bool,
}

impl FixedTick {
    /// Creates a scheduler whose first poll is immediately due.
    ///
    /// The interval must be non-zero; [`polarity_arena_core::ArenaConfig`]
    /// guarantees this for configured sessions.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
            stopped: false,
        }
    }

    /// Whether [`FixedTick::stop`] has been called.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stops the scheduler. Every later poll returns [`TickDecision::Stopped`].
    pub fn stop(&mut self) {
        self.stopped = true;
        self.next_deadline = None;
    }

    /// Reports whether a tick is due at `now`.
    ///
    /// At most one tick is granted per call. When the caller fell behind by
    /// several intervals the backlog is dropped and the next deadline is
    /// realigned to the original cadence.
    pub fn poll(&mut self, now: Instant) -> TickDecision {
        if self.stopped {
            return TickDecision::Stopped;
        }

        let Some(deadline) = self.next_deadline else {
            self.next_deadline = Some(now + self.interval);
            return TickDecision::Due { missed: 0 };
        };

        if now < deadline {
            return TickDecision::Wait(deadline - now);
        }

        let interval_ns = self.interval.as_nanos().max(1);
        let late_ns = (now - deadline).as_nanos();
        let missed = u64::try_from(late_ns / interval_ns).unwrap_or(u64::MAX);
        let into_interval = u64::try_from(late_ns % interval_ns)
            .map(Duration::from_nanos)
            .unwrap_or(Duration::ZERO);
        self.next_deadline = Some(now + self.interval.saturating_sub(into_interval));

        if missed > 0 {
            debug!(missed, "dropping overdue ticks");
        }

        TickDecision::Due { missed }
    }
}
