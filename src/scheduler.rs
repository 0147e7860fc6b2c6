//! Decides when the aggregator may run.
//!
//! The scheduler is a plain state machine driven by the event loop. It never
//! spawns anything itself: `tick` and `request_manual` hand back a
//! [`RefreshTicket`] and the caller starts the fetch, then reports back via
//! [`RefreshScheduler::complete`]. All instants are passed in so tests can
//! drive it with a paused tokio clock.

use std::time::Duration;
use tokio::time::Instant;

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No fetch has run yet; the next tick starts one.
    Idle,
    /// A fetch is in flight. Further triggers are ignored.
    Fetching,
    /// A fetch finished or the user interacted recently. Automatic fetches
    /// wait until `poll_interval` has passed since the last activity.
    Cooldown,
}

/// Permission to run one fetch.
///
/// The generation ties a completion back to the fetch that produced it, so a
/// result arriving for an older fetch can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
}

/// How a fetch ended, as far as scheduling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    state: RefreshState,
    /// Zero disables automatic refresh after the initial load.
    poll_interval: Duration,
    last_activity: Option<Instant>,
    generation: u64,
}

impl RefreshScheduler {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: RefreshState::Idle,
            poll_interval,
            last_activity: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Generation of the most recently issued ticket (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_fetching(&self) -> bool {
        self.state == RefreshState::Fetching
    }

    /// Records user activity, pushing the next automatic refresh back.
    ///
    /// Has no effect on the state itself: activity during a fetch doesn't
    /// cancel it, and activity before the first load doesn't delay it.
    pub fn note_activity(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    /// Housekeeping check, called on every tick of the event loop.
    pub fn tick(&mut self, now: Instant) -> Option<RefreshTicket> {
        match self.state {
            RefreshState::Fetching => None,
            RefreshState::Idle => Some(self.begin()),
            RefreshState::Cooldown => {
                if self.cooldown_elapsed(now) {
                    Some(self.begin())
                } else {
                    None
                }
            }
        }
    }

    /// User asked for a refresh. Ignored while a fetch is in flight.
    pub fn request_manual(&mut self, now: Instant) -> Option<RefreshTicket> {
        if self.is_fetching() {
            tracing::debug!("Refresh already in progress, ignoring manual request");
            return None;
        }
        self.last_activity = Some(now);
        Some(self.begin())
    }

    /// Reports that the fetch for `ticket` finished.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale or no
    /// fetch is in flight; the caller should then discard the result.
    pub fn complete(
        &mut self,
        ticket: RefreshTicket,
        now: Instant,
        outcome: RefreshOutcome,
    ) -> bool {
        if !self.is_fetching() || ticket.generation != self.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Ignoring stale refresh completion"
            );
            return false;
        }

        if outcome == RefreshOutcome::Failed {
            tracing::debug!(generation = ticket.generation, "Refresh failed, cooling down");
        }
        self.state = RefreshState::Cooldown;
        self.last_activity = Some(now);
        true
    }

    /// Time left before the next automatic refresh.
    ///
    /// `Some(Duration::ZERO)` means a refresh is due or running; `None` means
    /// no automatic refresh will happen (poll interval of zero).
    pub fn time_until_refresh(&self, now: Instant) -> Option<Duration> {
        match self.state {
            RefreshState::Idle | RefreshState::Fetching => Some(Duration::ZERO),
            RefreshState::Cooldown => {
                if self.poll_interval.is_zero() {
                    return None;
                }
                let since = self
                    .last_activity
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(self.poll_interval);
                Some(self.poll_interval.saturating_sub(since))
            }
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        if self.poll_interval.is_zero() {
            return false;
        }
        match self.last_activity {
            Some(at) => now.saturating_duration_since(at) >= self.poll_interval,
            None => true,
        }
    }

    fn begin(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.state = RefreshState::Fetching;
        tracing::debug!(generation = self.generation, "Refresh started");
        RefreshTicket {
            generation: self.generation,
        }
    }
}
