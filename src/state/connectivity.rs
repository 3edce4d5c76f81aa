use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;
use utoipa::ToSchema;

/// Baseline delay between poll cycles while the device answers.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Slower cadence used after the failure threshold has been reached.
pub const DEFAULT_BACKOFF_INTERVAL: Duration = Duration::from_secs(10);
/// Consecutive failed cycles after which polling slows down.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Link state between this service and the device, as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// The last cycle succeeded.
    Connected,
    /// The last cycle failed.
    Disconnected,
    /// A connection check is running and no outcome is known yet.
    Checking,
}

/// Read-only connectivity snapshot published after every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    /// Current link state.
    pub status: ConnectionStatus,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
    /// Time of the last successful cycle.
    pub last_updated: Option<OffsetDateTime>,
    /// Cadence the scheduler currently polls at.
    pub poll_interval: Duration,
}

/// Phases of the poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Not started yet, or stopped.
    Idle,
    /// A cycle is running, or the last one succeeded.
    Polling,
    /// The last cycle failed; waiting for the next tick.
    BackoffWait,
}

/// Cadence and backoff settings for the poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Cadence while the device answers.
    pub interval: Duration,
    /// Cadence once the failure threshold is reached.
    pub backoff_interval: Duration,
    /// Consecutive failures before switching to the backoff cadence.
    pub failure_threshold: u32,
}

impl PollPolicy {
    /// Replace zero values, which would stall or spin the scheduler, with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let sanitized = Self {
            interval: if self.interval.is_zero() {
                defaults.interval
            } else {
                self.interval
            },
            backoff_interval: if self.backoff_interval.is_zero() {
                defaults.backoff_interval
            } else {
                self.backoff_interval
            },
            failure_threshold: if self.failure_threshold == 0 {
                defaults.failure_threshold
            } else {
                self.failure_threshold
            },
        };
        if sanitized != self {
            warn!(policy = ?self, "poll policy holds zero values; using defaults for them");
        }
        sanitized
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff_interval: DEFAULT_BACKOFF_INTERVAL,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// State machine tracking poll outcomes, failure streaks and the resulting cadence.
///
/// Only the holder of the poll gate mutates it; everyone else sees [`Connectivity`]
/// copies.
#[derive(Debug, Clone)]
pub struct PollTracker {
    policy: PollPolicy,
    phase: PollPhase,
    connectivity: Connectivity,
}

impl PollTracker {
    /// Start a tracker in [`PollPhase::Idle`] with status `Checking`.
    ///
    /// Zero durations or a zero threshold in `policy` are replaced by the defaults.
    pub fn new(policy: PollPolicy) -> Self {
        let policy = policy.sanitized();
        Self {
            policy,
            phase: PollPhase::Idle,
            connectivity: Connectivity {
                status: ConnectionStatus::Checking,
                consecutive_failures: 0,
                last_updated: None,
                poll_interval: policy.interval,
            },
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Connectivity as of the last transition.
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Cadence to use for the next tick.
    pub fn current_interval(&self) -> Duration {
        self.connectivity.poll_interval
    }

    /// Whether the failure streak has pushed the scheduler onto the backoff cadence.
    pub fn in_backoff(&self) -> bool {
        self.connectivity.consecutive_failures >= self.policy.failure_threshold
    }

    /// Enter [`PollPhase::Polling`] at the start of a cycle.
    pub fn begin_cycle(&mut self) {
        self.phase = PollPhase::Polling;
    }

    /// Mark a user-requested connection check as in progress.
    pub fn begin_check(&mut self) {
        self.connectivity.status = ConnectionStatus::Checking;
        self.begin_cycle();
    }

    /// Record a cycle where both fetches succeeded.
    pub fn record_success(&mut self, now: OffsetDateTime) {
        self.phase = PollPhase::Polling;
        self.connectivity.status = ConnectionStatus::Connected;
        self.connectivity.consecutive_failures = 0;
        self.connectivity.last_updated = Some(now);
        self.connectivity.poll_interval = self.policy.interval;
    }

    /// Record a failed cycle, returning `true` when this failure switched to backoff.
    pub fn record_failure(&mut self) -> bool {
        let was_backing_off = self.in_backoff();

        self.phase = PollPhase::BackoffWait;
        self.connectivity.status = ConnectionStatus::Disconnected;
        self.connectivity.consecutive_failures =
            self.connectivity.consecutive_failures.saturating_add(1);

        if self.in_backoff() {
            self.connectivity.poll_interval = self.policy.backoff_interval;
        }

        self.in_backoff() && !was_backing_off
    }

    /// Return to [`PollPhase::Idle`] when the scheduler is torn down.
    pub fn stop(&mut self) {
        self.phase = PollPhase::Idle;
    }
}
