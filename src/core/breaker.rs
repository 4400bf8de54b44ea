//! Consecutive-failure circuit breaker.
//!
//! ```text
//! Closed ──[failure_threshold consecutive failures]──> Open
//! Open ──[cooldown elapsed]──> HalfOpen (trial window, trials = 0)
//! HalfOpen ──[half_open_max_retries failed trials]──> Open (new cooldown)
//! any ──[success]──> Closed { failures: 0 }
//! ```
//!
//! Transitions are pure functions of the current state, `now` and the config, so the state
//! machine can be exercised without a clock or a network. [`CircuitBreaker`] only adds the
//! lock and the clock read.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Tuning for [`CircuitBreaker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays open before trial calls are let through.
    pub cooldown: Duration,
    /// Failed trials tolerated in a half-open window before re-opening.
    pub half_open_max_retries: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
            half_open_max_retries: 2,
        }
    }
}

/// Logical breaker state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass; `failures` consecutive failures so far.
    Closed { failures: u32 },
    /// Calls fail fast until `until`.
    Open { failures: u32, until: Instant },
    /// Cooldown elapsed; calls pass as trials and `trials` of them have failed.
    HalfOpen { failures: u32, trials: u32 },
}

impl Default for BreakerState {
    fn default() -> Self {
        Self::Closed { failures: 0 }
    }
}

impl BreakerState {
    /// Consecutive failures since the last success.
    pub fn failures(&self) -> u32 {
        match *self {
            Self::Closed { failures }
            | Self::Open { failures, .. }
            | Self::HalfOpen { failures, .. } => failures,
        }
    }

    /// Resolve time-dependent state: an `Open` whose cooldown has passed is a fresh trial window.
    pub fn at(self, now: Instant) -> Self {
        match self {
            Self::Open { failures, until } if now >= until => Self::HalfOpen {
                failures,
                trials: 0,
            },
            other => other,
        }
    }

    /// Gate a call. Returns the next state and whether the call is blocked.
    pub fn check(self, now: Instant) -> (Self, bool) {
        let next = self.at(now);
        (next, matches!(next, Self::Open { .. }))
    }

    /// Any success fully closes the breaker.
    pub fn on_success(self) -> Self {
        Self::Closed { failures: 0 }
    }

    /// Count a failure: opens at the threshold, or re-opens after too many failed trials.
    pub fn on_failure(self, now: Instant, config: &BreakerConfig) -> Self {
        match self.at(now) {
            Self::Closed { failures } => {
                let failures = failures.saturating_add(1);
                if failures >= config.failure_threshold {
                    Self::Open {
                        failures,
                        until: now + config.cooldown,
                    }
                } else {
                    Self::Closed { failures }
                }
            }
            // A call admitted before the breaker opened; the cooldown is left as is.
            Self::Open { failures, until } => Self::Open {
                failures: failures.saturating_add(1),
                until,
            },
            Self::HalfOpen { failures, trials } => {
                let failures = failures.saturating_add(1);
                let trials = trials.saturating_add(1);
                if trials >= config.half_open_max_retries {
                    Self::Open {
                        failures,
                        until: now + config.cooldown,
                    }
                } else {
                    Self::HalfOpen { failures, trials }
                }
            }
        }
    }
}

/// Thread-safe breaker shared by every fetch against one upstream.
///
/// The lock is never held across an `.await`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// A closed breaker with the given tuning.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// The tuning this breaker was built with.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Snapshot of the current state, resolved against the clock.
    pub fn state(&self) -> BreakerState {
        self.lock().at(Instant::now())
    }

    /// `true` if the call must fail fast. May move an expired `Open` into `HalfOpen`.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();
        let (next, blocked) = state.check(Instant::now());
        #[cfg(feature = "tracing")]
        if matches!(*state, BreakerState::Open { .. })
            && matches!(next, BreakerState::HalfOpen { .. })
        {
            tracing::info!(failures = next.failures(), "circuit half-open; allowing trial calls");
        }
        *state = next;
        blocked
    }

    /// Report a healthy answer; closes the breaker.
    pub fn record_success(&self) {
        let mut state = self.lock();
        #[cfg(feature = "tracing")]
        if !matches!(*state, BreakerState::Closed { .. }) {
            tracing::info!("circuit closed");
        }
        *state = state.on_success();
    }

    /// Report a failed call.
    pub fn record_failure(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        let next = state.on_failure(now, &self.config);
        #[cfg(feature = "tracing")]
        if let BreakerState::Open { failures, until } = next
            && !matches!(state.at(now), BreakerState::Open { .. })
        {
            tracing::warn!(
                failures,
                cooldown_ms = until.saturating_duration_since(now).as_millis() as u64,
                "circuit opened"
            );
        }
        *state = next;
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
