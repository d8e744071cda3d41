//! Configuration for circuit breakers.
//!
//! All parameter validation happens here, at build time. A misconfigured
//! call site fails to construct; it never gets as far as invoking work.

use std::sync::Arc;
use std::time::Duration;

use crate::breaker::CircuitBreaker;
use crate::clock::Clock;
use crate::count::{CountBreaker, OnBreak};
use crate::error::ConfigError;
use crate::predicate::FaultPredicates;
use crate::ratio::RatioBreaker;
use crate::state::BreakerState;

/// Builder for guarded call sites.
///
/// One builder configures either strategy: [`build`](BreakerBuilder::build)
/// produces a count-threshold breaker, [`build_ratio`](BreakerBuilder::build_ratio)
/// a decayed-success-ratio breaker, and
/// [`build_with_state`](BreakerBuilder::build_with_state) accepts a custom
/// [`BreakerState`] implementation.
pub struct BreakerBuilder<E> {
    predicates: FaultPredicates<E>,
    threshold: u32,
    min_success_ratio: f64,
    break_duration: Duration,
    half_life: Duration,
    lock_wait: Duration,
    clock: Clock,
    on_break: Option<OnBreak<E>>,
}

impl<E> Default for BreakerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> BreakerBuilder<E> {
    /// Creates a builder with default settings: threshold 5, minimum success
    /// ratio 80%, 30 second break, 30 second half-life, 5 second lock wait,
    /// no predicates, the monotonic process clock.
    pub fn new() -> Self {
        BreakerBuilder {
            predicates: FaultPredicates::new(),
            threshold: 5,
            min_success_ratio: 80.0,
            break_duration: Duration::from_secs(30),
            half_life: Duration::from_secs(30),
            lock_wait: Duration::from_secs(5),
            clock: Clock::system(),
            on_break: None,
        }
    }

    /// Registers a fault predicate; only matched faults count toward
    /// breaking. Unmatched faults pass through without touching breaker
    /// state.
    pub fn handle<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(predicate);
        self
    }

    /// Treats every fault as handled.
    pub fn handle_all(mut self) -> Self {
        self.predicates.push(|_| true);
        self
    }

    /// Number of handled faults that opens the circuit (count strategy).
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Minimum decayed success percentage, in `[0, 100]`, required for the
    /// circuit to stay closed (ratio strategy).
    pub fn min_success_ratio(mut self, ratio: f64) -> Self {
        self.min_success_ratio = ratio;
        self
    }

    /// How long the circuit stays open after breaking.
    pub fn break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }

    /// Half-life of the decayed counters (ratio strategy).
    pub fn half_life(mut self, half_life: Duration) -> Self {
        self.half_life = half_life;
        self
    }

    /// Bound on waiting for the breaker's internal lock.
    pub fn lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Substitutes the time source; tests inject a
    /// [`ManualClock`](crate::ManualClock) here.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Callback invoked with the triggering fault each time the circuit
    /// opens (count strategy). Runs while the breaker lock is held.
    pub fn on_break<F>(mut self, callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on_break = Some(Arc::new(callback));
        self
    }
}

impl<E> BreakerBuilder<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Builds a count-threshold breaker.
    ///
    /// # Errors
    ///
    /// Rejects `threshold == 0`.
    pub fn build(self) -> Result<CircuitBreaker<CountBreaker<E>, E>, ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::out_of_range(
                "threshold",
                "value must be greater than zero",
            ));
        }

        let state = CountBreaker::new(
            self.threshold,
            self.break_duration,
            self.lock_wait,
            self.clock,
            self.on_break,
        );
        Ok(CircuitBreaker::new(Arc::new(state), self.predicates))
    }

    /// Builds a decayed-success-ratio breaker.
    ///
    /// # Errors
    ///
    /// Rejects a negative (or NaN) `min_success_ratio` and a zero
    /// `half_life`.
    pub fn build_ratio(self) -> Result<CircuitBreaker<RatioBreaker<E>, E>, ConfigError> {
        if !(self.min_success_ratio >= 0.0) {
            return Err(ConfigError::out_of_range(
                "min_success_ratio",
                "value cannot be less than zero",
            ));
        }
        if self.half_life.is_zero() {
            return Err(ConfigError::out_of_range(
                "half_life",
                "value must be greater than zero",
            ));
        }

        let state = RatioBreaker::new(
            self.min_success_ratio,
            self.break_duration,
            self.half_life,
            self.lock_wait,
            self.clock,
        );
        Ok(CircuitBreaker::new(Arc::new(state), self.predicates))
    }

    /// Builds an executor around a custom accounting strategy. The strategy
    /// owns its own configuration, so no validation applies here.
    pub fn build_with_state<S>(self, state: S) -> CircuitBreaker<S, E>
    where
        S: BreakerState<E>,
    {
        CircuitBreaker::new(Arc::new(state), self.predicates)
    }
}
