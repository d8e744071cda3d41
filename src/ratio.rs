//! Decayed-success-ratio breaker strategy.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::clock::{Clock, Timestamp};
use crate::error::InternalError;
use crate::state::BreakerState;

/// Counters at or below this mass are treated as exactly zero under decay,
/// avoiding division noise from vanishingly small remainders.
const EPSILON: f64 = 1e-5;

/// Opens when the exponentially decayed success ratio of recent calls drops
/// below a configured minimum percentage.
///
/// Both counters decay toward zero with a shared, caller-configurable
/// half-life, and both are decayed and re-timestamped on every touch —
/// success and fault alike — so the pair always shares one reference
/// instant. The decay is computed lazily at read/write time; there is no
/// background sweep. This approximates a sliding window of recent call
/// health in O(1) memory.
pub struct RatioBreaker<E> {
    shared: Mutex<Shared<E>>,
    min_success_ratio: f64,
    decay_factor: f64,
    break_duration: Duration,
    lock_wait: Duration,
    clock: Clock,
}

struct Shared<E> {
    success_count: f64,
    fail_count: f64,
    last_success_update: Timestamp,
    last_fail_update: Timestamp,
    blocked_until: Timestamp,
    last_fault: Option<Arc<E>>,
}

impl<E> RatioBreaker<E> {
    pub(crate) fn new(
        min_success_ratio: f64,
        break_duration: Duration,
        half_life: Duration,
        lock_wait: Duration,
        clock: Clock,
    ) -> Self {
        // Computed once; counter(t) = counter(t0) * exp(decay_factor * dt)
        // halves every half-life.
        let decay_factor = 0.5_f64.ln() / half_life.as_secs_f64();

        RatioBreaker {
            shared: Mutex::new(Shared {
                success_count: 0.0,
                fail_count: 0.0,
                last_success_update: Timestamp::NEVER,
                last_fail_update: Timestamp::NEVER,
                blocked_until: Timestamp::NEVER,
                last_fault: None,
            }),
            min_success_ratio,
            decay_factor,
            break_duration,
            lock_wait,
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared<E>>, InternalError> {
        self.shared
            .try_lock_for(self.lock_wait)
            .ok_or(InternalError::LockTimeout)
    }

    fn decayed(&self, counter: f64, last_update: Timestamp, now: Timestamp) -> f64 {
        if counter > EPSILON {
            counter * (self.decay_factor * now.seconds_since(last_update)).exp()
        } else {
            0.0
        }
    }
}

impl<E> BreakerState<E> for RatioBreaker<E>
where
    E: Send + Sync + 'static,
{
    fn is_broken(&self) -> Result<bool, InternalError> {
        let shared = self.lock()?;
        Ok(self.clock.now() < shared.blocked_until)
    }

    fn last_fault(&self) -> Result<Option<Arc<E>>, InternalError> {
        Ok(self.lock()?.last_fault.clone())
    }

    fn reset(&self) -> Result<(), InternalError> {
        let mut shared = self.lock()?;
        let now = self.clock.now();
        shared.success_count = 0.0;
        shared.fail_count = 0.0;
        shared.last_success_update = now;
        shared.last_fail_update = now;
        shared.blocked_until = Timestamp::NEVER;
        shared.last_fault = None;
        Ok(())
    }

    fn record_success(&self) -> Result<(), InternalError> {
        let mut shared = self.lock()?;
        let now = self.clock.now();

        shared.success_count =
            self.decayed(shared.success_count, shared.last_success_update, now) + 1.0;
        shared.last_success_update = now;
        shared.fail_count = self.decayed(shared.fail_count, shared.last_fail_update, now);
        shared.last_fail_update = now;

        // A success closes the circuit; after a cooldown this is the
        // half-open trial call succeeding.
        if shared.blocked_until != Timestamp::NEVER {
            tracing::debug!("circuit closed after successful call");
        }
        shared.blocked_until = Timestamp::NEVER;
        shared.last_fault = None;
        Ok(())
    }

    fn record_fault(&self, fault: Arc<E>) -> Result<(), InternalError> {
        let mut shared = self.lock()?;
        let now = self.clock.now();
        shared.last_fault = Some(fault);

        shared.fail_count = self.decayed(shared.fail_count, shared.last_fail_update, now) + 1.0;
        shared.last_fail_update = now;
        shared.success_count = self.decayed(shared.success_count, shared.last_success_update, now);
        shared.last_success_update = now;

        let ratio = shared.success_count / (shared.success_count + shared.fail_count) * 100.0;
        if ratio < self.min_success_ratio {
            shared.blocked_until = now.saturating_add(self.break_duration);
            shared.success_count = 0.0;
            shared.fail_count = 0.0;
            shared.last_success_update = now;
            shared.last_fail_update = now;
            tracing::warn!(
                success_ratio = ratio,
                min_success_ratio = self.min_success_ratio,
                "circuit opened"
            );
        }

        Ok(())
    }
}
