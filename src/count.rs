//! Count-threshold breaker strategy.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::clock::{Clock, Timestamp};
use crate::error::InternalError;
use crate::state::BreakerState;

/// Callback invoked when the circuit opens, given the fault that tripped it.
pub type OnBreak<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

/// Opens once a fixed number of handled faults accumulate without an
/// intervening success, then blocks calls for the configured break duration.
///
/// The fault count survives the open transition, so a failed half-open trial
/// call is still at or above the threshold and re-opens the circuit for a
/// fresh full break duration. Only a successful call or an explicit
/// [`reset`](BreakerState::reset) clears the count.
pub struct CountBreaker<E> {
    shared: Mutex<Shared<E>>,
    threshold: u32,
    break_duration: Duration,
    lock_wait: Duration,
    clock: Clock,
    on_break: Option<OnBreak<E>>,
}

struct Shared<E> {
    failure_count: u32,
    blocked_until: Timestamp,
    last_fault: Option<Arc<E>>,
}

impl<E> CountBreaker<E> {
    pub(crate) fn new(
        threshold: u32,
        break_duration: Duration,
        lock_wait: Duration,
        clock: Clock,
        on_break: Option<OnBreak<E>>,
    ) -> Self {
        CountBreaker {
            shared: Mutex::new(Shared {
                failure_count: 0,
                blocked_until: Timestamp::NEVER,
                last_fault: None,
            }),
            threshold,
            break_duration,
            lock_wait,
            clock,
            on_break,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared<E>>, InternalError> {
        self.shared
            .try_lock_for(self.lock_wait)
            .ok_or(InternalError::LockTimeout)
    }
}

impl<E> BreakerState<E> for CountBreaker<E>
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
        shared.failure_count = 0;
        shared.blocked_until = Timestamp::NEVER;
        shared.last_fault = None;
        Ok(())
    }

    fn record_success(&self) -> Result<(), InternalError> {
        self.reset()
    }

    fn record_fault(&self, fault: Arc<E>) -> Result<(), InternalError> {
        let mut shared = self.lock()?;
        shared.last_fault = Some(Arc::clone(&fault));
        shared.failure_count = shared.failure_count.saturating_add(1);

        if shared.failure_count >= self.threshold {
            shared.blocked_until = self.clock.now().saturating_add(self.break_duration);
            tracing::warn!(
                failure_count = shared.failure_count,
                threshold = self.threshold,
                "circuit opened"
            );

            if let Some(on_break) = &self.on_break {
                // Runs while the lock is held, matching the serialization of
                // concurrent queries with the open transition. Must be fast
                // and must not reenter this breaker.
                on_break(&fault);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, TimeSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn breaker(threshold: u32, clock: Arc<ManualClock>) -> CountBreaker<&'static str> {
        CountBreaker::new(
            threshold,
            Duration::from_secs(60),
            Duration::from_secs(1),
            Clock::new(clock),
            None,
        )
    }

    #[test]
    fn opens_only_at_threshold() {
        let clock = ManualClock::new();
        let breaker = breaker(3, clock);

        breaker.record_fault(Arc::new("one")).unwrap();
        assert!(!breaker.is_broken().unwrap());
        breaker.record_fault(Arc::new("two")).unwrap();
        assert!(!breaker.is_broken().unwrap());
        breaker.record_fault(Arc::new("three")).unwrap();
        assert!(breaker.is_broken().unwrap());
        assert_eq!(*breaker.last_fault().unwrap().unwrap(), "three");
    }

    #[test]
    fn success_clears_accumulated_faults() {
        let clock = ManualClock::new();
        let breaker = breaker(2, clock);

        breaker.record_fault(Arc::new("one")).unwrap();
        breaker.record_success().unwrap();
        breaker.record_fault(Arc::new("two")).unwrap();
        assert!(!breaker.is_broken().unwrap());
    }

    #[test]
    fn cooldown_elapses_at_exact_deadline() {
        let clock = ManualClock::new();
        let breaker = breaker(1, Arc::clone(&clock));

        breaker.record_fault(Arc::new("boom")).unwrap();
        assert!(breaker.is_broken().unwrap());

        clock.advance(Duration::from_secs(59));
        assert!(breaker.is_broken().unwrap());

        clock.advance(Duration::from_secs(1));
        assert!(!breaker.is_broken().unwrap());
    }

    #[test]
    fn trial_failure_reopens_for_a_fresh_duration() {
        let clock = ManualClock::new();
        let breaker = breaker(2, Arc::clone(&clock));

        breaker.record_fault(Arc::new("one")).unwrap();
        breaker.record_fault(Arc::new("two")).unwrap();
        assert!(breaker.is_broken().unwrap());

        clock.advance(Duration::from_secs(60));
        assert!(!breaker.is_broken().unwrap());

        // The count was not cleared by opening, so one trial failure is
        // enough to re-open.
        breaker.record_fault(Arc::new("three")).unwrap();
        assert!(breaker.is_broken().unwrap());

        clock.advance(Duration::from_secs(59));
        assert!(breaker.is_broken().unwrap());
        clock.advance(Duration::from_secs(1));
        assert!(!breaker.is_broken().unwrap());
    }

    #[test]
    fn on_break_fires_once_per_open_transition() {
        let clock = ManualClock::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let breaker: CountBreaker<&'static str> = CountBreaker::new(
            2,
            Duration::from_secs(60),
            Duration::from_secs(1),
            Clock::new(Arc::clone(&clock) as Arc<dyn TimeSource>),
            Some(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        breaker.record_fault(Arc::new("one")).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        breaker.record_fault(Arc::new("two")).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Trial failure after cooldown is a new open transition.
        clock.advance(Duration::from_secs(60));
        breaker.record_fault(Arc::new("three")).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn max_break_duration_saturates() {
        let clock = ManualClock::new();
        let breaker: CountBreaker<&'static str> = CountBreaker::new(
            1,
            Duration::MAX,
            Duration::from_secs(1),
            Clock::new(Arc::clone(&clock) as Arc<dyn TimeSource>),
            None,
        );

        breaker.record_fault(Arc::new("boom")).unwrap();
        assert!(breaker.is_broken().unwrap());

        clock.advance(Duration::from_secs(u64::MAX / 2));
        assert!(breaker.is_broken().unwrap());

        breaker.reset().unwrap();
        assert!(!breaker.is_broken().unwrap());
    }

    #[test]
    fn failure_count_saturates_at_the_type_boundary() {
        let clock = ManualClock::new();
        let breaker = breaker(2, Arc::clone(&clock));

        // A long-lived breaker that only ever sees trial failures keeps
        // counting past the threshold; pin the counter at the boundary.
        breaker.shared.lock().failure_count = u32::MAX;
        breaker.record_fault(Arc::new("boom")).unwrap();

        assert_eq!(breaker.shared.lock().failure_count, u32::MAX);
        assert!(breaker.is_broken().unwrap());
    }

    #[test]
    fn stalled_holder_surfaces_lock_timeout() {
        let clock = ManualClock::new();
        let breaker: Arc<CountBreaker<&'static str>> = Arc::new(CountBreaker::new(
            1,
            Duration::from_secs(60),
            Duration::from_millis(20),
            Clock::new(clock),
            None,
        ));

        let guard = breaker.shared.lock();
        let contender = Arc::clone(&breaker);
        let result = thread::spawn(move || contender.is_broken()).join().unwrap();
        drop(guard);

        assert_eq!(result, Err(InternalError::LockTimeout));
        assert!(!breaker.is_broken().unwrap());
    }
}
