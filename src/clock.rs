//! Time source abstraction used by breaker state.
//!
//! Breakers never read an unconditioned system clock. All time comparisons
//! route through an injected [`Clock`], so tests can freeze and fast-forward
//! time deterministically by substituting a [`ManualClock`] per instance.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Process-wide anchor for the default monotonic source. All breakers in a
/// process share one epoch so their timestamps are comparable.
static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// A point in time, measured as an offset from a fixed process-wide epoch.
///
/// The zero offset doubles as the "never blocked" sentinel: a breaker whose
/// block deadline is [`Timestamp::NEVER`] is closed, because the current time
/// is never earlier than the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Sentinel meaning "never blocked"; earlier than every reachable instant.
    pub const NEVER: Timestamp = Timestamp(Duration::ZERO);

    /// The latest representable instant. Saturating arithmetic clamps here.
    pub const MAX: Timestamp = Timestamp(Duration::MAX);

    /// Builds a timestamp at the given offset past the epoch.
    pub const fn from_epoch(offset: Duration) -> Self {
        Timestamp(offset)
    }

    /// Adds a duration, clamping to [`Timestamp::MAX`] instead of overflowing.
    pub fn saturating_add(self, duration: Duration) -> Self {
        match self.0.checked_add(duration) {
            Some(offset) => Timestamp(offset),
            None => Timestamp::MAX,
        }
    }

    /// Fractional seconds elapsed since `earlier`, or zero if `earlier` is
    /// not actually earlier.
    pub fn seconds_since(self, earlier: Timestamp) -> f64 {
        self.0.saturating_sub(earlier.0).as_secs_f64()
    }
}

/// Source of the current time for a breaker instance.
pub trait TimeSource: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// The default source: monotonic time since the process epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(EPOCH.elapsed())
    }
}

/// A manually driven source for deterministic tests.
///
/// The reported time is frozen until [`set`](ManualClock::set) or
/// [`advance`](ManualClock::advance) moves it. Share the `Arc` with the
/// breaker under test and drive it from the test body.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Creates a clock frozen at the epoch.
    pub fn new() -> Arc<Self> {
        Self::starting_at(Timestamp::NEVER)
    }

    /// Creates a clock frozen at the given instant.
    pub fn starting_at(at: Timestamp) -> Arc<Self> {
        Arc::new(ManualClock {
            now: Mutex::new(at),
        })
    }

    /// Moves the clock to the given instant.
    pub fn set(&self, to: Timestamp) {
        *self.now.lock() = to;
    }

    /// Advances the clock, saturating at [`Timestamp::MAX`].
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// Shared handle to a [`TimeSource`], cheap to clone into each breaker.
#[derive(Clone)]
pub struct Clock(Arc<dyn TimeSource>);

impl Clock {
    /// Wraps a custom time source.
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        Clock(source)
    }

    /// The monotonic process clock.
    pub fn system() -> Self {
        Clock(Arc::new(MonotonicClock))
    }

    /// Reads the current instant from the underlying source.
    pub fn now(&self) -> Timestamp {
        self.0.now()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}
