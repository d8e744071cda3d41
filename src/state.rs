//! The uniform contract implemented by breaker accounting strategies.

use std::sync::Arc;

use crate::error::InternalError;

/// Accounting state behind a guarded call site.
///
/// The two shipped strategies — [`CountBreaker`](crate::CountBreaker) and
/// [`RatioBreaker`](crate::RatioBreaker) — implement this trait, and custom
/// strategies plug into [`CircuitBreaker`](crate::CircuitBreaker) through it
/// without any change to the executor.
///
/// Implementations serialize every operation through one bounded-wait lock
/// per instance; each method reports [`InternalError::LockTimeout`] when the
/// lock cannot be acquired in time. The closed/open/half-open states are
/// derived from the block deadline and the accounting counters, never
/// materialized as a separate enum.
pub trait BreakerState<E>: Send + Sync + 'static {
    /// True while calls are blocked, i.e. the current time is before the
    /// block deadline. Side-effect-free apart from taking the lock.
    fn is_broken(&self) -> Result<bool, InternalError>;

    /// The most recent fault that caused or maintains the open state, or
    /// `None` if no handled fault has been recorded since the last reset.
    fn last_fault(&self) -> Result<Option<Arc<E>>, InternalError>;

    /// Clears all accounting and closes the circuit.
    fn reset(&self) -> Result<(), InternalError>;

    /// Records a successful call. For counting strategies this is equivalent
    /// to [`reset`](BreakerState::reset); decaying strategies credit the
    /// success counter and close the circuit.
    fn record_success(&self) -> Result<(), InternalError>;

    /// Records a handled fault, opening the circuit when the strategy's
    /// break condition is met.
    fn record_fault(&self, fault: Arc<E>) -> Result<(), InternalError>;
}
