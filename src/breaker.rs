//! Call-site execution wrapper around a breaker state.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::BreakerBuilder;
use crate::error::{BreakerError, BreakerResult, InternalError};
use crate::predicate::FaultPredicates;
use crate::state::BreakerState;

/// Executes units of work under a circuit-breaker guard.
///
/// Each invocation consults the breaker state first: while the circuit is
/// open the work is never invoked and the caller receives
/// [`BreakerError::Open`] wrapping the last recorded fault. Otherwise the
/// work runs, and its outcome is fed back into the state — a success clears
/// or credits the accounting, a fault matched by the configured predicates
/// is recorded before propagating unchanged, and an unmatched fault
/// propagates without touching breaker state at all.
///
/// The breaker never retries and never recovers via a background timer;
/// recovery happens only through the half-open trial call after the
/// cooldown elapses.
pub struct CircuitBreaker<S, E>
where
    S: BreakerState<E>,
    E: std::error::Error + Send + Sync + 'static,
{
    state: Arc<S>,
    predicates: FaultPredicates<E>,
    _fault_type: PhantomData<fn() -> E>,
}

impl<S, E> CircuitBreaker<S, E>
where
    S: BreakerState<E>,
    E: std::error::Error + Send + Sync + 'static,
{
    pub(crate) fn new(state: Arc<S>, predicates: FaultPredicates<E>) -> Self {
        CircuitBreaker {
            state,
            predicates,
            _fault_type: PhantomData,
        }
    }

    /// Creates a builder for a guarded call site.
    pub fn builder() -> BreakerBuilder<E> {
        BreakerBuilder::new()
    }

    /// True while the circuit is open and calls are being rejected.
    pub fn is_open(&self) -> Result<bool, InternalError> {
        self.state.is_broken()
    }

    /// The most recent handled fault, if any.
    pub fn last_fault(&self) -> Result<Option<Arc<E>>, InternalError> {
        self.state.last_fault()
    }

    /// Closes the circuit and clears all accounting.
    pub fn reset(&self) -> Result<(), InternalError> {
        self.state.reset()
    }

    /// Executes a unit of work under the breaker's guard.
    pub fn call<F, T>(&self, work: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.pre_call()?;
        let result = work();
        self.post_call(result)
    }

    /// Short-circuits when the circuit is open. No breaker state is mutated
    /// on the rejection path.
    fn pre_call(&self) -> Result<(), BreakerError<E>> {
        if self.state.is_broken().map_err(BreakerError::Internal)? {
            let cause = self.state.last_fault().map_err(BreakerError::Internal)?;
            return Err(BreakerError::Open(cause));
        }
        Ok(())
    }

    /// Feeds the outcome of an attempted call back into the breaker state.
    fn post_call<T>(&self, result: Result<T, E>) -> BreakerResult<T, E> {
        match result {
            Ok(value) => {
                self.state.record_success().map_err(BreakerError::Internal)?;
                Ok(value)
            }
            Err(fault) => {
                if !self.predicates.is_handled(&fault) {
                    return Err(BreakerError::Operation(Arc::new(fault)));
                }

                let fault = Arc::new(fault);
                self.state
                    .record_fault(Arc::clone(&fault))
                    .map_err(BreakerError::Internal)?;
                Err(BreakerError::Operation(fault))
            }
        }
    }
}

// Cloning shares the underlying state, so clones guard the same call site.
impl<S, E> Clone for CircuitBreaker<S, E>
where
    S: BreakerState<E>,
    E: std::error::Error + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        CircuitBreaker {
            state: Arc::clone(&self.state),
            predicates: self.predicates.clone(),
            _fault_type: PhantomData,
        }
    }
}

impl<S, E> fmt::Debug for CircuitBreaker<S, E>
where
    S: BreakerState<E>,
    E: std::error::Error + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker").finish_non_exhaustive()
    }
}

#[cfg(feature = "async")]
impl<S, E> CircuitBreaker<S, E>
where
    S: BreakerState<E>,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Executes an async unit of work under the breaker's guard.
    ///
    /// The breaker lock is only taken inside the synchronous bookkeeping
    /// before and after the work, never across the suspension.
    pub async fn call_async<F, Fut, T>(&self, work: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.pre_call()?;
        let result = work().await;
        self.post_call(result)
    }
}
