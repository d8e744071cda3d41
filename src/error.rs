//! Error types for the circuit breaker library.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Result type for guarded calls.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

/// Error type surfaced by guarded calls.
///
/// Faults are held behind `Arc` so the breaker can retain the most recent
/// fault for open-circuit reporting while the caller receives the same
/// value, unchanged and unmasked.
#[derive(Debug)]
pub enum BreakerError<E> {
    /// The circuit is open; the call was not attempted. Carries the last
    /// fault recorded before or during the open period, if any.
    Open(Option<Arc<E>>),

    /// The underlying operation raised a fault. This is always the real
    /// fault from the wrapped work, whether or not the policy handled it.
    Operation(Arc<E>),

    /// The breaker itself failed; the guarded work may or may not have run.
    Internal(InternalError),
}

impl<E> BreakerError<E> {
    /// True if this is an open-circuit rejection.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open(_))
    }

    /// The fault behind this error: the operation's own fault, or the fault
    /// that opened the circuit. `None` for internal errors and for a circuit
    /// opened without any recorded fault.
    pub fn fault(&self) -> Option<&E> {
        match self {
            BreakerError::Open(cause) => cause.as_deref(),
            BreakerError::Operation(fault) => Some(fault),
            BreakerError::Internal(_) => None,
        }
    }
}

/// Failures of the breaker machinery itself, distinct from both the
/// open-circuit rejection and the operation's own faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalError {
    /// The bounded-wait lock acquisition expired; breaker state was neither
    /// read nor written for this call.
    LockTimeout,
}

impl<E> Display for BreakerError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakerError::Open(_) => {
                write!(f, "The circuit is now open and is not allowing calls.")
            }
            BreakerError::Operation(e) => write!(f, "Operation error: {}", e),
            BreakerError::Internal(e) => write!(f, "Circuit breaker internal error: {}", e),
        }
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InternalError::LockTimeout => write!(f, "Timed out waiting for the breaker lock"),
        }
    }
}

impl<E: Error + 'static> Error for BreakerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BreakerError::Open(Some(cause)) => Some(&**cause),
            BreakerError::Open(None) => None,
            BreakerError::Operation(fault) => Some(&**fault),
            BreakerError::Internal(e) => Some(e),
        }
    }
}

impl Error for InternalError {}

/// Configuration rejected at build time. Construction never defers parameter
/// checks to call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    param: &'static str,
    message: &'static str,
}

impl ConfigError {
    pub(crate) fn out_of_range(param: &'static str, message: &'static str) -> Self {
        ConfigError { param, message }
    }

    /// Name of the offending builder parameter.
    pub fn param(&self) -> &'static str {
        self.param
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for `{}`: {}", self.param, self.message)
    }
}

impl Error for ConfigError {}
