//! Fault matching: decides which raised faults count toward breaking.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync + 'static>;

/// An ordered set of predicates describing the faults a policy handles.
///
/// A fault matched by any registered predicate is recorded into the breaker's
/// accounting; an unmatched fault passes through without touching breaker
/// state. An empty set handles nothing, so a breaker configured without
/// predicates never trips.
pub struct FaultPredicates<E> {
    predicates: SmallVec<[Predicate<E>; 4]>,
}

impl<E> FaultPredicates<E> {
    /// Creates an empty set.
    pub fn new() -> Self {
        FaultPredicates {
            predicates: SmallVec::new(),
        }
    }

    /// Registers a predicate; faults it matches count toward breaking.
    pub fn push<F>(&mut self, predicate: F)
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
    }

    /// True if no predicates are registered.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True if any registered predicate matches the fault.
    pub fn is_handled(&self, fault: &E) -> bool {
        self.predicates.iter().any(|p| p(fault))
    }
}

impl<E> Clone for FaultPredicates<E> {
    fn clone(&self) -> Self {
        FaultPredicates {
            predicates: self.predicates.clone(),
        }
    }
}

impl<E> Default for FaultPredicates<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for FaultPredicates<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultPredicates")
            .field("len", &self.predicates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_handles_nothing() {
        let predicates: FaultPredicates<&str> = FaultPredicates::new();
        assert!(predicates.is_empty());
        assert!(!predicates.is_handled(&"anything"));
    }

    #[test]
    fn any_predicate_may_match() {
        let mut predicates: FaultPredicates<&str> = FaultPredicates::new();
        predicates.push(|f| f.contains("timeout"));
        predicates.push(|f| f.contains("refused"));

        assert!(predicates.is_handled(&"connection timeout"));
        assert!(predicates.is_handled(&"connection refused"));
        assert!(!predicates.is_handled(&"permission denied"));
    }
}
