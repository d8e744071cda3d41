//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use fusebox::prelude::*;
//! ```

pub use crate::{
    BreakerBuilder, BreakerError, BreakerResult, BreakerState, CircuitBreaker, Clock,
    CountBreaker, ManualClock, RatioBreaker,
};
