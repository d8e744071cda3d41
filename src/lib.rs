//! # fusebox
//!
//! A circuit breaker for wrapping fault-prone units of work: it tracks
//! recent handled faults and, once a break condition is crossed, stops
//! attempting the operation for a cooldown window, failing fast instead.
//!
//! Two accounting strategies ship with the crate:
//!
//! - **Count threshold** ([`CountBreaker`]): opens after a fixed number of
//!   handled faults with no intervening success.
//! - **Decayed success ratio** ([`RatioBreaker`]): keeps exponentially
//!   decayed success and failure counters with a configurable half-life and
//!   opens when the success percentage of recent calls drops below a
//!   minimum — a sliding window of call health in O(1) memory.
//!
//! The breaker's three logical states are derived, not materialized:
//!
//! - **Closed**: accounting is below the break condition; calls pass through.
//! - **Open**: calls are rejected immediately with
//!   [`BreakerError::Open`] wrapping the fault that tripped the circuit.
//! - **Half-open**: the cooldown has elapsed; the next call is a trial.
//!   Success closes the circuit, failure re-opens it for a fresh full
//!   break duration.
//!
//! ## Basic usage
//!
//! ```rust
//! use fusebox::{BreakerBuilder, BreakerError};
//! use std::fmt;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct ServiceError(String);
//!
//! impl fmt::Display for ServiceError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "Service error: {}", self.0)
//!     }
//! }
//!
//! impl std::error::Error for ServiceError {}
//!
//! # fn main() -> Result<(), fusebox::ConfigError> {
//! // Break after 3 handled faults, stay open for 30 seconds.
//! let breaker = BreakerBuilder::<ServiceError>::new()
//!     .handle_all()
//!     .threshold(3)
//!     .break_duration(Duration::from_secs(30))
//!     .build()?;
//!
//! match breaker.call(|| -> Result<String, ServiceError> { Ok("ok".to_string()) }) {
//!     Ok(result) => println!("call succeeded: {}", result),
//!     Err(BreakerError::Open(_)) => println!("circuit is open, call was rejected"),
//!     Err(BreakerError::Operation(err)) => println!("call failed: {}", err),
//!     Err(err) => println!("breaker error: {}", err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Fault predicates
//!
//! Only faults matched by a registered predicate count toward breaking;
//! everything else passes through without touching breaker state:
//!
//! ```rust
//! # use fusebox::BreakerBuilder;
//! # use std::io;
//! # fn main() -> Result<(), fusebox::ConfigError> {
//! let breaker = BreakerBuilder::<io::Error>::new()
//!     .handle(|e| e.kind() == io::ErrorKind::TimedOut)
//!     .threshold(2)
//!     .build()?;
//! # let _ = breaker;
//! # Ok(())
//! # }
//! ```
//!
//! ## Deterministic time
//!
//! Breakers never read an unconditioned system clock; all time arithmetic
//! routes through an injected [`Clock`]. Tests substitute a [`ManualClock`]
//! and freeze or fast-forward it explicitly.
//!
//! ## Async support
//!
//! With the `async` feature enabled, [`CircuitBreaker::call_async`] guards
//! suspending work. The internal lock is held only around the bookkeeping
//! before and after the call, never across an `.await`.
//!
//! ## Features
//!
//! - `async` - async execution wrapper

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breaker;
mod clock;
mod config;
mod count;
mod error;
mod predicate;
pub mod prelude;
mod ratio;
mod state;

// Re-exports
pub use breaker::CircuitBreaker;
pub use clock::{Clock, ManualClock, MonotonicClock, TimeSource, Timestamp};
pub use config::BreakerBuilder;
pub use count::{CountBreaker, OnBreak};
pub use error::{BreakerError, BreakerResult, ConfigError, InternalError};
pub use predicate::FaultPredicates;
pub use ratio::RatioBreaker;
pub use state::BreakerState;
