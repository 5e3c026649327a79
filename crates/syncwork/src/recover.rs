//! Panic recovery and checked arithmetic helpers.
//!
//! [`WorkerPool`] deliberately leaves panics alone: a panicking job takes its
//! worker down. Jobs that must survive their own bugs wrap their body with
//! [`catch_panic`], which turns the panic into an ordinary
//! [`Error::Panicked`] value the job can store.
//!
//! [`WorkerPool`]: crate::WorkerPool

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use core::fmt;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A recovered panic: what it said and when it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanicError {
    raised_at: DateTime<Utc>,
    message: String,
}

impl PanicError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            raised_at: Utc::now(),
            message: message.into(),
        }
    }

    pub const fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_owned()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            String::from("unknown panic payload")
        };
        Self::new(message)
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ERROR: {}",
            self.raised_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.message
        )
    }
}

impl core::error::Error for PanicError {}

/// Runs `f`, converting a panic into [`Error::Panicked`].
///
/// The panic hook still runs, so the panic message is printed as usual. With
/// the `tracing` feature the recovered panic is also logged together with a
/// backtrace of the recovery point.
///
/// # Errors
///
/// Returns [`Error::Panicked`] if `f` panicked.
///
/// # Example
/// ```
/// use syncwork::{Error, catch_panic};
///
/// let ok = catch_panic(|| 2 + 2);
/// assert_eq!(ok.unwrap(), 4);
///
/// let err = catch_panic(|| -> i32 { panic!("boom") }).unwrap_err();
/// assert!(matches!(err, Error::Panicked(ref p) if p.message() == "boom"));
/// ```
pub fn catch_panic<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let err = PanicError::from_payload(payload.as_ref());

        #[cfg(feature = "tracing")]
        tracing::error!(
            "PANIC: {}\n{}",
            err.message(),
            std::backtrace::Backtrace::capture()
        );

        Error::Panicked(err)
    })
}

/// Integer mean of `sequence`, truncated toward zero.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty slice.
pub fn average(sequence: &[i64]) -> Result<i64> {
    if sequence.is_empty() {
        return Err(Error::EmptyInput);
    }
    let sum: i128 = sequence.iter().map(|&v| i128::from(v)).sum();
    // |sum / len| never exceeds the largest |element|, so it fits in i64.
    Ok((sum / sequence.len() as i128) as i64)
}

/// [`average`] run under [`catch_panic`].
///
/// `average` itself never panics; this is the guarded entry point for callers
/// that feed it from code that might.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty slice.
pub fn checked_average(sequence: &[i64]) -> Result<i64> {
    catch_panic(|| average(sequence))?
}
