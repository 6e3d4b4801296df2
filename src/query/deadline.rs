//! Caller-supplied search deadlines.
//!
//! A search invocation runs its statements strictly in sequence, so the
//! deadline is enforced between statements: once it has passed, every
//! remaining statement of the invocation is aborted before it starts.

use super::error::SearchError;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Deadline(instant)
    }

    pub fn after(duration: Duration) -> Self {
        Deadline(Instant::now() + duration)
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Error out with `DeadlineExceeded` if the deadline has passed.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.expired() {
            Err(SearchError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

/// Check an optional deadline; absent means unlimited.
pub(crate) fn check_deadline(deadline: Option<Deadline>) -> Result<(), SearchError> {
    match deadline {
        Some(deadline) => deadline.check(),
        None => Ok(()),
    }
}
