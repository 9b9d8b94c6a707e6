//! Absolute time budgets for blocking operations.

use std::time::{Duration, Instant};

/// A point in time after which a blocking operation must give up.
///
/// A `Deadline` is either a fixed [`Instant`] or *never*. Because it is
/// absolute, the same deadline can be handed to several consecutive
/// waits and the total time spent will not exceed the original budget.
///
/// # Examples
///
/// ```rust
/// use sockline::Deadline;
/// use std::time::Duration;
///
/// let deadline = Deadline::after(Duration::from_millis(250));
/// assert!(!deadline.is_never());
///
/// // Negative seconds mean "wait indefinitely".
/// assert!(Deadline::from_secs_f64(Some(-1.0)).is_never());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never elapses.
    pub const fn never() -> Self {
        Self(None)
    }

    /// A deadline `timeout` from now.
    ///
    /// Budgets too large to be represented collapse to [`Deadline::never`].
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    /// A deadline `timeout` from now, or never when `timeout` is `None`.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or(Self::never(), Self::after)
    }

    /// Builds a deadline from fractional seconds.
    ///
    /// `None`, negative, NaN and unrepresentable values all mean
    /// "wait indefinitely".
    pub fn from_secs_f64(seconds: Option<f64>) -> Self {
        match seconds {
            Some(secs) if secs >= 0.0 => Duration::try_from_secs_f64(secs)
                .map(Self::after)
                .unwrap_or(Self::never()),
            _ => Self::never(),
        }
    }

    /// Returns `true` if this deadline never elapses.
    pub fn is_never(&self) -> bool {
        self.0.is_none()
    }

    /// Time left before the deadline, saturating at zero.
    ///
    /// Returns `None` for a deadline that never elapses.
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the deadline has passed.
    pub fn has_elapsed(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Remaining time as a `poll(2)` timeout in milliseconds.
    ///
    /// `-1` means block forever. Partial milliseconds round up so a wait
    /// never returns before the deadline; values past `i32::MAX` clamp.
    pub(crate) fn poll_timeout(&self) -> i32 {
        match self.remaining() {
            None => -1,
            Some(left) => {
                let millis = left.as_nanos().div_ceil(1_000_000);
                i32::try_from(millis).unwrap_or(i32::MAX)
            }
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::never()
    }
}

impl From<Duration> for Deadline {
    fn from(timeout: Duration) -> Self {
        Self::after(timeout)
    }
}

impl From<Option<Duration>> for Deadline {
    fn from(timeout: Option<Duration>) -> Self {
        Self::from_timeout(timeout)
    }
}
