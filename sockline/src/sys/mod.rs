//! Platform system-call layer.
//!
//! This module wraps the handful of raw socket calls the crate relies on:
//! - `poll(2)` for readiness,
//! - `read(2)` and `write(2)` on non-blocking descriptors,
//! - `connect(2)` and the pending `SO_ERROR` lookup,
//! - creation of non-blocking stream sockets.
//!
//! Every wrapper reports failures as [`std::io::Error`] built from `errno`.

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(unix)]
pub(crate) use unix as platform;
