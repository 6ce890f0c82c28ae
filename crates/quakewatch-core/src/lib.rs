//! QuakeWatch core: alert model, classification, and error types.
//!
//! This crate defines the inbound alert contracts and the error surface shared
//! by the receiver and its tests. It carries no transport or runtime
//! dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed payloads surface as `QuakeWatchError::MalformedPayload` so the
//! receiver never crashes on bad traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod alert;
pub mod error;

pub use alert::{AlertBatch, AlertItem, Classification};
pub use error::{ErrorKind, QuakeWatchError, Result};
