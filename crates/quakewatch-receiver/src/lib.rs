//! QuakeWatch alert receiver library entry.
//!
//! This crate wires the metric registry, the alert ingestor with its rotating
//! log, and the HTTP routes into one sidecar. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
