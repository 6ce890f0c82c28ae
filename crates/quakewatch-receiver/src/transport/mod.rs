//! Transport layer (HTTP webhooks).
//!
//! Exposes the alert ingestion handlers, one per classification route.

pub mod webhook;
