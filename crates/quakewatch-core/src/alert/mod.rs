//! Alert model (Alertmanager webhook payloads).
//!
//! This module hosts the inbound alert contracts:
//! - Batch: schema-tolerant extraction from a parsed JSON value.
//! - Classification: the route-derived severity tag.
//! - Format: console and log-file renderings of one alert item.
//!
//! Extraction never fails on missing fields. Only a payload that is not a JSON
//! object, or whose `alerts` is not an array, is reported as `MalformedPayload`.

pub mod batch;
pub mod classification;
pub mod format;

pub use batch::{AlertBatch, AlertItem};
pub use classification::Classification;
