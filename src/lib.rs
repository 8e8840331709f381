//! IP geolocation record contract.
//!
//! Validates geolocation provider payloads into immutable [`location::LocationRecord`]
//! values, keeps the latest record per IP in a local cache, and serves
//! records to map renderers over a small HTTP API.

pub mod config;
pub mod logging;
pub mod location;
pub mod server;

pub use location::{LocationError, LocationRecord, MalformedReason, OptionalFields, ParseOptions};
