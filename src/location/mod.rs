//! Location record subsystem.
//!
//! Provides the validated record type, payload parsing with key renaming,
//! timezone interpretation, human-readable rendering, and a local cache.

pub mod cache;
pub mod display;
pub mod parse;
pub mod timezone;
pub mod types;

pub use cache::RecordCache;
pub use display::{country_display_name, format_coords};
pub use parse::{OptionalFields, ParseOptions};
pub use timezone::TimezoneLabel;
pub use types::{Location, LocationError, LocationRecord, MalformedReason};
