//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;

use super::parse::RawRecord;

/// One resolved IP geolocation lookup.
///
/// Immutable once built: fields are private and the only way in is through
/// the validating constructors in [`super::parse`] (or deserializing, which
/// runs the same checks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct LocationRecord {
    pub(super) ip: String,
    pub(super) isp: String,
    pub(super) name: String,
    pub(super) location: Location,
}

/// Where an IP address resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub(super) city: String,
    pub(super) country: String,
    pub(super) lat: f64,
    pub(super) lng: f64,
    pub(super) postal_code: String,
    pub(super) region: String,
    pub(super) timezone: String,
}

impl LocationRecord {
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// The `ip` field as an address, when it is one. Providers are free to
    /// report other textual forms, so `None` here is not an error.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        self.ip.trim().parse().ok()
    }

    pub fn isp(&self) -> &str {
        &self.isp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// `(lat, lng)` in decimal degrees.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.location.lat, self.location.lng)
    }
}

impl Location {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Postal/ZIP code; empty when the provider did not report one.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

/// Why a provider payload could not become a [`LocationRecord`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedReason {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// serde_json never yields NaN or infinity; this guards other deserializers.
    #[error("coordinate '{0}' is not a finite number")]
    NonFiniteCoordinate(&'static str),
    #[error("empty ip address")]
    EmptyIp,
}

/// Location subsystem errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Malformed provider response: {0}")]
    MalformedResponse(#[from] MalformedReason),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No record for '{0}'")]
    NotFound(String),
    #[error("Server error: {0}")]
    Server(String),
}

impl LocationError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}
