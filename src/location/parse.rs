//! Provider payload parsing.
//!
//! Payloads are first read into a raw shape where every field is optional,
//! then validated into a [`LocationRecord`]. Nothing is defaulted except the
//! two fields [`OptionalFields`] governs.

use serde::Deserialize;

use super::types::{Location, LocationError, LocationRecord, MalformedReason};

/// How to treat a provider that omits `postalCode` or `region`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionalFields {
    /// Absent means empty string.
    #[default]
    EmptyWhenAbsent,
    /// Absent is a malformed response, like any other field.
    Required,
}

/// Options for payload validation.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub optional_fields: OptionalFields,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            optional_fields: OptionalFields::Required,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord {
    ip: Option<String>,
    isp: Option<String>,
    name: Option<String>,
    /// geo.ipify.org reports the entity name under `as.name`.
    #[serde(rename = "as")]
    autonomous_system: Option<serde_json::Value>,
    location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    city: Option<String>,
    country: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "lon", alias = "longitude")]
    lng: Option<f64>,
    #[serde(rename = "postalCode", alias = "postal_code", alias = "postal")]
    postal_code: Option<String>,
    region: Option<String>,
    timezone: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedReason> {
    value.ok_or(MalformedReason::MissingField(field))
}

fn optional(
    value: Option<String>,
    field: &'static str,
    policy: OptionalFields,
) -> Result<String, MalformedReason> {
    match (value, policy) {
        (Some(v), _) => Ok(v),
        (None, OptionalFields::EmptyWhenAbsent) => Ok(String::new()),
        (None, OptionalFields::Required) => Err(MalformedReason::MissingField(field)),
    }
}

fn coordinate(
    value: Option<f64>,
    field: &'static str,
    limit: f64,
    out_of_range: fn(f64) -> MalformedReason,
) -> Result<f64, MalformedReason> {
    let v = required(value, field)?;
    if !v.is_finite() {
        return Err(MalformedReason::NonFiniteCoordinate(field));
    }
    if !(-limit..=limit).contains(&v) {
        return Err(out_of_range(v));
    }
    Ok(v)
}

impl RawRecord {
    pub(crate) fn validate(self, opts: &ParseOptions) -> Result<LocationRecord, MalformedReason> {
        let ip = required(self.ip, "ip")?;
        if ip.trim().is_empty() {
            return Err(MalformedReason::EmptyIp);
        }
        let isp = required(self.isp, "isp")?;

        let as_name = self
            .autonomous_system
            .as_ref()
            .and_then(|a| a.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string);
        let name = required(self.name.or(as_name), "name")?;

        let raw = required(self.location, "location")?;
        let city = required(raw.city, "location.city")?;
        let country = required(raw.country, "location.country")?;
        let lat = coordinate(raw.lat, "location.lat", 90.0, MalformedReason::LatitudeOutOfRange)?;
        let lng = coordinate(raw.lng, "location.lng", 180.0, MalformedReason::LongitudeOutOfRange)?;
        let postal_code = optional(raw.postal_code, "location.postalCode", opts.optional_fields)?;
        let region = optional(raw.region, "location.region", opts.optional_fields)?;
        let timezone = required(raw.timezone, "location.timezone")?;

        Ok(LocationRecord {
            ip,
            isp,
            name,
            location: Location {
                city,
                country,
                lat,
                lng,
                postal_code,
                region,
                timezone,
            },
        })
    }
}

impl TryFrom<RawRecord> for LocationRecord {
    type Error = MalformedReason;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        raw.validate(&ParseOptions::default())
    }
}

impl LocationRecord {
    /// Parse and validate a provider payload.
    pub fn from_json(payload: &str) -> Result<Self, LocationError> {
        Self::from_json_with(payload, &ParseOptions::default())
    }

    pub fn from_json_with(payload: &str, opts: &ParseOptions) -> Result<Self, LocationError> {
        let raw: RawRecord = serde_json::from_str(payload).map_err(invalid)?;
        accept(raw, opts)
    }

    pub fn from_slice(payload: &[u8]) -> Result<Self, LocationError> {
        Self::from_slice_with(payload, &ParseOptions::default())
    }

    pub fn from_slice_with(payload: &[u8], opts: &ParseOptions) -> Result<Self, LocationError> {
        let raw: RawRecord = serde_json::from_slice(payload).map_err(invalid)?;
        accept(raw, opts)
    }

    pub fn from_value(payload: serde_json::Value) -> Result<Self, LocationError> {
        Self::from_value_with(payload, &ParseOptions::default())
    }

    pub fn from_value_with(payload: serde_json::Value, opts: &ParseOptions) -> Result<Self, LocationError> {
        let raw: RawRecord = serde_json::from_value(payload).map_err(invalid)?;
        accept(raw, opts)
    }
}

fn invalid(e: serde_json::Error) -> LocationError {
    LocationError::MalformedResponse(MalformedReason::Invalid(e.to_string()))
}

fn accept(raw: RawRecord, opts: &ParseOptions) -> Result<LocationRecord, LocationError> {
    let record = raw.validate(opts)?;
    log::debug!(
        "accepted location record for {} ({}, {})",
        record.ip(),
        record.location().city(),
        record.location().country()
    );
    Ok(record)
}
