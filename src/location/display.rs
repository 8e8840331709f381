//! Human-readable rendering of location records.

use chrono::Utc;

use super::types::LocationRecord;

/// ISO 3166-1 alpha-2 codes seen most often in lookup results.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"), ("AR", "Argentina"),
    ("AT", "Austria"), ("AU", "Australia"),
    ("BD", "Bangladesh"), ("BE", "Belgium"),
    ("BR", "Brazil"), ("CA", "Canada"),
    ("CH", "Switzerland"), ("CL", "Chile"),
    ("CN", "China"), ("CO", "Colombia"),
    ("CZ", "Czechia"), ("DE", "Germany"),
    ("DK", "Denmark"), ("EG", "Egypt"),
    ("ES", "Spain"), ("FI", "Finland"),
    ("FR", "France"), ("GB", "United Kingdom"),
    ("GR", "Greece"), ("HK", "Hong Kong"),
    ("ID", "Indonesia"), ("IE", "Ireland"),
    ("IL", "Israel"), ("IN", "India"),
    ("IR", "Iran"), ("IT", "Italy"),
    ("JP", "Japan"), ("KE", "Kenya"),
    ("KR", "South Korea"), ("MA", "Morocco"),
    ("MX", "Mexico"), ("MY", "Malaysia"),
    ("NG", "Nigeria"), ("NL", "Netherlands"),
    ("NO", "Norway"), ("NZ", "New Zealand"),
    ("PE", "Peru"), ("PH", "Philippines"),
    ("PK", "Pakistan"), ("PL", "Poland"),
    ("PT", "Portugal"), ("RO", "Romania"),
    ("RU", "Russia"), ("SA", "Saudi Arabia"),
    ("SE", "Sweden"), ("SG", "Singapore"),
    ("TH", "Thailand"), ("TR", "Turkey"),
    ("TW", "Taiwan"), ("UA", "Ukraine"),
    ("US", "United States"), ("VN", "Vietnam"),
    ("ZA", "South Africa"),
];

/// English name for a country code; anything else comes back unchanged
/// (providers that already send names, unknown codes).
pub fn country_display_name(code: &str) -> &str {
    let trimmed = code.trim();
    if trimmed.len() != 2 {
        return code;
    }
    COUNTRY_NAMES
        .iter()
        .find(|(cc, _)| cc.eq_ignore_ascii_case(trimmed))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// `37.4000°N, 122.1000°W`
pub fn format_coords(lat: f64, lng: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lng.abs(), ew)
}

impl LocationRecord {
    /// City, region and country joined, skipping empty parts.
    pub fn place_line(&self) -> String {
        let loc = self.location();
        [loc.city(), loc.region(), country_display_name(loc.country())]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn display_line(&self) -> String {
        let loc = self.location();
        let tz = match loc.local_time(Utc::now()) {
            Some(t) => format!("{} ({} Local Time)", loc.timezone(), t),
            None => loc.timezone().to_string(),
        };
        let postal = if loc.postal_code().is_empty() {
            String::new()
        } else {
            format!(" {}", loc.postal_code())
        };
        format!(
            "\u{1F4CD} {} \u{2014} {}{}\n  \u{1F310} {} via {}\n  \u{1F552} {}\n  \u{1F4D0} {}",
            self.name(),
            self.place_line(),
            postal,
            self.ip(),
            self.isp(),
            tz,
            format_coords(loc.lat(), loc.lng()),
        )
    }
}
