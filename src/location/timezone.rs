//! Interpretation of the free-form `timezone` label.
//!
//! Providers disagree here: some send IANA identifiers, geo.ipify.org sends
//! a bare UTC offset like `-07:00`.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

use super::types::Location;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimezoneLabel {
    Iana(Tz),
    Offset(FixedOffset),
    Unrecognized,
}

impl TimezoneLabel {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if let Ok(tz) = label.parse::<Tz>() {
            return Self::Iana(tz);
        }
        match parse_offset(label) {
            Some(offset) => Self::Offset(offset),
            None => Self::Unrecognized,
        }
    }

    /// Wall-clock time at `now` in this zone, `HH:MM`.
    pub fn local_time(&self, now: DateTime<Utc>) -> Option<String> {
        match self {
            Self::Iana(tz) => Some(now.with_timezone(tz).format("%H:%M").to_string()),
            Self::Offset(offset) => Some(now.with_timezone(offset).format("%H:%M").to_string()),
            Self::Unrecognized => None,
        }
    }
}

/// `±HH:MM`, `±HHMM` or `±HH`, optionally prefixed with `UTC` or `GMT`.
fn parse_offset(label: &str) -> Option<FixedOffset> {
    let rest = label
        .strip_prefix("UTC")
        .or_else(|| label.strip_prefix("GMT"))
        .unwrap_or(label);

    let (sign, digits) = match rest.chars().next()? {
        '+' => (1, &rest[1..]),
        '-' => (-1, &rest[1..]),
        _ => return None,
    };

    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Location {
    pub fn timezone_label(&self) -> TimezoneLabel {
        TimezoneLabel::parse(&self.timezone)
    }

    pub fn local_time(&self, now: DateTime<Utc>) -> Option<String> {
        self.timezone_label().local_time(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iana() {
        assert_eq!(
            TimezoneLabel::parse("America/Los_Angeles"),
            TimezoneLabel::Iana(chrono_tz::America::Los_Angeles)
        );
    }

    #[test]
    fn test_offsets() {
        assert_eq!(
            TimezoneLabel::parse("-07:00"),
            TimezoneLabel::Offset(FixedOffset::west_opt(7 * 3600).unwrap())
        );
        assert_eq!(
            TimezoneLabel::parse("UTC+05:30"),
            TimezoneLabel::Offset(FixedOffset::east_opt(5 * 3600 + 1800).unwrap())
        );
        assert_eq!(
            TimezoneLabel::parse("+0545"),
            TimezoneLabel::Offset(FixedOffset::east_opt(5 * 3600 + 45 * 60).unwrap())
        );
        assert_eq!(
            TimezoneLabel::parse("GMT-3"),
            TimezoneLabel::Offset(FixedOffset::west_opt(3 * 3600).unwrap())
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(TimezoneLabel::parse("Pacific Standard Time"), TimezoneLabel::Unrecognized);
        assert_eq!(TimezoneLabel::parse("+25:00"), TimezoneLabel::Unrecognized);
        assert_eq!(TimezoneLabel::parse(""), TimezoneLabel::Unrecognized);
        assert_eq!(TimezoneLabel::parse("+"), TimezoneLabel::Unrecognized);
    }

    #[test]
    fn test_local_time() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            TimezoneLabel::parse("-07:00").local_time(now),
            Some("05:00".to_string())
        );
        // Tokyo has no DST.
        assert_eq!(
            TimezoneLabel::parse("Asia/Tokyo").local_time(now),
            Some("21:00".to_string())
        );
        assert_eq!(TimezoneLabel::Unrecognized.local_time(now), None);
    }
}
