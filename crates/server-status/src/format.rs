// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Human-readable formatting for the status card slots.
//!
//! All helpers are total: unknown or malformed inputs turn into placeholder
//! strings instead of errors.

use chrono::{DateTime, FixedOffset, Local, Locale, Utc};
use serde_json::Value;

/// Placeholder for an unknown player count.
pub const UNKNOWN_PLACEHOLDER: &str = "—";

/// Placeholder for a missing or unparseable timestamp.
pub const MISSING_TIMESTAMP: &str = "Sin dato";

/// Placeholder for a server without any usable address.
pub const MISSING_ADDRESS: &str = "No disponible";

/// Default locale for rendered timestamps.
pub const DEFAULT_LOCALE: Locale = Locale::es_CL;

// Two-digit day, short month, two-digit hour and minute
const TIMESTAMP_PATTERN: &str = "%d %b, %H:%M";

/// Coerce a JSON value into a finite number.
///
/// Numbers and numeric strings are accepted. Everything else, including
/// empty strings and non-finite values, is unknown.
#[must_use]
pub fn normalize_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Format current/max player counts.
///
/// ```
/// use server_status::format::format_players;
///
/// assert_eq!(format_players(Some(5.0), Some(20.0)), "5/20");
/// assert_eq!(format_players(None, Some(20.0)), "—/20");
/// ```
#[must_use]
pub fn format_players(current: Option<f64>, max: Option<f64>) -> String {
    let current = current.filter(|n| n.is_finite());
    let max = max.filter(|n| n.is_finite());

    match (current, max) {
        (Some(current), Some(max)) => format!("{current}/{max}"),
        (Some(current), None) => format!("{current}"),
        (None, Some(max)) => format!("{UNKNOWN_PLACEHOLDER}/{max}"),
        (None, None) => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

/// Format a server address from its parts, preferring `ip:port`.
#[must_use]
pub fn format_address(ip: Option<&str>, port: Option<u16>, address: Option<&str>) -> String {
    let ip = ip.filter(|s| !s.is_empty());
    let address = address.filter(|s| !s.is_empty());

    match (ip, port, address) {
        (Some(ip), Some(port), _) => format!("{ip}:{port}"),
        (Some(ip), None, _) => ip.to_string(),
        (None, _, Some(address)) => address.to_string(),
        (None, _, None) => MISSING_ADDRESS.to_string(),
    }
}

/// Time zone used when rendering timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

/// Locale-aware timestamp formatter for the "last updated" slot.
#[derive(Debug, Clone, Copy)]
pub struct TimestampFormatter {
    locale: Locale,
    zone: Zone,
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE, Zone::Local)
    }
}

impl TimestampFormatter {
    #[must_use]
    pub fn new(locale: Locale, zone: Zone) -> Self {
        Self { locale, zone }
    }

    /// Parse a locale name such as `es_CL` or `es-CL`.
    #[must_use]
    pub fn parse_locale(name: &str) -> Option<Locale> {
        Locale::try_from(name.trim().replace('-', "_").as_str()).ok()
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Format an instant, or the placeholder if there is none.
    #[must_use]
    pub fn format(&self, instant: Option<DateTime<Utc>>) -> String {
        let Some(instant) = instant else {
            return MISSING_TIMESTAMP.to_string();
        };

        match self.zone {
            Zone::Local => instant
                .with_timezone(&Local)
                .format_localized(TIMESTAMP_PATTERN, self.locale)
                .to_string(),
            Zone::Fixed(offset) => instant
                .with_timezone(&offset)
                .format_localized(TIMESTAMP_PATTERN, self.locale)
                .to_string(),
        }
    }

    /// Format the current instant.
    #[must_use]
    pub fn now(&self) -> String {
        self.format(Some(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc_formatter(locale: Locale) -> TimestampFormatter {
        TimestampFormatter::new(locale, Zone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    #[test]
    fn test_players_all_combinations() {
        assert_eq!(format_players(Some(5.0), Some(20.0)), "5/20");
        assert_eq!(format_players(Some(5.0), None), "5");
        assert_eq!(format_players(None, Some(20.0)), "—/20");
        assert_eq!(format_players(None, None), "—");
    }

    #[test]
    fn test_players_non_finite_is_unknown() {
        assert_eq!(format_players(Some(f64::NAN), Some(20.0)), "—/20");
        assert_eq!(format_players(Some(3.0), Some(f64::INFINITY)), "3");
    }

    #[test]
    fn test_players_fractional_counts() {
        assert_eq!(format_players(Some(2.5), Some(10.0)), "2.5/10");
    }

    #[test]
    fn test_normalize_number_inputs() {
        assert_eq!(normalize_number(Some(&json!(12))), Some(12.0));
        assert_eq!(normalize_number(Some(&json!(" 7 "))), Some(7.0));
        assert_eq!(normalize_number(Some(&json!("abc"))), None);
        assert_eq!(normalize_number(Some(&json!(""))), None);
        assert_eq!(normalize_number(Some(&json!("Infinity"))), None);
        assert_eq!(normalize_number(Some(&json!("NaN"))), None);
        assert_eq!(normalize_number(Some(&json!(true))), None);
        assert_eq!(normalize_number(Some(&Value::Null)), None);
        assert_eq!(normalize_number(None), None);
    }

    #[test]
    fn test_players_from_raw_values() {
        let players = normalize_number(Some(&json!("8")));
        let max = normalize_number(Some(&json!({"nested": 1})));
        assert_eq!(format_players(players, max), "8");
    }

    #[test]
    fn test_address_preference() {
        assert_eq!(format_address(Some("38.225.91.40"), Some(2702), Some("play.example")), "38.225.91.40:2702");
        assert_eq!(format_address(Some("38.225.91.40"), None, None), "38.225.91.40");
        assert_eq!(format_address(None, Some(2702), Some("play.example")), "play.example");
        assert_eq!(format_address(Some(""), None, Some("")), MISSING_ADDRESS);
    }

    #[test]
    fn test_missing_timestamp_placeholder() {
        assert_eq!(utc_formatter(Locale::en_US).format(None), MISSING_TIMESTAMP);
    }

    #[test]
    fn test_timestamp_fixed_locale_and_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(utc_formatter(Locale::en_US).format(Some(instant)), "01 Jan, 00:00");
    }

    #[test]
    fn test_timestamp_applies_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let santiago = FixedOffset::west_opt(3 * 3600).unwrap();
        let formatter = TimestampFormatter::new(Locale::en_US, Zone::Fixed(santiago));
        assert_eq!(formatter.format(Some(instant)), "31 Dec, 21:00");
    }

    #[test]
    fn test_timestamp_spanish_month() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 13, 5, 0).unwrap();
        let formatted = utc_formatter(Locale::es_CL).format(Some(instant));
        assert!(formatted.starts_with("15 ene"), "unexpected: {formatted}");
        assert!(formatted.ends_with("13:05"), "unexpected: {formatted}");
    }

    #[test]
    fn test_parse_locale_names() {
        assert_eq!(TimestampFormatter::parse_locale("es-CL"), Some(Locale::es_CL));
        assert_eq!(TimestampFormatter::parse_locale("en_US"), Some(Locale::en_US));
        assert_eq!(TimestampFormatter::parse_locale("xx_YY"), None);
    }
}
