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

//! Status payload decoding.
//!
//! The status endpoint follows the BattleMetrics server resource layout:
//!
//! ```text
//! { "data": { "attributes": { "players", "maxPlayers", "updatedAt",
//!             "details": { "updatedAt", "lastUpdated" } } } }
//! ```
//!
//! Every field is optional. Extraction never fails; a payload of the wrong
//! shape simply yields an empty snapshot.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::format::{format_address, format_players, normalize_number};

/// Values extracted from one successful status response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSnapshot {
    /// Players currently online.
    pub players_current: Option<f64>,
    /// Player capacity.
    pub players_max: Option<f64>,
    /// Raw "last updated" value, the first truthy of the fallback fields.
    pub updated_at: Option<Value>,
    /// Server display name.
    pub name: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    /// Hostname-style address, used when no IP is reported.
    pub address: Option<String>,
}

impl ServerSnapshot {
    /// Build a snapshot from a decoded JSON payload.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let empty = Map::new();
        let attrs = payload
            .get("data")
            .and_then(|data| data.get("attributes"))
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let details = attrs.get("details");

        let updated_at = [
            attrs.get("updatedAt"),
            details.and_then(|d| d.get("updatedAt")),
            details.and_then(|d| d.get("lastUpdated")),
        ]
        .into_iter()
        .flatten()
        .find(|value| is_truthy(value))
        .cloned();

        Self {
            players_current: normalize_number(attrs.get("players")),
            players_max: normalize_number(attrs.get("maxPlayers")),
            updated_at,
            name: string_field(attrs, "name"),
            ip: string_field(attrs, "ip"),
            port: attrs
                .get("port")
                .and_then(Value::as_u64)
                .and_then(|p| u16::try_from(p).ok()),
            address: string_field(attrs, "address"),
        }
    }

    /// The players slot text.
    #[must_use]
    pub fn players(&self) -> String {
        format_players(self.players_current, self.players_max)
    }

    /// The server address, `ip:port` when available.
    #[must_use]
    pub fn display_address(&self) -> String {
        format_address(self.ip.as_deref(), self.port, self.address.as_deref())
    }

    /// Parsed "last updated" instant, `None` when absent or unparseable.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_ref().and_then(parse_timestamp)
    }
}

fn string_field(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a timestamp value.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DDTHH:MM:SS` strings (read as
/// UTC), bare dates, and numbers as milliseconds since the Unix epoch.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_f64().filter(|f| f.is_finite())?;
            #[allow(clippy::cast_possible_truncation, reason = "epoch millis fit in i64")]
            let millis = millis.trunc() as i64;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
