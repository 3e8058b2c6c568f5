//! Lenient timestamp parsing for request bodies.
//!
//! Accepts RFC 3339 and zone-less `YYYY-MM-DDTHH:MM[:SS[.f]]` (read as UTC).
//! Values are truncated to microseconds, the precision `TIMESTAMPTZ` stores,
//! so both stores compare and return the same instant.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc())
        })?;
    Some(parsed.trunc_subsecs(6))
}

/// `deserialize_with` for `Option<DateTime<Utc>>`; `null` is `None`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))),
        None => Ok(None),
    }
}

/// `deserialize_with` for patch fields: omitted is `None` (via
/// `#[serde(default)]`), explicit `null` is `Some(None)`.
pub fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(deserializer).map(Some)
}

/// Same as [`nullable`] for any other field type.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
