//! Wire formats shared by the route handlers
//!
//! - times travel as `HH:mm` (`HH:mm:ss` is accepted on input)
//! - distances may arrive as a JSON number or a numeric string

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use subway_core::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

pub fn format_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format(TIME_FORMAT).to_string())
}

/// Parse an optional `HH:mm` field. Missing and blank both mean "not set".
pub fn parse_time(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveTime>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| ValidationError::InvalidFormat {
            field,
            reason: "expected HH:mm",
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// Deserialize an `i32` sent either as a number or as a numeric string.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s)))?,
    };
    i32::try_from(value).map_err(|_| serde::de::Error::custom("number out of range"))
}
