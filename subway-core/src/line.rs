//! Line model - a named, colored route with an optional timetable
//!
//! The line's sections live in [`crate::Sections`]; this module only
//! holds the line's own attributes.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::{validate_name, ValidationError};

/// Maximum length for line names (characters)
const MAX_LINE_NAME_LEN: usize = 255;

/// Color token such as `bg-red-600` or `#ff0000`
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?[a-z0-9][a-z0-9_-]{0,31}$").expect("invalid color regex"));

/// Store-assigned line identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub i64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated line name (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineName(String);

impl LineName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_name("line name", s, MAX_LINE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated line color
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineColor(String);

impl LineColor {
    /// Create a line color.
    ///
    /// # Rules
    /// - Max 32 characters after an optional leading `#`
    /// - Lowercase alphanumeric, hyphens, underscores
    ///
    /// # Example
    /// ```
    /// use subway_core::LineColor;
    ///
    /// assert!(LineColor::new("bg-red-600").is_ok());
    /// assert!(LineColor::new("#ff0000").is_ok());
    /// assert!(LineColor::new("Red").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "line color" });
        }
        if !COLOR_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "line color",
                reason: "must be a lowercase color token such as bg-red-600",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Line attributes supplied on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    pub name: LineName,
    pub color: LineColor,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Minutes between trains
    pub interval_time: Option<i32>,
}

impl NewLine {
    pub fn new(name: &str, color: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: LineName::new(name)?,
            color: LineColor::new(color)?,
            start_time: None,
            end_time: None,
            interval_time: None,
        })
    }

    /// Attach a timetable. Service may run past midnight, so the end time
    /// is allowed to be earlier than the start time.
    pub fn with_schedule(
        mut self,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        interval_time: Option<i32>,
    ) -> Result<Self, ValidationError> {
        if let Some(minutes) = interval_time {
            if minutes <= 0 {
                return Err(ValidationError::NotPositive {
                    field: "intervalTime",
                    value: i64::from(minutes),
                });
            }
        }
        self.start_time = start_time;
        self.end_time = end_time;
        self.interval_time = interval_time;
        Ok(self)
    }
}

/// Persisted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub name: LineName,
    pub color: LineColor,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub interval_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Line {
    /// Build the persisted line from its stored attributes.
    pub fn from_parts(
        id: LineId,
        attrs: NewLine,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: attrs.name,
            color: attrs.color,
            start_time: attrs.start_time,
            end_time: attrs.end_time,
            interval_time: attrs.interval_time,
            created_at,
            updated_at,
        }
    }

    /// Overwrite the editable attributes, keeping id and creation time.
    pub fn apply(&mut self, attrs: NewLine, updated_at: DateTime<Utc>) {
        self.name = attrs.name;
        self.color = attrs.color;
        self.start_time = attrs.start_time;
        self.end_time = attrs.end_time;
        self.interval_time = attrs.interval_time;
        self.updated_at = updated_at;
    }
}
