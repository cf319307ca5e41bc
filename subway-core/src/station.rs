//! Station identity
//!
//! A station is persisted once and never mutated afterwards. Two stations
//! are equal by id when both carry one, and by name otherwise. That rule
//! is not transitive across persisted and unpersisted values, so `Station`
//! is `PartialEq` only and topologies are built from persisted stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{validate_name, ValidationError};

/// Maximum length for station names (characters)
const MAX_STATION_NAME_LEN: usize = 255;

/// Store-assigned station identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub i64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated station name (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationName(String);

impl StationName {
    /// Create a station name.
    ///
    /// # Example
    /// ```
    /// use subway_core::StationName;
    ///
    /// assert_eq!(StationName::new(" 잠실역 ").unwrap().as_str(), "잠실역");
    /// assert!(StationName::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_name("station name", s, MAX_STATION_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    id: Option<StationId>,
    name: StationName,
}

impl Station {
    /// A station that has not been saved yet.
    pub fn new(name: StationName) -> Self {
        Self { id: None, name }
    }

    /// A station loaded from the store.
    pub fn persisted(id: StationId, name: StationName) -> Self {
        Self { id: Some(id), name }
    }

    pub fn id(&self) -> Option<StationId> {
        self.id
    }

    pub fn name(&self) -> &StationName {
        &self.name
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name,
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> StationName {
        StationName::new(s).unwrap()
    }

    #[test]
    fn persisted_stations_compare_by_id() {
        let a = Station::persisted(StationId(1), name("강남역"));
        let renamed = Station::persisted(StationId(1), name("강남"));
        let other = Station::persisted(StationId(2), name("강남역"));

        assert_eq!(a, renamed);
        assert_ne!(a, other);
    }

    #[test]
    fn unsaved_stations_compare_by_name() {
        assert_eq!(Station::new(name("역삼역")), Station::new(name("역삼역")));
        assert_ne!(Station::new(name("역삼역")), Station::new(name("선릉역")));
    }

    #[test]
    fn mixed_comparison_falls_back_to_name() {
        let saved = Station::persisted(StationId(7), name("역삼역"));
        assert_eq!(saved, Station::new(name("역삼역")));
        assert_ne!(saved, Station::new(name("선릉역")));
    }

    #[test]
    fn rejects_empty_name() {
        let err = StationName::new("  ").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length() {
        assert!(StationName::new(&"가".repeat(255)).is_ok());
        let err = StationName::new(&"가".repeat(256)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 255, .. }));
    }
}
