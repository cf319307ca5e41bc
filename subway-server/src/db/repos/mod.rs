//! Repository contracts and their PostgreSQL implementations
//!
//! Services only see the traits. `Pg*Repo` types talk to PostgreSQL,
//! [`crate::db::MemoryStore`] implements all three traits in process.

pub mod lines;
pub mod sections;
pub mod stations;

use async_trait::async_trait;
use subway_core::{
    Line, LineId, LineName, NewLine, Section, SectionDiff, SectionId, Station, StationId,
    StationName,
};

pub use lines::PgLineRepo;
pub use sections::PgSectionRepo;
pub use stations::PgStationRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Unique name constraint violated
    #[error("{resource} '{name}' already exists")]
    Duplicate { resource: &'static str, name: String },

    /// Operation needs a stored row but got an unsaved value
    #[error("{resource} has not been saved yet")]
    Unsaved { resource: &'static str },

    /// Stored row no longer satisfies domain rules
    #[error("corrupt {resource} row {id}: {reason}")]
    Corrupt {
        resource: &'static str,
        id: i64,
        reason: String,
    },
}

impl DbError {
    /// Map a unique-constraint violation to `Duplicate`, pass anything else through.
    pub(crate) fn from_insert(err: sqlx::Error, resource: &'static str, name: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Duplicate {
                resource,
                name: name.to_owned(),
            },
            _ => Self::Sqlx(err),
        }
    }

    pub(crate) fn corrupt(resource: &'static str, id: i64, reason: impl ToString) -> Self {
        Self::Corrupt {
            resource,
            id,
            reason: reason.to_string(),
        }
    }
}

/// Persistence contract for stations
#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn save(&self, name: &StationName) -> Result<Station, DbError>;

    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, DbError>;

    async fn find_by_name(&self, name: &StationName) -> Result<Option<Station>, DbError>;

    async fn find_all(&self) -> Result<Vec<Station>, DbError>;

    /// Returns whether a row was deleted
    async fn delete_by_id(&self, id: StationId) -> Result<bool, DbError>;
}

/// Persistence contract for lines
#[async_trait]
pub trait LineRepository: Send + Sync {
    async fn save(&self, line: &NewLine) -> Result<Line, DbError>;

    async fn find_all(&self) -> Result<Vec<Line>, DbError>;

    async fn find_by_id(&self, id: LineId) -> Result<Option<Line>, DbError>;

    async fn find_by_name(&self, name: &LineName) -> Result<Option<Line>, DbError>;

    /// Returns whether a row was updated
    async fn update(&self, id: LineId, line: &NewLine) -> Result<bool, DbError>;

    /// Returns whether a row was deleted
    async fn delete_by_id(&self, id: LineId) -> Result<bool, DbError>;
}

/// Persistence contract for sections
#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn save(&self, section: &Section) -> Result<SectionId, DbError>;

    async fn find_by_id(&self, id: SectionId) -> Result<Option<Section>, DbError>;

    async fn find_by_line_id(&self, line_id: LineId) -> Result<Vec<Section>, DbError>;

    async fn find_all(&self) -> Result<Vec<Section>, DbError>;

    /// Rewrite endpoints and distance of a stored section
    async fn update(&self, section: &Section) -> Result<bool, DbError>;

    /// Returns the number of rows deleted
    async fn delete_sections(&self, sections: &[Section]) -> Result<u64, DbError>;

    async fn delete_by_line_id(&self, line_id: LineId) -> Result<u64, DbError>;

    /// True if the station is an endpoint of any section on any line
    async fn is_station_used(&self, station_id: StationId) -> Result<bool, DbError>;

    /// Write one topology edit atomically
    async fn apply(&self, diff: &SectionDiff) -> Result<(), DbError>;
}

/// Id of a station that must already be stored
pub(crate) fn stored_station_id(station: &Station) -> Result<i64, DbError> {
    station
        .id()
        .map(|id| id.0)
        .ok_or(DbError::Unsaved { resource: "station" })
}

/// Ids of the stored sections in `sections`
pub(crate) fn stored_section_ids(sections: &[Section]) -> Vec<i64> {
    sections.iter().filter_map(|s| s.id()).map(|id| id.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsaved_station_has_no_row_id() {
        let station = Station::new(StationName::new("강남역").unwrap());
        assert!(matches!(
            stored_station_id(&station),
            Err(DbError::Unsaved { resource: "station" })
        ));

        let saved = Station::persisted(StationId(4), StationName::new("강남역").unwrap());
        assert_eq!(stored_station_id(&saved).unwrap(), 4);
    }

    #[test]
    fn duplicate_message() {
        let err = DbError::Duplicate {
            resource: "line",
            name: "분당선".into(),
        };
        assert_eq!(err.to_string(), "line '분당선' already exists");
    }
}
