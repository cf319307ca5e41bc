//! Application services
//!
//! Services own the use cases: they load the current state through the
//! repository traits, run the domain rules from `subway-core`, and write
//! the result back. Absence becomes [`ServiceError::NotFound`] here.

pub mod line;
pub mod station;

use subway_core::{SectionError, ValidationError};

use crate::db::DbError;

pub use line::{AddStation, LineDetail, LineService};
pub use station::StationService;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Topology rule or section precondition violated
    #[error(transparent)]
    Section(#[from] SectionError),

    #[error("{resource} '{name}' already exists")]
    Duplicate { resource: &'static str, name: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("station '{name}' is still part of a line")]
    StationInUse { name: String },

    #[error(transparent)]
    Db(DbError),
}

impl ServiceError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Duplicate { resource, name } => Self::Duplicate { resource, name },
            other => Self::Db(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_from_store_keeps_its_kind() {
        let err = ServiceError::from(DbError::Duplicate {
            resource: "station",
            name: "강남역".into(),
        });
        assert!(matches!(err, ServiceError::Duplicate { resource: "station", .. }));
        assert_eq!(err.to_string(), "station '강남역' already exists");
    }

    #[test]
    fn other_store_errors_stay_internal() {
        let err = ServiceError::from(DbError::Unsaved { resource: "station" });
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
