//! Structured error types for section and line topology operations.
//!
//! Every variant is a deterministic outcome of the input state; none of
//! them is transient. The HTTP layer reports all of them as client errors.

use thiserror::Error;

use crate::line::LineId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// Section distance must be strictly positive
    #[error("distance must be greater than 0 km (got {distance})")]
    InvalidDistance { distance: i32 },

    /// A section cannot start and end at the same station
    #[error("up and down station must differ (both are '{station}')")]
    SameStation { station: String },

    /// Shrinking a section would leave it with a non-positive distance
    #[error("cannot shorten a {distance} km section by {amount} km")]
    DistanceUnderflow { distance: i32, amount: i32 },

    /// Merge requires the two sections to share exactly one endpoint
    #[error("sections {first} and {second} are not adjacent")]
    NotAdjacent { first: String, second: String },

    /// Merged distance does not fit in an i32
    #[error("merging {first} km and {second} km sections exceeds the maximum distance")]
    DistanceOverflow { first: i32, second: i32 },

    /// Merge across lines is meaningless
    #[error("sections belong to different lines ({first} and {second})")]
    DifferentLines { first: LineId, second: LineId },

    /// Section handed to a line it does not belong to
    #[error("section of line {found} cannot be placed on line {expected}")]
    ForeignSection { expected: LineId, found: LineId },

    /// Stored sections are not a single up-to-down path
    #[error("sections of line {line_id} do not form a single path: {reason}")]
    BrokenPath { line_id: LineId, reason: &'static str },

    /// Both endpoints of a new section are already on the line
    #[error("stations '{up}' and '{down}' are both already on the line")]
    AlreadyLinked { up: String, down: String },

    /// Neither endpoint of a new section is on the line
    #[error("neither '{up}' nor '{down}' is on the line")]
    NotConnected { up: String, down: String },

    /// Inserted section is not shorter than the section it splits
    #[error("new section ({distance} km) must be shorter than the section it splits ({existing} km)")]
    TooLong { distance: i32, existing: i32 },

    /// Station is not an endpoint of any section on the line
    #[error("station '{station}' is not on the line")]
    StationNotOnLine { station: String },
}

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, SectionError>;
