//! subway-core: domain model for the subway admin backend
//!
//! Stations, lines and the sections linking them, plus the topology
//! edits (split on insert, merge on removal) that keep a line a single
//! connected path.

pub mod config;
pub mod error;
pub mod line;
pub mod section;
pub mod sections;
pub mod station;
pub mod validation;

pub use config::{DatabaseSection, SubwayConfig};
pub use error::{Result, SectionError};
pub use line::{Line, LineColor, LineId, LineName, NewLine};
pub use section::{Section, SectionId};
pub use sections::{SectionDiff, Sections};
pub use station::{Station, StationId, StationName};
pub use validation::ValidationError;
