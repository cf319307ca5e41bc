//! Route handlers organized by resource

pub mod health;
pub mod lines;
pub mod stations;

use serde::Serialize;
use subway_core::{Station, StationId};

/// Station as it appears in every response
#[derive(Debug, Serialize)]
pub struct StationResponse {
    pub id: Option<StationId>,
    pub name: String,
}

impl From<&Station> for StationResponse {
    fn from(s: &Station) -> Self {
        Self {
            id: s.id(),
            name: s.name().to_string(),
        }
    }
}
