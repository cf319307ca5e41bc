//! Station use cases

use std::sync::Arc;

use subway_core::{Station, StationId, StationName};

use super::{Result, ServiceError};
use crate::db::{DbError, SectionRepository, StationRepository};

#[derive(Clone)]
pub struct StationService {
    stations: Arc<dyn StationRepository>,
    sections: Arc<dyn SectionRepository>,
}

impl StationService {
    pub fn new(
        stations: Arc<dyn StationRepository>,
        sections: Arc<dyn SectionRepository>,
    ) -> Self {
        Self { stations, sections }
    }

    /// Create a station, refusing a name that is already taken.
    pub async fn create(&self, name: &str) -> Result<Station> {
        let name = StationName::new(name)?;
        if self.stations.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::Duplicate {
                resource: "station",
                name: name.into_string(),
            });
        }

        let station = self.stations.save(&name).await?;
        tracing::info!(station_id = ?station.id(), name = %station.name(), "station created");
        Ok(station)
    }

    pub async fn list(&self) -> Result<Vec<Station>> {
        Ok(self.stations.find_all().await?)
    }

    pub async fn find(&self, id: StationId) -> Result<Station> {
        self.stations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("station", id))
    }

    pub async fn find_by_name(&self, name: &StationName) -> Result<Station> {
        self.stations
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::not_found("station", name))
    }

    /// Look a station up by name, creating it when missing.
    pub async fn find_or_create(&self, name: &StationName) -> Result<Station> {
        if let Some(station) = self.stations.find_by_name(name).await? {
            return Ok(station);
        }
        match self.stations.save(name).await {
            Ok(station) => {
                tracing::info!(station_id = ?station.id(), name = %name, "station created");
                Ok(station)
            }
            // lost a race with a concurrent insert of the same name
            Err(DbError::Duplicate { .. }) => self.find_by_name(name).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a station that no line uses any more.
    pub async fn delete(&self, id: StationId) -> Result<()> {
        let station = self.find(id).await?;
        if self.sections.is_station_used(id).await? {
            return Err(ServiceError::StationInUse {
                name: station.name().to_string(),
            });
        }

        if !self.stations.delete_by_id(id).await? {
            return Err(ServiceError::not_found("station", id));
        }
        tracing::info!(station_id = %id, "station deleted");
        Ok(())
    }
}
