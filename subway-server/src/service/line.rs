//! Line use cases, including the topology edits
//!
//! Every edit follows the same steps: load the line's sections into a
//! [`Sections`], apply the change in memory, then hand the resulting
//! [`subway_core::SectionDiff`] to the store in one call.

use std::collections::BTreeMap;
use std::sync::Arc;

use subway_core::{
    Line, LineId, NewLine, Section, SectionError, Sections, Station, StationId, StationName,
    ValidationError,
};

use super::station::StationService;
use super::{Result, ServiceError};
use crate::db::{LineRepository, SectionRepository};

/// A line together with its ordered sections
#[derive(Debug, Clone)]
pub struct LineDetail {
    pub line: Line,
    pub sections: Sections,
}

impl LineDetail {
    /// Stations in travel order
    pub fn stations(&self) -> Vec<&Station> {
        self.sections.stations()
    }
}

/// Request to put a station on a line
#[derive(Debug, Clone)]
pub struct AddStation {
    /// Station the new one follows; `None` makes the new station the up terminus
    pub pre_station: Option<StationName>,
    pub station: StationName,
    pub distance: i32,
}

#[derive(Clone)]
pub struct LineService {
    lines: Arc<dyn LineRepository>,
    sections: Arc<dyn SectionRepository>,
    stations: StationService,
}

impl LineService {
    pub fn new(
        lines: Arc<dyn LineRepository>,
        sections: Arc<dyn SectionRepository>,
        stations: StationService,
    ) -> Self {
        Self {
            lines,
            sections,
            stations,
        }
    }

    pub async fn create(&self, attrs: NewLine) -> Result<LineDetail> {
        if self.lines.find_by_name(&attrs.name).await?.is_some() {
            return Err(ServiceError::Duplicate {
                resource: "line",
                name: attrs.name.to_string(),
            });
        }

        let line = self.lines.save(&attrs).await?;
        tracing::info!(line_id = %line.id, name = %line.name, "line created");
        Ok(LineDetail {
            sections: Sections::empty(line.id),
            line,
        })
    }

    /// All lines with their sections, loaded in two queries.
    pub async fn list(&self) -> Result<Vec<LineDetail>> {
        let lines = self.lines.find_all().await?;

        let mut by_line: BTreeMap<LineId, Vec<Section>> = BTreeMap::new();
        for section in self.sections.find_all().await? {
            by_line.entry(section.line_id()).or_default().push(section);
        }

        lines
            .into_iter()
            .map(|line| -> Result<LineDetail> {
                let sections = by_line.remove(&line.id).unwrap_or_default();
                Ok(LineDetail {
                    sections: Sections::new(line.id, sections)?,
                    line,
                })
            })
            .collect()
    }

    pub async fn find(&self, id: LineId) -> Result<LineDetail> {
        let line = self.line(id).await?;
        let sections = self.load_sections(id).await?;
        Ok(LineDetail { line, sections })
    }

    /// Replace a line's attributes. Keeping the current name is allowed.
    pub async fn update(&self, id: LineId, attrs: NewLine) -> Result<()> {
        self.line(id).await?;
        if let Some(other) = self.lines.find_by_name(&attrs.name).await? {
            if other.id != id {
                return Err(ServiceError::Duplicate {
                    resource: "line",
                    name: attrs.name.to_string(),
                });
            }
        }

        if !self.lines.update(id, &attrs).await? {
            return Err(ServiceError::not_found("line", id));
        }
        tracing::info!(line_id = %id, "line updated");
        Ok(())
    }

    /// Delete a line and every section on it.
    pub async fn delete(&self, id: LineId) -> Result<()> {
        self.line(id).await?;
        let sections = self.sections.delete_by_line_id(id).await?;
        if !self.lines.delete_by_id(id).await? {
            return Err(ServiceError::not_found("line", id));
        }
        tracing::info!(line_id = %id, sections, "line deleted");
        Ok(())
    }

    /// Put a station on a line, creating the station if it does not exist.
    ///
    /// With a pre-station the new section runs `pre -> station` and either
    /// extends the down terminus or splits the section leaving `pre`.
    /// Without one the station becomes the new up terminus.
    pub async fn add_station(&self, line_id: LineId, request: AddStation) -> Result<LineDetail> {
        let line = self.line(line_id).await?;
        if request.distance <= 0 {
            return Err(SectionError::InvalidDistance {
                distance: request.distance,
            }
            .into());
        }

        let before = self.load_sections(line_id).await?;
        let pre_station = match &request.pre_station {
            Some(name) => Some(self.stations.find_by_name(name).await?),
            None if before.is_empty() => {
                return Err(ValidationError::Empty {
                    field: "preStationName",
                }
                .into())
            }
            None => None,
        };
        // an unsaved station compares by name, so the edit is checked
        // before a missing station is written
        let candidate = Station::new(request.station.clone());
        let section = placed_section(&before, pre_station.clone(), candidate, request.distance)?;
        before.clone().add(section)?;

        let station = self.stations.find_or_create(&request.station).await?;
        let section = placed_section(&before, pre_station, station.clone(), request.distance)?;
        let mut after = before.clone();
        after.add(section)?;
        self.sections.apply(&after.diff(&before)).await?;

        tracing::info!(
            line_id = %line_id,
            station_id = ?station.id(),
            distance = request.distance,
            "station added to line"
        );

        Ok(LineDetail {
            line,
            sections: self.load_sections(line_id).await?,
        })
    }

    /// Take a station off a line, merging the two sections around it.
    pub async fn remove_station(&self, line_id: LineId, station_id: StationId) -> Result<()> {
        self.line(line_id).await?;
        let station = self.stations.find(station_id).await?;

        let before = self.load_sections(line_id).await?;
        let mut after = before.clone();
        after.remove_station(&station)?;
        self.sections.apply(&after.diff(&before)).await?;

        tracing::info!(line_id = %line_id, station_id = %station_id, "station removed from line");
        Ok(())
    }

    /// Stations of a line in travel order.
    pub async fn line_stations(&self, id: LineId) -> Result<Vec<Station>> {
        let detail = self.find(id).await?;
        Ok(detail.stations().into_iter().cloned().collect())
    }

    async fn line(&self, id: LineId) -> Result<Line> {
        self.lines
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("line", id))
    }

    async fn load_sections(&self, id: LineId) -> Result<Sections> {
        let sections = self.sections.find_by_line_id(id).await?;
        Ok(Sections::new(id, sections)?)
    }
}

/// Section joining `station` to the line: after `pre` when given, otherwise
/// in front of the current up terminus.
fn placed_section(
    before: &Sections,
    pre: Option<Station>,
    station: Station,
    distance: i32,
) -> Result<Section> {
    let line_id = before.line_id();
    let section = match pre {
        Some(pre) => Section::new(line_id, pre, station, distance)?,
        None => {
            let first = before
                .stations()
                .first()
                .map(|s| (*s).clone())
                .ok_or(SectionError::BrokenPath {
                    line_id,
                    reason: "line has no up terminus",
                })?;
            Section::new(line_id, station, first, distance)?
        }
    };
    Ok(section)
}
