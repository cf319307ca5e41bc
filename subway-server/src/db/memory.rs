//! In-process store implementing every repository trait
//!
//! Used by the HTTP tests and by `subway serve --in-memory`. Each table
//! has its own id sequence, and every call holds one lock for its whole
//! duration, so an `apply` is as atomic here as a transaction is in
//! PostgreSQL. Sections keep station ids only and resolve the stations
//! on read, the way the SQL JOIN does.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use subway_core::{
    Line, LineId, LineName, NewLine, Section, SectionDiff, SectionId, Station, StationId,
    StationName,
};
use tokio::sync::Mutex;

use super::repos::{
    stored_station_id, DbError, LineRepository, SectionRepository, StationRepository,
};

#[derive(Debug, Clone, Copy)]
struct SectionRecord {
    line_id: i64,
    up_station_id: i64,
    down_station_id: i64,
    distance: i32,
}

#[derive(Debug, Default)]
struct Tables {
    stations: BTreeMap<i64, StationName>,
    lines: BTreeMap<i64, Line>,
    sections: BTreeMap<i64, SectionRecord>,
    station_seq: i64,
    line_seq: i64,
    section_seq: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {
    fn station(&self, id: i64) -> Option<Station> {
        self.stations
            .get(&id)
            .map(|name| Station::persisted(StationId(id), name.clone()))
    }

    fn section(&self, id: i64, record: &SectionRecord) -> Result<Section, DbError> {
        let endpoint = |station_id| {
            self.station(station_id).ok_or_else(|| {
                DbError::corrupt("section", id, format!("station {} missing", station_id))
            })
        };
        Section::with_id(
            SectionId(id),
            LineId(record.line_id),
            endpoint(record.up_station_id)?,
            endpoint(record.down_station_id)?,
            record.distance,
        )
        .map_err(|e| DbError::corrupt("section", id, e))
    }

    fn sections_where(
        &self,
        keep: impl Fn(&SectionRecord) -> bool,
    ) -> Result<Vec<Section>, DbError> {
        self.sections
            .iter()
            .filter(|(_, record)| keep(record))
            .map(|(&id, record)| self.section(id, record))
            .collect()
    }

    fn line_name_taken(&self, name: &LineName, except: Option<i64>) -> bool {
        self.lines
            .values()
            .any(|line| &line.name == name && Some(line.id.0) != except)
    }

    fn record(section: &Section) -> Result<SectionRecord, DbError> {
        Ok(SectionRecord {
            line_id: section.line_id().0,
            up_station_id: stored_station_id(section.up_station())?,
            down_station_id: stored_station_id(section.down_station())?,
            distance: section.distance(),
        })
    }

    fn insert_section(&mut self, section: &Section) -> Result<i64, DbError> {
        let record = Self::record(section)?;
        let id = next(&mut self.section_seq);
        self.sections.insert(id, record);
        Ok(id)
    }

    fn rewrite_section(&mut self, section: &Section) -> Result<bool, DbError> {
        let id = section
            .id()
            .ok_or(DbError::Unsaved { resource: "section" })?;
        let record = Self::record(section)?;
        match self.sections.get_mut(&id.0) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Shared in-memory database
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationRepository for MemoryStore {
    async fn save(&self, name: &StationName) -> Result<Station, DbError> {
        let mut tables = self.tables.lock().await;
        if tables.stations.values().any(|existing| existing == name) {
            return Err(DbError::Duplicate {
                resource: "station",
                name: name.to_string(),
            });
        }
        let id = next(&mut tables.station_seq);
        tables.stations.insert(id, name.clone());
        tracing::debug!(station_id = id, "station saved");
        Ok(Station::persisted(StationId(id), name.clone()))
    }

    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, DbError> {
        Ok(self.tables.lock().await.station(id.0))
    }

    async fn find_by_name(&self, name: &StationName) -> Result<Option<Station>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .stations
            .iter()
            .find(|(_, existing)| *existing == name)
            .map(|(&id, existing)| Station::persisted(StationId(id), existing.clone())))
    }

    async fn find_all(&self) -> Result<Vec<Station>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .stations
            .iter()
            .map(|(&id, name)| Station::persisted(StationId(id), name.clone()))
            .collect())
    }

    async fn delete_by_id(&self, id: StationId) -> Result<bool, DbError> {
        Ok(self.tables.lock().await.stations.remove(&id.0).is_some())
    }
}

#[async_trait]
impl LineRepository for MemoryStore {
    async fn save(&self, line: &NewLine) -> Result<Line, DbError> {
        let mut tables = self.tables.lock().await;
        if tables.line_name_taken(&line.name, None) {
            return Err(DbError::Duplicate {
                resource: "line",
                name: line.name.to_string(),
            });
        }
        let id = next(&mut tables.line_seq);
        let now = Utc::now();
        let saved = Line::from_parts(LineId(id), line.clone(), now, now);
        tables.lines.insert(id, saved.clone());
        tracing::debug!(line_id = id, "line saved");
        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Line>, DbError> {
        Ok(self.tables.lock().await.lines.values().cloned().collect())
    }

    async fn find_by_id(&self, id: LineId) -> Result<Option<Line>, DbError> {
        Ok(self.tables.lock().await.lines.get(&id.0).cloned())
    }

    async fn find_by_name(&self, name: &LineName) -> Result<Option<Line>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables.lines.values().find(|line| &line.name == name).cloned())
    }

    async fn update(&self, id: LineId, line: &NewLine) -> Result<bool, DbError> {
        let mut tables = self.tables.lock().await;
        if tables.line_name_taken(&line.name, Some(id.0)) {
            return Err(DbError::Duplicate {
                resource: "line",
                name: line.name.to_string(),
            });
        }
        match tables.lines.get_mut(&id.0) {
            Some(existing) => {
                existing.apply(line.clone(), Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: LineId) -> Result<bool, DbError> {
        let mut tables = self.tables.lock().await;
        let removed = tables.lines.remove(&id.0).is_some();
        if removed {
            tables.sections.retain(|_, record| record.line_id != id.0);
        }
        Ok(removed)
    }
}

#[async_trait]
impl SectionRepository for MemoryStore {
    async fn save(&self, section: &Section) -> Result<SectionId, DbError> {
        let id = self.tables.lock().await.insert_section(section)?;
        tracing::debug!(section_id = id, line_id = %section.line_id(), "section saved");
        Ok(SectionId(id))
    }

    async fn find_by_id(&self, id: SectionId) -> Result<Option<Section>, DbError> {
        let tables = self.tables.lock().await;
        tables
            .sections
            .get(&id.0)
            .map(|record| tables.section(id.0, record))
            .transpose()
    }

    async fn find_by_line_id(&self, line_id: LineId) -> Result<Vec<Section>, DbError> {
        let tables = self.tables.lock().await;
        tables.sections_where(|record| record.line_id == line_id.0)
    }

    async fn find_all(&self) -> Result<Vec<Section>, DbError> {
        let tables = self.tables.lock().await;
        tables.sections_where(|_| true)
    }

    async fn update(&self, section: &Section) -> Result<bool, DbError> {
        self.tables.lock().await.rewrite_section(section)
    }

    async fn delete_sections(&self, sections: &[Section]) -> Result<u64, DbError> {
        let mut tables = self.tables.lock().await;
        let deleted = sections
            .iter()
            .filter_map(|s| s.id())
            .filter(|id| tables.sections.remove(&id.0).is_some())
            .count();
        Ok(deleted as u64)
    }

    async fn delete_by_line_id(&self, line_id: LineId) -> Result<u64, DbError> {
        let mut tables = self.tables.lock().await;
        let before = tables.sections.len();
        tables.sections.retain(|_, record| record.line_id != line_id.0);
        Ok((before - tables.sections.len()) as u64)
    }

    async fn is_station_used(&self, station_id: StationId) -> Result<bool, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables.sections.values().any(|record| {
            record.up_station_id == station_id.0 || record.down_station_id == station_id.0
        }))
    }

    async fn apply(&self, diff: &SectionDiff) -> Result<(), DbError> {
        let mut tables = self.tables.lock().await;

        // validate everything before touching the tables
        for section in diff.added.iter().chain(&diff.updated) {
            Tables::record(section)?;
        }

        for id in diff.removed.iter().filter_map(|s| s.id()) {
            tables.sections.remove(&id.0);
        }
        for section in &diff.updated {
            tables.rewrite_section(section)?;
        }
        for section in &diff.added {
            tables.insert_section(section)?;
        }

        tracing::debug!(
            added = diff.added.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "section edit applied"
        );
        Ok(())
    }
}
