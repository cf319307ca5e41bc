//! Section - one directed track segment of a line
//!
//! A section links `up_station -> down_station` on a single line with a
//! strictly positive distance. Identity is `(line_id, up, down)`; the
//! distance and the store id do not take part in equality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SectionError};
use crate::line::LineId;
use crate::station::Station;

/// Store-assigned section identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub i64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    id: Option<SectionId>,
    line_id: LineId,
    up_station: Station,
    down_station: Station,
    distance: i32,
}

impl Section {
    /// Create an unsaved section.
    ///
    /// Fails with [`SectionError::InvalidDistance`] when `distance <= 0` and
    /// with [`SectionError::SameStation`] when both endpoints are equal.
    pub fn new(
        line_id: LineId,
        up_station: Station,
        down_station: Station,
        distance: i32,
    ) -> Result<Self> {
        Self::build(None, line_id, up_station, down_station, distance)
    }

    /// Rebuild a section loaded from the store.
    pub fn with_id(
        id: SectionId,
        line_id: LineId,
        up_station: Station,
        down_station: Station,
        distance: i32,
    ) -> Result<Self> {
        Self::build(Some(id), line_id, up_station, down_station, distance)
    }

    fn build(
        id: Option<SectionId>,
        line_id: LineId,
        up_station: Station,
        down_station: Station,
        distance: i32,
    ) -> Result<Self> {
        if distance <= 0 {
            return Err(SectionError::InvalidDistance { distance });
        }
        ensure_distinct(&up_station, &down_station)?;
        Ok(Self {
            id,
            line_id,
            up_station,
            down_station,
            distance,
        })
    }

    pub fn id(&self) -> Option<SectionId> {
        self.id
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    pub fn up_station(&self) -> &Station {
        &self.up_station
    }

    pub fn down_station(&self) -> &Station {
        &self.down_station
    }

    pub fn distance(&self) -> i32 {
        self.distance
    }

    /// True if either station is one of this section's endpoints.
    pub fn have_station(&self, up_station: &Station, down_station: &Station) -> bool {
        self.is_same_up_station(up_station)
            || self.is_same_up_station(down_station)
            || self.is_same_down_station(up_station)
            || self.is_same_down_station(down_station)
    }

    pub fn is_same_up_station(&self, station: &Station) -> bool {
        self.up_station == *station
    }

    pub fn is_same_down_station(&self, station: &Station) -> bool {
        self.down_station == *station
    }

    /// Replace both endpoints in place. The distance is left untouched.
    pub fn update_stations(&mut self, up_station: Station, down_station: Station) -> Result<()> {
        ensure_distinct(&up_station, &down_station)?;
        self.up_station = up_station;
        self.down_station = down_station;
        Ok(())
    }

    pub fn is_longer_than(&self, distance: i32) -> bool {
        self.distance > distance
    }

    /// Shorten this section by `distance`.
    ///
    /// Callers gate this with [`Section::is_longer_than`]; a subtraction
    /// that would leave a non-positive distance is refused and the section
    /// is left unchanged.
    pub fn subtract_distance(&mut self, distance: i32) -> Result<()> {
        if distance <= 0 {
            return Err(SectionError::InvalidDistance { distance });
        }
        if !self.is_longer_than(distance) {
            return Err(SectionError::DistanceUnderflow {
                distance: self.distance,
                amount: distance,
            });
        }
        self.distance -= distance;
        Ok(())
    }

    /// True when `other` is the same stored row with rewritten endpoints.
    pub fn is_update(&self, other: &Section) -> bool {
        self.id.is_some()
            && self.id == other.id
            && !(self.is_same_up_station(&other.up_station)
                && self.is_same_down_station(&other.down_station))
    }

    /// Collapse two adjacent sections into one spanning their outer
    /// stations, with the summed distance.
    ///
    /// The upstream side is detected from the shared station, so
    /// `a.merge(&b)` and `b.merge(&a)` produce the same section. The result
    /// carries no id. Fails with [`SectionError::DistanceOverflow`] when the
    /// summed distance does not fit the distance type.
    pub fn merge(&self, other: &Section) -> Result<Section> {
        if self.line_id != other.line_id {
            return Err(SectionError::DifferentLines {
                first: self.line_id,
                second: other.line_id,
            });
        }

        let down_to_up = self.is_same_down_station(&other.up_station);
        let up_to_down = self.is_same_up_station(&other.down_station);
        let distance = self.distance.checked_add(other.distance).ok_or(
            SectionError::DistanceOverflow {
                first: self.distance,
                second: other.distance,
            },
        )?;

        match (down_to_up, up_to_down) {
            (true, false) => Section::new(
                self.line_id,
                self.up_station.clone(),
                other.down_station.clone(),
                distance,
            ),
            (false, true) => Section::new(
                self.line_id,
                other.up_station.clone(),
                self.down_station.clone(),
                distance,
            ),
            // (true, true) is a two-station loop, (false, false) shares nothing
            _ => Err(SectionError::NotAdjacent {
                first: self.to_string(),
                second: other.to_string(),
            }),
        }
    }
}

fn ensure_distinct(up_station: &Station, down_station: &Station) -> Result<()> {
    if up_station == down_station {
        return Err(SectionError::SameStation {
            station: up_station.to_string(),
        });
    }
    Ok(())
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.line_id == other.line_id
            && self.up_station == other.up_station
            && self.down_station == other.down_station
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} km)",
            self.up_station, self.down_station, self.distance
        )
    }
}
