//! Line topology - the ordered chain of sections making up one line
//!
//! `Sections` keeps a line's sections ordered from the up terminus to the
//! down terminus and only accepts edits that keep them a single connected
//! path (no branches, no cycles):
//!
//! - inserting a station extends a terminus or splits an existing section
//! - removing an interior station merges its two sections
//! - removing a terminus drops its only section
//!
//! Edits work on in-memory values. [`Sections::diff`] turns the result
//! into the rows the store has to add, rewrite and delete.

use crate::error::{Result, SectionError};
use crate::line::LineId;
use crate::section::Section;
use crate::station::Station;

#[derive(Debug, Clone)]
pub struct Sections {
    line_id: LineId,
    /// Ordered up terminus first
    items: Vec<Section>,
}

/// Rows touched by one topology edit
#[derive(Debug, Clone, Default)]
pub struct SectionDiff {
    /// New sections without a store id
    pub added: Vec<Section>,
    /// Stored sections whose endpoints or distance changed
    pub updated: Vec<Section>,
    /// Stored sections no longer on the line
    pub removed: Vec<Section>,
}

impl SectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl Sections {
    pub fn empty(line_id: LineId) -> Self {
        Self {
            line_id,
            items: Vec::new(),
        }
    }

    /// Order an unordered list of sections into a single up-to-down path.
    ///
    /// Fails if any section belongs to another line, or if the sections
    /// branch, loop back on themselves, or fall apart into pieces.
    pub fn new(line_id: LineId, mut sections: Vec<Section>) -> Result<Self> {
        if let Some(foreign) = sections.iter().find(|s| s.line_id() != line_id) {
            return Err(SectionError::ForeignSection {
                expected: line_id,
                found: foreign.line_id(),
            });
        }
        if sections.is_empty() {
            return Ok(Self::empty(line_id));
        }

        let heads: Vec<usize> = (0..sections.len())
            .filter(|&i| {
                !sections
                    .iter()
                    .any(|other| other.is_same_down_station(sections[i].up_station()))
            })
            .collect();
        let head = match heads.as_slice() {
            [head] => *head,
            [] => return Err(broken(line_id, "the sections form a cycle")),
            _ => return Err(broken(line_id, "more than one up terminus")),
        };

        let mut ordered = Vec::with_capacity(sections.len());
        let mut current = sections.swap_remove(head);
        loop {
            let next = sections
                .iter()
                .position(|s| s.is_same_up_station(current.down_station()));
            ordered.push(current);
            match next {
                Some(i) => current = sections.swap_remove(i),
                None => break,
            }
        }
        if !sections.is_empty() {
            return Err(broken(line_id, "sections branch or are disconnected"));
        }

        let topology = Self {
            line_id,
            items: ordered,
        };
        let stations = topology.stations();
        let repeats = stations
            .iter()
            .enumerate()
            .any(|(i, s)| stations[..i].contains(s));
        if repeats {
            return Err(broken(line_id, "a station is visited twice"));
        }
        Ok(topology)
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Section] {
        &self.items
    }

    /// Stations in travel order, up terminus first.
    pub fn stations(&self) -> Vec<&Station> {
        let Some(first) = self.items.first() else {
            return Vec::new();
        };
        let mut stations = Vec::with_capacity(self.items.len() + 1);
        stations.push(first.up_station());
        stations.extend(self.items.iter().map(Section::down_station));
        stations
    }

    pub fn contains_station(&self, station: &Station) -> bool {
        self.items.iter().any(|s| s.have_station(station, station))
    }

    pub fn total_distance(&self) -> i64 {
        self.items.iter().map(|s| i64::from(s.distance())).sum()
    }

    /// Insert a new section.
    ///
    /// Exactly one endpoint must already be on a non-empty line. A section
    /// hanging off a terminus extends the line; otherwise the section that
    /// starts (or ends) at the shared station is split, which requires it
    /// to be strictly longer than the new one.
    pub fn add(&mut self, section: Section) -> Result<()> {
        if section.line_id() != self.line_id {
            return Err(SectionError::ForeignSection {
                expected: self.line_id,
                found: section.line_id(),
            });
        }
        if self.items.is_empty() {
            self.items.push(section);
            return Ok(());
        }

        let up_on_line = self.contains_station(section.up_station());
        let down_on_line = self.contains_station(section.down_station());
        match (up_on_line, down_on_line) {
            (true, true) => {
                return Err(SectionError::AlreadyLinked {
                    up: section.up_station().to_string(),
                    down: section.down_station().to_string(),
                })
            }
            (false, false) => {
                return Err(SectionError::NotConnected {
                    up: section.up_station().to_string(),
                    down: section.down_station().to_string(),
                })
            }
            _ => {}
        }

        if self.items[0].is_same_up_station(section.down_station()) {
            self.items.insert(0, section);
            return Ok(());
        }
        let last = self.items.len() - 1;
        if self.items[last].is_same_down_station(section.up_station()) {
            self.items.push(section);
            return Ok(());
        }

        if let Some(i) = self
            .items
            .iter()
            .position(|s| s.is_same_up_station(section.up_station()))
        {
            let existing = &mut self.items[i];
            shrink(existing, section.distance())?;
            let down = existing.down_station().clone();
            existing.update_stations(section.down_station().clone(), down)?;
            self.items.insert(i, section);
            return Ok(());
        }

        if let Some(i) = self
            .items
            .iter()
            .position(|s| s.is_same_down_station(section.down_station()))
        {
            let existing = &mut self.items[i];
            shrink(existing, section.distance())?;
            let up = existing.up_station().clone();
            existing.update_stations(up, section.up_station().clone())?;
            self.items.insert(i + 1, section);
            return Ok(());
        }

        // Every station on a path is a terminus or the up end of some
        // section, so one of the branches above has matched.
        Err(SectionError::NotConnected {
            up: section.up_station().to_string(),
            down: section.down_station().to_string(),
        })
    }

    /// Take a station off the line, merging around it when it is interior.
    pub fn remove_station(&mut self, station: &Station) -> Result<()> {
        let touching: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, s)| s.have_station(station, station))
            .map(|(i, _)| i)
            .collect();

        match touching.as_slice() {
            [] => Err(SectionError::StationNotOnLine {
                station: station.to_string(),
            }),
            [only] => {
                self.items.remove(*only);
                Ok(())
            }
            [first, second] => {
                let merged = self.items[*first].merge(&self.items[*second])?;
                self.items.remove(*second);
                self.items[*first] = merged;
                Ok(())
            }
            _ => Err(broken(
                self.line_id,
                "a station touches more than two sections",
            )),
        }
    }

    /// Compare against an earlier snapshot of the same line.
    pub fn diff(&self, before: &Sections) -> SectionDiff {
        let added = self
            .items
            .iter()
            .filter(|s| s.id().is_none())
            .cloned()
            .collect();

        let updated = self
            .items
            .iter()
            .filter(|s| {
                s.id().is_some()
                    && before.items.iter().any(|old| {
                        old.id() == s.id()
                            && (old.is_update(s) || old.distance() != s.distance())
                    })
            })
            .cloned()
            .collect();

        let removed = before
            .items
            .iter()
            .filter(|old| {
                old.id().is_some() && !self.items.iter().any(|s| s.id() == old.id())
            })
            .cloned()
            .collect();

        SectionDiff {
            added,
            updated,
            removed,
        }
    }
}

fn shrink(existing: &mut Section, distance: i32) -> Result<()> {
    if !existing.is_longer_than(distance) {
        return Err(SectionError::TooLong {
            distance,
            existing: existing.distance(),
        });
    }
    existing.subtract_distance(distance)
}

fn broken(line_id: LineId, reason: &'static str) -> SectionError {
    SectionError::BrokenPath { line_id, reason }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionId;
    use crate::station::{StationId, StationName};

    const LINE: LineId = LineId(1);

    fn station(id: i64) -> Station {
        let names = ["", "A", "B", "C", "D", "E"];
        Station::persisted(StationId(id), StationName::new(names[id as usize]).unwrap())
    }

    fn stored(id: i64, up: i64, down: i64, distance: i32) -> Section {
        Section::with_id(SectionId(id), LINE, station(up), station(down), distance).unwrap()
    }

    fn fresh(up: i64, down: i64, distance: i32) -> Section {
        Section::new(LINE, station(up), station(down), distance).unwrap()
    }

    fn names(sections: &Sections) -> Vec<String> {
        sections.stations().iter().map(|s| s.to_string()).collect()
    }

    fn line_abc() -> Sections {
        Sections::new(LINE, vec![stored(2, 2, 3, 3), stored(1, 1, 2, 5)]).unwrap()
    }

    #[test]
    fn orders_unordered_sections() {
        let sections = line_abc();
        assert_eq!(names(&sections), ["A", "B", "C"]);
        assert_eq!(sections.total_distance(), 8);
    }

    #[test]
    fn rejects_branch() {
        let err = Sections::new(LINE, vec![stored(1, 1, 2, 5), stored(2, 1, 3, 5)]).unwrap_err();
        assert!(matches!(err, SectionError::BrokenPath { .. }));
    }

    #[test]
    fn rejects_converging_branch() {
        let err = Sections::new(LINE, vec![stored(1, 1, 3, 5), stored(2, 2, 3, 5)]).unwrap_err();
        assert!(matches!(err, SectionError::BrokenPath { .. }));
    }

    #[test]
    fn rejects_cycle() {
        let err = Sections::new(
            LINE,
            vec![stored(1, 1, 2, 5), stored(2, 2, 3, 5), stored(3, 3, 1, 5)],
        )
        .unwrap_err();
        assert!(matches!(err, SectionError::BrokenPath { .. }));
    }

    #[test]
    fn rejects_tail_looping_back() {
        let err = Sections::new(
            LINE,
            vec![stored(1, 1, 2, 5), stored(2, 2, 3, 5), stored(3, 3, 2, 5)],
        )
        .unwrap_err();
        assert!(matches!(err, SectionError::BrokenPath { .. }));
    }

    #[test]
    fn rejects_foreign_section() {
        let other = Section::new(LineId(2), station(1), station(2), 5).unwrap();
        let err = Sections::new(LINE, vec![other]).unwrap_err();
        assert_eq!(
            err,
            SectionError::ForeignSection {
                expected: LINE,
                found: LineId(2)
            }
        );
    }

    #[test]
    fn first_section_on_empty_line() {
        let mut sections = Sections::empty(LINE);
        sections.add(fresh(1, 2, 5)).unwrap();
        assert_eq!(names(&sections), ["A", "B"]);
    }

    #[test]
    fn extends_both_termini() {
        let mut sections = line_abc();
        sections.add(fresh(3, 4, 2)).unwrap();
        sections.add(fresh(5, 1, 4)).unwrap();
        assert_eq!(names(&sections), ["E", "A", "B", "C", "D"]);
        assert_eq!(sections.total_distance(), 14);
    }

    #[test]
    fn splits_from_up_side() {
        let mut sections = line_abc();
        sections.add(fresh(1, 4, 2)).unwrap();

        assert_eq!(names(&sections), ["A", "D", "B", "C"]);
        assert_eq!(sections.total_distance(), 8);
        let rewritten = &sections.as_slice()[1];
        assert_eq!(rewritten.id(), Some(SectionId(1)));
        assert_eq!(rewritten.distance(), 3);
    }

    #[test]
    fn splits_from_down_side() {
        let mut sections = line_abc();
        sections.add(fresh(4, 3, 1)).unwrap();

        assert_eq!(names(&sections), ["A", "B", "D", "C"]);
        assert_eq!(sections.total_distance(), 8);
        let rewritten = &sections.as_slice()[1];
        assert_eq!(rewritten.id(), Some(SectionId(2)));
        assert_eq!(rewritten.distance(), 2);
    }

    #[test]
    fn split_requires_shorter_section() {
        let mut sections = line_abc();
        let err = sections.add(fresh(1, 4, 5)).unwrap_err();
        assert_eq!(
            err,
            SectionError::TooLong {
                distance: 5,
                existing: 5
            }
        );
        assert_eq!(names(&sections), ["A", "B", "C"]);
        assert_eq!(sections.total_distance(), 8);
    }

    #[test]
    fn rejects_already_linked_and_disconnected() {
        let mut sections = line_abc();
        assert!(matches!(
            sections.add(fresh(1, 3, 2)),
            Err(SectionError::AlreadyLinked { .. })
        ));
        assert!(matches!(
            sections.add(fresh(4, 5, 2)),
            Err(SectionError::NotConnected { .. })
        ));
    }

    #[test]
    fn removing_interior_station_merges() {
        let mut sections = line_abc();
        sections.remove_station(&station(2)).unwrap();

        assert_eq!(names(&sections), ["A", "C"]);
        let merged = &sections.as_slice()[0];
        assert_eq!(merged.id(), None);
        assert_eq!(merged.distance(), 8);
    }

    #[test]
    fn removing_terminus_drops_one_section() {
        let mut sections = line_abc();
        sections.remove_station(&station(3)).unwrap();
        assert_eq!(names(&sections), ["A", "B"]);
        assert_eq!(sections.as_slice()[0].id(), Some(SectionId(1)));

        sections.remove_station(&station(1)).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn removing_unknown_station_fails() {
        let mut sections = line_abc();
        assert!(matches!(
            sections.remove_station(&station(4)),
            Err(SectionError::StationNotOnLine { .. })
        ));
    }

    #[test]
    fn removing_station_between_huge_sections_leaves_line_intact() {
        let mut sections = Sections::new(
            LINE,
            vec![stored(1, 1, 2, 2_000_000_000), stored(2, 2, 3, 2_000_000_000)],
        )
        .unwrap();

        let err = sections.remove_station(&station(2)).unwrap_err();
        assert!(matches!(err, SectionError::DistanceOverflow { .. }));
        assert_eq!(names(&sections), ["A", "B", "C"]);
        assert_eq!(sections.total_distance(), 4_000_000_000);
    }

    #[test]
    fn diff_after_split() {
        let before = line_abc();
        let mut after = before.clone();
        after.add(fresh(1, 4, 2)).unwrap();

        let diff = after.diff(&before);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.updated.len(), 1);
        assert_eq!(diff.updated[0].id(), Some(SectionId(1)));
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn diff_after_merge() {
        let before = line_abc();
        let mut after = before.clone();
        after.remove_station(&station(2)).unwrap();

        let diff = after.diff(&before);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].distance(), 8);
        assert!(diff.updated.is_empty());
        let mut removed: Vec<_> = diff.removed.iter().filter_map(Section::id).collect();
        removed.sort();
        assert_eq!(removed, [SectionId(1), SectionId(2)]);
    }

    #[test]
    fn diff_of_unchanged_line_is_empty() {
        let before = line_abc();
        assert!(before.clone().diff(&before).is_empty());
    }
}
