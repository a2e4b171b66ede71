use smallvec::SmallVec;

use crate::input::line::{SectionRecord, UnitType};
use crate::railway::geometry::Coord;
use crate::railway::infrastructure::{Line, Unit};
use crate::railway::{SectionId, SimError, UnitId, UnitSituation};

/// Units of one section that may precede the same unit of the next section.
pub type Group = SmallVec<[UnitId; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    Start { coords: Vec<Coord> },
    Normal { length: usize },
    Crossing { vector: Coord },
    Merge { vector: Coord },
    Branch { vector: Coord },
    End,
}

impl SectionKind {
    pub fn from_record(section: SectionId, record: &SectionRecord) -> Result<SectionKind, SimError> {
        let missing = |field: &str| SimError::TopologyConstruction {
            section,
            reason: format!("{:?} section without \"{}\"", record.unit_type, field),
        };
        let invalid = |reason: String| SimError::TopologyConstruction { section, reason };
        // Every leg needs at least one rail point.
        let vector = || -> Result<Coord, SimError> {
            let vector = record.vector.ok_or_else(|| missing("vector"))?;
            if vector.0 < 1.0 {
                return Err(invalid(format!("{:?} section with x extent {}", record.unit_type, vector.0)));
            }
            Ok(vector)
        };
        Ok(match record.unit_type {
            UnitType::Start => SectionKind::Start {
                coords: record.start_coord.clone().ok_or_else(|| missing("start_coord"))?,
            },
            UnitType::Normal => match record.length.ok_or_else(|| missing("length"))? {
                0 => return Err(invalid("normal section of length 0".to_string())),
                length => SectionKind::Normal { length: length as usize },
            },
            UnitType::Crossing => SectionKind::Crossing { vector: vector()? },
            UnitType::Merge => SectionKind::Merge { vector: vector()? },
            UnitType::Branch => SectionKind::Branch { vector: vector()? },
            UnitType::End => SectionKind::End,
        })
    }

    pub fn name(&self) -> &'static str {
        match *self {
            SectionKind::Start { .. } => "start",
            SectionKind::Normal { .. } => "normal",
            SectionKind::Crossing { .. } => "crossing",
            SectionKind::Merge { .. } => "merge",
            SectionKind::Branch { .. } => "branch",
            SectionKind::End => "end",
        }
    }
}

#[derive(Debug)]
pub struct Section {
    pub kind: SectionKind,
    pub units: SmallVec<[UnitId; 4]>,
}

impl Section {
    /// Builds the units of a section behind the last section of `line`,
    /// wiring the previous exit interface to them.
    pub fn build(line: &mut Line, index: SectionId, kind: SectionKind) -> Result<Section, SimError> {
        let groups = match line.sections.last() {
            Some(prev) => prev.exit_interface(index)?,
            None => Vec::new(),
        };
        let expect = |n: usize| -> Result<(), SimError> {
            if groups.len() == n {
                Ok(())
            } else {
                Err(SimError::TopologyConstruction {
                    section: index,
                    reason: format!("{} section needs {} tracks, found {}", kind.name(), n, groups.len()),
                })
            }
        };

        let mut units: SmallVec<[UnitId; 4]> = SmallVec::new();
        match kind {
            SectionKind::Start { ref coords } => {
                expect(0)?;
                for &c in coords {
                    units.push(line.add_unit(Unit::start(c)));
                }
            }
            SectionKind::Normal { length } => {
                if groups.is_empty() {
                    expect(1)?;
                }
                for g in &groups {
                    let id = line.add_straight(g, length);
                    line.link(g, &[id]);
                    units.push(id);
                }
            }
            SectionKind::Crossing { vector } => {
                expect(2)?;
                let (vx, vy) = vector;
                let leg = vx as usize + 1;
                units.push(line.add_straight(&groups[0], leg));
                units.push(line.add_curve(&groups[0], (vx, vy)));
                units.push(line.add_curve(&groups[1], (vx, -vy)));
                units.push(line.add_straight(&groups[1], leg));
                line.link(&groups[0], &units[0..2]);
                line.link(&groups[1], &units[2..4]);
            }
            SectionKind::Branch { vector } => {
                expect(2)?;
                let (vx, vy) = vector;
                let leg = vx as usize + 1;
                units.push(line.add_curve(&groups[0], (vx, -vy)));
                units.push(line.add_straight(&groups[0], leg));
                units.push(line.add_straight(&groups[1], leg));
                units.push(line.add_curve(&groups[1], (vx, vy)));
                line.link(&groups[0], &units[0..2]);
                line.link(&groups[1], &units[2..4]);
            }
            SectionKind::Merge { vector } => {
                expect(4)?;
                let (vx, vy) = vector;
                let leg = vx as usize + 1;
                units.push(line.add_curve(&groups[0], (vx, vy)));
                units.push(line.add_straight(&groups[1], leg));
                units.push(line.add_straight(&groups[2], leg));
                units.push(line.add_curve(&groups[3], (vx, -vy)));
                for (g, &u) in groups.iter().zip(units.iter()) {
                    line.link(g, &[u]);
                }
            }
            SectionKind::End => {
                if groups.is_empty() {
                    expect(1)?;
                }
                for g in &groups {
                    let anchor = line.anchor(g);
                    let id = line.add_unit(Unit::end(g.clone(), anchor));
                    line.link(g, &[id]);
                    units.push(id);
                }
            }
        }

        Ok(Section { kind, units })
    }

    /// Groups of units a following section attaches to, one group per
    /// logical track.
    pub fn exit_interface(&self, next: SectionId) -> Result<Vec<Group>, SimError> {
        let u = &self.units;
        match self.kind {
            SectionKind::Start { .. } | SectionKind::Normal { .. } | SectionKind::Branch { .. } => {
                Ok(u.iter().map(|&id| SmallVec::from_slice(&[id])).collect())
            }
            SectionKind::Crossing { .. } => Ok(vec![
                SmallVec::from_slice(&[u[0], u[2]]),
                SmallVec::from_slice(&[u[1], u[3]]),
            ]),
            SectionKind::Merge { .. } => Ok(vec![
                SmallVec::from_slice(&[u[0], u[1]]),
                SmallVec::from_slice(&[u[2], u[3]]),
            ]),
            SectionKind::End => Err(SimError::TopologyConstruction {
                section: next,
                reason: "nothing may follow an end section".to_string(),
            }),
        }
    }

    /// Whether a crossing may grant passage over path `path` (0 and 3 are
    /// the straight paths, 1 and 2 the crossing ones). Two straight moves
    /// may coexist; anything else conflicts with a reserved path.
    /// Sections other than crossings have nothing to conflict with.
    pub fn check_pass_allowed(&self, line: &Line, path: usize) -> bool {
        if let SectionKind::Crossing { .. } = self.kind {
            let blocked = |i: usize| line.unit(self.units[i]).situation == UnitSituation::Blocked;
            if blocked(1) || blocked(2) {
                return false;
            }
            if blocked(0) && path != 3 {
                return false;
            }
            if blocked(3) && path != 0 {
                return false;
            }
        }
        true
    }
}
