use std::collections::HashMap;

use log::trace;
use smallvec::SmallVec;

use crate::input::line::{LineDescriptor, StationRecord};
use crate::output::history::InfrastructureLogEvent;
use crate::railway::geometry::{curve_rail, straight_rail, Coord, Rail};
use crate::railway::section::{Group, Section, SectionKind};
use crate::railway::*;

pub type InfLogger<'a> = &'a mut dyn FnMut(InfrastructureLogEvent);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Start,
    End,
    Straight,
    Curve,
}

/// Atomic track segment. Neighbour lists are fixed once the line is built;
/// only the selected neighbour, the situation and the aspects change while
/// the simulation runs.
///
/// A `Blocked` unit is reserved by the junction controller that owns it.
/// Nothing unblocks it explicitly: the reservation ends when a train moves
/// off the unit and `Line::move_occupant` sets it `Free`.
///
/// Crossing conflicts are judged on `Blocked` units only. A train already
/// on a crossing unit has made it `Occupied`, so a route over the other
/// diagonal can be granted while that train is still on the diamond.
#[derive(Debug, Clone)]
pub struct Unit {
    pub kind: UnitKind,
    pub rail: Rail,
    prev_units: Group,
    next_units: Group,
    prev_index: usize,
    next_index: usize,
    pub situation: UnitSituation,
    controller: Option<ControllerId>,
    up_sign: Aspect,
    down_sign: Aspect,
}

impl Unit {
    pub(crate) fn start(coord: Coord) -> Unit {
        Unit::dead_end(UnitKind::Start, SmallVec::new(), coord)
    }

    pub(crate) fn end(prev_units: Group, anchor: Coord) -> Unit {
        Unit::dead_end(UnitKind::End, prev_units, anchor)
    }

    fn dead_end(kind: UnitKind, prev_units: Group, coord: Coord) -> Unit {
        Unit {
            kind,
            rail: vec![coord],
            prev_units,
            next_units: SmallVec::new(),
            prev_index: 0,
            next_index: 0,
            situation: UnitSituation::DeadEnd,
            controller: None,
            up_sign: Aspect::Red,
            down_sign: Aspect::Red,
        }
    }

    fn track(kind: UnitKind, prev_units: Group, rail: Rail) -> Unit {
        Unit {
            kind,
            rail,
            prev_units,
            next_units: SmallVec::new(),
            prev_index: 0,
            next_index: 0,
            situation: UnitSituation::Free,
            controller: None,
            up_sign: Aspect::Green,
            down_sign: Aspect::Green,
        }
    }

    pub fn is_dead_end(&self) -> bool {
        match self.kind {
            UnitKind::Start | UnitKind::End => true,
            _ => false,
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    pub fn neighbours(&self, side: Side) -> &[UnitId] {
        match side {
            Side::Prev => &self.prev_units,
            Side::Next => &self.next_units,
        }
    }

    pub fn selected_index(&self, side: Side) -> usize {
        match side {
            Side::Prev => self.prev_index,
            Side::Next => self.next_index,
        }
    }

    /// The neighbour currently routed to on `side`.
    pub fn selected(&self, side: Side) -> Option<UnitId> {
        self.neighbours(side).get(self.selected_index(side)).cloned()
    }

    pub fn aspect(&self, side: Side) -> Aspect {
        match side {
            Side::Prev => self.up_sign,
            Side::Next => self.down_sign,
        }
    }

    pub fn up_sign(&self) -> Aspect {
        self.up_sign
    }

    pub fn down_sign(&self) -> Aspect {
        self.down_sign
    }

    pub fn midpoint(&self) -> usize {
        self.rail.len() / 2
    }
}

/// The whole track graph. Owns every unit; everything else refers to units
/// by `UnitId`.
#[derive(Debug)]
pub struct Line {
    units: Vec<Unit>,
    pub sections: Vec<Section>,
    pub stations: HashMap<String, SmallVec<[UnitId; 4]>>,
}

impl Line {
    pub fn new(descriptor: &LineDescriptor) -> Result<Line, SimError> {
        let mut line = Line {
            units: Vec::new(),
            sections: Vec::new(),
            stations: HashMap::new(),
        };
        for (index, record) in descriptor.sections.iter().enumerate() {
            let kind = SectionKind::from_record(index, record)?;
            if (index == 0) != (kind.name() == "start") {
                return Err(SimError::TopologyConstruction {
                    section: index,
                    reason: "a line begins with exactly one start section".to_string(),
                });
            }
            let section = Section::build(&mut line, index, kind)?;
            line.sections.push(section);
        }
        line.index_stations(&descriptor.stations)?;
        Ok(line)
    }

    fn index_stations(&mut self, records: &[StationRecord]) -> Result<(), SimError> {
        let last = self.sections.len().saturating_sub(1);
        for station in records {
            if station.sect_index == 0 || station.sect_index >= last {
                return Err(SimError::TopologyConstruction {
                    section: station.sect_index,
                    reason: format!("station \"{}\" must lie on an interior section", station.name),
                });
            }
            let units = self.sections[station.sect_index].units.clone();
            self.stations.insert(station.name.clone(), units);
        }
        Ok(())
    }

    pub(crate) fn add_unit(&mut self, unit: Unit) -> UnitId {
        self.units.push(unit);
        self.units.len() - 1
    }

    /// Where a unit following `group` starts: the last rail point of the
    /// group's first unit.
    pub(crate) fn anchor(&self, group: &[UnitId]) -> Coord {
        let rail = &self.units[group[0]].rail;
        rail[rail.len() - 1]
    }

    pub(crate) fn add_straight(&mut self, group: &Group, length: usize) -> UnitId {
        let rail = straight_rail(self.anchor(group), length);
        self.add_unit(Unit::track(UnitKind::Straight, group.clone(), rail))
    }

    pub(crate) fn add_curve(&mut self, group: &Group, vector: Coord) -> UnitId {
        let rail = curve_rail(self.anchor(group), vector);
        self.add_unit(Unit::track(UnitKind::Curve, group.clone(), rail))
    }

    /// Every unit of `group` leads to `next`.
    pub(crate) fn link(&mut self, group: &[UnitId], next: &[UnitId]) {
        for &id in group {
            self.units[id].next_units = SmallVec::from_slice(next);
            self.units[id].next_index = 0;
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id]
    }

    pub fn station_units(&self, name: &str) -> Option<&[UnitId]> {
        self.stations.get(name).map(|u| &u[..])
    }

    pub fn platform(&self, station: &str, track: usize) -> Result<UnitId, SimError> {
        let units = self
            .station_units(station)
            .ok_or_else(|| SimError::UnknownStation(station.to_string()))?;
        units.get(track).cloned().ok_or_else(|| SimError::TrackOutOfRange {
            station: station.to_string(),
            track,
        })
    }

    /// Resolves `index` relative to `unit`, following the selected
    /// neighbours while it lies outside the unit's rail. Index `len` of a
    /// unit is index 0 of its successor, index -1 the last index of its
    /// predecessor.
    pub fn get_next_pos(&self, unit: UnitId, index: i64) -> Result<(UnitId, usize), SimError> {
        let dead_end = || SimError::DeadEndTraversal { unit, index };
        let mut curr = unit;
        let mut idx = index;
        loop {
            let u = &self.units[curr];
            let len = u.rail.len() as i64;
            if idx < 0 {
                curr = u.selected(Side::Prev).ok_or_else(dead_end)?;
                idx += self.units[curr].rail.len() as i64;
            } else if idx >= len {
                curr = u.selected(Side::Next).ok_or_else(dead_end)?;
                idx -= len;
            } else {
                break;
            }
        }
        if self.units[curr].is_dead_end() {
            return Err(dead_end());
        }
        Ok((curr, idx as usize))
    }

    /// Automatic block signalling over the interior sections. Units owned by
    /// a junction controller are left alone.
    pub fn update_signs(&mut self, log: InfLogger) {
        let last = self.sections.len().saturating_sub(1);
        for s in 1..last {
            for i in 0..self.sections[s].units.len() {
                let id = self.sections[s].units[i];
                let unit = &self.units[id];
                if unit.is_controlled() {
                    continue;
                }
                let (up, down) = if unit.situation == UnitSituation::Occupied {
                    (Aspect::Red, Aspect::Red)
                } else {
                    let caution = |side: Side| match unit.selected(side) {
                        Some(n) if self.units[n].situation == UnitSituation::Occupied => Aspect::Yellow,
                        _ => Aspect::Green,
                    };
                    (caution(Side::Prev), caution(Side::Next))
                };
                self.write_aspect(id, Side::Prev, up, log);
                self.write_aspect(id, Side::Next, down, log);
            }
        }
    }

    fn write_aspect(&mut self, id: UnitId, side: Side, aspect: Aspect, log: InfLogger) {
        let unit = &mut self.units[id];
        if unit.aspect(side) == aspect {
            return;
        }
        match side {
            Side::Prev => unit.up_sign = aspect,
            Side::Next => unit.down_sign = aspect,
        }
        log(InfrastructureLogEvent::Aspect(id, side, aspect));
    }

    fn assert_owner(&self, owner: ControllerId, id: UnitId) {
        assert_eq!(
            self.units[id].controller,
            Some(owner),
            "unit {} is not owned by controller {}",
            id,
            owner
        );
    }

    /// Hands `id` to controller `owner`. Fails if another controller has it.
    pub fn claim(&mut self, owner: ControllerId, id: UnitId) -> bool {
        let unit = &mut self.units[id];
        match unit.controller {
            Some(other) if other != owner => false,
            _ => {
                unit.controller = Some(owner);
                true
            }
        }
    }

    pub fn set_aspect(&mut self, owner: ControllerId, id: UnitId, side: Side, aspect: Aspect, log: InfLogger) {
        self.assert_owner(owner, id);
        self.write_aspect(id, side, aspect, log);
    }

    pub fn select(&mut self, owner: ControllerId, id: UnitId, side: Side, index: usize) {
        self.assert_owner(owner, id);
        let unit = &mut self.units[id];
        assert!(index < unit.neighbours(side).len(), "unit {} has no {:?} neighbour {}", id, side, index);
        match side {
            Side::Prev => unit.prev_index = index,
            Side::Next => unit.next_index = index,
        }
    }

    pub fn reserve(&mut self, owner: ControllerId, id: UnitId, log: InfLogger) {
        self.assert_owner(owner, id);
        self.units[id].situation = UnitSituation::Blocked;
        log(InfrastructureLogEvent::Reserved(id));
    }

    pub(crate) fn occupy(&mut self, id: UnitId) {
        self.units[id].situation = UnitSituation::Occupied;
    }

    /// Moves a train's occupancy from `from` to `to` in one step. This is
    /// also what releases a reservation on `from`.
    pub(crate) fn move_occupant(&mut self, from: UnitId, to: UnitId) {
        trace!("occupancy {} -> {}", from, to);
        self.units[from].situation = UnitSituation::Free;
        self.units[to].situation = UnitSituation::Occupied;
    }
}
