//! What a renderer needs to draw one moment of the simulation.

use serde::Serialize;

use crate::input::clock::format_clock;
use crate::railway::driver::Train;
use crate::railway::geometry::Coord;
use crate::railway::infrastructure::{Line, Unit};
use crate::railway::interlocking::JunctionController;
use crate::railway::*;

#[derive(Debug, Serialize)]
pub struct UnitView<'a> {
    pub id: UnitId,
    pub rail: &'a [Coord],
    pub up_sign: Aspect,
    pub down_sign: Aspect,
    pub situation: UnitSituation,
}

#[derive(Debug, Serialize)]
pub struct TrainView<'a> {
    pub id: &'a str,
    pub number: u32,
    pub unit: UnitId,
    pub index: usize,
    pub speed: u32,
    pub direction: Direction,
    pub situation: TrainSituation,
    pub color: [u8; 3],
    pub coordinate: Coord,
}

#[derive(Debug, Serialize)]
pub struct JunctionView<'a> {
    pub name: &'a str,
    pub progress: usize,
    pub pending: usize,
    pub arr_track: Option<usize>,
    /// Green if any arrival route of the junction is cleared.
    pub arrival_aspect: Aspect,
}

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub clock: String,
    pub units: Vec<UnitView<'a>>,
    pub trains: Vec<TrainView<'a>>,
    pub junctions: Vec<JunctionView<'a>>,
}

impl<'a> UnitView<'a> {
    fn new(id: UnitId, unit: &'a Unit) -> UnitView<'a> {
        UnitView {
            id,
            rail: &unit.rail,
            up_sign: unit.up_sign(),
            down_sign: unit.down_sign(),
            situation: unit.situation,
        }
    }
}

impl<'a> Snapshot<'a> {
    pub fn new(
        minute: Minute,
        line: &'a Line,
        trains: &'a [Train],
        junctions: &'a [JunctionController],
    ) -> Snapshot<'a> {
        Snapshot {
            clock: format_clock(minute),
            units: line.units().iter().enumerate().map(|(i, u)| UnitView::new(i, u)).collect(),
            trains: trains
                .iter()
                .map(|t| TrainView {
                    id: &t.id,
                    number: t.number,
                    unit: t.curr_unit,
                    index: t.curr_index,
                    speed: t.speed,
                    direction: t.direction,
                    situation: t.situation,
                    color: t.color,
                    coordinate: t.coordinate(line),
                })
                .collect(),
            junctions: junctions
                .iter()
                .map(|j| {
                    let cleared = j
                        .arrival_signals()
                        .any(|(u, side)| line.unit(u).aspect(side) == Aspect::Green);
                    JunctionView {
                        name: &j.name,
                        progress: j.progress,
                        pending: j.pending(),
                        arr_track: j.arr_track,
                        arrival_aspect: if cleared { Aspect::Green } else { Aspect::Red },
                    }
                })
                .collect(),
        }
    }
}
