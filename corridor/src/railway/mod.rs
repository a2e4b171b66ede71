//! Railway simulation.

pub mod driver;
pub mod geometry;
pub mod infrastructure;
pub mod interlocking;
pub mod layouts;
pub mod section;

use failure::Fail;
use serde::{Deserialize, Serialize};

pub type UnitId = usize;
pub type SectionId = usize;
pub type ControllerId = usize;
pub type Tick = u64;
pub type Minute = u16;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Aspect {
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum UnitSituation {
    Free,
    Occupied,
    Blocked,
    DeadEnd,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrainSituation {
    Waiting,
    Moving,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Forward,
    Neutral,
    Backward,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Neutral => 0,
            Direction::Backward => -1,
        }
    }
}

/// Which end of a unit is meant. The `Prev` aspect is the unit's up sign
/// (shown to backward traffic), the `Next` aspect its down sign.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Prev,
    Next,
}

#[derive(Debug, Fail)]
pub enum SimError {
    #[fail(display = "cannot build section {}: {}", section, reason)]
    TopologyConstruction { section: SectionId, reason: String },
    #[fail(display = "dead end reached from unit {} at index {}", unit, index)]
    DeadEndTraversal { unit: UnitId, index: i64 },
    #[fail(display = "unknown station \"{}\"", _0)]
    UnknownStation(String),
    #[fail(display = "\"{}\" has no track {}", station, track)]
    TrackOutOfRange { station: String, track: usize },
    #[fail(display = "train {}: {}", train, reason)]
    Schedule { train: String, reason: String },
    #[fail(display = "junction {}: {}", junction, reason)]
    JunctionLayout { junction: String, reason: String },
}
