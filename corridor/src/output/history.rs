use std::fmt::Write;

use serde::Serialize;

use crate::railway::interlocking::MovementKind;
use crate::railway::{Aspect, Side, Tick, UnitId};

#[derive(Debug, Default, Serialize)]
pub struct History {
    pub inf: Vec<(Tick, InfrastructureLogEvent)>,
    pub trains: Vec<(String, Vec<(Tick, TrainLogEvent)>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InfrastructureLogEvent {
    Aspect(UnitId, Side, Aspect),
    Reserved(UnitId), // unit
    Route {
        junction: String,
        number: u32,
        track: usize,
        movement: MovementKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrainLogEvent {
    Departed { station: String, track: usize },
    Entered(UnitId),
    Arrived { station: String, track: usize },
}

/// Print one train arrival per line on the following format:
/// `trainname tick station track`.
pub fn visits(h: &History) -> Result<String, failure::Error> {
    let mut s = String::new();
    for (train_name, events) in &h.trains {
        for (t, ev) in events {
            if let TrainLogEvent::Arrived { station, track } = ev {
                writeln!(s, "{} {} {} {}", train_name, t, station, track)?;
            }
        }
    }
    Ok(s)
}
