use serde::Deserialize;

use super::ParseError;
use crate::railway::{Direction, Minute};

#[derive(Debug, Clone, Deserialize)]
pub struct TrainDef {
    pub id: String,
    pub init_stn: String,
    pub init_track: usize,
    pub max_speed: u32,
    pub color: [u8; 3],
}

/// One stop of a train's journey. Minutes are minutes of the day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleStop {
    pub station: String,
    pub track: usize,
    #[serde(default)]
    pub arr_time: Option<Minute>,
    #[serde(default)]
    pub dep_time: Option<Minute>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimetableEntry {
    pub train_id: String,
    pub number: u32,
    pub schedule: Vec<ScheduleStop>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteRequest {
    pub number: u32,
    pub track: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimetableDescriptor {
    pub train: Vec<TrainDef>,
    pub timetable: Vec<TimetableEntry>,
    #[serde(default)]
    pub starting_stn: Vec<RouteRequest>,
    #[serde(default)]
    pub terminal_stn: Vec<RouteRequest>,
}

impl TimetableDescriptor {
    /// The first timetable entry of a train.
    pub fn entry(&self, train_id: &str) -> Option<&TimetableEntry> {
        self.timetable.iter().find(|e| e.train_id == train_id)
    }
}

pub fn parse_timetable(input: &str) -> Result<TimetableDescriptor, ParseError> {
    Ok(serde_json::from_str(input)?)
}
