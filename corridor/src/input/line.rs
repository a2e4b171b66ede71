use serde::Deserialize;

use super::ParseError;
use crate::railway::geometry::Coord;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Start,
    Normal,
    Crossing,
    Merge,
    Branch,
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionRecord {
    pub unit_type: UnitType,
    #[serde(default)]
    pub start_coord: Option<Vec<Coord>>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub vector: Option<Coord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub sect_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineDescriptor {
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub stations: Vec<StationRecord>,
}

pub fn parse_line(input: &str) -> Result<LineDescriptor, ParseError> {
    Ok(serde_json::from_str(input)?)
}
