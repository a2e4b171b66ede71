//! Double-track corridor simulation: trains running a timetable over
//! block-signalled track with two interlocked junctions.

pub mod config;
pub mod input;
pub mod output;
pub mod railway;
pub mod simulation;

#[cfg(test)]
mod tests;

use std::path::Path;

use input::line::{parse_line, LineDescriptor};
use input::timetable::{parse_timetable, TimetableDescriptor};

pub type AppResult<T> = Result<T, failure::Error>;

pub fn read_file(f: &Path) -> AppResult<String> {
    use std::fs::File;
    use std::io::prelude::*;
    use std::io::BufReader;

    let file = File::open(f)?;
    let mut file = BufReader::new(&file);
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn get_line(s: &Path) -> AppResult<LineDescriptor> {
    let contents = read_file(s)?;
    let d = parse_line(&contents)?;
    Ok(d)
}

pub fn get_timetable(s: &Path) -> AppResult<TimetableDescriptor> {
    let contents = read_file(s)?;
    let d = parse_timetable(&contents)?;
    Ok(d)
}
