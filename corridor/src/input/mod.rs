//! Line and timetable descriptors.

pub mod clock;
pub mod line;
pub mod timetable;

use failure::Fail;

#[derive(Debug, Fail)]
pub enum ParseError {
    #[fail(display = "error in regular expression: {}", _0)]
    RegexError(String),
    #[fail(display = "malformed descriptor: {}", _0)]
    Json(String),
    #[fail(display = "unrecognized clock value: {}", _0)]
    Clock(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> ParseError {
        ParseError::Json(e.to_string())
    }
}
