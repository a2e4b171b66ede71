use regex::Regex;

use super::ParseError;
use crate::railway::Minute;

pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// Parses `HH:MM` or a plain count of minutes into a minute of the day.
/// `24:00` is accepted as the end of the day.
pub fn parse_clock(input: &str) -> Result<Minute, ParseError> {
    let re = Regex::new(r"^\s*(?:(?P<h>\d{1,2}):(?P<m>\d{2})|(?P<min>\d+))\s*$")
        .map_err(|e| ParseError::RegexError(format!("{:?}", e)))?;
    let bad = || ParseError::Clock(input.to_string());
    let groups = re.captures(input).ok_or_else(bad)?;
    let minute: u32 = if let Some(min) = groups.name("min") {
        min.as_str().parse().map_err(|_| bad())?
    } else {
        let h: u32 = groups["h"].parse().map_err(|_| bad())?;
        let m: u32 = groups["m"].parse().map_err(|_| bad())?;
        if m >= 60 {
            return Err(bad());
        }
        h * 60 + m
    };
    if minute > MINUTES_PER_DAY as u32 {
        return Err(bad());
    }
    Ok(minute as Minute)
}

pub fn format_clock(minute: Minute) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
