//! Run parameters. The defaults describe the bundled corridor.

use crate::input::timetable::{RouteRequest, TimetableDescriptor};
use crate::railway::interlocking::ParityRule;
use crate::railway::layouts::LayoutKind;
use crate::railway::{Minute, SectionId, Tick};

/// Which route request list of the timetable a junction consumes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestList {
    Starting,
    Terminal,
}

impl RequestList {
    pub fn select<'a>(self, timetable: &'a TimetableDescriptor) -> &'a [RouteRequest] {
        match self {
            RequestList::Starting => &timetable.starting_stn,
            RequestList::Terminal => &timetable.terminal_stn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JunctionConfig {
    pub name: String,
    pub layout: LayoutKind,
    pub first_section: SectionId,
    pub parity: ParityRule,
    pub requests: RequestList,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Signals and junctions are updated every this many ticks.
    pub signal_interval: Tick,
    pub ticks_per_minute: Tick,
    pub start_minute: Minute,
    pub end_minute: Minute,
    pub junctions: Vec<JunctionConfig>,
}

impl JunctionConfig {
    pub fn starting(first_section: SectionId) -> JunctionConfig {
        JunctionConfig {
            name: "starting".to_string(),
            layout: LayoutKind::StartingFourTrack,
            first_section,
            parity: ParityRule::OddDeparts,
            requests: RequestList::Starting,
        }
    }

    pub fn terminal(first_section: SectionId) -> JunctionConfig {
        JunctionConfig {
            name: "terminal".to_string(),
            layout: LayoutKind::TerminalTwoTrack,
            first_section,
            parity: ParityRule::EvenDeparts,
            requests: RequestList::Terminal,
        }
    }
}

impl Default for SimConfig {
    fn default() -> SimConfig {
        SimConfig {
            signal_interval: 30,
            ticks_per_minute: 60,
            start_minute: 358,
            end_minute: 24 * 60,
            junctions: vec![JunctionConfig::starting(2), JunctionConfig::terminal(9)],
        }
    }
}
