use log::{info, warn};

use crate::config::SimConfig;
use crate::input::clock::format_clock;
use crate::input::line::LineDescriptor;
use crate::input::timetable::TimetableDescriptor;
use crate::output::history::History;
use crate::output::snapshot::Snapshot;
use crate::railway::driver::Train;
use crate::railway::infrastructure::Line;
use crate::railway::interlocking::JunctionController;
use crate::railway::*;

/// Tick counter with the minute of day it corresponds to.
#[derive(Debug, Clone)]
pub struct Clock {
    pub tick: Tick,
    pub minute: Minute,
    pub ticks_per_minute: Tick,
}

impl Clock {
    pub fn new(start_minute: Minute, ticks_per_minute: Tick) -> Clock {
        Clock {
            tick: 0,
            minute: start_minute,
            ticks_per_minute: ticks_per_minute.max(1),
        }
    }

    pub fn step(&mut self) {
        self.tick += 1;
        if self.tick % self.ticks_per_minute == 0 {
            self.minute += 1;
        }
    }
}

pub struct Simulation {
    pub line: Line,
    pub controllers: Vec<JunctionController>,
    /// Same order as `history.trains`.
    pub trains: Vec<Train>,
    pub config: SimConfig,
    pub history: History,
}

impl Simulation {
    pub fn new(
        line: &LineDescriptor,
        timetable: &TimetableDescriptor,
        config: SimConfig,
    ) -> Result<Simulation, SimError> {
        let mut line = Line::new(line)?;
        let mut history = History::default();

        let mut controllers = Vec::new();
        for (id, j) in config.junctions.iter().enumerate() {
            let layout = j.layout.build(&line, j.first_section, &j.name)?;
            let requests = j.requests.select(timetable).to_vec();
            let inf = &mut history.inf;
            let controller = JunctionController::new(id, &j.name, layout, j.parity, requests, &mut line,
                                                     &mut |e| inf.push((0, e)))?;
            controllers.push(controller);
        }

        let mut trains = Vec::new();
        for def in &timetable.train {
            match timetable.entry(&def.id) {
                Some(entry) => {
                    trains.push(Train::new(def, entry, &mut line)?);
                    history.trains.push((def.id.clone(), Vec::new()));
                }
                None => warn!("train {} has no timetable entry and stays out of the run", def.id),
            }
        }

        Ok(Simulation {
            line,
            controllers,
            trains,
            config,
            history,
        })
    }

    /// One tick: signals and junctions (on signalling ticks), then trains.
    pub fn advance(&mut self, tick: Tick, minute: Minute) -> Result<(), SimError> {
        if tick % self.config.signal_interval.max(1) == 0 {
            let inf = &mut self.history.inf;
            let mut log = |e| inf.push((tick, e));
            self.line.update_signs(&mut log);
            for c in self.controllers.iter_mut() {
                c.update(&mut self.line, &mut log);
            }
        }
        for (train, (_, events)) in self.trains.iter_mut().zip(self.history.trains.iter_mut()) {
            train.update(&mut self.line, minute, &mut |e| events.push((tick, e)))?;
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.trains.iter().all(|t| t.is_done()) && self.controllers.iter().all(|c| c.is_done())
    }

    /// Runs until the end of the day or until every journey is over.
    pub fn run(&mut self, clock: &mut Clock) -> Result<(), SimError> {
        while clock.minute < self.config.end_minute {
            self.advance(clock.tick, clock.minute)?;
            if self.is_finished() {
                info!("all journeys complete at {}", format_clock(clock.minute));
                return Ok(());
            }
            clock.step();
        }
        info!("day ended with {} journeys running", self.trains.iter().filter(|t| !t.is_done()).count());
        Ok(())
    }

    pub fn snapshot(&self, minute: Minute) -> Snapshot {
        Snapshot::new(minute, &self.line, &self.trains, &self.controllers)
    }
}
