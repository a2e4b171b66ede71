use log::{info, trace};

use crate::input::timetable::{ScheduleStop, TimetableEntry, TrainDef};
use crate::output::history::TrainLogEvent;
use crate::railway::geometry::Coord;
use crate::railway::infrastructure::Line;
use crate::railway::*;

/// Ticks one speed step costs.
pub const ACCELERATION_TICKS: u32 = 30;

pub type TrainLogger<'a> = &'a mut dyn FnMut(TrainLogEvent);

#[derive(Debug)]
pub struct Train {
    pub id: String,
    pub number: u32,
    pub color: [u8; 3],
    pub max_speed: u32,
    pub speed: u32,
    speed_limit: u32,
    process_time: u32,
    schedule: Vec<ScheduleStop>,
    pub progress: usize,
    pub curr_unit: UnitId,
    pub curr_index: usize,
    pub target_unit: UnitId,
    pub direction: Direction,
    pub situation: TrainSituation,
}

impl Train {
    /// Places the train on the midpoint of its initial platform.
    pub fn new(def: &TrainDef, entry: &TimetableEntry, line: &mut Line) -> Result<Train, SimError> {
        let unit = line.platform(&def.init_stn, def.init_track)?;
        line.occupy(unit);
        Ok(Train {
            id: def.id.clone(),
            number: entry.number,
            color: def.color,
            max_speed: def.max_speed,
            speed: 0,
            speed_limit: def.max_speed,
            process_time: 0,
            schedule: entry.schedule.clone(),
            progress: 0,
            curr_unit: unit,
            curr_index: line.unit(unit).midpoint(),
            target_unit: unit,
            direction: Direction::Neutral,
            situation: TrainSituation::Waiting,
        })
    }

    pub fn schedule(&self) -> &[ScheduleStop] {
        &self.schedule
    }

    /// Waiting at the last stop of the schedule.
    pub fn is_done(&self) -> bool {
        self.situation == TrainSituation::Waiting && self.progress + 1 >= self.schedule.len()
    }

    pub fn coordinate(&self, line: &Line) -> Coord {
        line.unit(self.curr_unit).rail[self.curr_index]
    }

    pub fn update(&mut self, line: &mut Line, minute: Minute, log: TrainLogger) -> Result<(), SimError> {
        match self.situation {
            TrainSituation::Waiting => self.wait(line, minute, log),
            TrainSituation::Moving => self.drive(line, log),
        }
    }

    fn schedule_error(&self, reason: String) -> SimError {
        SimError::Schedule {
            train: self.id.clone(),
            reason,
        }
    }

    fn wait(&mut self, line: &Line, minute: Minute, log: TrainLogger) -> Result<(), SimError> {
        if self.progress + 1 >= self.schedule.len() {
            return Ok(());
        }
        let stop = &self.schedule[self.progress];
        let departure = stop
            .dep_time
            .ok_or_else(|| self.schedule_error(format!("no departure time at {}", stop.station)))?;
        if minute < departure {
            return Ok(());
        }
        let direction = match stop.direction {
            Some(d) if d != Direction::Neutral => d,
            _ => return Err(self.schedule_error(format!("no direction to leave {}", stop.station))),
        };

        let next = &self.schedule[self.progress + 1];
        self.target_unit = line.platform(&next.station, next.track)?;
        info!("{} departs {} track {} for {}", self.id, stop.station, stop.track, next.station);
        log(TrainLogEvent::Departed {
            station: stop.station.clone(),
            track: stop.track,
        });
        self.progress += 1;
        self.direction = direction;
        self.situation = TrainSituation::Moving;
        self.process_time = ACCELERATION_TICKS;
        Ok(())
    }

    /// The aspect governing the move off the current unit.
    fn aspect_ahead(&self, line: &Line) -> Aspect {
        let side = match self.direction {
            Direction::Forward => Side::Next,
            Direction::Backward => Side::Prev,
            Direction::Neutral => return Aspect::Red,
        };
        line.unit(self.curr_unit)
            .selected(side)
            .map(|n| line.unit(n).aspect(side))
            .unwrap_or(Aspect::Red)
    }

    fn drive(&mut self, line: &mut Line, log: TrainLogger) -> Result<(), SimError> {
        let sign = self.direction.sign();
        let mid = line.unit(self.curr_unit).midpoint() as i64;
        let idx = self.curr_index as i64;

        let may_raise = match self.aspect_ahead(line) {
            Aspect::Green => {
                self.speed_limit = self.max_speed;
                true
            }
            Aspect::Yellow => {
                self.speed_limit = 1;
                true
            }
            Aspect::Red => {
                // Past the midpoint the train is committed to the red signal.
                if (mid - idx) * sign < 0 {
                    self.speed = 0;
                }
                false
            }
        };

        if self.curr_unit != self.target_unit {
            if self.process_time > 0 {
                self.process_time -= 1;
            }
            if self.process_time == 0 && may_raise && self.speed < self.speed_limit {
                self.speed += 1;
                self.process_time = ACCELERATION_TICKS;
            }
        } else {
            let remaining = (mid - idx).abs();
            if remaining <= self.speed as i64 {
                self.arrive(mid as usize, log);
                return Ok(());
            }
            let braking = (self.speed * self.speed.saturating_sub(1) * 10) as i64;
            if remaining <= braking && self.speed > 1 {
                self.speed -= 1;
            }
        }

        let raw = idx + self.speed as i64 * sign;
        let (unit, index) = line.get_next_pos(self.curr_unit, raw)?;
        if unit != self.curr_unit {
            trace!("{} enters unit {}", self.id, unit);
            line.move_occupant(self.curr_unit, unit);
            log(TrainLogEvent::Entered(unit));
            self.curr_unit = unit;
        }
        self.curr_index = index;
        Ok(())
    }

    fn arrive(&mut self, mid: usize, log: TrainLogger) {
        self.curr_index = mid;
        self.speed = 0;
        self.direction = Direction::Neutral;
        self.situation = TrainSituation::Waiting;
        let stop = &self.schedule[self.progress];
        info!("{} arrives at {} track {}", self.id, stop.station, stop.track);
        log(TrainLogEvent::Arrived {
            station: stop.station.clone(),
            track: stop.track,
        });
    }
}
