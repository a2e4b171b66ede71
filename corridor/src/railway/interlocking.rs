use std::collections::HashMap;
use std::ops::Range;

use log::debug;
use serde::Serialize;
use smallvec::SmallVec;

use crate::input::timetable::RouteRequest;
use crate::output::history::InfrastructureLogEvent;
use crate::railway::infrastructure::{InfLogger, Line};
use crate::railway::layouts::Layout;
use crate::railway::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MovementKind {
    Departure,
    Arrival,
}

/// Which request numbers are departures at a junction. The other parity
/// arrives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParityRule {
    OddDeparts,
    EvenDeparts,
}

impl ParityRule {
    pub fn movement(self, number: u32) -> MovementKind {
        let odd = number % 2 == 1;
        match (self, odd) {
            (ParityRule::OddDeparts, true) | (ParityRule::EvenDeparts, false) => MovementKind::Departure,
            _ => MovementKind::Arrival,
        }
    }
}

/// Everything the controller touches to grant one movement to one track.
#[derive(Debug, Clone)]
pub struct Route {
    /// Must not be occupied when the route is granted.
    pub destination: UnitId,
    /// Crossing section and path index to check for conflicts.
    pub crossing: Option<(SectionId, usize)>,
    pub switches: SmallVec<[(UnitId, Side, usize); 4]>,
    /// Must be free, and become blocked on grant.
    pub reserve: SmallVec<[UnitId; 4]>,
    /// Aspect cleared to green on grant.
    pub signal: (UnitId, Side),
}

/// Grants the route requests of one junction strictly in order.
#[derive(Debug)]
pub struct JunctionController {
    pub id: ControllerId,
    pub name: String,
    pub sections: Range<SectionId>,
    routes: HashMap<(MovementKind, usize), Route>,
    boundary: Vec<(UnitId, Side)>,
    parity: ParityRule,
    requests: Vec<RouteRequest>,
    pub progress: usize,
    pub arr_track: Option<usize>,
}

impl JunctionController {
    pub fn new(
        id: ControllerId,
        name: &str,
        layout: Layout,
        parity: ParityRule,
        requests: Vec<RouteRequest>,
        line: &mut Line,
        log: InfLogger,
    ) -> Result<JunctionController, SimError> {
        for s in layout.sections.clone() {
            for &u in line.sections[s].units.clone().iter() {
                if !line.claim(id, u) {
                    return Err(SimError::JunctionLayout {
                        junction: name.to_string(),
                        reason: format!("unit {} already belongs to another junction", u),
                    });
                }
            }
        }
        for &(unit, side) in &layout.boundary {
            line.set_aspect(id, unit, side, Aspect::Red, log);
        }
        for r in &requests {
            if !layout.routes.contains_key(&(parity.movement(r.number), r.track)) {
                return Err(SimError::TrackOutOfRange {
                    station: name.to_string(),
                    track: r.track,
                });
            }
        }

        Ok(JunctionController {
            id,
            name: name.to_string(),
            sections: layout.sections,
            routes: layout.routes,
            boundary: layout.boundary,
            parity,
            requests,
            progress: 0,
            arr_track: None,
        })
    }

    pub fn pending(&self) -> usize {
        self.requests.len() - self.progress
    }

    pub fn is_done(&self) -> bool {
        self.progress == self.requests.len()
    }

    /// The aspects this junction shows to arriving trains.
    pub fn arrival_signals(&self) -> impl Iterator<Item = (UnitId, Side)> + '_ {
        self.routes
            .iter()
            .filter(|(k, _)| k.0 == MovementKind::Arrival)
            .map(|(_, r)| r.signal)
    }

    fn route(&self, request: &RouteRequest) -> (MovementKind, &Route) {
        let movement = self.parity.movement(request.number);
        // Every request was matched against the route table on construction.
        (movement, &self.routes[&(movement, request.track)])
    }

    fn guard(&self, line: &Line, route: &Route) -> bool {
        if line.unit(route.destination).situation == UnitSituation::Occupied {
            return false;
        }
        if route
            .reserve
            .iter()
            .any(|&u| line.unit(u).situation != UnitSituation::Free)
        {
            return false;
        }
        match route.crossing {
            Some((section, path)) => line.sections[section].check_pass_allowed(line, path),
            None => true,
        }
    }

    /// One signalling pass: close the boundary behind trains, then try to
    /// grant the next request.
    pub fn update(&mut self, line: &mut Line, log: InfLogger) {
        // A boundary aspect only shows proceed while its unit is reserved.
        for &(unit, side) in &self.boundary {
            if line.unit(unit).situation != UnitSituation::Blocked {
                line.set_aspect(self.id, unit, side, Aspect::Red, log);
            }
        }

        if self.is_done() {
            return;
        }
        let request = self.requests[self.progress].clone();
        let (movement, route) = self.route(&request);
        if !self.guard(line, route) {
            debug!("{} holds {:?} {} for track {}", self.name, movement, request.number, request.track);
            return;
        }

        let route = route.clone();
        for &(unit, side, index) in &route.switches {
            line.select(self.id, unit, side, index);
        }
        for &unit in &route.reserve {
            line.reserve(self.id, unit, log);
        }
        let (unit, side) = route.signal;
        line.set_aspect(self.id, unit, side, Aspect::Green, log);
        if movement == MovementKind::Arrival {
            self.arr_track = Some(request.track);
        }
        self.progress += 1;

        debug!("{} grants {:?} {} on track {}", self.name, movement, request.number, request.track);
        log(InfrastructureLogEvent::Route {
            junction: self.name.clone(),
            number: request.number,
            track: request.track,
            movement,
        });
    }
}
