use maplit::hashmap;

use crate::config::SimConfig;
use crate::input::line::parse_line;
use crate::input::timetable::{parse_timetable, RouteRequest, ScheduleStop, TimetableEntry, TrainDef};
use crate::output::history::TrainLogEvent;
use crate::railway::driver::Train;
use crate::railway::infrastructure::Line;
use crate::railway::*;
use crate::simulation::{Clock, Simulation};

const LINE: &str = include_str!("../data/line.json");
const TIMETABLE: &str = include_str!("../data/timetable.json");

/// Four platforms, the starting junction on sections 2..6, then a double
/// track to the two platforms of "Far".
pub fn starting_line() -> Line {
    let d = parse_line(
        r#"{ "sections": [
            { "unit_type": "start", "start_coord": [[0, 100], [0, 140], [0, 180], [0, 220]] },
            { "unit_type": "normal", "length": 200 },
            { "unit_type": "merge", "vector": [100, 40] },
            { "unit_type": "normal", "length": 100 },
            { "unit_type": "crossing", "vector": [100, 40] },
            { "unit_type": "normal", "length": 600 },
            { "unit_type": "normal", "length": 400 },
            { "unit_type": "end" } ],
          "stations": [ { "name": "Stonevale", "sect_index": 1 }, { "name": "Far", "sect_index": 6 } ] }"#,
    )
    .unwrap();
    Line::new(&d).unwrap()
}

/// A double track into the terminal junction on sections 2..5.
pub fn terminal_line() -> Line {
    let d = parse_line(
        r#"{ "sections": [
            { "unit_type": "start", "start_coord": [[0, 140], [0, 180]] },
            { "unit_type": "normal", "length": 300 },
            { "unit_type": "normal", "length": 800 },
            { "unit_type": "crossing", "vector": [100, 40] },
            { "unit_type": "normal", "length": 200 },
            { "unit_type": "end" } ],
          "stations": [ { "name": "Millbrook", "sect_index": 1 }, { "name": "Ashmoor", "sect_index": 4 } ] }"#,
    )
    .unwrap();
    Line::new(&d).unwrap()
}

pub fn requests(list: &[(u32, usize)]) -> Vec<RouteRequest> {
    list.iter().map(|&(number, track)| RouteRequest { number, track }).collect()
}

/// A train leaving `from` forward at minute 0, bound for `to`.
pub fn train_between(line: &mut Line, id: &str, number: u32, from: (&str, usize), to: (&str, usize)) -> Train {
    let def = TrainDef {
        id: id.to_string(),
        init_stn: from.0.to_string(),
        init_track: from.1,
        max_speed: 5,
        color: [0, 0, 0],
    };
    let stop = |(station, track): (&str, usize), dep: Option<Minute>, dir: Option<Direction>| ScheduleStop {
        station: station.to_string(),
        track,
        arr_time: None,
        dep_time: dep,
        direction: dir,
    };
    let entry = TimetableEntry {
        train_id: id.to_string(),
        number,
        schedule: vec![stop(from, Some(0), Some(Direction::Forward)), stop(to, None, None)],
    };
    Train::new(&def, &entry, line).unwrap()
}

fn reference_simulation() -> Simulation {
    let line = parse_line(LINE).unwrap();
    let timetable = parse_timetable(TIMETABLE).unwrap();
    Simulation::new(&line, &timetable, SimConfig::default()).unwrap()
}

fn check_occupancy(sim: &Simulation) {
    for (id, unit) in sim.line.units().iter().enumerate() {
        let holders = sim.trains.iter().filter(|t| t.curr_unit == id).count();
        match unit.situation {
            UnitSituation::Occupied => assert_eq!(holders, 1, "unit {} occupied by {} trains", id, holders),
            _ => assert_eq!(holders, 0, "train on unit {} which is {:?}", id, unit.situation),
        }
    }
}

#[test]
fn reference_day_completes() {
    let mut sim = reference_simulation();
    let mut clock = Clock::new(sim.config.start_minute, sim.config.ticks_per_minute);
    check_occupancy(&sim);
    while clock.minute < sim.config.end_minute && !sim.is_finished() {
        sim.advance(clock.tick, clock.minute).unwrap();
        check_occupancy(&sim);
        clock.step();
    }
    assert!(sim.is_finished(), "still running at minute {}", clock.minute);
    assert!(clock.minute < 420);

    for t in &sim.trains {
        let last = t.schedule().last().unwrap();
        let platform = sim.line.platform(&last.station, last.track).unwrap();
        assert_eq!(t.curr_unit, platform, "{} not at {}", t.id, last.station);
        assert_eq!(t.curr_index, sim.line.unit(platform).midpoint());
        assert_eq!(t.situation, TrainSituation::Waiting);
    }
    for c in &sim.controllers {
        assert_eq!(c.pending(), 0);
    }
}

#[test]
fn reference_day_arrivals_in_order() {
    let mut sim = reference_simulation();
    let mut clock = Clock::new(sim.config.start_minute, sim.config.ticks_per_minute);
    sim.run(&mut clock).unwrap();

    let expected = hashmap! {
        "T1" => vec![("Millbrook", 0), ("Ashmoor", 0), ("Millbrook", 2), ("Stonevale", 2)],
        "T2" => vec![("Millbrook", 2), ("Stonevale", 3)],
    };
    for (name, events) in &sim.history.trains {
        let arrivals: Vec<(&str, usize)> = events
            .iter()
            .filter_map(|(_, e)| match e {
                TrainLogEvent::Arrived { station, track } => Some((station.as_str(), *track)),
                _ => None,
            })
            .collect();
        assert_eq!(arrivals, expected[name.as_str()]);
    }

    // Every train arrival at an intermediate stop comes before its departure.
    let (_, t1) = &sim.history.trains[0];
    let first_arrival = t1.iter().position(|(_, e)| matches!(e, TrainLogEvent::Arrived { .. })).unwrap();
    assert!(matches!(t1[0].1, TrainLogEvent::Departed { .. }));
    assert!(matches!(t1[first_arrival + 1].1, TrainLogEvent::Departed { .. }));
}

#[test]
fn reference_day_grants_every_route() {
    let mut sim = reference_simulation();
    let mut clock = Clock::new(sim.config.start_minute, sim.config.ticks_per_minute);
    sim.run(&mut clock).unwrap();
    use crate::output::history::InfrastructureLogEvent;
    let grants: Vec<(String, u32)> = sim
        .history
        .inf
        .iter()
        .filter_map(|(_, e)| match e {
            InfrastructureLogEvent::Route { junction, number, .. } => Some((junction.clone(), *number)),
            _ => None,
        })
        .collect();
    let starting: Vec<u32> = grants.iter().filter(|g| g.0 == "starting").map(|g| g.1).collect();
    let terminal: Vec<u32> = grants.iter().filter(|g| g.0 == "terminal").map(|g| g.1).collect();
    assert_eq!(starting, vec![1, 2, 4]);
    assert_eq!(terminal, vec![2, 1, 4]);
    assert_eq!(sim.controllers[0].arr_track, Some(2));
    assert_eq!(sim.controllers[1].arr_track, Some(0));
}

#[test]
fn trains_without_timetable_are_skipped() {
    let line = parse_line(LINE).unwrap();
    let mut timetable = parse_timetable(TIMETABLE).unwrap();
    let mut extra = timetable.train[0].clone();
    extra.id = "T7".to_string();
    extra.init_track = 1;
    timetable.train.push(extra);
    let sim = Simulation::new(&line, &timetable, SimConfig::default()).unwrap();
    assert_eq!(sim.trains.len(), 2);
    assert_eq!(sim.history.trains.len(), 2);
}

#[test]
fn snapshot_reports_state() {
    let mut sim = reference_simulation();
    sim.advance(0, 358).unwrap();
    let snapshot = sim.snapshot(358);
    assert_eq!(snapshot.clock, "05:58");
    assert_eq!(snapshot.units.len(), sim.line.units().len());
    assert_eq!(snapshot.trains.len(), 2);
    assert_eq!(snapshot.trains[0].coordinate, (100.0, 100.0));
    assert_eq!(snapshot.junctions[0].name, "starting");
    assert_eq!(snapshot.junctions[0].pending, 2);
    assert_eq!(snapshot.junctions[1].arrival_aspect, Aspect::Red);

    let mut out = Vec::new();
    crate::output::json::json_snapshot(&snapshot, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["trains"][1]["direction"], "NEUTRAL");
    assert_eq!(value["junctions"][0]["progress"], 1);
}

#[test]
fn unknown_platform_fails_construction() {
    let line = parse_line(LINE).unwrap();
    let mut timetable = parse_timetable(TIMETABLE).unwrap();
    timetable.train[1].init_stn = "Nowhere".to_string();
    match Simulation::new(&line, &timetable, SimConfig::default()) {
        Err(SimError::UnknownStation(name)) => assert_eq!(name, "Nowhere"),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("construction succeeded"),
    }
}
