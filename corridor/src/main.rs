use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use corridor::config::{JunctionConfig, SimConfig};
use corridor::input::clock::{format_clock, parse_clock};
use corridor::output;
use corridor::railway::Minute;
use corridor::simulation::{Clock, Simulation};
use corridor::*;
use structopt::StructOpt;

fn clock(s: &str) -> Result<Minute, String> {
    parse_clock(s).map_err(|e| e.to_string())
}

/// Corridor -- timetabled trains on a block-signalled double track
#[derive(StructOpt, Debug)]
#[structopt(name = "corridor")]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Line descriptor (JSON)
    #[structopt(parse(from_os_str))]
    line: PathBuf,

    /// Timetable descriptor (JSON)
    #[structopt(parse(from_os_str))]
    timetable: PathBuf,

    /// Output JSON history file
    #[structopt(short = "j", long = "json", parse(from_os_str))]
    json: Option<PathBuf>,

    /// Output JSON history as JavaScript
    #[structopt(short = "J", long = "javascript", parse(from_os_str))]
    javascript: Option<PathBuf>,

    /// Output train arrival times to file
    #[structopt(short = "n", long = "visits", parse(from_os_str))]
    visits: Option<PathBuf>,

    /// Output the final state as a JSON snapshot
    #[structopt(short = "s", long = "snapshot", parse(from_os_str))]
    snapshot: Option<PathBuf>,

    /// Clock at the first tick (HH:MM or minutes)
    #[structopt(long = "start", default_value = "05:58", parse(try_from_str = clock))]
    start: Minute,

    /// Clock at which the run stops (HH:MM or minutes)
    #[structopt(long = "end", default_value = "24:00", parse(try_from_str = clock))]
    end: Minute,

    /// Ticks between signal and junction updates
    #[structopt(long = "signal-interval", default_value = "30")]
    signal_interval: u64,

    #[structopt(long = "ticks-per-minute", default_value = "60")]
    ticks_per_minute: u64,

    /// First section of the four-track starting junction
    #[structopt(long = "starting-junction", default_value = "2")]
    starting_junction: usize,

    /// First section of the two-track terminal junction
    #[structopt(long = "terminal-junction", default_value = "9")]
    terminal_junction: usize,
}

impl Opt {
    fn config(&self) -> SimConfig {
        SimConfig {
            signal_interval: self.signal_interval,
            ticks_per_minute: self.ticks_per_minute,
            start_minute: self.start,
            end_minute: self.end,
            junctions: vec![
                JunctionConfig::starting(self.starting_junction),
                JunctionConfig::terminal(self.terminal_junction),
            ],
        }
    }
}

fn run(opt: &Opt) -> AppResult<()> {
    let line = get_line(&opt.line)?;
    let timetable = get_timetable(&opt.timetable)?;
    let config = opt.config();
    let mut clock = Clock::new(config.start_minute, config.ticks_per_minute);

    let mut sim = Simulation::new(&line, &timetable, config)?;
    sim.run(&mut clock)?;

    println!("# Run ended at {} after {} ticks", format_clock(clock.minute), clock.tick);
    for t in &sim.trains {
        let stop = t.progress.min(t.schedule().len().saturating_sub(1));
        let at = t.schedule().get(stop).map(|s| s.station.as_str()).unwrap_or("-");
        println!("  {} ({}): {:?} at {}, {}/{} stops", t.id, t.number, t.situation, at, t.progress + 1, t.schedule().len());
    }
    for j in &sim.controllers {
        println!("  junction {}: {} routes granted, {} pending", j.name, j.progress, j.pending());
    }

    if let Some(ref json) = opt.json {
        let file = File::create(json)?;
        let mut writer = BufWriter::new(&file);
        output::json::json_history(&sim.history, &mut writer)?;
    }

    if let Some(ref javascript) = opt.javascript {
        let file = File::create(javascript)?;
        let mut writer = BufWriter::new(&file);
        output::json::javascript_history(&sim.history, &mut writer)?;
    }

    if let Some(ref visits) = opt.visits {
        let file = File::create(visits)?;
        let mut writer = BufWriter::new(&file);
        let string = output::history::visits(&sim.history)?;
        write!(writer, "{}", string)?;
    }

    if let Some(ref snapshot) = opt.snapshot {
        let file = File::create(snapshot)?;
        let mut writer = BufWriter::new(&file);
        output::json::json_snapshot(&sim.snapshot(clock.minute), &mut writer)?;
    }

    Ok(())
}

pub fn main() {
    let opt = Opt::from_args();
    let level = match opt.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("{:?}", opt);

    match run(&opt) {
        Ok(()) => {}
        Err(e) => {
            println!("Error:\n{}", e.as_fail());
            std::process::exit(1);
        }
    }
}
