use std::io;

use failure::Error;
use serde::Serialize;

use super::history::History;
use super::snapshot::Snapshot;

pub fn javascript_history<W: io::Write>(history: &History, f: &mut W) -> Result<(), Error> {
    write!(f, "var data = ")?;
    json_history(history, f)?;
    write!(f, ";")?;
    Ok(())
}

/// Infrastructure and train events, each as `{ "time", "event", ... }`.
pub fn json_history<W: io::Write>(history: &History, f: &mut W) -> Result<(), Error> {
    #[derive(Serialize)]
    struct Timed<'a, E> {
        time: u64,
        event: &'a E,
    }

    #[derive(Serialize)]
    struct TrainHistory<'a, E> {
        name: &'a str,
        events: Vec<Timed<'a, E>>,
    }

    #[derive(Serialize)]
    struct Doc<'a, I, T> {
        infrastructure: Vec<Timed<'a, I>>,
        trains: Vec<TrainHistory<'a, T>>,
    }

    let doc = Doc {
        infrastructure: history.inf.iter().map(|(t, e)| Timed { time: *t, event: e }).collect(),
        trains: history
            .trains
            .iter()
            .map(|(name, events)| TrainHistory {
                name,
                events: events.iter().map(|(t, e)| Timed { time: *t, event: e }).collect(),
            })
            .collect(),
    };
    serde_json::to_writer(&mut *f, &doc)?;
    Ok(())
}

pub fn json_snapshot<W: io::Write>(snapshot: &Snapshot, f: &mut W) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *f, snapshot)?;
    writeln!(f)?;
    Ok(())
}
