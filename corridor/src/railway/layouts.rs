//! Route tables of the two junction shapes on the corridor.

use std::collections::HashMap;
use std::ops::Range;

use smallvec::smallvec;

use crate::railway::infrastructure::Line;
use crate::railway::interlocking::{MovementKind, Route};
use crate::railway::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayoutKind {
    /// Merge, normal, crossing, normal: four platforms fanning into a
    /// double track.
    StartingFourTrack,
    /// Normal, crossing, normal: a double track ending in two platforms.
    TerminalTwoTrack,
}

#[derive(Debug)]
pub struct Layout {
    pub sections: Range<SectionId>,
    pub boundary: Vec<(UnitId, Side)>,
    pub routes: HashMap<(MovementKind, usize), Route>,
}

impl LayoutKind {
    pub fn build(self, line: &Line, first: SectionId, junction: &str) -> Result<Layout, SimError> {
        match self {
            LayoutKind::StartingFourTrack => starting_four_track(line, first, junction),
            LayoutKind::TerminalTwoTrack => terminal_two_track(line, first, junction),
        }
    }
}

/// Unit lists of `first..first + shape.len()`, checked against the section
/// kinds and track counts in `shape`.
fn sections<'a>(
    line: &'a Line,
    first: SectionId,
    junction: &str,
    shape: &[(&str, usize)],
) -> Result<Vec<&'a [UnitId]>, SimError> {
    let mut units = Vec::new();
    for (i, &(kind, tracks)) in shape.iter().enumerate() {
        let s = first + i;
        let section = line.sections.get(s).ok_or_else(|| SimError::JunctionLayout {
            junction: junction.to_string(),
            reason: format!("section {} does not exist", s),
        })?;
        if section.kind.name() != kind || section.units.len() != tracks {
            return Err(SimError::JunctionLayout {
                junction: junction.to_string(),
                reason: format!(
                    "section {} is a {} section with {} units, expected {} with {}",
                    s,
                    section.kind.name(),
                    section.units.len(),
                    kind,
                    tracks
                ),
            });
        }
        units.push(&section.units[..]);
    }
    Ok(units)
}

fn starting_four_track(line: &Line, first: SectionId, junction: &str) -> Result<Layout, SimError> {
    let s = sections(line, first, junction, &[("merge", 4), ("normal", 2), ("crossing", 4), ("normal", 2)])?;
    let (m, n, c, o) = (s[0], s[1], s[2], s[3]);
    let crossing = first + 2;

    let mut routes = HashMap::new();
    for t in 0..4 {
        let platform = line.unit(m[t]).neighbours(Side::Prev).first().cloned().ok_or_else(|| {
            SimError::JunctionLayout {
                junction: junction.to_string(),
                reason: format!("no platform behind track {}", t),
            }
        })?;

        let (n_dep, c_dep, path_dep, o_dep) = if t < 2 { (n[0], c[0], 0, 0) } else { (n[1], c[2], 2, 1) };
        routes.insert(
            (MovementKind::Departure, t),
            Route {
                destination: o[0],
                crossing: Some((crossing, path_dep)),
                switches: smallvec![(n_dep, Side::Prev, t % 2), (n_dep, Side::Next, 0), (o[0], Side::Prev, o_dep)],
                reserve: smallvec![m[t], n_dep, c_dep],
                signal: (m[t], Side::Next),
            },
        );

        let (n_arr, c_arr, path_arr, o_arr) = if t < 2 { (n[0], c[1], 1, 0) } else { (n[1], c[3], 3, 1) };
        routes.insert(
            (MovementKind::Arrival, t),
            Route {
                destination: platform,
                crossing: Some((crossing, path_arr)),
                switches: smallvec![(n_arr, Side::Prev, t % 2), (n_arr, Side::Next, 1), (o[1], Side::Prev, o_arr)],
                reserve: smallvec![n_arr, c_arr],
                signal: (c_arr, Side::Prev),
            },
        );
    }

    let mut boundary: Vec<(UnitId, Side)> = m.iter().map(|&u| (u, Side::Next)).collect();
    boundary.extend(c.iter().map(|&u| (u, Side::Prev)));

    Ok(Layout {
        sections: first..first + 4,
        boundary,
        routes,
    })
}

fn terminal_two_track(line: &Line, first: SectionId, junction: &str) -> Result<Layout, SimError> {
    let s = sections(line, first, junction, &[("normal", 2), ("crossing", 4), ("normal", 2)])?;
    let (a, c, p) = (s[0], s[1], s[2]);
    let crossing = first + 1;

    let mut routes = HashMap::new();
    for t in 0..2 {
        routes.insert(
            (MovementKind::Arrival, t),
            Route {
                destination: p[t],
                crossing: Some((crossing, t)),
                switches: smallvec![(a[0], Side::Next, t), (p[t], Side::Prev, 0)],
                reserve: smallvec![c[t]],
                signal: (c[t], Side::Next),
            },
        );
        routes.insert(
            (MovementKind::Departure, t),
            Route {
                destination: a[1],
                crossing: Some((crossing, 2 + t)),
                switches: smallvec![(a[1], Side::Next, t), (p[t], Side::Prev, 1)],
                reserve: smallvec![c[2 + t]],
                signal: (c[2 + t], Side::Prev),
            },
        );
    }

    let boundary = c
        .iter()
        .flat_map(|&u| vec![(u, Side::Prev), (u, Side::Next)])
        .collect();

    Ok(Layout {
        sections: first..first + 3,
        boundary,
        routes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{starting_line, terminal_line};

    /// Walks from `from` along the selected neighbours on `side` after
    /// applying a route's switches, returning the units passed.
    fn walk(line: &Line, route: &Route, from: UnitId, side: Side, steps: usize) -> Vec<UnitId> {
        let selected = |u: UnitId, side: Side| -> UnitId {
            for &(unit, s, index) in &route.switches {
                if unit == u && s == side {
                    return line.unit(u).neighbours(side)[index];
                }
            }
            line.unit(u).selected(side).unwrap()
        };
        let mut path = vec![from];
        for _ in 0..steps {
            let last = *path.last().unwrap();
            path.push(selected(last, side));
        }
        path
    }

    #[test]
    fn starting_routes_lead_to_destination() {
        let line = starting_line();
        let layout = LayoutKind::StartingFourTrack.build(&line, 2, "S").unwrap();
        assert_eq!(layout.routes.len(), 8);
        assert_eq!(layout.boundary.len(), 8);
        for t in 0..4 {
            let platform = line.platform("Stonevale", t).unwrap();
            let dep = &layout.routes[&(MovementKind::Departure, t)];
            let forward = walk(&line, dep, platform, Side::Next, 4);
            assert_eq!(forward[4], dep.destination);
            for u in &dep.reserve {
                assert!(forward.contains(u));
            }

            let arr = &layout.routes[&(MovementKind::Arrival, t)];
            let o1 = line.sections[5].units[1];
            let backward = walk(&line, arr, o1, Side::Prev, 4);
            assert_eq!(backward[4], platform);
            assert_eq!(arr.destination, platform);
            assert_eq!(arr.signal, (backward[1], Side::Prev));
        }
    }

    #[test]
    fn terminal_routes_lead_to_destination() {
        let line = terminal_line();
        let layout = LayoutKind::TerminalTwoTrack.build(&line, 2, "T").unwrap();
        assert_eq!(layout.boundary.len(), 8);
        let a = &line.sections[2].units;
        for t in 0..2 {
            let platform = line.platform("Ashmoor", t).unwrap();
            let arr = &layout.routes[&(MovementKind::Arrival, t)];
            assert_eq!(walk(&line, arr, a[0], Side::Next, 2)[2], platform);
            let dep = &layout.routes[&(MovementKind::Departure, t)];
            assert_eq!(walk(&line, dep, platform, Side::Prev, 2)[2], a[1]);
        }
    }

    #[test]
    fn wrong_sections_are_rejected() {
        let line = starting_line();
        let result = LayoutKind::TerminalTwoTrack.build(&line, 2, "T");
        assert!(matches!(result, Err(SimError::JunctionLayout { .. })));
        let result = LayoutKind::StartingFourTrack.build(&line, 5, "S");
        assert!(matches!(result, Err(SimError::JunctionLayout { .. })));
    }
}
