pub type Coord = (f64, f64);
pub type Rail = Vec<Coord>;

const ARC_RESOLUTION: usize = 1000;

pub fn straight_rail(anchor: Coord, length: usize) -> Rail {
    (0..length).map(|i| (anchor.0 + i as f64, anchor.1)).collect()
}

/// Curve from `anchor` to `anchor + vector`, leaving and arriving parallel
/// to the x axis. Consecutive points are roughly one unit of distance apart,
/// so an index step means the same travel on straight and curved rail.
/// The anchor itself is not part of the rail.
pub fn curve_rail(anchor: Coord, vector: Coord) -> Rail {
    let steps = (arc_length(vector).floor() as usize).max(1);
    let control = control_points(anchor, vector);
    (1..=steps)
        .map(|i| cubic_bezier(i as f64 / steps as f64, &control))
        .collect()
}

pub fn arc_length(vector: Coord) -> f64 {
    let control = control_points((0.0, 0.0), vector);
    let mut prev = control[0];
    let mut total = 0.0;
    for i in 1..=ARC_RESOLUTION {
        let point = cubic_bezier(i as f64 / ARC_RESOLUTION as f64, &control);
        total += distance(prev, point);
        prev = point;
    }
    total
}

pub fn distance(a: Coord, b: Coord) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn control_points(anchor: Coord, vector: Coord) -> [Coord; 4] {
    let (x0, y0) = anchor;
    let (vx, vy) = vector;
    [
        (x0, y0),
        (x0 + vx / 2.0, y0),
        (x0 + vx / 2.0, y0 + vy),
        (x0 + vx, y0 + vy),
    ]
}

fn cubic_bezier(t: f64, control: &[Coord; 4]) -> Coord {
    let u = 1.0 - t;
    let weights = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    let mut point = (0.0, 0.0);
    for (w, c) in weights.iter().zip(control.iter()) {
        point.0 += w * c.0;
        point.1 += w * c.1;
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_rail_starts_on_anchor() {
        let rail = straight_rail((10.0, 5.0), 4);
        assert_eq!(rail, vec![(10.0, 5.0), (11.0, 5.0), (12.0, 5.0), (13.0, 5.0)]);
    }

    #[test]
    fn curve_ends_on_target() {
        let rail = curve_rail((0.0, 100.0), (100.0, 40.0));
        assert_eq!(*rail.last().unwrap(), (100.0, 140.0));
        assert_eq!(rail.len(), arc_length((100.0, 40.0)).floor() as usize);
        assert!(rail.len() > 100);
    }

    #[test]
    fn curve_points_are_about_one_unit_apart() {
        let anchor = (0.0, 0.0);
        let rail = curve_rail(anchor, (100.0, -40.0));
        let mut prev = anchor;
        for &p in &rail {
            let d = distance(prev, p);
            assert!(d > 0.5 && d < 1.5, "step of {} at {:?}", d, p);
            prev = p;
        }
    }
}
