//! Duplicate removal and minimum-spacing point filtering.
//!
//! The filter is a single greedy left-to-right pass, not a global
//! optimization: a point is retained when it is at least `d_min` meters
//! (Euclidean, in the projected frame) from the last retained point. The
//! first and last points of a sequence are always retained, so the final
//! pair may end up closer than `d_min`. Both passes preserve order and
//! are idempotent.

use crate::TrackPoint;

/// Remove consecutive points with identical coordinates.
///
/// Exact (bitwise) equality only; near-duplicates are left for the
/// spacing pass.
pub fn dedup_points(points: &[TrackPoint]) -> Vec<TrackPoint> {
    let mut out: Vec<TrackPoint> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| !last.coincides_with(p)) {
            out.push(*p);
        }
    }
    out
}

/// Enforce a minimum spacing of `d_min` meters between retained points.
///
/// Inputs with fewer than 2 points are returned unchanged. The last point
/// is always kept unless it coincides exactly with the last retained
/// point, in which case it is already represented.
pub fn enforce_min_spacing(points: &[TrackPoint], d_min: f64) -> Vec<TrackPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut out = vec![points[0]];
    for p in &points[1..points.len() - 1] {
        // Distance to the last *retained* point, not the previous input point.
        if out.last().map(|last| last.distance_to(p)).unwrap_or(f64::MAX) >= d_min {
            out.push(*p);
        }
    }

    let last = points[points.len() - 1];
    if !out.last().is_some_and(|kept| kept.coincides_with(&last)) {
        out.push(last);
    }
    out
}

/// Dedup then spacing, the composition used by the pipeline.
pub fn filter_track(points: &[TrackPoint], d_min: f64) -> Vec<TrackPoint> {
    let deduped = dedup_points(points);
    enforce_min_spacing(&deduped, d_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<TrackPoint> {
        raw.iter().map(|&(x, y)| TrackPoint::new(x, y)).collect()
    }

    #[test]
    fn dedup_removes_consecutive_repeats() {
        let input = pts(&[(0.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (10.0, 0.0)]);
        let out = dedup_points(&input);
        assert_eq!(out, pts(&[(0.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn spacing_keeps_endpoints() {
        let input = pts(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let out = enforce_min_spacing(&input, 200.0);
        assert_eq!(out, pts(&[(0.0, 0.0), (100.0, 0.0)]));
    }

    #[test]
    fn spacing_measures_from_last_retained() {
        // 150m steps: each point is under 200m from its predecessor but the
        // greedy pass accumulates distance from the last retained one.
        let input = pts(&[
            (0.0, 0.0),
            (150.0, 0.0),
            (300.0, 0.0),
            (450.0, 0.0),
            (600.0, 0.0),
        ]);
        let out = enforce_min_spacing(&input, 200.0);
        assert_eq!(out, pts(&[(0.0, 0.0), (300.0, 0.0), (600.0, 0.0)]));
    }

    #[test]
    fn short_input_unchanged() {
        let single = pts(&[(1.0, 2.0)]);
        assert_eq!(enforce_min_spacing(&single, 200.0), single);
        let empty: Vec<TrackPoint> = vec![];
        assert_eq!(enforce_min_spacing(&empty, 200.0), empty);
    }

    #[test]
    fn filter_is_idempotent() {
        let input = pts(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (90.0, 10.0),
            (250.0, 0.0),
            (260.0, 5.0),
            (500.0, 0.0),
        ]);
        let once = filter_track(&input, 200.0);
        let twice = filter_track(&once, 200.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn closed_loop_collapses_without_duplicating_start() {
        // All points within d_min and the track returns to its exact start.
        let input = pts(&[(0.0, 0.0), (50.0, 0.0), (0.0, 0.0)]);
        let out = filter_track(&input, 200.0);
        assert_eq!(out, pts(&[(0.0, 0.0)]));
    }
}
