//! Tests for the point filter
//!
//! The filter contract: duplicates removed, a greedy minimum-spacing pass
//! that always keeps the endpoints, deterministic and idempotent.

use icetrack::{dedup_points, enforce_min_spacing, filter_track, TrackPoint};

fn pts(raw: &[(f64, f64)]) -> Vec<TrackPoint> {
    raw.iter().map(|&(x, y)| TrackPoint::new(x, y)).collect()
}

/// 1km track with uneven spacing, duplicates included.
fn messy_track() -> Vec<TrackPoint> {
    pts(&[
        (0.0, 0.0),
        (0.0, 0.0),
        (40.0, 10.0),
        (180.0, 0.0),
        (210.0, 5.0),
        (210.0, 5.0),
        (430.0, 0.0),
        (460.0, 0.0),
        (700.0, 20.0),
        (1000.0, 0.0),
    ])
}

#[test]
fn test_filter_is_idempotent() {
    let once = filter_track(&messy_track(), 200.0);
    let twice = filter_track(&once, 200.0);
    assert_eq!(once, twice);
}

#[test]
fn test_endpoints_always_retained() {
    let input = messy_track();
    let out = filter_track(&input, 200.0);
    assert_eq!(out.first(), input.first());
    assert_eq!(out.last(), input.last());

    // Same with a threshold larger than the whole track.
    let out = filter_track(&input, 5_000.0);
    assert_eq!(out.first(), input.first());
    assert_eq!(out.last(), input.last());
}

#[test]
fn test_spacing_enforced_between_retained_points() {
    let out = filter_track(&messy_track(), 200.0);

    // Every consecutive pair except possibly the final one is >= d_min.
    for window in out[..out.len() - 1].windows(2) {
        assert!(
            window[0].distance_to(&window[1]) >= 200.0,
            "points {:?} and {:?} closer than d_min",
            window[0],
            window[1]
        );
    }
}

#[test]
fn test_track_entirely_within_threshold_collapses_to_endpoints() {
    // All points within 200m of each other.
    let input = pts(&[
        (0.0, 0.0),
        (30.0, 10.0),
        (60.0, 0.0),
        (90.0, 10.0),
        (120.0, 0.0),
    ]);
    let out = filter_track(&input, 200.0);
    assert_eq!(out, pts(&[(0.0, 0.0), (120.0, 0.0)]));
}

#[test]
fn test_dedup_keeps_order_and_distant_revisits() {
    // A track may legitimately revisit a coordinate later; only
    // consecutive repeats are duplicates.
    let input = pts(&[(0.0, 0.0), (500.0, 0.0), (500.0, 0.0), (0.0, 0.0)]);
    let out = dedup_points(&input);
    assert_eq!(out, pts(&[(0.0, 0.0), (500.0, 0.0), (0.0, 0.0)]));
}

#[test]
fn test_short_inputs_unchanged() {
    let empty: Vec<TrackPoint> = vec![];
    assert_eq!(enforce_min_spacing(&empty, 200.0), empty);

    let single = pts(&[(5.0, 5.0)]);
    assert_eq!(enforce_min_spacing(&single, 200.0), single);

    let pair = pts(&[(0.0, 0.0), (10.0, 0.0)]);
    assert_eq!(enforce_min_spacing(&pair, 200.0), pair);
}
