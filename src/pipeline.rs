//! Per-track normalization, filtering and simplification.
//!
//! One raw coordinate sequence goes in, one finalized [`Track`] comes
//! out: normalize into the canonical polar frame, drop duplicates,
//! enforce the minimum spacing, then simplify line tracks with
//! Ramer-Douglas-Peucker. Point-cloud tracks are thinned by spacing only.
//!
//! Tracks are independent of each other, so batches can fan out across
//! worker threads (the `parallel` feature); the indexer downstream is the
//! single synchronization point.

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{IndexError, Result};
use crate::filtering::{dedup_points, filter_track};
use crate::naming::ConventionRegistry;
use crate::projection::normalize;
use crate::simplify::simplify;
use crate::{GeometryKind, PipelineConfig, RawTrack, SkippedTrack, Track, TrackPoint};

/// Run the full chain on one raw track.
///
/// Line tracks keep at least their two endpoints, point clouds at least
/// one point, regardless of tolerance. Inputs below those minimums fail
/// with [`IndexError::InsufficientPoints`].
pub fn build_track(
    raw: RawTrack,
    config: &PipelineConfig,
    registry: &ConventionRegistry,
) -> Result<Track> {
    let name = raw.identity.display_name();
    let kind = registry.geometry_kind(&raw.identity);

    if raw.coords.len() < kind.min_points() {
        return Err(IndexError::InsufficientPoints {
            name,
            point_count: raw.coords.len(),
            minimum_required: kind.min_points(),
        });
    }

    let normalized = normalize(&raw.coords, raw.format, raw.hemisphere)?;

    let points = match kind {
        GeometryKind::LineString => {
            let filtered = filter_track(&normalized, config.min_spacing_meters);
            let simplified = simplify(&filtered, config.line_tolerance_meters);
            if simplified.len() >= 2 {
                cap_points(simplified, config.max_simplified_points)
            } else {
                // A closed loop shorter than the spacing threshold can
                // collapse to a single point; recover the endpoints of
                // the deduplicated input if they are distinct.
                let deduped = dedup_points(&normalized);
                let first = deduped[0];
                let last = deduped[deduped.len() - 1];
                if deduped.len() >= 2 && !first.coincides_with(&last) {
                    vec![first, last]
                } else {
                    return Err(IndexError::InsufficientPoints {
                        name,
                        point_count: 1,
                        minimum_required: 2,
                    });
                }
            }
        }
        GeometryKind::MultiPoint => {
            let filtered = filter_track(&normalized, config.point_cloud_spacing_meters);
            cap_points(filtered, config.max_simplified_points)
        }
    };

    debug!(
        "built track {}: {} -> {} points",
        raw.identity.display_name(),
        raw.coords.len(),
        points.len()
    );

    Ok(Track {
        identity: raw.identity,
        hemisphere: raw.hemisphere,
        kind,
        points,
    })
}

/// Run the chain over a batch with per-track failure isolation.
///
/// Failing tracks are logged and reported in the skip list; survivors are
/// returned in input order. With the `parallel` feature the per-track
/// work is distributed with rayon.
pub fn build_tracks(
    raws: Vec<RawTrack>,
    config: &PipelineConfig,
    registry: &ConventionRegistry,
) -> (Vec<Track>, Vec<SkippedTrack>) {
    #[cfg(feature = "parallel")]
    let results: Vec<(String, Result<Track>)> = raws
        .into_par_iter()
        .map(|raw| {
            let name = raw.identity.display_name();
            (name, build_track(raw, config, registry))
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(String, Result<Track>)> = raws
        .into_iter()
        .map(|raw| {
            let name = raw.identity.display_name();
            (name, build_track(raw, config, registry))
        })
        .collect();

    let mut tracks = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (name, result) in results {
        match result {
            Ok(track) => tracks.push(track),
            Err(err) => {
                warn!("skipping track {name}: {err}");
                skipped.push(SkippedTrack {
                    name,
                    reason: err.to_string(),
                });
            }
        }
    }
    (tracks, skipped)
}

/// Cap a point sequence by uniform sampling, preserving the endpoints.
fn cap_points(points: Vec<TrackPoint>, max: usize) -> Vec<TrackPoint> {
    if max == 0 || points.len() <= max {
        return points;
    }
    let step = points.len() as f64 / max as f64;
    let mut out: Vec<TrackPoint> = (0..max)
        .map(|i| points[(i as f64 * step) as usize])
        .collect();
    // Uniform sampling can miss the final point; the endpoints are part
    // of the track contract.
    if let (Some(slot), Some(&last)) = (out.last_mut(), points.last()) {
        *slot = last;
    }
    out
}
