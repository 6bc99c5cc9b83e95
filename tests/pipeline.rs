//! End-to-end pipeline tests
//!
//! Raw coordinate sequences through normalize/filter/simplify, into the
//! indexer, out as a styled project: the whole chain on one in-memory
//! store.

use icetrack::naming::ConventionRegistry;
use icetrack::styling::{build_style_project, AvailabilityCatalog, AvailabilityStatus, Color};
use icetrack::{
    build_tracks, GeometryKind, Hemisphere, MemoryStore, PipelineConfig, RawTrack, SourceIdentity,
    TrackIndexer,
};

/// A survey line crossing the Antarctic interior, geographic degrees.
fn antarctic_flight(granule: &str) -> RawTrack {
    let coords: Vec<(f64, f64)> = (0..200)
        .map(|i| (-75.0 - i as f64 * 0.005, 10.0 + i as f64 * 0.01))
        .collect();
    RawTrack::geographic(
        SourceIdentity::new("UTIG", "2018_Thwaites", granule),
        Hemisphere::Antarctic,
        coords,
    )
}

#[test]
fn test_geographic_input_end_to_end() {
    let raws = vec![antarctic_flight("seg001_granule01"), antarctic_flight("SEG1_GR1")];
    let config = PipelineConfig::default();
    let registry = ConventionRegistry::default();

    let (tracks, skipped) = build_tracks(raws, &config, &registry);
    assert_eq!(tracks.len(), 2);
    assert!(skipped.is_empty());
    for track in &tracks {
        assert!(track.points.len() >= 2);
        assert_eq!(track.kind, GeometryKind::LineString);
    }

    let mut store = MemoryStore::new();
    let mut indexer = TrackIndexer::new(&mut store, &registry);
    let summary = indexer.index_tracks(&tracks).unwrap();
    assert_eq!(summary.tracks_indexed, 2);
    // Both naming variants merged into a single campaign layer.
    assert_eq!(summary.layers_created, 1);

    let mut catalog = AvailabilityCatalog::new();
    catalog.insert("2018_Thwaites", AvailabilityStatus::Supported);
    let project = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();

    assert_eq!(project.groups.len(), 1);
    assert_eq!(project.groups[0].institution, "UTIG");
    assert_eq!(project.groups[0].layers[0].color, Color::BLUE);
}

#[test]
fn test_finalized_tracks_respect_min_spacing() {
    let config = PipelineConfig {
        min_spacing_meters: 200.0,
        line_tolerance_meters: 0.0,
        ..PipelineConfig::default()
    };
    let registry = ConventionRegistry::default();
    let (tracks, _) = build_tracks(vec![antarctic_flight("seg001_granule01")], &config, &registry);

    let points = &tracks[0].points;
    assert!(points.len() >= 2);
    for window in points[..points.len() - 1].windows(2) {
        assert!(window[0].distance_to(&window[1]) >= 200.0);
    }
}

#[test]
fn test_bad_coordinates_skip_only_their_track() {
    let mut bad = antarctic_flight("seg002_granule01");
    bad.coords[10] = (-95.0, 10.0); // latitude out of range

    let (tracks, skipped) = build_tracks(
        vec![antarctic_flight("seg001_granule01"), bad],
        &PipelineConfig::default(),
        &ConventionRegistry::default(),
    );

    assert_eq!(tracks.len(), 1);
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].name.contains("seg002_granule01"));
    assert!(skipped[0].reason.contains("projection"));
}

#[test]
fn test_viewport_query_after_indexing() {
    let registry = ConventionRegistry::default();
    let (tracks, _) = build_tracks(
        vec![antarctic_flight("seg001_granule01")],
        &PipelineConfig::default(),
        &registry,
    );

    let mut store = MemoryStore::new();
    let mut indexer = TrackIndexer::new(&mut store, &registry);
    indexer.index_tracks(&tracks).unwrap();

    let bounds = tracks[0].bounds().unwrap();
    let hits = store.query_bounds(&bounds);
    assert_eq!(hits, vec!["utig_2018_thwaites".to_string()]);

    // A viewport far from the track finds nothing.
    let empty = store.query_bounds(&icetrack::Bounds {
        min_x: 5e6,
        max_x: 6e6,
        min_y: 5e6,
        max_y: 6e6,
    });
    assert!(empty.is_empty());
}
