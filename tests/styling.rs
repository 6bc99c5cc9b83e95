//! Tests for availability styling and the style tree
//!
//! Style is a pure function of (availability status, geometry kind); the
//! builder groups campaign layers under their institutions and stamps the
//! CRS of the declared hemisphere.

use icetrack::naming::ConventionRegistry;
use icetrack::styling::{build_style_project, AvailabilityCatalog, AvailabilityStatus, Color, SymbolShape};
use icetrack::{
    GeometryKind, Hemisphere, MemoryStore, SourceIdentity, Track, TrackIndexer, TrackPoint,
};

fn track(institution: &str, campaign: &str, granule: &str, kind: GeometryKind) -> Track {
    Track {
        identity: SourceIdentity::new(institution, campaign, granule),
        hemisphere: Hemisphere::Antarctic,
        kind,
        points: vec![TrackPoint::new(0.0, 0.0), TrackPoint::new(1000.0, 0.0)],
    }
}

/// Store with a line campaign from UTIG and a BEDMAP point compilation.
fn populated_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let registry = ConventionRegistry::default();
    let mut indexer = TrackIndexer::new(&mut store, &registry);
    indexer
        .index_tracks(&[
            track("UTIG", "2018_Thwaites", "seg001_granule01", GeometryKind::LineString),
            track("BEDMAP", "BEDMAP1", "bedmap1-thickness", GeometryKind::MultiPoint),
        ])
        .unwrap();
    store
}

#[test]
fn test_supported_line_is_blue_unavailable_points_are_salmon() {
    let store = populated_store();
    let mut catalog = AvailabilityCatalog::new();
    catalog.insert("2018_Thwaites", AvailabilityStatus::Supported);
    catalog.insert("BEDMAP1", AvailabilityStatus::Unavailable);

    let project = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();
    assert_eq!(project.crs, "EPSG:3031");
    assert_eq!(project.groups.len(), 2);

    let bedmap = &project.groups[0];
    assert_eq!(bedmap.institution, "BEDMAP");
    assert_eq!(bedmap.layers[0].color, Color::SALMON);
    assert_eq!(bedmap.layers[0].symbol, SymbolShape::Point);

    let utig = &project.groups[1];
    assert_eq!(utig.institution, "UTIG");
    assert_eq!(utig.layers[0].color, Color::BLUE);
    assert_eq!(utig.layers[0].symbol, SymbolShape::Line);
    assert_eq!(utig.layers[0].layer_name, "utig_2018_thwaites");
}

#[test]
fn test_available_campaign_is_grey() {
    let store = populated_store();
    let mut catalog = AvailabilityCatalog::new();
    catalog.insert("2018_Thwaites", AvailabilityStatus::Available);
    catalog.insert("BEDMAP1", AvailabilityStatus::Available);

    let project = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();
    for group in &project.groups {
        for layer in &group.layers {
            assert_eq!(layer.color, Color::GREY);
        }
    }
}

#[test]
fn test_missing_status_degrades_to_unavailable() {
    let store = populated_store();
    let catalog = AvailabilityCatalog::new();

    // Empty catalog: the build continues and styles everything salmon.
    let project = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();
    assert_eq!(project.layer_count(), 2);
    for group in &project.groups {
        for layer in &group.layers {
            assert_eq!(layer.status, AvailabilityStatus::Unavailable);
            assert_eq!(layer.color, Color::SALMON);
        }
    }
}

#[test]
fn test_other_hemisphere_layers_excluded() {
    let mut store = populated_store();
    let registry = ConventionRegistry::default();
    let mut indexer = TrackIndexer::new(&mut store, &registry);
    indexer
        .index_tracks(&[Track {
            identity: SourceIdentity::new("AWI", "2019_NorthGreenland", "20190401_01"),
            hemisphere: Hemisphere::Arctic,
            kind: GeometryKind::LineString,
            points: vec![TrackPoint::new(0.0, 0.0), TrackPoint::new(1000.0, 0.0)],
        }])
        .unwrap();

    let catalog = AvailabilityCatalog::new();
    let antarctic = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();
    assert!(antarctic.groups.iter().all(|g| g.institution != "AWI"));

    let arctic = build_style_project(&store, &catalog, Hemisphere::Arctic).unwrap();
    assert_eq!(arctic.crs, "EPSG:3413");
    assert_eq!(arctic.groups.len(), 1);
    assert_eq!(arctic.groups[0].institution, "AWI");
}

#[test]
fn test_groups_are_sorted_by_institution() {
    let store = populated_store();
    let catalog = AvailabilityCatalog::new();
    let project = build_style_project(&store, &catalog, Hemisphere::Antarctic).unwrap();

    let names: Vec<_> = project.groups.iter().map(|g| g.institution.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}
