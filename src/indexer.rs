//! Track indexing into the feature store.
//!
//! The indexer is the single synchronization point of a pipeline run:
//! finalized tracks are handed over once, their source identities are
//! resolved to canonical campaign identities, and their geometries are
//! appended to the matching layer (created on first use). Writes are
//! append-only within a run; rebuilding means re-indexing into a fresh
//! store.

use log::{info, warn};

use crate::error::{IndexError, Result};
use crate::naming::{CanonicalIdentity, ConventionRegistry};
use crate::store::{
    line_geometry, multipoint_geometry, AttributeMap, AttributeValue, FeatureStore,
};
use crate::{GeometryKind, SkippedTrack, Track};

/// End-of-run report for one indexing batch.
#[derive(Debug, Clone, Default)]
pub struct IndexSummary {
    pub tracks_indexed: usize,
    pub layers_created: usize,
    pub skipped: Vec<SkippedTrack>,
}

/// Writes finalized tracks into a feature store.
///
/// Holds an explicit store handle and a convention registry; there is no
/// ambient connection state, so tests can run against a
/// [`MemoryStore`](crate::store::MemoryStore).
pub struct TrackIndexer<'a, S: FeatureStore> {
    store: &'a mut S,
    registry: &'a ConventionRegistry,
}

impl<'a, S: FeatureStore> TrackIndexer<'a, S> {
    pub fn new(store: &'a mut S, registry: &'a ConventionRegistry) -> Self {
        Self { store, registry }
    }

    /// Layer name for a canonical identity.
    ///
    /// `institution_campaign`, lowercased with non-alphanumeric runs
    /// collapsed to underscores; point-cloud layers get a `_points`
    /// suffix so a campaign carrying both radargram lines and point
    /// clouds materializes as two layers.
    pub fn layer_name(canonical: &CanonicalIdentity) -> String {
        let mut name = format!("{}_{}", slug(&canonical.institution), slug(&canonical.campaign));
        if canonical.kind == GeometryKind::MultiPoint {
            name.push_str("_points");
        }
        name
    }

    /// Index one track, creating its layer if needed.
    ///
    /// Returns `true` when a new layer was created. Naming failures are
    /// reported as [`IndexError::UnresolvedNamingConvention`]; store
    /// failures as [`IndexError::StoreWrite`].
    pub fn index_track(&mut self, track: &Track) -> Result<bool> {
        let canonical = self.registry.resolve(&track.identity)?;

        if track.points.len() < canonical.kind.min_points() {
            return Err(IndexError::InsufficientPoints {
                name: track.identity.display_name(),
                point_count: track.points.len(),
                minimum_required: canonical.kind.min_points(),
            });
        }

        let layer = Self::layer_name(&canonical);
        let created = if self.store.layer_info(&layer).is_none() {
            self.store
                .create_layer(&layer, canonical.kind, track.hemisphere)?;
            true
        } else {
            false
        };

        let geometry = match canonical.kind {
            GeometryKind::LineString => line_geometry(&track.points),
            GeometryKind::MultiPoint => multipoint_geometry(&track.points),
        };

        self.store
            .append_features(&layer, vec![(geometry, track_attributes(track, &canonical))])?;
        Ok(created)
    }

    /// Index a batch of tracks with per-track failure isolation.
    ///
    /// Tracks whose identity cannot be resolved, or which are too small
    /// for their geometry type, are logged and recorded in the summary;
    /// store write failures abort the run.
    pub fn index_tracks(&mut self, tracks: &[Track]) -> Result<IndexSummary> {
        let mut summary = IndexSummary::default();

        for track in tracks {
            match self.index_track(track) {
                Ok(created) => {
                    summary.tracks_indexed += 1;
                    if created {
                        summary.layers_created += 1;
                    }
                }
                Err(
                    err @ (IndexError::UnresolvedNamingConvention { .. }
                    | IndexError::InsufficientPoints { .. }),
                ) => {
                    warn!("skipping track {}: {}", track.identity.display_name(), err);
                    summary.skipped.push(SkippedTrack {
                        name: track.identity.display_name(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "indexed {} tracks ({} layers created, {} skipped)",
            summary.tracks_indexed,
            summary.layers_created,
            summary.skipped.len()
        );
        Ok(summary)
    }
}

/// Attribute row written alongside a track geometry.
fn track_attributes(track: &Track, canonical: &CanonicalIdentity) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    attrs.insert(
        "institution".to_string(),
        AttributeValue::String(canonical.institution.clone()),
    );
    attrs.insert(
        "campaign".to_string(),
        AttributeValue::String(canonical.campaign.clone()),
    );
    attrs.insert(
        "granule".to_string(),
        AttributeValue::String(canonical.granule.clone()),
    );
    attrs.insert(
        "source_granule".to_string(),
        AttributeValue::String(track.identity.granule.clone()),
    );
    attrs.insert(
        "point_count".to_string(),
        AttributeValue::Int(track.points.len() as i64),
    );
    attrs
}

/// Lowercase a name and collapse non-alphanumeric runs to underscores.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("2018 Thwaites / Main"), "2018_thwaites_main");
        assert_eq!(slug("UTIG"), "utig");
        assert_eq!(slug("__a__b__"), "a_b");
    }
}
