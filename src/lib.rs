//! # icetrack
//!
//! Normalization, simplification and indexing of polar radar survey tracks.
//!
//! Institutions publish ice-thickness survey positions in wildly different
//! file layouts, naming conventions and coordinate systems. This library
//! provides the pipeline that turns those heterogeneous position records
//! into a compact, consistently-projected feature store:
//!
//! - Coordinate normalization into one canonical polar frame per hemisphere
//!   (EPSG:3413 for the Arctic, EPSG:3031 for the Antarctic)
//! - Duplicate removal and minimum-spacing point filtering
//! - Ramer-Douglas-Peucker path simplification with bounded deviation
//! - Hierarchical indexing by institution and campaign, resolving
//!   per-institution granule naming conventions to one canonical identity
//! - Availability-driven styling and export of a portable layer-definition
//!   artifact for visualization tooling
//!
//! ## Features
//!
//! - **`parallel`** - Process independent source tracks with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use icetrack::{Hemisphere, PipelineConfig, RawTrack, SourceIdentity};
//! use icetrack::naming::ConventionRegistry;
//! use icetrack::pipeline::build_track;
//!
//! let identity = SourceIdentity::new("UTIG", "2018_Thwaites", "seg001_granule01");
//! let raw = RawTrack::projected(
//!     identity,
//!     Hemisphere::Antarctic,
//!     vec![(0.0, 0.0), (1000.0, 50.0), (2500.0, 0.0)],
//! );
//!
//! let registry = ConventionRegistry::default();
//! let track = build_track(raw, &PipelineConfig::default(), &registry).unwrap();
//! assert!(track.points.len() >= 2);
//! ```

use geo::{Distance, Euclidean, Point};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{IndexError, Result};

// Coordinate normalization into the canonical polar frames
pub mod projection;
pub use projection::{normalize, project, SourceFormat};

// Duplicate removal and minimum-spacing filtering
pub mod filtering;
pub use filtering::{dedup_points, enforce_min_spacing, filter_track};

// Ramer-Douglas-Peucker path simplification
pub mod simplify;
pub use simplify::{perpendicular_distance, simplify};

// Granule naming conventions and campaign identity resolution
pub mod naming;
pub use naming::{CanonicalIdentity, ConventionRegistry, GranuleConvention};

// Feature store trait and in-memory implementation
pub mod store;
pub use store::{AttributeValue, FeatureStore, LayerInfo, MemoryStore};

// Track indexing into the feature store
pub mod indexer;
pub use indexer::{IndexSummary, TrackIndexer};

// Availability classification and style tree assembly
pub mod styling;
pub use styling::{
    build_style_project, build_style_project_with, style_for, AvailabilityCatalog,
    AvailabilityStatus, Color, InstitutionGroup, StyleMap, StyleProject, StyledLayer, SymbolShape,
};

// Style artifact serialization
pub mod export;
pub use export::{read_project, write_project};

// Per-track normalization/filter/simplify chain
pub mod pipeline;
pub use pipeline::{build_track, build_tracks};

// ============================================================================
// Core Types
// ============================================================================

/// A 2D coordinate in a canonical polar frame, in meters.
///
/// Points are immutable once created and always paired with the
/// [`Hemisphere`] that selects their reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

impl TrackPoint {
    /// Create a new projected point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point, in meters.
    pub fn distance_to(&self, other: &TrackPoint) -> f64 {
        Euclidean::distance(Point::new(self.x, self.y), Point::new(other.x, other.y))
    }

    /// Exact coordinate equality, used for duplicate removal.
    pub fn coincides_with(&self, other: &TrackPoint) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Hemisphere selecting the canonical polar frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    /// EPSG:3413, polar stereographic true at 70N, central meridian 45W.
    Arctic,
    /// EPSG:3031, polar stereographic true at 71S, central meridian 0.
    Antarctic,
}

impl Hemisphere {
    /// EPSG code of the canonical frame for this hemisphere.
    pub fn epsg(&self) -> u32 {
        match self {
            Hemisphere::Arctic => 3413,
            Hemisphere::Antarctic => 3031,
        }
    }

    /// CRS identifier string, e.g. `"EPSG:3031"`.
    pub fn crs_identifier(&self) -> String {
        format!("EPSG:{}", self.epsg())
    }
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hemisphere::Arctic => write!(f, "arctic"),
            Hemisphere::Antarctic => write!(f, "antarctic"),
        }
    }
}

/// Geometry type of a persisted layer, fixed at layer creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    LineString,
    MultiPoint,
}

impl GeometryKind {
    /// Minimum point count a finalized track of this kind must keep.
    pub fn min_points(&self) -> usize {
        match self {
            GeometryKind::LineString => 2,
            GeometryKind::MultiPoint => 1,
        }
    }
}

/// Source identity attached to an incoming coordinate sequence.
///
/// The granule string is in whatever naming convention the institution
/// uses; the [`naming::ConventionRegistry`] resolves it to a canonical
/// form at indexing time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceIdentity {
    pub institution: String,
    pub campaign: String,
    pub granule: String,
}

impl SourceIdentity {
    pub fn new(
        institution: impl Into<String>,
        campaign: impl Into<String>,
        granule: impl Into<String>,
    ) -> Self {
        Self {
            institution: institution.into(),
            campaign: campaign.into(),
            granule: granule.into(),
        }
    }

    /// Human-readable name used in logs and run summaries.
    pub fn display_name(&self) -> String {
        format!("{}/{}/{}", self.institution, self.campaign, self.granule)
    }
}

/// A raw coordinate sequence handed over by an external parser.
///
/// Geographic input is `(latitude, longitude)` degree pairs; projected
/// input is `(easting, northing)` meter pairs already in the canonical
/// frame for the declared hemisphere.
#[derive(Debug, Clone)]
pub struct RawTrack {
    pub identity: SourceIdentity,
    pub hemisphere: Hemisphere,
    pub format: SourceFormat,
    pub coords: Vec<(f64, f64)>,
}

impl RawTrack {
    /// Raw track with geographic `(latitude, longitude)` coordinates.
    pub fn geographic(
        identity: SourceIdentity,
        hemisphere: Hemisphere,
        coords: Vec<(f64, f64)>,
    ) -> Self {
        Self {
            identity,
            hemisphere,
            format: SourceFormat::Geographic,
            coords,
        }
    }

    /// Raw track with `(easting, northing)` coordinates already in the
    /// canonical frame.
    pub fn projected(
        identity: SourceIdentity,
        hemisphere: Hemisphere,
        coords: Vec<(f64, f64)>,
    ) -> Self {
        Self {
            identity,
            hemisphere,
            format: SourceFormat::Projected,
            coords,
        }
    }
}

/// A finalized, simplified track ready for indexing.
///
/// All points lie in the canonical frame of `hemisphere`. Tracks are
/// never mutated after simplification, only replaced.
#[derive(Debug, Clone)]
pub struct Track {
    pub identity: SourceIdentity,
    pub hemisphere: Hemisphere,
    pub kind: GeometryKind,
    pub points: Vec<TrackPoint>,
}

impl Track {
    /// Bounding box of the track, `None` for an empty point list.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }
}

/// Axis-aligned bounding box in projected meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Compute bounds from projected points.
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;

        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Merge with another bounds, returning the union box.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Check whether two boxes intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.max_x < other.min_x
            || other.max_x < self.min_x
            || self.max_y < other.min_y
            || other.max_y < self.min_y)
    }
}

/// Configuration for the normalization/filter/simplify chain.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum spacing between retained points along a line track.
    /// Default: 200.0 meters
    pub min_spacing_meters: f64,

    /// Ramer-Douglas-Peucker deviation tolerance for line tracks.
    /// Default: 10.0 meters
    pub line_tolerance_meters: f64,

    /// Spacing used to thin point-cloud tracks, which are not run through
    /// the path simplifier. Default: 500.0 meters
    pub point_cloud_spacing_meters: f64,

    /// Hard cap on points per simplified track; enforced by uniform
    /// sampling after simplification. Default: 10_000
    pub max_simplified_points: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_spacing_meters: 200.0,
            line_tolerance_meters: 10.0,
            point_cloud_spacing_meters: 500.0,
            max_simplified_points: 10_000,
        }
    }
}

/// A track skipped by the pipeline or the indexer, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub name: String,
    pub reason: String,
}
