//! Feature store abstraction and in-memory implementation.
//!
//! The persistent store engine is an external collaborator; the pipeline
//! only needs a narrow surface: create a named layer with a fixed
//! geometry type and CRS, append geometries with attributes, list layers
//! and read attributes back. [`MemoryStore`] implements that surface for
//! tests and batch runs, and additionally answers viewport queries over
//! layer bounds through an R-tree.
//!
//! The store handle is always passed in explicitly; there is no ambient
//! global connection.

use std::collections::HashMap;

use geo_types::{Coord, Geometry, LineString, MultiPoint, Point};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::{Bounds, GeometryKind, Hemisphere, TrackPoint};

/// Attribute value attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// String content, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Per-feature attribute map.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Summary of one persisted layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub kind: GeometryKind,
    pub hemisphere: Hemisphere,
    pub feature_count: usize,
    pub bounds: Option<Bounds>,
}

/// The narrow surface the pipeline needs from a feature store.
///
/// Geometry type and CRS are fixed when a layer is created; appends are
/// validated against them. All write failures map to
/// [`IndexError::StoreWrite`], which is fatal for an indexing run.
pub trait FeatureStore {
    /// Create a new layer. Fails if the name is already taken.
    fn create_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
        hemisphere: Hemisphere,
    ) -> Result<()>;

    /// Append features to an existing layer.
    fn append_features(
        &mut self,
        layer: &str,
        features: Vec<(Geometry<f64>, AttributeMap)>,
    ) -> Result<()>;

    /// Look up a single layer.
    fn layer_info(&self, name: &str) -> Option<LayerInfo>;

    /// List all layers, sorted by name.
    fn list_layers(&self) -> Vec<LayerInfo>;

    /// Read back the attribute rows of a layer.
    fn query_attributes(&self, layer: &str) -> Result<Vec<AttributeMap>>;
}

// ============================================================================
// Geometry helpers
// ============================================================================

/// Build a LINESTRING geometry from projected points.
pub fn line_geometry(points: &[TrackPoint]) -> Geometry<f64> {
    Geometry::LineString(LineString::new(
        points.iter().map(|p| Coord { x: p.x, y: p.y }).collect(),
    ))
}

/// Build a MULTIPOINT geometry from projected points.
pub fn multipoint_geometry(points: &[TrackPoint]) -> Geometry<f64> {
    Geometry::MultiPoint(MultiPoint::new(
        points.iter().map(|p| Point::new(p.x, p.y)).collect(),
    ))
}

/// Geometry kind of a store geometry, if it is one the store accepts.
pub fn geometry_kind_of(geometry: &Geometry<f64>) -> Option<GeometryKind> {
    match geometry {
        Geometry::LineString(_) => Some(GeometryKind::LineString),
        Geometry::MultiPoint(_) => Some(GeometryKind::MultiPoint),
        _ => None,
    }
}

/// Bounding box of a store geometry.
pub fn geometry_bounds(geometry: &Geometry<f64>) -> Option<Bounds> {
    let points: Vec<TrackPoint> = match geometry {
        Geometry::LineString(line) => line.coords().map(|c| TrackPoint::new(c.x, c.y)).collect(),
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|p| TrackPoint::new(p.x(), p.y()))
            .collect(),
        _ => return None,
    };
    Bounds::from_points(&points)
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug)]
struct MemoryLayer {
    kind: GeometryKind,
    hemisphere: Hemisphere,
    bounds: Option<Bounds>,
    features: Vec<(Geometry<f64>, AttributeMap)>,
}

/// Layer bounds wrapper for R-tree viewport queries.
#[derive(Debug, Clone)]
struct LayerEnvelope {
    layer_name: String,
    bounds: Bounds,
}

impl RTreeObject for LayerEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_x, self.bounds.min_y],
            [self.bounds.max_x, self.bounds.max_y],
        )
    }
}

/// In-memory feature store with an R-tree over layer bounds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    layers: HashMap<String, MemoryLayer>,
    spatial: RTree<LayerEnvelope>,
    spatial_dirty: bool,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
            spatial: RTree::new(),
            spatial_dirty: false,
        }
    }

    /// Get the number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the store has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Read back the geometries of a layer.
    pub fn query_geometries(&self, layer: &str) -> Result<Vec<Geometry<f64>>> {
        let layer_data = self.layers.get(layer).ok_or(IndexError::UnknownLayer {
            name: layer.to_string(),
        })?;
        Ok(layer_data.features.iter().map(|(g, _)| g.clone()).collect())
    }

    /// Names of layers whose bounds intersect the given box.
    pub fn query_bounds(&mut self, bounds: &Bounds) -> Vec<String> {
        self.ensure_spatial();
        let search = AABB::from_corners(
            [bounds.min_x, bounds.min_y],
            [bounds.max_x, bounds.max_y],
        );
        self.spatial
            .locate_in_envelope_intersecting(&search)
            .map(|e| e.layer_name.clone())
            .collect()
    }

    /// Rebuild the R-tree if layer bounds changed since the last query.
    fn ensure_spatial(&mut self) {
        if !self.spatial_dirty {
            return;
        }
        let envelopes: Vec<LayerEnvelope> = self
            .layers
            .iter()
            .filter_map(|(name, layer)| {
                layer.bounds.map(|bounds| LayerEnvelope {
                    layer_name: name.clone(),
                    bounds,
                })
            })
            .collect();
        self.spatial = RTree::bulk_load(envelopes);
        self.spatial_dirty = false;
    }
}

impl FeatureStore for MemoryStore {
    fn create_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
        hemisphere: Hemisphere,
    ) -> Result<()> {
        if self.layers.contains_key(name) {
            return Err(IndexError::StoreWrite {
                layer: name.to_string(),
                reason: "layer already exists".to_string(),
            });
        }
        self.layers.insert(
            name.to_string(),
            MemoryLayer {
                kind,
                hemisphere,
                bounds: None,
                features: Vec::new(),
            },
        );
        self.spatial_dirty = true;
        Ok(())
    }

    fn append_features(
        &mut self,
        layer: &str,
        features: Vec<(Geometry<f64>, AttributeMap)>,
    ) -> Result<()> {
        let layer_data = self.layers.get_mut(layer).ok_or_else(|| IndexError::StoreWrite {
            layer: layer.to_string(),
            reason: "layer does not exist".to_string(),
        })?;

        for (geometry, _) in &features {
            match geometry_kind_of(geometry) {
                Some(kind) if kind == layer_data.kind => {}
                Some(kind) => {
                    return Err(IndexError::StoreWrite {
                        layer: layer.to_string(),
                        reason: format!(
                            "geometry kind mismatch: layer is {:?}, feature is {:?}",
                            layer_data.kind, kind
                        ),
                    });
                }
                None => {
                    return Err(IndexError::StoreWrite {
                        layer: layer.to_string(),
                        reason: "unsupported geometry type".to_string(),
                    });
                }
            }
        }

        for (geometry, attributes) in features {
            if let Some(bounds) = geometry_bounds(&geometry) {
                layer_data.bounds = Some(match layer_data.bounds {
                    Some(existing) => existing.union(&bounds),
                    None => bounds,
                });
            }
            layer_data.features.push((geometry, attributes));
        }

        self.spatial_dirty = true;
        Ok(())
    }

    fn layer_info(&self, name: &str) -> Option<LayerInfo> {
        self.layers.get(name).map(|layer| LayerInfo {
            name: name.to_string(),
            kind: layer.kind,
            hemisphere: layer.hemisphere,
            feature_count: layer.features.len(),
            bounds: layer.bounds,
        })
    }

    fn list_layers(&self) -> Vec<LayerInfo> {
        let mut infos: Vec<LayerInfo> = self
            .layers
            .keys()
            .filter_map(|name| self.layer_info(name))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    fn query_attributes(&self, layer: &str) -> Result<Vec<AttributeMap>> {
        let layer_data = self.layers.get(layer).ok_or(IndexError::UnknownLayer {
            name: layer.to_string(),
        })?;
        Ok(layer_data
            .features
            .iter()
            .map(|(_, attrs)| attrs.clone())
            .collect())
    }
}
