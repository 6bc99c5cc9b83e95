//! Availability classification and style tree assembly.
//!
//! Campaign availability comes from an external catalog, never from the
//! geometry. Style is a pure function of exactly two inputs: the
//! availability status picks the color (Supported = blue, Available =
//! grey, Unavailable = salmon) and the layer geometry kind picks the
//! symbol shape. The builder reads institution/campaign metadata back
//! from the feature store and assembles a two-level tree, one group per
//! institution with one styled node per campaign layer.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::FeatureStore;
use crate::{GeometryKind, Hemisphere, IndexError};

/// Campaign-level availability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Supported,
    Available,
    Unavailable,
}

impl AvailabilityStatus {
    /// Parse a catalog code. Accepts the single-letter codes used in the
    /// institution catalogs (`s`/`a`/`u`) as well as full words.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "s" | "supported" => Some(AvailabilityStatus::Supported),
            "a" | "available" => Some(AvailabilityStatus::Available),
            "u" | "unavailable" => Some(AvailabilityStatus::Unavailable),
            _ => None,
        }
    }
}

/// RGB color assigned to a campaign layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const GREY: Color = Color {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const SALMON: Color = Color {
        r: 250,
        g: 128,
        b: 114,
    };

    /// Hex form, e.g. `"#fa8072"`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Symbol shape derived from the layer geometry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolShape {
    Line,
    Point,
}

/// Color and symbol mapping tables.
///
/// The defaults are the standard assignment (Supported = blue,
/// Available = grey, Unavailable = salmon; lines = line symbol, points =
/// point symbol); deployments with their own palette can override any
/// entry. Style stays a pure function of availability status and
/// geometry kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleMap {
    pub supported: Color,
    pub available: Color,
    pub unavailable: Color,
    pub line_symbol: SymbolShape,
    pub point_symbol: SymbolShape,
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            supported: Color::BLUE,
            available: Color::GREY,
            unavailable: Color::SALMON,
            line_symbol: SymbolShape::Line,
            point_symbol: SymbolShape::Point,
        }
    }
}

impl StyleMap {
    /// Resolve the visual style for a campaign layer.
    pub fn style(&self, status: AvailabilityStatus, kind: GeometryKind) -> (Color, SymbolShape) {
        let color = match status {
            AvailabilityStatus::Supported => self.supported,
            AvailabilityStatus::Available => self.available,
            AvailabilityStatus::Unavailable => self.unavailable,
        };
        let symbol = match kind {
            GeometryKind::LineString => self.line_symbol,
            GeometryKind::MultiPoint => self.point_symbol,
        };
        (color, symbol)
    }
}

/// Resolve the visual style for a campaign layer with the default tables.
pub fn style_for(status: AvailabilityStatus, kind: GeometryKind) -> (Color, SymbolShape) {
    StyleMap::default().style(status, kind)
}

/// External campaign -> availability lookup.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityCatalog {
    statuses: HashMap<String, AvailabilityStatus>,
}

impl AvailabilityCatalog {
    pub fn new() -> Self {
        Self {
            statuses: HashMap::new(),
        }
    }

    /// Record the status for a campaign.
    pub fn insert(&mut self, campaign: impl Into<String>, status: AvailabilityStatus) {
        self.statuses.insert(campaign.into(), status);
    }

    /// Strict lookup, failing on campaigns missing from the catalog.
    pub fn lookup(&self, campaign: &str) -> Result<AvailabilityStatus> {
        self.statuses
            .get(campaign)
            .copied()
            .ok_or_else(|| IndexError::UnknownStatus {
                campaign: campaign.to_string(),
            })
    }

    /// Lookup that degrades to `Unavailable` with a warning instead of
    /// failing the whole style build for one campaign.
    pub fn status_or_default(&self, campaign: &str) -> AvailabilityStatus {
        match self.lookup(campaign) {
            Ok(status) => status,
            Err(err) => {
                warn!("{err}; treating campaign as unavailable");
                AvailabilityStatus::Unavailable
            }
        }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl FromIterator<(String, AvailabilityStatus)> for AvailabilityCatalog {
    fn from_iter<T: IntoIterator<Item = (String, AvailabilityStatus)>>(iter: T) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Style tree
// ============================================================================

/// One styled campaign-layer node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledLayer {
    /// Stable feature-store layer name this node references.
    pub layer_name: String,
    pub campaign: String,
    pub kind: GeometryKind,
    pub status: AvailabilityStatus,
    pub color: Color,
    pub symbol: SymbolShape,
}

/// One institution group node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionGroup {
    pub institution: String,
    pub layers: Vec<StyledLayer>,
}

/// The hierarchical style tree: root -> institution groups -> campaign
/// layers, with the CRS of the target hemisphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProject {
    pub crs: String,
    pub groups: Vec<InstitutionGroup>,
}

impl StyleProject {
    /// Total number of styled layer nodes.
    pub fn layer_count(&self) -> usize {
        self.groups.iter().map(|g| g.layers.len()).sum()
    }
}

/// Build the style tree from whatever the store currently holds.
///
/// Layers of other hemispheres are ignored; the project CRS comes from
/// the declared hemisphere, not from coordinates. Campaigns without a
/// catalog entry are styled as `Unavailable` and the build continues.
pub fn build_style_project<S: FeatureStore>(
    store: &S,
    catalog: &AvailabilityCatalog,
    hemisphere: Hemisphere,
) -> Result<StyleProject> {
    build_style_project_with(store, catalog, hemisphere, &StyleMap::default())
}

/// Build the style tree with custom color/symbol mapping tables.
pub fn build_style_project_with<S: FeatureStore>(
    store: &S,
    catalog: &AvailabilityCatalog,
    hemisphere: Hemisphere,
    style_map: &StyleMap,
) -> Result<StyleProject> {
    let mut by_institution: BTreeMap<String, Vec<StyledLayer>> = BTreeMap::new();

    for info in store.list_layers() {
        if info.hemisphere != hemisphere {
            continue;
        }

        let rows = store.query_attributes(&info.name)?;
        let Some(first) = rows.first() else {
            warn!("layer '{}' has no features, not styled", info.name);
            continue;
        };

        let institution = first
            .get("institution")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let campaign = first
            .get("campaign")
            .and_then(|v| v.as_str())
            .unwrap_or(&info.name)
            .to_string();

        let status = catalog.status_or_default(&campaign);
        let (color, symbol) = style_map.style(status, info.kind);

        by_institution.entry(institution).or_default().push(StyledLayer {
            layer_name: info.name,
            campaign,
            kind: info.kind,
            status,
            color,
            symbol,
        });
    }

    Ok(StyleProject {
        crs: hemisphere.crs_identifier(),
        groups: by_institution
            .into_iter()
            .map(|(institution, layers)| InstitutionGroup {
                institution,
                layers,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_parse() {
        assert_eq!(
            AvailabilityStatus::from_code("s"),
            Some(AvailabilityStatus::Supported)
        );
        assert_eq!(
            AvailabilityStatus::from_code("Available"),
            Some(AvailabilityStatus::Available)
        );
        assert_eq!(
            AvailabilityStatus::from_code(" U "),
            Some(AvailabilityStatus::Unavailable)
        );
        assert_eq!(AvailabilityStatus::from_code("x"), None);
    }

    #[test]
    fn style_is_pure_in_status_and_kind() {
        let (color, symbol) =
            style_for(AvailabilityStatus::Supported, GeometryKind::LineString);
        assert_eq!(color, Color::BLUE);
        assert_eq!(symbol, SymbolShape::Line);

        let (color, symbol) =
            style_for(AvailabilityStatus::Unavailable, GeometryKind::MultiPoint);
        assert_eq!(color, Color::SALMON);
        assert_eq!(symbol, SymbolShape::Point);

        let (color, _) = style_for(AvailabilityStatus::Available, GeometryKind::MultiPoint);
        assert_eq!(color, Color::GREY);
    }

    #[test]
    fn custom_style_map_overrides_colors() {
        let map = StyleMap {
            supported: Color { r: 10, g: 20, b: 30 },
            ..StyleMap::default()
        };
        let (color, symbol) = map.style(AvailabilityStatus::Supported, GeometryKind::LineString);
        assert_eq!(color, Color { r: 10, g: 20, b: 30 });
        assert_eq!(symbol, SymbolShape::Line);
    }

    #[test]
    fn missing_status_degrades_to_unavailable() {
        let catalog = AvailabilityCatalog::new();
        assert_eq!(
            catalog.status_or_default("2019_Unknown"),
            AvailabilityStatus::Unavailable
        );
        assert!(catalog.lookup("2019_Unknown").is_err());
    }
}
