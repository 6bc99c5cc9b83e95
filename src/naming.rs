//! Granule naming conventions and campaign identity resolution.
//!
//! Every institution names its segments and granules differently, and some
//! renamed schemes mid-archive, so the same physical campaign can show up
//! under several spellings. Conventions are modeled as a small set of
//! tagged parser variants registered in a lookup table keyed by
//! institution; each variant maps a raw granule name to one canonical
//! form, so differing schemes land in the same campaign layer. Adding an
//! institution means registering one variant, not touching shared logic.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::{IndexError, Result};
use crate::{GeometryKind, SourceIdentity};

/// A tagged granule-name parser variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranuleConvention {
    /// Long form, e.g. `seg001_granule01`.
    SegmentGranule,
    /// Compact form, e.g. `SEG1_GR1`.
    CompactSegmentGranule,
    /// Date-based form, e.g. `Data_20230101_01_001` or `20230101_01`.
    DateFlight,
    /// A single opaque name used as-is, e.g. BEDMAP compilation files.
    Flat,
}

/// Canonical identity of a track after convention resolution.
///
/// Two source identities with different granule spellings resolve to the
/// same canonical identity when they describe the same data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalIdentity {
    pub institution: String,
    pub campaign: String,
    /// Granule name in canonical form.
    pub granule: String,
    pub kind: GeometryKind,
}

/// Lookup table of naming conventions per institution.
///
/// Institutions without an explicit registration fall back to the default
/// chain, which tries every convention from most to least specific.
#[derive(Debug)]
pub struct ConventionRegistry {
    by_institution: HashMap<String, Vec<GranuleConvention>>,
    default_chain: Vec<GranuleConvention>,
    point_cloud_institutions: HashSet<String>,
    matchers: HashMap<GranuleConvention, Regex>,
}

impl Default for ConventionRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        // The BEDMAP compilation is a point-cloud-only legacy dataset with
        // flat file names.
        registry.register("BEDMAP", vec![GranuleConvention::Flat]);
        registry.mark_point_cloud("BEDMAP");
        registry
    }
}

impl ConventionRegistry {
    /// Create a registry with no institution-specific registrations.
    pub fn new() -> Self {
        let matchers = [
            (
                GranuleConvention::SegmentGranule,
                Regex::new(r"(?i)^seg(\d+)[_-]granule(\d+)$").unwrap(),
            ),
            (
                GranuleConvention::CompactSegmentGranule,
                Regex::new(r"(?i)^seg(\d+)[_-]gr(\d+)$").unwrap(),
            ),
            (
                GranuleConvention::DateFlight,
                Regex::new(r"(?i)^(?:data[_-])?(\d{8})[_-](\d{1,2})(?:[_-](\d{1,3}))?$").unwrap(),
            ),
            (
                GranuleConvention::Flat,
                Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]*$").unwrap(),
            ),
        ]
        .into_iter()
        .collect();

        Self {
            by_institution: HashMap::new(),
            default_chain: vec![
                GranuleConvention::SegmentGranule,
                GranuleConvention::CompactSegmentGranule,
                GranuleConvention::DateFlight,
                GranuleConvention::Flat,
            ],
            point_cloud_institutions: HashSet::new(),
            matchers,
        }
    }

    /// Register the convention chain for an institution, replacing any
    /// previous registration. Conventions are tried in order.
    pub fn register(&mut self, institution: &str, conventions: Vec<GranuleConvention>) {
        self.by_institution
            .insert(institution.trim().to_uppercase(), conventions);
    }

    /// Mark an institution's datasets as point clouds (MULTIPOINT layers).
    pub fn mark_point_cloud(&mut self, institution: &str) {
        self.point_cloud_institutions
            .insert(institution.trim().to_uppercase());
    }

    /// Geometry kind for a source identity.
    pub fn geometry_kind(&self, identity: &SourceIdentity) -> GeometryKind {
        if self
            .point_cloud_institutions
            .contains(&identity.institution.trim().to_uppercase())
        {
            GeometryKind::MultiPoint
        } else {
            GeometryKind::LineString
        }
    }

    /// Resolve a source identity to its canonical form.
    ///
    /// Tries the institution's registered chain, or the default chain for
    /// unregistered institutions. The first matching convention wins.
    pub fn resolve(&self, identity: &SourceIdentity) -> Result<CanonicalIdentity> {
        let granule = identity.granule.trim();
        let chain = self
            .by_institution
            .get(&identity.institution.trim().to_uppercase())
            .unwrap_or(&self.default_chain);

        for convention in chain {
            if let Some(canonical) = self.try_parse(*convention, granule) {
                return Ok(CanonicalIdentity {
                    institution: identity.institution.trim().to_string(),
                    campaign: identity.campaign.trim().to_string(),
                    granule: canonical,
                    kind: self.geometry_kind(identity),
                });
            }
        }

        Err(IndexError::UnresolvedNamingConvention {
            institution: identity.institution.clone(),
            granule: identity.granule.clone(),
        })
    }

    /// Parse a granule name with one convention, returning the canonical
    /// form on a match.
    fn try_parse(&self, convention: GranuleConvention, granule: &str) -> Option<String> {
        if granule.is_empty() {
            return None;
        }
        let caps = self.matchers[&convention].captures(granule)?;
        match convention {
            GranuleConvention::SegmentGranule | GranuleConvention::CompactSegmentGranule => {
                let segment: u32 = caps[1].parse().ok()?;
                let granule_no: u32 = caps[2].parse().ok()?;
                Some(format!("seg{segment:03}_gr{granule_no:02}"))
            }
            GranuleConvention::DateFlight => {
                let date = &caps[1];
                let flight: u32 = caps[2].parse().ok()?;
                match caps.get(3) {
                    Some(g) => {
                        let granule_no: u32 = g.as_str().parse().ok()?;
                        Some(format!("{date}_{flight:02}_{granule_no:03}"))
                    }
                    None => Some(format!("{date}_{flight:02}")),
                }
            }
            GranuleConvention::Flat => Some(granule.to_lowercase()),
        }
    }
}
