//! Coordinate normalization into the canonical polar frames.
//!
//! Input coordinate sequences arrive either as geographic WGS84
//! `(latitude, longitude)` degree pairs or as `(easting, northing)` pairs
//! already projected into the canonical frame for their hemisphere. This
//! module validates both and projects the geographic ones with the
//! ellipsoidal polar stereographic forward formulas (Snyder, Map
//! Projections: A Working Manual, eq. 21-33..21-41):
//!
//! - Arctic: EPSG:3413, true scale at 70N, central meridian 45W
//! - Antarctic: EPSG:3031, true scale at 71S, central meridian 0
//!
//! The projection is a pure transform. At the pole the conformal latitude
//! factor `t` goes to zero and the radius with it, so the formulas stay
//! finite without special casing.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::{Hemisphere, TrackPoint};

/// WGS84 semi-major axis, meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 first eccentricity.
const WGS84_E: f64 = 0.081_819_190_842_622;

/// Declared format of a raw coordinate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// WGS84 `(latitude, longitude)` in degrees.
    Geographic,
    /// `(easting, northing)` in meters, already in the canonical frame.
    Projected,
}

/// Project a geographic coordinate into the canonical frame for the
/// given hemisphere.
///
/// Fails when the coordinate is non-finite, out of range, or lies on the
/// wrong side of the equator for the declared hemisphere.
pub fn project(lat_deg: f64, lon_deg: f64, hemisphere: Hemisphere) -> Result<TrackPoint> {
    if !lat_deg.is_finite() || !lon_deg.is_finite() {
        return Err(IndexError::Projection {
            reason: format!("non-finite coordinate ({lat_deg}, {lon_deg})"),
        });
    }
    if lat_deg.abs() > 90.0 {
        return Err(IndexError::Projection {
            reason: format!("latitude {lat_deg} out of range [-90, 90]"),
        });
    }
    if lon_deg.abs() > 360.0 {
        return Err(IndexError::Projection {
            reason: format!("longitude {lon_deg} out of range [-360, 360]"),
        });
    }

    match hemisphere {
        Hemisphere::Arctic => {
            if lat_deg <= 0.0 {
                return Err(IndexError::Projection {
                    reason: format!("latitude {lat_deg} is not in the arctic hemisphere"),
                });
            }
            let (lat_ts, lon_0) = (70.0, -45.0);
            let rho = polar_radius(lat_deg, lat_ts);
            let dlam = wrap_degrees(lon_deg - lon_0).to_radians();
            Ok(TrackPoint::new(rho * dlam.sin(), -rho * dlam.cos()))
        }
        Hemisphere::Antarctic => {
            if lat_deg >= 0.0 {
                return Err(IndexError::Projection {
                    reason: format!("latitude {lat_deg} is not in the antarctic hemisphere"),
                });
            }
            // South polar aspect: mirror the latitude into the north form.
            let (lat_ts, lon_0) = (71.0, 0.0);
            let rho = polar_radius(-lat_deg, lat_ts);
            let dlam = wrap_degrees(lon_deg - lon_0).to_radians();
            Ok(TrackPoint::new(rho * dlam.sin(), rho * dlam.cos()))
        }
    }
}

/// Normalize a raw coordinate sequence into canonical projected points.
///
/// Geographic input is projected point by point; projected input is
/// validated and passed through. A single bad coordinate fails the whole
/// sequence, which callers treat as a per-track failure.
pub fn normalize(
    coords: &[(f64, f64)],
    format: SourceFormat,
    hemisphere: Hemisphere,
) -> Result<Vec<TrackPoint>> {
    match format {
        SourceFormat::Geographic => coords
            .iter()
            .map(|&(lat, lon)| project(lat, lon, hemisphere))
            .collect(),
        SourceFormat::Projected => coords
            .iter()
            .map(|&(x, y)| {
                let p = TrackPoint::new(x, y);
                if p.is_finite() {
                    Ok(p)
                } else {
                    Err(IndexError::Projection {
                        reason: format!("non-finite projected coordinate ({x}, {y})"),
                    })
                }
            })
            .collect(),
    }
}

/// Radius from the pole on the projection plane for a north-form latitude.
///
/// `rho = a * m(lat_ts) * t(lat) / t(lat_ts)`, true scale at `lat_ts`.
fn polar_radius(lat_deg: f64, lat_ts_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    let lat_ts = lat_ts_deg.to_radians();
    WGS84_A * true_scale_factor(lat_ts) * conformal_t(lat) / conformal_t(lat_ts)
}

/// Snyder's `t`: conformal colatitude factor, zero at the pole.
fn conformal_t(lat_rad: f64) -> f64 {
    let es = WGS84_E * lat_rad.sin();
    (std::f64::consts::FRAC_PI_4 - lat_rad / 2.0).tan()
        * ((1.0 + es) / (1.0 - es)).powf(WGS84_E / 2.0)
}

/// Snyder's `m`: parallel-circle scale at a latitude.
fn true_scale_factor(lat_rad: f64) -> f64 {
    let es = WGS84_E * lat_rad.sin();
    lat_rad.cos() / (1.0 - es * es).sqrt()
}

/// Wrap a longitude difference into (-180, 180] degrees.
fn wrap_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

// =============================================================================
// Unit Tests
// =============================================================================
