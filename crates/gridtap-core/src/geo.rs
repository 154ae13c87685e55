//! Geodesic geometry primitives.
//!
//! All positions are latitude/longitude in degrees. Distances use the
//! haversine great-circle formula; segment projection uses a localized
//! equirectangular flattening (longitude scaled by the cosine of the segment's
//! mean latitude) so that "perpendicular" means perpendicular in kilometers,
//! not in raw degrees. At planning scale (grid links of tens to a few hundred
//! kilometers) the flattening error is negligible against the solver
//! tolerances downstream.

use crate::units::Kilometers;
use crate::GeoPoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points.
///
/// Symmetric, and zero exactly when the two points coincide.
pub fn distance(p1: GeoPoint, p2: GeoPoint) -> Kilometers {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lng = (p2.lng - p1.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Kilometers::new(EARTH_RADIUS_KM * c)
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1) in coordinate
/// space. Used for points on a grid link, which are short enough that the
/// chord is indistinguishable from the great circle.
pub fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng))
}

/// Projection parameter of `p` onto the segment `a`–`b`, clamped to [0, 1].
///
/// Longitudes are scaled by cos(mean latitude) before the planar projection so
/// that longitude compression away from the equator does not skew the foot
/// point. A degenerate segment (`a` ≈ `b`) yields 0.
pub fn segment_param(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let k = ((a.lat + b.lat) / 2.0).to_radians().cos();

    let (x, y) = (p.lng * k, p.lat);
    let (x1, y1) = (a.lng * k, a.lat);
    let (x2, y2) = (b.lng * k, b.lat);

    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        // Zero-length segment: every point "projects" to the start.
        return 0.0;
    }

    let dot = (x - x1) * dx + (y - y1) * dy;
    (dot / len_sq).clamp(0.0, 1.0)
}

/// Orthogonal projection of `p` onto the finite segment `a`–`b`.
///
/// The result always lies between `a` and `b` inclusive; a degenerate segment
/// returns `a`.
pub fn project_onto_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> GeoPoint {
    lerp(a, b, segment_param(p, a, b))
}
