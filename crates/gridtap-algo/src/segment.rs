//! Attachment-point search along a single grid link.
//!
//! Both solvers work on the unit parameter t ∈ [0, 1] along a segment whose
//! endpoints carry precomputed grid distances d1/d2 to the hub attachment
//! point. The grid-travel term is the lower envelope of two near-linear
//! branches (leave via one endpoint or the other) and is not smooth where
//! they cross; the crossing parameter is estimated analytically (treating
//! segment distance as linear in t) and the search runs independently on each
//! side. Within one side the objectives are unimodal, which is all the
//! derivative-free bracketing needs.

use gridtap_core::{geo, GeoPoint, Kilometers};
use std::cmp::Ordering;

/// 1/phi, the golden-section step factor: (sqrt(5) - 1) / 2.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Refinement steps for the weighted-cost minimization.
const OPT_REFINE_STEPS: usize = 20;
/// Refinement steps when locating a sub-range's total-distance minimum.
const MIN_LOCATE_STEPS: usize = 15;
/// Bisection steps on a monotonic branch.
const BISECT_STEPS: usize = 20;

/// A crossing is accepted only within this distance of the requested target.
pub const TARGET_TOLERANCE_KM: f64 = 0.5;
/// Slack applied when testing whether a branch brackets the target at all.
const BRACKET_GUARD_KM: f64 = 0.1;

/// Best attachment point on one segment for the weighted-cost objective.
#[derive(Debug, Clone, Copy)]
pub struct SegmentCandidate {
    /// The chosen point on the segment.
    pub point: GeoPoint,
    /// Unweighted total distance (cable + grid) for display and equalization.
    pub total: Kilometers,
    /// The fresh-cable component alone.
    pub cable: Kilometers,
}

/// An attachment point whose total distance matches a requested target.
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub point: GeoPoint,
    /// The fresh-cable component (the quantity minimized across candidates).
    pub cable: Kilometers,
    /// Absolute deviation from the requested total.
    pub deviation: Kilometers,
}

/// Split [0, 1] at the estimated crossing of the two grid-travel branches.
///
/// The estimate assumes distance grows linearly along the segment; crossings
/// at or beyond the ends collapse to a single range, as does a degenerate
/// (zero-length) segment.
fn split_ranges(length_km: f64, d1_km: f64, d2_km: f64) -> Vec<(f64, f64)> {
    if length_km <= f64::EPSILON {
        return vec![(0.0, 1.0)];
    }
    let split = (length_km + d2_km - d1_km) / (2.0 * length_km);
    if split <= 0.01 || split >= 0.99 {
        vec![(0.0, 1.0)]
    } else {
        vec![(0.0, split), (split, 1.0)]
    }
}

/// Golden-section search for the minimum of `f` on [l, r].
fn golden_min(f: &impl Fn(f64) -> f64, mut l: f64, mut r: f64, steps: usize) -> f64 {
    let mut c = r - (r - l) * INV_PHI;
    let mut d = l + (r - l) * INV_PHI;
    for _ in 0..steps {
        if f(c) < f(d) {
            r = d;
            d = c;
            c = r - (r - l) * INV_PHI;
        } else {
            l = c;
            c = d;
            d = l + (r - l) * INV_PHI;
        }
    }
    0.5 * (l + r)
}

/// Bisect a monotonic branch of `f` for the parameter where it crosses
/// `target`. `descending` selects which side of the crossing each probe
/// eliminates.
fn bisect(
    f: &impl Fn(f64) -> f64,
    mut lo: f64,
    mut hi: f64,
    target: f64,
    descending: bool,
) -> f64 {
    for _ in 0..BISECT_STEPS {
        let mid = 0.5 * (lo + hi);
        let above = f(mid) > target;
        if above == descending {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Find the point on segment `p1`–`p2` minimizing
/// `penalty * cable(t) + grid(t)`, where `cable` is the fresh-cable length
/// from `station` and `grid` is the cheaper of the two endpoint branches
/// toward the hub attachment.
///
/// The returned `total` is the *unweighted* cable + grid distance; the
/// penalty only steers the search toward short, perpendicular taps.
pub fn optimal_point(
    station: GeoPoint,
    p1: GeoPoint,
    p2: GeoPoint,
    d1: Kilometers,
    d2: Kilometers,
    penalty: f64,
) -> SegmentCandidate {
    let cost = |t: f64| {
        let p = geo::lerp(p1, p2, t);
        let cable = geo::distance(station, p).value();
        let grid = (geo::distance(p, p1).value() + d1.value())
            .min(geo::distance(p, p2).value() + d2.value());
        penalty * cable + grid
    };

    let length = geo::distance(p1, p2).value();
    let mut best_t = 0.0;
    let mut best_cost = f64::INFINITY;

    for (start, end) in split_ranges(length, d1.value(), d2.value()) {
        // The optimum may sit on a range boundary, where the bracketing
        // search cannot land exactly.
        for t in [start, end] {
            let c = cost(t);
            if c < best_cost {
                best_cost = c;
                best_t = t;
            }
        }

        let t = golden_min(&cost, start, end, OPT_REFINE_STEPS);
        let c = cost(t);
        if c < best_cost {
            best_cost = c;
            best_t = t;
        }
    }

    let point = geo::lerp(p1, p2, best_t);
    let cable = geo::distance(station, point);
    let grid = (geo::distance(point, p1) + d1).min(geo::distance(point, p2) + d2);
    SegmentCandidate {
        point,
        total: cable + grid,
        cable,
    }
}

/// Find the point on segment `p1`–`p2` whose unweighted total distance equals
/// `target`, preferring grid reuse: among all qualifying crossings the one
/// with the smallest cable component wins. Returns `None` when no point on
/// this segment lands within [`TARGET_TOLERANCE_KM`] of the target.
pub fn target_point(
    station: GeoPoint,
    p1: GeoPoint,
    p2: GeoPoint,
    d1: Kilometers,
    d2: Kilometers,
    target: Kilometers,
) -> Option<TargetCandidate> {
    let total = |t: f64| {
        let p = geo::lerp(p1, p2, t);
        let cable = geo::distance(station, p).value();
        let grid = (geo::distance(p, p1).value() + d1.value())
            .min(geo::distance(p, p2).value() + d2.value());
        cable + grid
    };

    let target_km = target.value();
    let length = geo::distance(p1, p2).value();
    let mut hits: Vec<(f64, f64, f64)> = Vec::new(); // (t, cable, deviation)

    let mut consider = |t: f64| {
        let deviation = (total(t) - target_km).abs();
        if deviation < TARGET_TOLERANCE_KM {
            let cable = geo::distance(station, geo::lerp(p1, p2, t)).value();
            hits.push((t, cable, deviation));
        }
    };

    for (start, end) in split_ranges(length, d1.value(), d2.value()) {
        let min_t = golden_min(&total, start, end, MIN_LOCATE_STEPS);
        let min_val = total(min_t);

        // Descending branch: range start down to the minimum.
        if total(start) >= target_km - BRACKET_GUARD_KM && min_val <= target_km + BRACKET_GUARD_KM {
            consider(bisect(&total, start, min_t, target_km, true));
        }
        // Ascending branch: the minimum up to the range end.
        if total(end) >= target_km - BRACKET_GUARD_KM && min_val <= target_km + BRACKET_GUARD_KM {
            consider(bisect(&total, min_t, end, target_km, false));
        }
    }

    hits.into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(t, cable, deviation)| TargetCandidate {
            point: geo::lerp(p1, p2, t),
            cable: Kilometers::new(cable),
            deviation: Kilometers::new(deviation),
        })
}
