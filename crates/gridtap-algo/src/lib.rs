//! # gridtap-algo: Grid Connection Optimization
//!
//! The algorithmic half of the planner: given a
//! [`Snapshot`](gridtap_core::Snapshot) of grid nodes, links, and stations,
//! compute where each station should tap the backbone and how long the
//! resulting cable route is.
//!
//! ## The two passes
//!
//! | Operation | Produces |
//! |-----------|----------|
//! | [`recompute_connections`] | stations with settled attachment point/link |
//! | [`recompute_distances`] | per-station geo distance, cable distance, route waypoints |
//!
//! Both are pure, synchronous functions of the snapshot; the caller re-runs
//! them wholesale on every edit. Feeding a pass's own output back in leaves
//! it unchanged, so the caller's change-detection loop terminates.
//!
//! ## Modules
//!
//! - [`segment`] - attachment-point search along a single link
//!   (penalty-weighted optimum and target-distance matching)
//! - [`connect`] - the orchestrator: hub reference, per-station candidates,
//!   wind/wave equalization, route assembly
//!
//! ## Example
//!
//! ```ignore
//! use gridtap_algo::{recompute_connections, recompute_distances, PlannerConfig};
//!
//! let mut snapshot = load_snapshot();
//! snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());
//! let results = recompute_distances(&snapshot);
//! for (id, result) in &results {
//!     println!("station {:?}: {} of cable", id, result.cable_distance);
//! }
//! ```

use gridtap_core::{geo, GeoPoint, Kilometers};

pub mod connect;
pub mod segment;

pub use connect::{
    recompute_connections, recompute_distances, ConnectionResult, PlannerConfig,
};
pub use segment::{optimal_point, target_point, SegmentCandidate, TargetCandidate};

/// Straight-line distance between two map points, for the external
/// measurement tool. Thin pass-through to the geometry primitives.
pub fn measure_distance(a: GeoPoint, b: GeoPoint) -> Kilometers {
    geo::distance(a, b)
}
