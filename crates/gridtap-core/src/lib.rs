//! # gridtap-core: Subsea Grid Connection Modeling Core
//!
//! Provides the data model and base machinery for planning undersea power
//! cable connections from renewable installations onto a backbone
//! transmission grid.
//!
//! ## Design Philosophy
//!
//! The planner is a **pure function of a snapshot**: the external editor owns
//! the grid nodes, grid links, and stations, hands the current triple to the
//! planner, and receives derived attachment and distance data back. Nothing
//! in this crate holds hidden state, performs I/O, or mutates its input.
//!
//! Inconsistent input never panics. A link referencing a deleted node is
//! skipped; a station referencing a deleted link loses its attachment on the
//! next pass. The [`diagnostics`] module is the reporting channel for those
//! degradations.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridtap_core::*;
//!
//! let mut snapshot = Snapshot::new();
//!
//! snapshot.nodes.push(
//!     GridNode::new(NodeId::new(1), GeoPoint::new(55.3, 3.9)).named("Dogger Bank"),
//! );
//! snapshot.nodes.push(
//!     GridNode::new(NodeId::new(2), GeoPoint::new(56.4, 9.3)).named("Jutland"),
//! );
//! snapshot.links.push(GridLink::new(LinkId::new(1), NodeId::new(1), NodeId::new(2)));
//!
//! snapshot.insert_station(Station::new(
//!     StationId::new(1),
//!     StationKind::Hub,
//!     GeoPoint::new(55.9, 6.5),
//! ));
//!
//! assert_eq!(snapshot.stats().num_links, 1);
//! assert!(snapshot.hub().is_some());
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Snapshot`] - the consistent (nodes, links, stations) triple
//! - [`GridNode`], [`GridLink`] - the editable backbone topology
//! - [`Station`], [`StationKind`] - installations with derived attachment state
//! - Type-safe ids: [`NodeId`], [`LinkId`], [`StationId`]
//!
//! ## Modules
//!
//! - [`geo`] - geodesic distance and segment projection primitives
//! - [`graph`] - petgraph-backed shortest paths over the backbone
//! - [`diagnostics`] - validation and degradation reporting
//! - [`units`] - kilometre newtype used for every distance
//! - [`error`] - unified error type for the fallible edges (I/O, parsing)

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod geo;
pub mod graph;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{PlanError, PlanResult};
pub use graph::{GridGraph, GridPath};
pub use units::Kilometers;

// Newtype wrappers for ids for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(usize);

impl NodeId {
    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl LinkId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LinkId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl StationId {
    #[inline]
    pub fn new(value: usize) -> Self {
        StationId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Geographic position, latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Per-coordinate closeness check, used for tolerance-gated attachment
    /// writes (1e-5 degrees is roughly one meter).
    pub fn close_to(&self, other: GeoPoint, eps_deg: f64) -> bool {
        (self.lat - other.lat).abs() <= eps_deg && (self.lng - other.lng).abs() <= eps_deg
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Kind tag of a station.
///
/// `Hub` is unique across the system; `DirectLink` installations cable
/// straight to the hub and bypass the grid; everything else taps the backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationKind {
    /// The reference installation all cable distances are measured against.
    Hub,
    /// Cables directly to the hub, never to a grid link.
    DirectLink,
    Wind,
    Wave,
    Solar,
    PumpedStorage,
    HeatStorage,
}

impl StationKind {
    #[inline]
    pub fn is_hub(self) -> bool {
        self == StationKind::Hub
    }

    #[inline]
    pub fn is_direct_link(self) -> bool {
        self == StationKind::DirectLink
    }

    /// Wind and Wave are kept at matched total distance from the hub by
    /// policy.
    #[inline]
    pub fn is_balanced(self) -> bool {
        matches!(self, StationKind::Wind | StationKind::Wave)
    }
}

impl std::fmt::Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StationKind::Hub => "hub",
            StationKind::DirectLink => "direct-link",
            StationKind::Wind => "wind",
            StationKind::Wave => "wave",
            StationKind::Solar => "solar",
            StationKind::PumpedStorage => "pumped-storage",
            StationKind::HeatStorage => "heat-storage",
        };
        f.write_str(name)
    }
}

/// A node of the backbone grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridNode {
    pub id: NodeId,
    pub position: GeoPoint,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Part of the fixed backbone (as opposed to a user-drafted extension).
    #[serde(default)]
    pub fixed: bool,
}

impl GridNode {
    pub fn new(id: NodeId, position: GeoPoint) -> Self {
        Self {
            id,
            position,
            name: None,
            fixed: false,
        }
    }

    /// Attach a display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the node as part of the fixed backbone.
    pub fn as_backbone(mut self) -> Self {
        self.fixed = true;
        self
    }
}

/// An undirected link between two backbone nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLink {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
}

impl GridLink {
    pub fn new(id: LinkId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }
}

/// A power station placed on the map.
///
/// The `attach_*` fields are derived state owned by the planner: editors may
/// clear them (e.g. when moving a station) to force recomputation but must
/// not otherwise write them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub kind: StationKind,
    pub position: GeoPoint,
    /// Where the station's cable meets the grid (or the hub, for direct-link
    /// stations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_point: Option<GeoPoint>,
    /// The grid link carrying the attachment point. Always `None` for
    /// direct-link stations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_link: Option<LinkId>,
}

impl Station {
    pub fn new(id: StationId, kind: StationKind, position: GeoPoint) -> Self {
        Self {
            id,
            kind,
            position,
            attach_point: None,
            attach_link: None,
        }
    }

    /// Whether the planner has produced an attachment for this station.
    pub fn has_attachment(&self) -> bool {
        self.attach_point.is_some()
    }

    /// Drop the derived attachment, forcing recomputation on the next pass.
    pub fn clear_attachment(&mut self) {
        self.attach_point = None;
        self.attach_link = None;
    }
}

/// The consistent (nodes, links, stations) triple handed to the planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<GridNode>,
    #[serde(default)]
    pub links: Vec<GridLink>,
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&GridNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a link by id.
    pub fn link(&self, id: LinkId) -> Option<&GridLink> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Look up a station by id.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// The hub station, if one is placed.
    pub fn hub(&self) -> Option<&Station> {
        self.stations.iter().find(|s| s.kind.is_hub())
    }

    /// Resolve a link's endpoints, failing soft on dangling references.
    pub fn link_endpoints(&self, link: &GridLink) -> Option<(&GridNode, &GridNode)> {
        Some((self.node(link.source)?, self.node(link.target)?))
    }

    /// Iterate the links whose endpoints both resolve and are distinct.
    pub fn valid_links(&self) -> impl Iterator<Item = (&GridLink, &GridNode, &GridNode)> {
        self.links.iter().filter_map(|link| {
            if link.source == link.target {
                return None;
            }
            let (a, b) = self.link_endpoints(link)?;
            Some((link, a, b))
        })
    }

    /// Compute basic statistics about the snapshot.
    pub fn stats(&self) -> SnapshotStats {
        let mut stats = SnapshotStats {
            num_nodes: self.nodes.len(),
            num_links: self.links.len(),
            num_stations: self.stations.len(),
            ..SnapshotStats::default()
        };
        stats.num_backbone_nodes = self.nodes.iter().filter(|n| n.fixed).count();
        stats.num_valid_links = self.valid_links().count();
        stats.num_hubs = self.stations.iter().filter(|s| s.kind.is_hub()).count();
        stats.num_attached_stations = self.stations.iter().filter(|s| s.has_attachment()).count();
        stats
    }

    /// Validate the snapshot for issues that degrade planning results.
    ///
    /// Populates the provided `Diagnostics`; nothing here is fatal, invalid
    /// entities are simply skipped by the planner.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        for link in &self.links {
            if link.source == link.target {
                diag.add_warning_with_entity(
                    "structure",
                    "link connects a node to itself and is ignored",
                    &format!("Link #{}", link.id.value()),
                );
                continue;
            }
            if self.link_endpoints(link).is_none() {
                diag.add_error_with_entity(
                    "reference",
                    "link endpoint does not exist",
                    &format!("Link #{}", link.id.value()),
                );
            }
        }

        let num_hubs = self.stations.iter().filter(|s| s.kind.is_hub()).count();
        if num_hubs > 1 {
            diag.add_error(
                "structure",
                &format!("{} hub stations present, expected at most one", num_hubs),
            );
        }

        for station in &self.stations {
            let entity = format!("Station #{}", station.id.value());
            if station.kind.is_direct_link() && station.attach_link.is_some() {
                diag.add_warning_with_entity(
                    "structure",
                    "direct-link station holds a grid link reference",
                    &entity,
                );
            }
            if let Some(link_id) = station.attach_link {
                match self.link(link_id).and_then(|l| self.link_endpoints(l)) {
                    None => {
                        diag.add_warning_with_entity(
                            "reference",
                            "attachment references a missing link; it will be recomputed",
                            &entity,
                        );
                    }
                    Some((a, b)) => {
                        if let Some(point) = station.attach_point {
                            let foot = geo::project_onto_segment(point, a.position, b.position);
                            if geo::distance(point, foot).value() > 0.01 {
                                diag.add_warning_with_entity(
                                    "geometry",
                                    "attachment point does not lie on its link",
                                    &entity,
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    /// Insert a station, enforcing hub uniqueness: placing a new hub removes
    /// any previous one.
    pub fn insert_station(&mut self, station: Station) {
        if station.kind.is_hub() {
            self.stations.retain(|s| !s.kind.is_hub());
        }
        self.stations.push(station);
    }

    /// Remove a station by id.
    pub fn remove_station(&mut self, id: StationId) {
        self.stations.retain(|s| s.id != id);
    }

    /// Remove a node together with its incident links, clearing the
    /// attachments of stations that referenced those links.
    pub fn remove_node(&mut self, id: NodeId) {
        let removed: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.source == id || l.target == id)
            .map(|l| l.id)
            .collect();

        self.nodes.retain(|n| n.id != id);
        self.links.retain(|l| l.source != id && l.target != id);
        for station in &mut self.stations {
            if let Some(link) = station.attach_link {
                if removed.contains(&link) {
                    station.clear_attachment();
                }
            }
        }
    }

    /// Remove a link, clearing the attachments of stations that referenced it.
    pub fn remove_link(&mut self, id: LinkId) {
        self.links.retain(|l| l.id != id);
        for station in &mut self.stations {
            if station.attach_link == Some(id) {
                station.clear_attachment();
            }
        }
    }

    /// Move a station and clear its attachment so the next pass recomputes
    /// it. Returns false when the id is unknown.
    pub fn move_station(&mut self, id: StationId, position: GeoPoint) -> bool {
        match self.stations.iter_mut().find(|s| s.id == id) {
            Some(station) => {
                station.position = position;
                station.clear_attachment();
                true
            }
            None => false,
        }
    }
}

/// Statistics about a snapshot's size and health.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotStats {
    pub num_nodes: usize,
    pub num_backbone_nodes: usize,
    pub num_links: usize,
    pub num_valid_links: usize,
    pub num_stations: usize,
    pub num_hubs: usize,
    pub num_attached_stations: usize,
}

impl std::fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} links ({} valid), {} stations ({} attached)",
            self.num_nodes,
            self.num_links,
            self.num_valid_links,
            self.num_stations,
            self.num_attached_stations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot
            .nodes
            .push(GridNode::new(NodeId::new(1), GeoPoint::new(0.0, 0.0)));
        snapshot
            .nodes
            .push(GridNode::new(NodeId::new(2), GeoPoint::new(0.0, 1.0)));
        snapshot
            .links
            .push(GridLink::new(LinkId::new(1), NodeId::new(1), NodeId::new(2)));
        snapshot
    }

    #[test]
    fn test_lookup_and_endpoints() {
        let snapshot = two_node_snapshot();
        assert!(snapshot.node(NodeId::new(1)).is_some());
        assert!(snapshot.node(NodeId::new(9)).is_none());

        let link = snapshot.link(LinkId::new(1)).unwrap();
        let (a, b) = snapshot.link_endpoints(link).unwrap();
        assert_eq!(a.id, NodeId::new(1));
        assert_eq!(b.id, NodeId::new(2));
    }

    #[test]
    fn test_valid_links_skips_dangling() {
        let mut snapshot = two_node_snapshot();
        snapshot
            .links
            .push(GridLink::new(LinkId::new(2), NodeId::new(1), NodeId::new(9)));
        snapshot
            .links
            .push(GridLink::new(LinkId::new(3), NodeId::new(2), NodeId::new(2)));
        assert_eq!(snapshot.valid_links().count(), 1);

        let stats = snapshot.stats();
        assert_eq!(stats.num_links, 3);
        assert_eq!(stats.num_valid_links, 1);
    }

    #[test]
    fn test_validate_reports_dangling_link() {
        let mut snapshot = two_node_snapshot();
        snapshot
            .links
            .push(GridLink::new(LinkId::new(2), NodeId::new(1), NodeId::new(9)));
        let mut diag = Diagnostics::new();
        snapshot.validate_into(&mut diag);
        assert!(diag.has_errors());
        assert!(diag.errors().any(|i| i.message.contains("endpoint")));
    }

    #[test]
    fn test_validate_reports_duplicate_hub() {
        let mut snapshot = two_node_snapshot();
        snapshot.stations.push(Station::new(
            StationId::new(1),
            StationKind::Hub,
            GeoPoint::new(0.0, 0.4),
        ));
        snapshot.stations.push(Station::new(
            StationId::new(2),
            StationKind::Hub,
            GeoPoint::new(0.0, 0.6),
        ));
        let mut diag = Diagnostics::new();
        snapshot.validate_into(&mut diag);
        assert!(diag.has_errors());
        assert!(diag.errors().any(|i| i.message.contains("hub")));
    }

    #[test]
    fn test_validate_reports_stale_attachment() {
        let mut snapshot = two_node_snapshot();
        let mut station = Station::new(
            StationId::new(1),
            StationKind::Wind,
            GeoPoint::new(0.5, 0.5),
        );
        station.attach_point = Some(GeoPoint::new(0.0, 0.5));
        station.attach_link = Some(LinkId::new(42));
        snapshot.stations.push(station);

        let mut diag = Diagnostics::new();
        snapshot.validate_into(&mut diag);
        assert!(diag.warnings().any(|i| i.message.contains("missing link")));
    }

    #[test]
    fn test_insert_station_replaces_hub() {
        let mut snapshot = two_node_snapshot();
        snapshot.insert_station(Station::new(
            StationId::new(1),
            StationKind::Hub,
            GeoPoint::new(0.0, 0.4),
        ));
        snapshot.insert_station(Station::new(
            StationId::new(2),
            StationKind::Hub,
            GeoPoint::new(0.0, 0.6),
        ));
        let hubs: Vec<_> = snapshot.stations.iter().filter(|s| s.kind.is_hub()).collect();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].id, StationId::new(2));
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut snapshot = two_node_snapshot();
        let mut station = Station::new(
            StationId::new(1),
            StationKind::Wind,
            GeoPoint::new(0.5, 0.5),
        );
        station.attach_point = Some(GeoPoint::new(0.0, 0.5));
        station.attach_link = Some(LinkId::new(1));
        snapshot.stations.push(station);

        snapshot.remove_node(NodeId::new(2));

        assert_eq!(snapshot.nodes.len(), 1);
        assert!(snapshot.links.is_empty());
        let station = snapshot.station(StationId::new(1)).unwrap();
        assert!(!station.has_attachment());
        assert!(station.attach_link.is_none());
    }

    #[test]
    fn test_remove_link_clears_attachment() {
        let mut snapshot = two_node_snapshot();
        let mut station = Station::new(
            StationId::new(1),
            StationKind::Wind,
            GeoPoint::new(0.5, 0.5),
        );
        station.attach_point = Some(GeoPoint::new(0.0, 0.5));
        station.attach_link = Some(LinkId::new(1));
        snapshot.stations.push(station);

        snapshot.remove_link(LinkId::new(1));
        assert!(!snapshot.station(StationId::new(1)).unwrap().has_attachment());
    }

    #[test]
    fn test_move_station_clears_attachment() {
        let mut snapshot = two_node_snapshot();
        let mut station = Station::new(
            StationId::new(1),
            StationKind::Wave,
            GeoPoint::new(0.5, 0.5),
        );
        station.attach_point = Some(GeoPoint::new(0.0, 0.5));
        station.attach_link = Some(LinkId::new(1));
        snapshot.stations.push(station);

        assert!(snapshot.move_station(StationId::new(1), GeoPoint::new(1.0, 1.0)));
        let station = snapshot.station(StationId::new(1)).unwrap();
        assert_eq!(station.position, GeoPoint::new(1.0, 1.0));
        assert!(!station.has_attachment());

        assert!(!snapshot.move_station(StationId::new(77), GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let mut snapshot = two_node_snapshot();
        snapshot.insert_station(Station::new(
            StationId::new(1),
            StationKind::Hub,
            GeoPoint::new(0.0, 0.5),
        ));

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
