//! The connection orchestrator.
//!
//! Two passes over a snapshot, both pure:
//!
//! 1. [`recompute_connections`] settles every station's attachment. The hub
//!    is attached first by plain nearest-point search, because its attachment
//!    is the reference point every other station's grid distance is measured
//!    against. Ordinary stations then get the link and point with the lowest
//!    penalty-weighted cost, the two balanced kinds (wind, wave) are
//!    equalized, and the results are written back through a tolerance gate so
//!    the pass reaches a fixed point instead of oscillating on float noise.
//! 2. [`recompute_distances`] takes the settled attachments and produces the
//!    real route: straight-line distance, full cable length, and the waypoint
//!    sequence, trying every endpoint pairing between the station's link and
//!    the hub's link.
//!
//! Everything fails soft. Stations whose link was deleted, links whose nodes
//! are gone, and unreachable grid regions all degrade to "no result" and heal
//! on the next pass.

use std::collections::HashMap;

use gridtap_core::{
    geo, GeoPoint, GridGraph, Kilometers, LinkId, NodeId, Snapshot, Station, StationId,
    StationKind,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::segment;

/// Tunables for the connection pass.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Weight applied to fresh cable relative to existing grid travel. The
    /// default of 2.0 biases solutions toward short, perpendicular taps.
    pub cable_penalty: f64,
    /// Balanced stations whose totals differ by more than this are equalized.
    pub equalize_tolerance: Kilometers,
    /// Attachment writes below this per-coordinate delta are suppressed
    /// (degrees; 1e-5 is roughly one meter).
    pub attach_epsilon_deg: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cable_penalty: 2.0,
            equalize_tolerance: Kilometers::new(0.1),
            attach_epsilon_deg: 1e-5,
        }
    }
}

/// Derived route data for one station, relative to the hub.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResult {
    /// Straight-line distance to the hub.
    pub geo_distance: Kilometers,
    /// Full cable route length: station to attachment, along the grid, and
    /// from the hub's attachment to the hub.
    pub cable_distance: Kilometers,
    /// Waypoints of the physical route, for rendering and audit.
    pub path: Vec<GeoPoint>,
}

/// A settled connection candidate for one station.
#[derive(Debug, Clone)]
struct GridConnection {
    point: GeoPoint,
    link: Option<LinkId>,
    /// Nominal total distance used for candidate ranking and equalization.
    dist: Kilometers,
}

/// The hub's attachment plus, per grid node, the cheaper of the two
/// attach-branch grid distances to it.
struct HubReference {
    point: GeoPoint,
    link: LinkId,
    node_to_hub: HashMap<NodeId, Kilometers>,
}

/// A candidate segment for attachment search: a grid link, or one half of
/// the hub's own link split at the hub attachment point.
struct LinkSegment {
    link: LinkId,
    a: GeoPoint,
    b: GeoPoint,
    d_a: Kilometers,
    d_b: Kilometers,
}

/// Stations with attachment fields updated; the input snapshot is untouched.
///
/// Re-running on the returned stations (with otherwise unchanged input) is a
/// no-op: candidates are a pure function of positions and topology, and the
/// write gate suppresses sub-tolerance rewrites.
pub fn recompute_connections(snapshot: &Snapshot, config: &PlannerConfig) -> Vec<Station> {
    let graph = GridGraph::build(snapshot);
    let hub_station = snapshot.hub();

    // Step 1: the hub's own attachment, by plain geodesic nearest point.
    let hub_conn = hub_station.and_then(|hub| nearest_connection(snapshot, hub.position));
    let hub_ref = hub_conn
        .as_ref()
        .and_then(|conn| hub_reference(snapshot, &graph, conn));

    if let Some(conn) = &hub_conn {
        debug!(link = ?conn.link, point = %conn.point, "hub attachment settled");
    }

    // Step 2: per-station candidates.
    let mut candidates: HashMap<StationId, GridConnection> = HashMap::new();
    for station in &snapshot.stations {
        match station.kind {
            StationKind::Hub => {
                if let Some(conn) = &hub_conn {
                    candidates.insert(station.id, conn.clone());
                }
            }
            StationKind::DirectLink => {
                // Cables straight to the hub; the grid plays no part. With no
                // hub there is nothing to attach to.
                if let Some(hub) = hub_station {
                    candidates.insert(
                        station.id,
                        GridConnection {
                            point: hub.position,
                            link: None,
                            dist: geo::distance(station.position, hub.position),
                        },
                    );
                }
            }
            _ => {
                let conn = match &hub_ref {
                    Some(hub) => {
                        optimal_connection(snapshot, hub, station.position, config.cable_penalty)
                    }
                    None => nearest_connection(snapshot, station.position),
                };
                match conn {
                    Some(conn) => {
                        candidates.insert(station.id, conn);
                    }
                    None => trace!(station = station.id.value(), "no viable connection"),
                }
            }
        }
    }

    // Step 3: equalize the two balanced kinds.
    if let Some(hub) = &hub_ref {
        equalize_balanced(snapshot, hub, config, &mut candidates);
    }

    // Step 4: tolerance-gated writes.
    let mut stations = snapshot.stations.clone();
    for station in &mut stations {
        let stale = station
            .attach_link
            .is_some_and(|id| snapshot.link(id).is_none());

        match candidates.get(&station.id) {
            Some(conn) => {
                let moved = match station.attach_point {
                    Some(prev) => !prev.close_to(conn.point, config.attach_epsilon_deg),
                    None => true,
                };
                if moved || stale {
                    station.attach_point = Some(conn.point);
                    station.attach_link = conn.link;
                }
            }
            None => {
                // No candidate this pass. Attachments that can no longer be
                // trusted are dropped: stale link references, and direct-link
                // attachments with no hub left to anchor them.
                if stale || (station.kind.is_direct_link() && station.has_attachment()) {
                    station.clear_attachment();
                }
            }
        }
    }
    stations
}

/// Per-station route results against the settled attachments.
///
/// Stations without a usable attachment (and the hub itself) are omitted, as
/// are stations whose every grid traversal is unreachable.
pub fn recompute_distances(snapshot: &Snapshot) -> HashMap<StationId, ConnectionResult> {
    let mut results = HashMap::new();

    let Some(hub) = snapshot.hub() else {
        return results;
    };
    let (Some(hub_point), Some(hub_link_id)) = (hub.attach_point, hub.attach_link) else {
        return results;
    };
    let Some((h1, h2)) = snapshot
        .link(hub_link_id)
        .and_then(|l| snapshot.link_endpoints(l))
    else {
        return results;
    };

    let graph = GridGraph::build(snapshot);
    // Tail pieces shared by every ordinary route.
    let hub_tail = geo::distance(hub.position, hub_point);
    let d_h1 = geo::distance(hub_point, h1.position);
    let d_h2 = geo::distance(hub_point, h2.position);
    let hub_ends = [(h1, d_h1), (h2, d_h2)];

    for station in &snapshot.stations {
        if station.id == hub.id {
            continue;
        }
        let geo_distance = geo::distance(station.position, hub.position);

        if station.kind.is_direct_link() {
            results.insert(
                station.id,
                ConnectionResult {
                    geo_distance,
                    cable_distance: geo_distance,
                    path: vec![station.position, hub.position],
                },
            );
            continue;
        }

        let (Some(st_point), Some(st_link_id)) = (station.attach_point, station.attach_link)
        else {
            continue;
        };
        let Some((s1, s2)) = snapshot
            .link(st_link_id)
            .and_then(|l| snapshot.link_endpoints(l))
        else {
            continue;
        };

        let st_tail = geo::distance(station.position, st_point);
        let st_ends = [
            (s1, geo::distance(st_point, s1.position)),
            (s2, geo::distance(st_point, s2.position)),
        ];

        // Best grid traversal between the two attachment points.
        let mut best: Option<(Kilometers, Vec<GeoPoint>)> = None;

        if st_link_id == hub_link_id {
            // Both attachments sit on the same link: the direct stretch along
            // it competes with every endpoint detour.
            let across = geo::distance(st_point, hub_point);
            best = Some((
                across,
                vec![station.position, st_point, hub_point, hub.position],
            ));
        }

        for (s_node, s_offset) in &st_ends {
            for (h_node, h_offset) in &hub_ends {
                let Some(grid_path) = graph.shortest_path(s_node.id, h_node.id) else {
                    continue; // disconnected pairing contributes nothing
                };
                let total = grid_path.distance + *s_offset + *h_offset;
                if best.as_ref().is_none_or(|(d, _)| total < *d) {
                    let mut waypoints = Vec::with_capacity(grid_path.nodes.len() + 4);
                    waypoints.push(station.position);
                    waypoints.push(st_point);
                    for node_id in &grid_path.nodes {
                        if let Some(node) = snapshot.node(*node_id) {
                            waypoints.push(node.position);
                        }
                    }
                    waypoints.push(hub_point);
                    waypoints.push(hub.position);
                    best = Some((total, waypoints));
                }
            }
        }

        if let Some((across, path)) = best {
            results.insert(
                station.id,
                ConnectionResult {
                    geo_distance,
                    cable_distance: across + st_tail + hub_tail,
                    path,
                },
            );
        }
    }

    results
}

/// Nearest point on any valid link by plain geodesic distance. Used for the
/// hub's own attachment and as the fallback when no hub attachment exists.
fn nearest_connection(snapshot: &Snapshot, position: GeoPoint) -> Option<GridConnection> {
    let mut best: Option<GridConnection> = None;
    for (link, a, b) in snapshot.valid_links() {
        let point = geo::project_onto_segment(position, a.position, b.position);
        let dist = geo::distance(position, point);
        if best.as_ref().is_none_or(|c| dist < c.dist) {
            best = Some(GridConnection {
                point,
                link: Some(link.id),
                dist,
            });
        }
    }
    best
}

/// Precompute, for every grid node, the cheaper attach-branch distance to the
/// hub attachment point: one single-source sweep per hub-link endpoint plus
/// the endpoint-to-attachment offsets.
fn hub_reference(
    snapshot: &Snapshot,
    graph: &GridGraph,
    conn: &GridConnection,
) -> Option<HubReference> {
    let link = snapshot.link(conn.link?)?;
    let (n1, n2) = snapshot.link_endpoints(link)?;

    let offset1 = geo::distance(conn.point, n1.position);
    let offset2 = geo::distance(conn.point, n2.position);
    let from1 = graph.distances_from(n1.id);
    let from2 = graph.distances_from(n2.id);

    let mut node_to_hub = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        let via1 = from1.get(&node.id).map(|d| *d + offset1);
        let via2 = from2.get(&node.id).map(|d| *d + offset2);
        let best = match (via1, via2) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (one, two) => one.or(two),
        };
        if let Some(dist) = best {
            node_to_hub.insert(node.id, dist);
        }
    }

    Some(HubReference {
        point: conn.point,
        link: link.id,
        node_to_hub,
    })
}

/// Candidate segments for the attachment search. The hub's own link is split
/// at the hub attachment point so the search can tap the grid on either side
/// of it with the true (zero-at-attachment) grid distance; every other link
/// contributes itself with its endpoints' precomputed distances.
fn candidate_segments(snapshot: &Snapshot, hub: &HubReference) -> Vec<LinkSegment> {
    let mut segments = Vec::new();
    for (link, n1, n2) in snapshot.valid_links() {
        let (Some(&d1), Some(&d2)) = (
            hub.node_to_hub.get(&n1.id),
            hub.node_to_hub.get(&n2.id),
        ) else {
            trace!(link = link.id.value(), "link disconnected from the hub");
            continue;
        };
        if link.id == hub.link {
            segments.push(LinkSegment {
                link: link.id,
                a: n1.position,
                b: hub.point,
                d_a: d1,
                d_b: Kilometers::ZERO,
            });
            segments.push(LinkSegment {
                link: link.id,
                a: hub.point,
                b: n2.position,
                d_a: Kilometers::ZERO,
                d_b: d2,
            });
        } else {
            segments.push(LinkSegment {
                link: link.id,
                a: n1.position,
                b: n2.position,
                d_a: d1,
                d_b: d2,
            });
        }
    }
    segments
}

/// Best attachment across all links for the weighted cable+grid objective,
/// falling back to the plain nearest point when nothing is reachable.
fn optimal_connection(
    snapshot: &Snapshot,
    hub: &HubReference,
    position: GeoPoint,
    penalty: f64,
) -> Option<GridConnection> {
    let mut best: Option<(f64, GridConnection)> = None;

    for seg in candidate_segments(snapshot, hub) {
        let cand = segment::optimal_point(position, seg.a, seg.b, seg.d_a, seg.d_b, penalty);
        let weighted = cand.cable.value() * penalty + (cand.total - cand.cable).value();
        if best.as_ref().is_none_or(|(w, _)| weighted < *w) {
            best = Some((
                weighted,
                GridConnection {
                    point: cand.point,
                    link: Some(seg.link),
                    dist: cand.total,
                },
            ));
        }
    }

    best.map(|(_, conn)| conn)
        .or_else(|| nearest_connection(snapshot, position))
}

/// Re-attach a station so its total distance matches `target`, keeping the
/// current attachment when it is already within tolerance of the target or
/// when no link offers a qualifying point. Among qualifying points the one
/// with the least fresh cable wins.
fn target_connection(
    snapshot: &Snapshot,
    hub: &HubReference,
    position: GeoPoint,
    target: Kilometers,
    current: &GridConnection,
) -> GridConnection {
    if current.dist.value() >= target.value() - segment::TARGET_TOLERANCE_KM {
        return current.clone();
    }

    let mut best: Option<(Kilometers, GridConnection)> = None;
    for seg in candidate_segments(snapshot, hub) {
        let Some(hit) = segment::target_point(position, seg.a, seg.b, seg.d_a, seg.d_b, target)
        else {
            continue;
        };
        if best.as_ref().is_none_or(|(cable, _)| hit.cable < *cable) {
            best = Some((
                hit.cable,
                GridConnection {
                    point: hit.point,
                    link: Some(seg.link),
                    dist: target,
                },
            ));
        }
    }

    best.map(|(_, conn)| conn).unwrap_or_else(|| current.clone())
}

/// Wind/wave equalization: when both exist and both have candidates, the
/// closer one is re-attached to match the farther one's total distance.
fn equalize_balanced(
    snapshot: &Snapshot,
    hub: &HubReference,
    config: &PlannerConfig,
    candidates: &mut HashMap<StationId, GridConnection>,
) {
    let wind = snapshot.stations.iter().find(|s| s.kind == StationKind::Wind);
    let wave = snapshot.stations.iter().find(|s| s.kind == StationKind::Wave);
    let (Some(wind), Some(wave)) = (wind, wave) else {
        return;
    };
    let (Some(wind_conn), Some(wave_conn)) = (
        candidates.get(&wind.id).cloned(),
        candidates.get(&wave.id).cloned(),
    ) else {
        return;
    };

    let gap = (wind_conn.dist - wave_conn.dist).abs();
    if gap <= config.equalize_tolerance {
        return;
    }

    let target = wind_conn.dist.max(wave_conn.dist);
    let (id, position, current) = if wind_conn.dist < wave_conn.dist {
        (wind.id, wind.position, wind_conn)
    } else {
        (wave.id, wave.position, wave_conn)
    };

    debug!(
        station = id.value(),
        target = %target,
        gap = %gap,
        "equalizing balanced station"
    );
    let adjusted = target_connection(snapshot, hub, position, target, &current);
    candidates.insert(id, adjusted);
}
