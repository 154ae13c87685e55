//! Connection orchestrator tests

use gridtap_algo::{recompute_connections, recompute_distances, PlannerConfig};
use gridtap_core::{
    geo, GeoPoint, GridLink, GridNode, LinkId, NodeId, Snapshot, Station, StationId, StationKind,
};

/// Two backbone nodes one degree apart along the equator, single link.
fn create_equator_grid() -> Snapshot {
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
fn test_end_to_end_hub_and_ordinary_station() {
    let mut snapshot = create_equator_grid();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.0, 0.5),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::Wind,
        GeoPoint::new(1.0, 0.5),
    ));

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());

    // The hub sits on the link, so its attachment is its own position.
    let hub = snapshot.station(StationId::new(1)).unwrap();
    assert_eq!(hub.attach_link, Some(LinkId::new(1)));
    assert!(hub.attach_point.unwrap().close_to(GeoPoint::new(0.0, 0.5), 1e-9));

    // The station one degree north taps the grid right at the hub
    // attachment: ~111 km of cable, no grid travel.
    let wind = snapshot.station(StationId::new(2)).unwrap();
    assert_eq!(wind.attach_link, Some(LinkId::new(1)));
    let attach = wind.attach_point.unwrap();
    assert!(attach.close_to(GeoPoint::new(0.0, 0.5), 1e-6), "got {}", attach);

    let results = recompute_distances(&snapshot);
    let wind_result = &results[&StationId::new(2)];
    assert!((wind_result.geo_distance.value() - 111.19).abs() < 0.1);
    assert!((wind_result.cable_distance.value() - 111.19).abs() < 0.5);

    // Grid share of the route is essentially zero.
    let tap = geo::distance(GeoPoint::new(1.0, 0.5), attach).value();
    assert!((wind_result.cable_distance.value() - tap).abs() < 0.01);

    // Route runs station -> attachment -> hub attachment -> hub.
    assert_eq!(wind_result.path.first().unwrap(), &GeoPoint::new(1.0, 0.5));
    assert_eq!(wind_result.path.last().unwrap(), &GeoPoint::new(0.0, 0.5));
    // The hub itself gets no distance entry.
    assert!(!results.contains_key(&StationId::new(1)));
}

#[test]
fn test_direct_link_station_bypasses_grid() {
    let mut snapshot = create_equator_grid();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.0, 0.5),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::DirectLink,
        GeoPoint::new(0.3, 0.2),
    ));

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());

    let direct = snapshot.station(StationId::new(2)).unwrap();
    assert_eq!(direct.attach_point, Some(GeoPoint::new(0.0, 0.5)));
    assert_eq!(direct.attach_link, None);

    let results = recompute_distances(&snapshot);
    let result = &results[&StationId::new(2)];
    assert_eq!(result.cable_distance, result.geo_distance);
    assert_eq!(
        result.path,
        vec![GeoPoint::new(0.3, 0.2), GeoPoint::new(0.0, 0.5)]
    );
}

#[test]
fn test_direct_link_without_hub_loses_attachment() {
    let mut snapshot = create_equator_grid();
    let mut station = Station::new(
        StationId::new(1),
        StationKind::DirectLink,
        GeoPoint::new(0.3, 0.2),
    );
    station.attach_point = Some(GeoPoint::new(5.0, 5.0)); // stale, hub is gone
    snapshot.stations.push(station);

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());

    let direct = snapshot.station(StationId::new(1)).unwrap();
    assert!(!direct.has_attachment());
    assert_eq!(direct.attach_link, None);
}

#[test]
fn test_fallback_to_nearest_without_hub() {
    let mut snapshot = create_equator_grid();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Wind,
        GeoPoint::new(0.5, 0.25),
    ));

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());

    let wind = snapshot.station(StationId::new(1)).unwrap();
    assert_eq!(wind.attach_link, Some(LinkId::new(1)));
    assert!(wind
        .attach_point
        .unwrap()
        .close_to(GeoPoint::new(0.0, 0.25), 1e-6));

    // No hub: no distances either.
    assert!(recompute_distances(&snapshot).is_empty());
}

#[test]
fn test_stale_link_reference_heals_in_one_pass() {
    let mut snapshot = create_equator_grid();
    let mut station = Station::new(
        StationId::new(1),
        StationKind::Wind,
        GeoPoint::new(0.5, 0.5),
    );
    // Pointing at a link that no longer exists, at exactly the point the
    // recomputation will produce again: the write gate must still fire.
    station.attach_point = Some(GeoPoint::new(0.0, 0.5));
    station.attach_link = Some(LinkId::new(99));
    snapshot.stations.push(station);

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());

    let wind = snapshot.station(StationId::new(1)).unwrap();
    assert_eq!(wind.attach_link, Some(LinkId::new(1)));
    assert!(wind
        .attach_point
        .unwrap()
        .close_to(GeoPoint::new(0.0, 0.5), 1e-6));
}

#[test]
fn test_station_without_any_links_left_unattached() {
    let mut snapshot = create_equator_grid();
    snapshot.links.clear();
    let mut station = Station::new(
        StationId::new(1),
        StationKind::Wind,
        GeoPoint::new(0.5, 0.5),
    );
    station.attach_point = Some(GeoPoint::new(0.0, 0.5));
    station.attach_link = Some(LinkId::new(1)); // deleted with the links
    snapshot.stations.push(station);

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());
    assert!(!snapshot.station(StationId::new(1)).unwrap().has_attachment());
}

/// Equator grid plus a second, disconnected island two links to the east.
fn create_grid_with_island() -> Snapshot {
    let mut snapshot = create_equator_grid();
    snapshot
        .nodes
        .push(GridNode::new(NodeId::new(3), GeoPoint::new(0.0, 20.0)));
    snapshot
        .nodes
        .push(GridNode::new(NodeId::new(4), GeoPoint::new(0.0, 21.0)));
    snapshot
        .links
        .push(GridLink::new(LinkId::new(2), NodeId::new(3), NodeId::new(4)));
    snapshot
}

#[test]
fn test_connection_pass_avoids_links_cut_off_from_hub() {
    let mut snapshot = create_grid_with_island();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.0, 0.5),
    ));
    // Geometrically nearest to the island link, but that link has no route
    // to the hub, so the optimizer must attach to the hub's component.
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::Wind,
        GeoPoint::new(0.5, 20.5),
    ));

    snapshot.stations = recompute_connections(&snapshot, &PlannerConfig::default());
    let wind = snapshot.station(StationId::new(2)).unwrap();
    assert_eq!(wind.attach_link, Some(LinkId::new(1)));
}

#[test]
fn test_unreachable_attachment_yields_no_distance() {
    let mut snapshot = create_grid_with_island();

    let mut hub = Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.0, 0.5),
    );
    hub.attach_point = Some(GeoPoint::new(0.0, 0.5));
    hub.attach_link = Some(LinkId::new(1));
    snapshot.stations.push(hub);

    // Editor state left this station attached to the island link; every
    // endpoint pairing toward the hub is unreachable.
    let mut wind = Station::new(
        StationId::new(2),
        StationKind::Wind,
        GeoPoint::new(0.5, 20.5),
    );
    wind.attach_point = Some(GeoPoint::new(0.0, 20.5));
    wind.attach_link = Some(LinkId::new(2));
    snapshot.stations.push(wind);

    // Reachable control station.
    let mut solar = Station::new(
        StationId::new(3),
        StationKind::Solar,
        GeoPoint::new(0.5, 0.25),
    );
    solar.attach_point = Some(GeoPoint::new(0.0, 0.25));
    solar.attach_link = Some(LinkId::new(1));
    snapshot.stations.push(solar);

    let results = recompute_distances(&snapshot);
    assert!(!results.contains_key(&StationId::new(2)));
    assert!(results.contains_key(&StationId::new(3)));
}

#[test]
fn test_recompute_is_idempotent_at_fixed_point() {
    let mut snapshot = create_equator_grid();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.1, 0.4),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::Wind,
        GeoPoint::new(0.4, 0.1),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(3),
        StationKind::Wave,
        GeoPoint::new(0.5, 0.9),
    ));

    let config = PlannerConfig::default();
    snapshot.stations = recompute_connections(&snapshot, &config);
    let settled = snapshot.stations.clone();

    snapshot.stations = recompute_connections(&snapshot, &config);
    assert_eq!(snapshot.stations, settled);
}

#[test]
fn test_moving_a_station_reattaches_it() {
    let mut snapshot = create_equator_grid();
    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(0.0, 0.5),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::Solar,
        GeoPoint::new(0.5, 0.1),
    ));

    let config = PlannerConfig::default();
    snapshot.stations = recompute_connections(&snapshot, &config);
    let before = snapshot.station(StationId::new(2)).unwrap().attach_point;

    assert!(snapshot.move_station(StationId::new(2), GeoPoint::new(0.5, 0.9)));
    snapshot.stations = recompute_connections(&snapshot, &config);
    let after = snapshot.station(StationId::new(2)).unwrap().attach_point;

    assert!(before.is_some() && after.is_some());
    assert!(
        !after.unwrap().close_to(before.unwrap(), 1e-6),
        "attachment should follow the station"
    );
}
