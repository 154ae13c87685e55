//! The bundled North Sea sample dataset.
//!
//! A 13-node backbone spanning the North and Baltic Seas with 18 links,
//! matching the planner's default map. [`north_sea_backbone`] returns the
//! grid alone; [`north_sea_demo`] adds a hub and five stations (attachments
//! cleared, ready for a first planning pass).

use gridtap_core::{
    GeoPoint, GridLink, GridNode, LinkId, NodeId, Snapshot, Station, StationId, StationKind,
};

fn node(id: usize, lat: f64, lng: f64, name: &str) -> GridNode {
    GridNode::new(NodeId::new(id), GeoPoint::new(lat, lng))
        .named(name)
        .as_backbone()
}

fn link(id: usize, source: usize, target: usize) -> GridLink {
    GridLink::new(LinkId::new(id), NodeId::new(source), NodeId::new(target))
}

/// The backbone grid alone: nodes and links, no stations.
pub fn north_sea_backbone() -> Snapshot {
    let mut snapshot = Snapshot::new();

    snapshot.nodes = vec![
        node(1, 61.976002406987880, 9.045196425363880, "Oppland"),
        node(2, 62.386162051662340, 15.279737242659978, "Sundsvall"),
        node(3, 56.360221606375490, 9.308627727503167, "Jutland"),
        node(4, 55.323980026137850, 3.864380816624849, "Dogger Bank"),
        node(5, 53.167677592400246, 6.937746008249698, "Groningen"),
        node(6, 57.746231720275745, 14.752874638381481, "Jönköping"),
        node(7, 69.927184756727780, 19.319017208795536, "Tromsø"),
        node(8, 70.725983206723550, 25.377937157998787, "Nordkapp"),
        node(9, 67.029620364410580, 23.007055438745322, "Pajala"),
        node(10, 66.121287894197720, 38.812933567101700, "White Sea"),
        node(11, 52.321910885947730, 13.611258804824333, "Berlin"),
        node(12, 46.739860599692670, 7.025476251342542, "Fribourg"),
        node(13, 57.040729838360875, 11.591618821756594, "Kattegat"),
    ];

    snapshot.links = vec![
        link(1, 2, 1),
        link(2, 6, 2),
        link(3, 3, 4),
        link(4, 5, 4),
        link(5, 5, 11),
        link(6, 5, 12),
        link(7, 11, 12),
        link(8, 11, 3),
        link(9, 6, 11),
        link(10, 13, 3),
        link(11, 1, 13),
        link(12, 2, 13),
        link(13, 1, 7),
        link(14, 8, 1),
        link(15, 8, 7),
        link(16, 9, 2),
        link(17, 9, 10),
        link(18, 8, 10),
    ];

    snapshot
}

/// The backbone plus the demo station layout: a hub in the central North
/// Sea, wind and wave parks off the Norwegian coast, pumped storage, a
/// solar farm in the Baltic, and a direct-link installation next to the hub.
pub fn north_sea_demo() -> Snapshot {
    let mut snapshot = north_sea_backbone();

    snapshot.insert_station(Station::new(
        StationId::new(1),
        StationKind::Hub,
        GeoPoint::new(57.350247591057670, 6.701660170757156),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(2),
        StationKind::Wave,
        GeoPoint::new(62.471723714758724, 6.013691581446055),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(3),
        StationKind::Wind,
        GeoPoint::new(61.648162458523890, 5.486828977167520),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(4),
        StationKind::PumpedStorage,
        GeoPoint::new(59.333189426592190, 6.760080270840657),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(5),
        StationKind::Solar,
        GeoPoint::new(56.413901376006760, 16.419228015947297),
    ));
    snapshot.insert_station(Station::new(
        StationId::new(6),
        StationKind::DirectLink,
        GeoPoint::new(57.433113734450690, 5.646972640130976),
    ));

    snapshot
}
