//! # gridtap-io: Snapshot Persistence and Sample Data
//!
//! The external editor owns persistence of the planning snapshot; this crate
//! provides the one format it speaks, a JSON document carrying the
//! (nodes, links, stations) triple with ids preserved, plus the bundled
//! North Sea sample grid.
//!
//! Exports come in two scopes, matching the editor's "grid only" and "full"
//! downloads: [`ExportScope::GridOnly`] drops the stations,
//! [`ExportScope::Full`] round-trips everything including derived attachment
//! fields (which the planner will overwrite or confirm on its next pass
//! anyway).

pub mod sample;
pub mod snapshot;

pub use sample::{north_sea_backbone, north_sea_demo};
pub use snapshot::{from_json, read_snapshot, to_json, write_snapshot, ExportScope};
