//! JSON import/export of planning snapshots.

use std::fs;
use std::path::Path;

use gridtap_core::{PlanResult, Snapshot};

/// What an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Grid nodes and links only, no stations.
    GridOnly,
    /// The full triple, including stations and their derived attachments.
    Full,
}

/// Serialize a snapshot to pretty-printed JSON.
pub fn to_json(snapshot: &Snapshot, scope: ExportScope) -> PlanResult<String> {
    let out = match scope {
        ExportScope::Full => snapshot.clone(),
        ExportScope::GridOnly => Snapshot {
            nodes: snapshot.nodes.clone(),
            links: snapshot.links.clone(),
            stations: Vec::new(),
        },
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Parse a snapshot from JSON. Missing collections default to empty, so a
/// grid-only document imports cleanly.
pub fn from_json(json: &str) -> PlanResult<Snapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Write a snapshot to a file.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot, scope: ExportScope) -> PlanResult<()> {
    fs::write(path, to_json(snapshot, scope)?)?;
    Ok(())
}

/// Read a snapshot from a file.
pub fn read_snapshot(path: &Path) -> PlanResult<Snapshot> {
    from_json(&fs::read_to_string(path)?)
}
