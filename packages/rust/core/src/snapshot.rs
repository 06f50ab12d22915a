//! Snapshot persistence.
//!
//! The snapshot is the decoupling point between enrichment and rendering:
//! a plain JSON array of enriched records, pretty-printed, overwritten on
//! every run. Rendering reads it back without re-contacting any provider.

use std::path::Path;

use tracing::info;

use trendlens_shared::{Result, Snapshot, TrendLensError};

/// Write `snapshot` to `path` as pretty-printed JSON, replacing any
/// previous snapshot.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| TrendLensError::snapshot(format!("serialize: {e}")))?;

    std::fs::write(path, json).map_err(|e| TrendLensError::io(path, e))?;
    info!(?path, records = snapshot.len(), "snapshot written");
    Ok(())
}

/// Read a snapshot back from `path`.
///
/// A missing file is an I/O error; a present but malformed file is a
/// snapshot error naming the parse failure.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path).map_err(|e| TrendLensError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| {
        TrendLensError::snapshot(format!("failed to parse {}: {e}", path.display()))
    })
}
