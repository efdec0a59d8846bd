//! JSON run reports written next to the store.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `payload` as pretty JSON to `path`, replacing any previous file.
pub fn write_json_report<P: AsRef<Path>, T: Serialize>(path: P, payload: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(path.as_ref(), json + "\n")?;
    info!("Wrote report to {:?}", path.as_ref());
    Ok(())
}
