//! Timeline files with versioning and migration.
//!
//! A timeline file is JSON: `{ "version", "app_version", "timeline" }`.
//! Files written before the version wrapper existed are a bare snapshot.

use serde::{Deserialize, Serialize};
use splice_core::{Result, SpliceError};
use std::path::Path;

use crate::timeline::{Timeline, TimelineSnapshot};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned timeline file wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    /// Application version that wrote this file.
    pub app_version: String,
    pub timeline: TimelineSnapshot,
}

impl TimelineFile {
    pub fn new(timeline: TimelineSnapshot) -> Self {
        Self {
            version: CURRENT_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            timeline,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            SpliceError::Serialization(format!("Failed to serialize timeline: {e}"))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| SpliceError::Serialization(format!("Invalid JSON: {e}")))?;

        let version = raw
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if version > u64::from(CURRENT_VERSION) {
            return Err(SpliceError::Serialization(format!(
                "Timeline file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version as u32)?;
        serde_json::from_value(migrated)
            .map_err(|e| SpliceError::Serialization(format!("Failed to parse timeline: {e}")))
    }

    /// Rebuild a live timeline, re-checking every invariant.
    pub fn into_timeline(self) -> Result<Timeline> {
        Timeline::from_snapshot(self.timeline)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        tracing::debug!(path = %path.display(), "Timeline saved");
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to `CURRENT_VERSION`.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;
    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 files are the bare snapshot.
                data = serde_json::json!({
                    "version": 1,
                    "app_version": "0.0.0",
                    "timeline": data,
                });
                version = 1;
            }
            _ => {
                return Err(SpliceError::Serialization(format!(
                    "No migration path from version {version}"
                )));
            }
        }
    }
    Ok(data)
}
