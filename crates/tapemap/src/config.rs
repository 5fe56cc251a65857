//! JSON configuration for a mapping session.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use tapemap_detect::{ContourFilterParams, DetectError, SegmentParams};
use tapemap_grid::{AccumulateParams, GridError, ScanParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Lock timeouts for the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    /// How long a scan request waits for an in-progress merge.
    pub scan_lock_timeout_ms: u64,
    /// How long a target lookup waits for an in-progress tag update.
    pub tag_lock_timeout_ms: u64,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            scan_lock_timeout_ms: 50,
            tag_lock_timeout_ms: 10,
        }
    }
}

impl SessionParams {
    #[inline]
    pub fn scan_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_lock_timeout_ms)
    }

    #[inline]
    pub fn tag_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.tag_lock_timeout_ms)
    }
}

/// Every tunable of the pipeline in one document.
///
/// Missing sections and fields fall back to their defaults, so `{}` is a
/// valid config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeMapConfig {
    pub segment: SegmentParams,
    pub contours: ContourFilterParams,
    pub accumulate: AccumulateParams,
    pub scan: ScanParams,
    pub session: SessionParams,
}

impl TapeMapConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.segment.validate()?;
        self.contours.validate()?;
        self.accumulate.validate()?;
        self.scan.validate()?;
        Ok(())
    }
}
