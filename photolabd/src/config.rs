//! Daemon configuration: optional `config.json` in the data directory, then
//! environment overrides.
//!
//! - `PHOTOLAB_ADDR=127.0.0.1:9877`
//! - `PHOTOLAB_TUTOR=off|stub|endpoint`
//! - `PHOTOLAB_TUTOR_ENDPOINT=host:port`
//! - `PHOTOLAB_TUTOR_TIMEOUT_MS=20000`

use std::fs;
use std::path::Path;

use photolab::protocol::DEFAULT_ADDR;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DaemonError;
use crate::tutor::{TutorConfig, TutorMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub tutor: TutorConfig,
}

fn default_listen_addr() -> String {
    DEFAULT_ADDR.to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            tutor: TutorConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Read `path` if it exists; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| DaemonError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| DaemonError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("PHOTOLAB_ADDR") {
            let v = v.trim();
            if !v.is_empty() {
                self.listen_addr = v.to_string();
            }
        }

        if let Some(v) = get("PHOTOLAB_TUTOR") {
            match TutorMode::parse(&v) {
                Some(mode) => self.tutor.mode = mode,
                None => warn!("Ignoring unknown PHOTOLAB_TUTOR={:?}", v),
            }
        }

        if let Some(v) = get("PHOTOLAB_TUTOR_ENDPOINT") {
            let v = v.trim();
            self.tutor.endpoint = (!v.is_empty()).then(|| v.to_string());
        }

        if let Some(v) = get("PHOTOLAB_TUTOR_TIMEOUT_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.tutor.timeout_ms = ms.max(1),
                Err(_) => warn!("Ignoring invalid PHOTOLAB_TUTOR_TIMEOUT_MS={:?}", v),
            }
        }
    }
}
