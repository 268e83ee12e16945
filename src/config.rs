//! Ambient process configuration — not to be confused with the `Hexmake`
//! build spec. Controls worker count and logging verbosity only; has no
//! bearing on build semantics.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HexmakeError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct HexmakeConfig {
    /// Worker count for the conductor. 0 means auto-detect.
    #[serde(default)]
    pub jobs: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for HexmakeConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            log_level: default_log_level(),
            color: true,
        }
    }
}

impl HexmakeConfig {
    /// Resolved worker count: `jobs` if nonzero, otherwise the host's
    /// available parallelism (falling back to 1 if that can't be read).
    pub fn resolved_jobs(&self) -> usize {
        if self.jobs > 0 {
            return self.jobs;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Load configuration with layered merging.
    ///
    /// When an explicit `path` is supplied (via `--config`), that single file
    /// is loaded as-is with no layering. Otherwise configs are merged in
    /// ascending priority order, so a higher layer only needs to specify the
    /// keys it wants to override:
    ///
    ///   1. `/etc/hexmake/hexmake.toml` (system-wide, lowest priority)
    ///   2. `./hexmake.toml`            (project-local, highest priority)
    ///
    /// Any layer that does not exist is silently skipped; if none exist,
    /// built-in defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            if !p.exists() {
                return Ok(Self::default());
            }
            return Self::from_toml_str(&read_to_string(p)?);
        }

        let layers = [
            PathBuf::from("/etc/hexmake/hexmake.toml"),
            PathBuf::from("./hexmake.toml"),
        ];

        let mut merged: Option<toml::Value> = None;
        for layer in &layers {
            if layer.exists() {
                let val: toml::Value = toml::from_str(&read_to_string(layer)?)
                    .map_err(|e| HexmakeError::Config(format!("{}: {}", layer.display(), e)))?;
                merged = Some(match merged {
                    Some(base) => merge_toml(base, val),
                    None => val,
                });
            }
        }

        match merged {
            None => Ok(Self::default()),
            Some(val) => Ok(HexmakeConfig::deserialize(val)
                .map_err(|e| HexmakeError::Config(e.to_string()))?),
        }
    }

    fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| HexmakeError::Config(e.to_string()))
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| HexmakeError::Config(format!("failed to read {}: {}", path.display(), e)))
}

/// Recursively merge two TOML values: for tables, overlay keys win and
/// missing keys are inherited from base; everything else is replaced
/// wholesale by the overlay value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    use toml::Value;
    match (base, overlay) {
        (Value::Table(mut base_map), Value::Table(overlay_map)) => {
            for (k, v) in overlay_map {
                let merged = match base_map.remove(&k) {
                    Some(base_v) => merge_toml(base_v, v),
                    None => v,
                };
                base_map.insert(k, merged);
            }
            Value::Table(base_map)
        }
        (_, overlay) => overlay,
    }
}
