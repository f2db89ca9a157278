//! Runtime configuration, optionally stored as TOML.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Limits and diagnostics applied to every invocation run by a
/// [`Runtime`](crate::runtime::Runtime).
///
/// Missing fields default to the values in [`RuntimeConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum nesting of composed actors below the top-level call.
    pub max_depth: usize,

    /// Emit a `trace`-level snapshot of the state after each actor finishes.
    pub trace_state: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            trace_state: false,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(anyhow!("max_depth must be > 0"));
        }
        Ok(())
    }
}

/// Read a runtime config from TOML. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let cfg = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<RuntimeConfig>(&raw)
            .with_context(|| format!("parse runtime config {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no runtime config, using defaults");
            RuntimeConfig::default()
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read runtime config {}", path.display()));
        }
    };
    cfg.validate()
        .with_context(|| format!("invalid runtime config {}", path.display()))?;
    debug!(max_depth = cfg.max_depth, trace_state = cfg.trace_state, "runtime config ready");
    Ok(cfg)
}

/// Persist `cfg` as TOML, replacing any existing file in one rename.
pub fn write_config(path: &Path, cfg: &RuntimeConfig) -> Result<()> {
    cfg.validate()?;
    let body = toml::to_string_pretty(cfg).context("render runtime config")?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let staging = path.with_extension("toml.tmp");
    fs::write(&staging, format!("{body}\n"))
        .with_context(|| format!("write {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("move {} into place", staging.display()))?;
    debug!(path = %path.display(), "runtime config written");
    Ok(())
}
