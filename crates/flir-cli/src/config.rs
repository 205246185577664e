//! `flir.toml` loading.
//!
//! ```toml
//! [analysis]
//! mutate_method = "setState"
//! widget_types = ["Label"]
//!
//! [analysis.severity]
//! WIDGETS_IN_LOOPS = "off"
//!
//! [codec]
//! checksum = true
//! debug_info = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use flir_engine::{AnalysisConfig, WriteOptions};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "flir.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlirConfig {
    pub analysis: AnalysisConfig,
    pub codec: CodecConfig,
}

/// `[codec]` section: defaults for `flir encode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub checksum: bool,
    pub debug_info: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        let options = WriteOptions::default();
        Self {
            checksum: options.checksum,
            debug_info: options.debug_info,
        }
    }
}

impl CodecConfig {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            checksum: self.checksum,
            debug_info: self.debug_info,
        }
    }
}

impl FlirConfig {
    /// Parse and validate TOML text.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: FlirConfig = toml::from_str(text)?;
        config.analysis.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The explicit `--config` path, else the nearest `flir.toml` above the
    /// working directory, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        match discover(&cwd) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Walk up from `start` looking for `flir.toml`.
pub fn discover(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
