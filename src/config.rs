//! CLI configuration. Not used by the core engine itself (`sanitize` takes
//! its options directly) — this is the ambient configuration layer for
//! the binary, grounded on the project's `GeneralConfig`/`LoggingConfig`
//! split, trimmed to what a sanitizer CLI needs.
//! Author: kartik6717

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SanitizeError};
use crate::options::SanitizeOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Which of the three sanitizer options are enabled by default when
    /// the CLI isn't told otherwise.
    #[serde(default = "SanitizeOptions::all")]
    pub default_options: SanitizeOptions,

    /// Directory sanitized files are written to when `--output` names a
    /// directory rather than a file, or is omitted for multi-file runs.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// `tracing-subscriber` `EnvFilter` directive, e.g. `"info"` or
    /// `"pdf_sanitizer=debug"`. Overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("sanitized")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_options: SanitizeOptions::all(),
            output_dir: default_output_dir(),
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Loads config from `path` if it exists, falling back to defaults
    /// otherwise — the same fallback-to-default posture the project's
    /// config loader documents for its own `Config::load`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "no config file found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            warn!(?path, error = %e, "failed to parse config file");
            SanitizeError::Config(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_yields_defaults() {
        let cfg = CliConfig::load(Path::new("/nonexistent/pdf_sanitizer.toml")).unwrap();
        assert_eq!(cfg.default_options, SanitizeOptions::all());
    }

    #[test]
    fn parses_partial_toml_with_defaults_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_filter = \"debug\"\n").unwrap();

        let cfg = CliConfig::load(&path).unwrap();
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.default_options, SanitizeOptions::all());
    }
}
