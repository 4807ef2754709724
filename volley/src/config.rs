//! Binary configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;
use volley_dispatch::DispatchConfig;

/// Which transport the binary wires into the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportChoice {
    /// Accept and log every message. The development and demo transport.
    #[default]
    Sink,
}

/// Top-level configuration for the `volley` binary, usually read from
/// `volley.config.ron`. Every field has a default, so an empty file (or no
/// file at all) gives a working setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VolleyConfig {
    pub dispatch: DispatchConfig,
    pub transport: TransportChoice,
    /// Log each recipient's final outcome once the run settles.
    pub log_sends: bool,
}

impl VolleyConfig {
    /// Read and parse one configuration file.
    ///
    /// # Errors
    /// When the file cannot be read or is not valid RON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config from {}: {e}", path.display()))?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Malformed config {}: {e}", path.display()))
    }

    /// Resolve the effective configuration:
    /// 1. An explicit `--config` path
    /// 2. The `VOLLEY_CONFIG` environment variable
    /// 3. ./volley.config.ron (current working directory)
    /// 4. /etc/volley/volley.config.ron (system-wide config)
    ///
    /// With none of those present, defaults apply.
    ///
    /// # Errors
    /// When an explicitly named file (argument or environment variable) does
    /// not exist, or whichever file was found fails to parse.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var("VOLLEY_CONFIG") {
            let path = PathBuf::from(env_path);
            if !path.exists() {
                anyhow::bail!(
                    "VOLLEY_CONFIG points to non-existent file: {}",
                    path.display()
                );
            }
            return Self::load(&path);
        }

        for path in [
            Path::new("./volley.config.ron"),
            Path::new("/etc/volley/volley.config.ron"),
        ] {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn an_empty_config_is_all_defaults() {
        let config: VolleyConfig = ron::from_str("()").unwrap();
        assert_eq!(config.transport, TransportChoice::Sink);
        assert_eq!(config.dispatch.send_timeout_secs, 30);
        assert_eq!(config.dispatch.batch_window_secs, 60);
        assert!(!config.log_sends);
    }

    #[test]
    fn fields_can_be_set_individually() {
        let config: VolleyConfig = ron::from_str(
            "(dispatch: (send_timeout_secs: 5), transport: sink, log_sends: true)",
        )
        .unwrap();
        assert_eq!(config.dispatch.send_timeout_secs, 5);
        assert_eq!(config.dispatch.batch_window_secs, 60);
        assert!(config.log_sends);
    }

    #[test]
    fn explicit_paths_must_exist() {
        let error = VolleyConfig::discover(Some(Path::new("/does/not/exist.ron"))).unwrap_err();
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_files_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.config.ron");
        std::fs::write(&path, "(log_sends: true)").unwrap();

        let config = VolleyConfig::discover(Some(&path)).unwrap();
        assert!(config.log_sends);
    }

    #[test]
    fn malformed_files_are_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.config.ron");
        std::fs::write(&path, "(log_sends: maybe)").unwrap();

        let error = VolleyConfig::load(&path).unwrap_err();
        assert!(error.to_string().contains("Malformed config"));
    }
}
