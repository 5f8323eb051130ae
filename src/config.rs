use crate::render::{OutputFormat, DEFAULT_PREVIEW_LIMIT};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Format used when none is given on the command line.
    pub default_format: OutputFormat,
    /// Where rendered transcripts are written.
    pub output_dir: PathBuf,
    /// Keeps downloaded payloads keyed by URL when set.
    pub cache_dir: Option<PathBuf>,
    /// Characters shown per format by `preview`.
    pub preview_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Cue,
            output_dir: PathBuf::from("."),
            cache_dir: None,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("parse config")
    }

    /// Loads `path`, or `config.toml` if it exists, or falls back to defaults.
    ///
    /// An explicitly named file that cannot be read is an error.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let config = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config = Self::from_toml(&config)
            .with_context(|| format!("in config '{}'", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn reads_fields() {
        let config = Config::from_toml(
            r#"
            default_format = "grouped"
            output_dir = "/tmp/transcripts"
            cache_dir = ".cache"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_format, OutputFormat::Grouped);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/transcripts"));
        assert_eq!(config.cache_dir, Some(PathBuf::from(".cache")));
        assert_eq!(config.preview_limit, 500);
    }

    #[test]
    fn accepts_legacy_format_names() {
        for (name, format) in [
            ("json", OutputFormat::Raw),
            ("vtt", OutputFormat::Cue),
            ("vtt-grouped", OutputFormat::Grouped),
        ] {
            let config = Config::from_toml(&format!("default_format = \"{name}\"")).unwrap();
            assert_eq!(config.default_format, format);
        }
    }

    #[test]
    fn rejects_unknown_keys_and_formats() {
        assert!(Config::from_toml("default_format = \"srt\"").is_err());
        assert!(Config::from_toml("api_key = \"x\"").is_err());
    }

    #[tokio::test]
    async fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("missing.toml").as_path()))
            .await
            .is_err());

        let path = dir.path().join("c.toml");
        std::fs::write(&path, "preview_limit = 80\n").unwrap();
        let config = Config::load(Some(path.as_path())).await.unwrap();
        assert_eq!(config.preview_limit, 80);
        assert_eq!(config.default_format, OutputFormat::Cue);
    }
}
