//! Configuration loading and resolution.
//!
//! Precedence, highest first: command-line flags, environment variables,
//! `<data_dir>/wailt-metadata.json`, built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use wailt_metadata::{MetadataError, MetadataFetcher, DEFAULT_TIMEOUT_MS};

/// Where track metadata is downloaded from unless configured otherwise.
pub const DEFAULT_METADATA_URL: &str =
    "https://raw.githubusercontent.com/GlyphMods/wailt/1.20.6/src/main/resources/tracks.json";

/// Optional config file, looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "wailt-metadata.json";

pub const ENV_METADATA_URL: &str = "WAILT_METADATA_URL";
pub const ENV_FORCE_EMBEDDED: &str = "WAILT_FORCE_EMBEDDED";
pub const ENV_DATA_DIR: &str = "WAILT_DATA_DIR";
pub const ENV_TIMEOUT_MS: &str = "WAILT_TIMEOUT_MS";

/// Effective settings for the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MetadataConfig {
    /// Base URL document names are resolved against.
    pub url: String,
    /// Skip network and cache, use only the bundled copies.
    pub force_embedded: bool,
    /// Download timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_METADATA_URL.to_string(),
            force_embedded: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub force_embedded: bool,
    pub timeout_ms: Option<u64>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },

    #[error("Invalid metadata URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Resolve the host data directory the cache lives under.
pub fn resolve_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }

    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Load `<data_dir>/wailt-metadata.json`, or defaults if it does not exist.
pub fn load_config_file(data_dir: &Path) -> Result<MetadataConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE_NAME);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(MetadataConfig::default())
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Apply environment overrides read through `lookup`.
pub fn apply_env<F>(mut config: MetadataConfig, lookup: F) -> Result<MetadataConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_METADATA_URL) {
        config.url = url;
    }
    if let Some(value) = lookup(ENV_FORCE_EMBEDDED) {
        config.force_embedded = parse_flag(ENV_FORCE_EMBEDDED, &value)?;
    }
    if let Some(value) = lookup(ENV_TIMEOUT_MS) {
        config.timeout_ms = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_MS.to_string(),
                value: value.clone(),
            })?;
    }
    Ok(config)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// File, then process environment, then command-line overrides.
pub fn resolve_config(data_dir: &Path, overrides: &Overrides) -> Result<MetadataConfig, ConfigError> {
    let config = load_config_file(data_dir)?;
    let mut config = apply_env(config, |name| std::env::var(name).ok())?;

    if let Some(url) = &overrides.url {
        config.url = url.clone();
    }
    if overrides.force_embedded {
        config.force_embedded = true;
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    Ok(config)
}

impl MetadataConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })
    }

    /// Build a fetcher caching under `<data_dir>/wailt`.
    pub fn fetcher(&self, data_dir: &Path) -> Result<MetadataFetcher, ConfigError> {
        let fetcher = MetadataFetcher::in_data_dir(data_dir, self.base_url()?, self.force_embedded)?
            .with_source(std::sync::Arc::new(wailt_metadata::HttpSource::new(
                self.timeout_ms,
            )));
        Ok(fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file(dir.path()).unwrap();
        assert_eq!(config, MetadataConfig::default());
        assert_eq!(config.url, DEFAULT_METADATA_URL);
        assert!(!config.force_embedded);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"force-embedded": true}"#,
        )
        .unwrap();

        let config = load_config_file(dir.path()).unwrap();
        assert!(config.force_embedded);
        assert_eq!(config.url, DEFAULT_METADATA_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ nope").unwrap();
        assert!(matches!(
            load_config_file(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env(
            MetadataConfig::default(),
            env(&[
                (ENV_METADATA_URL, "http://localhost:8080/"),
                (ENV_FORCE_EMBEDDED, "Yes"),
            ]),
        )
        .unwrap();
        assert_eq!(config.url, "http://localhost:8080/");
        assert!(config.force_embedded);

        let err = apply_env(MetadataConfig::default(), env(&[(ENV_FORCE_EMBEDDED, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_env_timeout() {
        let config =
            apply_env(MetadataConfig::default(), env(&[(ENV_TIMEOUT_MS, " 2500 ")])).unwrap();
        assert_eq!(config.timeout_ms, 2500);

        let err = apply_env(MetadataConfig::default(), env(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == ENV_TIMEOUT_MS
        ));
    }

    #[test]
    fn test_invalid_url() {
        let config = MetadataConfig {
            url: "not a url".to_string(),
            ..MetadataConfig::default()
        };
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_fetcher_uses_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MetadataConfig::default().fetcher(dir.path()).unwrap();
        assert_eq!(
            fetcher.cache_root(),
            dir.path().join(wailt_metadata::CACHE_DIR_NAME)
        );
        assert_eq!(fetcher.base_url().as_str(), DEFAULT_METADATA_URL);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        assert_eq!(resolve_data_dir(Some("/srv/game")), PathBuf::from("/srv/game"));
    }
}
