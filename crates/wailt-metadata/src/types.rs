//! Document capability, format version, and error types.

use std::path::PathBuf;

use serde::de::DeserializeOwned;

/// The only `version` value accepted from any tier.
pub const FORMAT_VERSION: u32 = 1;

/// A versioned metadata document.
///
/// The concrete shape is up to the caller; the fetcher only needs to
/// deserialize JSON into it and read its `version`.
pub trait MetadataDocument: DeserializeOwned + Send {
    fn version(&self) -> u32;
}

/// Parse `text` into `T` and check its version against [`FORMAT_VERSION`].
///
/// Shared by all three tiers, so a wrong version is indistinguishable from
/// malformed JSON to the caller.
pub fn decode<T: MetadataDocument>(text: &str) -> Result<T, TierError> {
    let document: T = serde_json::from_str(text)?;
    let found = document.version();
    if found != FORMAT_VERSION {
        return Err(TierError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(document)
}

/// Failure of a single acquisition tier. Recovered by falling back one tier.
#[derive(thiserror::Error, Debug)]
pub enum TierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("No embedded copy of {0}")]
    NotBundled(String),
}

/// Errors surfaced to callers of the fetcher.
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    /// The cache root could not be created or is not a directory.
    #[error("Failed to prepare cache directory {}: {source}", .path.display())]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata file name: {0:?}")]
    InvalidFileName(String),

    /// Every tier failed. Carries the cause from each tier that was tried.
    #[error(
        "Could not load metadata file {file} ({})",
        describe_causes(.download, .cache, .embedded)
    )]
    Exhausted {
        file: String,
        download: Option<TierError>,
        cache: Option<TierError>,
        #[source]
        embedded: TierError,
    },
}

fn describe_causes(
    download: &Option<TierError>,
    cache: &Option<TierError>,
    embedded: &TierError,
) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(e) = download {
        parts.push(format!("download: {e}"));
    }
    if let Some(e) = cache {
        parts.push(format!("cache: {e}"));
    }
    parts.push(format!("embedded: {embedded}"));
    parts.join("; ")
}

/// Convenience result type.
pub type MetadataResult<T> = Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug)]
    struct Versioned {
        version: u32,
        #[serde(default)]
        name: Option<String>,
    }

    impl MetadataDocument for Versioned {
        fn version(&self) -> u32 {
            self.version
        }
    }

    #[test]
    fn test_decode_accepts_current_version() {
        let doc: Versioned = decode(r#"{"version":1,"name":"x"}"#).unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let err = decode::<Versioned>(r#"{"version":2}"#).unwrap_err();
        assert!(matches!(
            err,
            TierError::UnsupportedVersion {
                found: 2,
                expected: FORMAT_VERSION
            }
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_and_missing_version() {
        assert!(matches!(
            decode::<Versioned>("not json"),
            Err(TierError::Parse(_))
        ));
        assert!(matches!(
            decode::<Versioned>(r#"{"name":"x"}"#),
            Err(TierError::Parse(_))
        ));
    }

    #[test]
    fn test_exhausted_message_lists_every_cause() {
        let err = MetadataError::Exhausted {
            file: "tracks.json".to_string(),
            download: Some(TierError::Status(404)),
            cache: Some(TierError::UnsupportedVersion {
                found: 2,
                expected: 1,
            }),
            embedded: TierError::NotBundled("tracks.json".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("tracks.json"));
        assert!(msg.contains("download: Unexpected HTTP status 404"));
        assert!(msg.contains("cache: Unsupported version 2"));
        assert!(msg.contains("embedded: No embedded copy"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_exhausted_message_without_skipped_tiers() {
        let err = MetadataError::Exhausted {
            file: "a.json".to_string(),
            download: None,
            cache: None,
            embedded: TierError::NotBundled("a.json".to_string()),
        };
        let msg = err.to_string();
        assert!(!msg.contains("download:"));
        assert!(!msg.contains("cache:"));
    }
}
