//! Subcommand implementations. Each returns the text to print.

use serde::{Deserialize, Serialize};

use wailt_metadata::{MetadataDocument, MetadataFetcher, TrackIndex, Tracks};

use crate::config::MetadataConfig;

/// Name of the track metadata document.
pub const TRACKS_FILE: &str = "tracks.json";

/// Any versioned JSON document; everything besides `version` is kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub version: u32,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl MetadataDocument for RawDocument {
    fn version(&self) -> u32 {
        self.version
    }
}

/// `fetch`: pretty-printed document.
pub async fn fetch(fetcher: &MetadataFetcher, file_name: &str) -> anyhow::Result<String> {
    let document: RawDocument = fetcher.fetch(file_name).await?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Fetch `tracks.json` and index it.
pub async fn load_tracks(fetcher: &MetadataFetcher) -> anyhow::Result<TrackIndex> {
    tracing::info!("Downloading artist index");
    let tracks: Tracks = fetcher.fetch(TRACKS_FILE).await?;
    let index = TrackIndex::from_tracks(&tracks);
    tracing::info!(
        "Loaded information for {} songs in {} namespaces",
        index.track_count(),
        index.namespace_count()
    );
    Ok(index)
}

/// `tracks`: one-line summary.
pub async fn tracks(fetcher: &MetadataFetcher) -> anyhow::Result<String> {
    let index = load_tracks(fetcher).await?;
    Ok(format!(
        "{} songs in {} namespaces",
        index.track_count(),
        index.namespace_count()
    ))
}

/// `lookup`: title and artist for a sound location, as JSON.
pub async fn lookup(fetcher: &MetadataFetcher, location: &str) -> anyhow::Result<String> {
    let index = load_tracks(fetcher).await?;
    match index.lookup(location) {
        Some(track) => Ok(serde_json::to_string_pretty(track)?),
        None => {
            tracing::warn!("No metadata is defined for music track {location}");
            anyhow::bail!("unknown track: {location}")
        }
    }
}

/// `config`: effective configuration plus derived paths, as JSON.
pub fn config(config: &MetadataConfig, fetcher: &MetadataFetcher) -> anyhow::Result<String> {
    let info = serde_json::json!({
        "url": config.url,
        "force-embedded": config.force_embedded,
        "timeout-ms": config.timeout_ms,
        "cache-dir": fetcher.cache_root().display().to_string(),
    });
    Ok(serde_json::to_string_pretty(&info)?)
}
