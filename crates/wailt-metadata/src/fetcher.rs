//! Tiered acquisition: network, then cache, then the embedded bundle.
//!
//! Each call walks the tiers in order and stops at the first one that yields
//! a document with the current [`FORMAT_VERSION`](crate::FORMAT_VERSION):
//!
//! ```text
//! START -> NETWORK -> CACHE -> EMBEDDED -> { ok, Exhausted }
//!   \___________________________^   (force_embedded)
//! ```
//!
//! Every tier is tried at most once per call and nothing is memoized.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::cache::{validate_file_name, MetadataCache};
use crate::embedded::EmbeddedBundle;
use crate::log::{LogSink, TracingSink};
use crate::source::{HttpSource, RemoteSource};
use crate::types::{decode, MetadataDocument, MetadataError, MetadataResult, TierError};

/// Subdirectory of the host's data directory that holds the cache.
pub const CACHE_DIR_NAME: &str = "wailt";

/// Fetches versioned metadata documents with cache and bundled fallbacks.
pub struct MetadataFetcher {
    cache: MetadataCache,
    base_url: Url,
    force_embedded: bool,
    source: Arc<dyn RemoteSource>,
    bundle: EmbeddedBundle,
    logger: Arc<dyn LogSink>,
}

impl MetadataFetcher {
    /// Create a fetcher whose cache lives at `cache_root`.
    ///
    /// The directory is created if missing. Fails if it cannot be created or
    /// something other than a directory is already there.
    pub fn new(
        cache_root: impl Into<PathBuf>,
        base_url: Url,
        force_embedded: bool,
    ) -> MetadataResult<Self> {
        let cache = MetadataCache::open(cache_root)?;
        Ok(Self {
            cache,
            base_url,
            force_embedded,
            source: Arc::new(HttpSource::default()),
            bundle: EmbeddedBundle::builtin(),
            logger: Arc::new(TracingSink),
        })
    }

    /// Create a fetcher caching under `<data_dir>/wailt`.
    pub fn in_data_dir(
        data_dir: impl AsRef<Path>,
        base_url: Url,
        force_embedded: bool,
    ) -> MetadataResult<Self> {
        Self::new(data_dir.as_ref().join(CACHE_DIR_NAME), base_url, force_embedded)
    }

    pub fn with_source(mut self, source: Arc<dyn RemoteSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_bundle(mut self, bundle: EmbeddedBundle) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }

    pub fn cache_root(&self) -> &Path {
        self.cache.root()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn force_embedded(&self) -> bool {
        self.force_embedded
    }

    /// Fetch `file_name` as a `T`.
    ///
    /// Only fails when every tier has failed; the error then carries the
    /// cause from each tier that was attempted.
    pub async fn fetch<T: MetadataDocument>(&self, file_name: &str) -> MetadataResult<T> {
        validate_file_name(file_name)?;

        if self.force_embedded {
            self.logger
                .warn(&format!("Using embedded copy of {file_name}, as requested"));
            return self
                .load_embedded(file_name)
                .map_err(|embedded| MetadataError::Exhausted {
                    file: file_name.to_string(),
                    download: None,
                    cache: None,
                    embedded,
                });
        }

        let download_error = match self.download(file_name).await {
            Ok(document) => return Ok(document),
            Err(e) => e,
        };
        self.logger.warn(&format!(
            "Failed to download or parse {file_name}, loading cached file"
        ));
        self.logger.debug(&format!("Download error: {download_error}"));

        let cache_error = match self.read_cache(file_name).await {
            Ok(document) => return Ok(document),
            Err(e) => e,
        };
        self.logger.warn(&format!(
            "Unable to read {file_name} from cache, using embedded copy"
        ));
        self.logger.debug(&format!("Cache read error: {cache_error}"));

        self.load_embedded(file_name)
            .map_err(|embedded| MetadataError::Exhausted {
                file: file_name.to_string(),
                download: Some(download_error),
                cache: Some(cache_error),
                embedded,
            })
    }

    /// Network tier. The raw text is cached only once it has validated.
    async fn download<T: MetadataDocument>(&self, file_name: &str) -> Result<T, TierError> {
        let url = self.base_url.join(file_name).map_err(|e| {
            TierError::Network(format!(
                "cannot resolve {file_name} against {}: {e}",
                self.base_url
            ))
        })?;

        let text = self.source.fetch_text(&url).await?;
        let document = decode(&text)?;

        self.logger.debug(&format!(
            "Caching downloaded file {file_name} from {}",
            self.source.label()
        ));
        if let Err(e) = self.cache.write(file_name, &text).await {
            self.logger
                .warn(&format!("Failed to cache downloaded file {file_name}: {e}"));
        }

        Ok(document)
    }

    /// Cache tier. Read-only.
    pub async fn read_cache<T: MetadataDocument>(&self, file_name: &str) -> Result<T, TierError> {
        self.cache.load(file_name).await
    }

    /// Embedded tier. Nothing falls back from here.
    pub fn load_embedded<T: MetadataDocument>(&self, file_name: &str) -> Result<T, TierError> {
        self.bundle.load(file_name)
    }
}
