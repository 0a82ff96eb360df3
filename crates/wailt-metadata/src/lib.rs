//! wailt-metadata — tiered acquisition of versioned metadata documents.
//!
//! Documents are fetched from the network, fall back to the last good
//! download cached on disk, and finally to a copy compiled into the binary.

pub mod cache;
pub mod embedded;
pub mod fetcher;
pub mod log;
pub mod source;
pub mod tracks;
pub mod types;

pub use cache::{validate_file_name, MetadataCache};
pub use embedded::EmbeddedBundle;
pub use fetcher::{MetadataFetcher, CACHE_DIR_NAME};
pub use log::{Level, LogSink, MemorySink, TracingSink};
pub use source::{HttpSource, RemoteSource, DEFAULT_TIMEOUT_MS};
pub use tracks::{Artist, ArtistLabel, Track, TrackIndex, Tracks, DEFAULT_ARTIST_COLOR};
pub use types::*;
