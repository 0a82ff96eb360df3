//! On-disk cache of raw downloaded documents.
//!
//! One file per document name directly under the cache root, holding the
//! downloaded text verbatim. No expiry and no eviction: an entry is replaced
//! only by the next successful download of the same name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{decode, MetadataDocument, MetadataError, MetadataResult, TierError};

/// Reject names that could escape the cache root or be read as a URL.
///
/// Names are used verbatim as cache file names, bundle keys, and relative
/// URLs, so they must be a single plain path component. Percent escapes,
/// queries and fragments are refused because `Url::join` would not keep
/// them literal.
pub fn validate_file_name(name: &str) -> MetadataResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':', '%', '?', '#', '\0']);
    if invalid {
        return Err(MetadataError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// The cache root and the entries stored in it.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    root: PathBuf,
}

impl MetadataCache {
    /// Open the cache at `root`, creating the directory if it is absent.
    pub fn open(root: impl Into<PathBuf>) -> MetadataResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|source| MetadataError::CacheDir {
            path: root.clone(),
            source,
        })?;

        if !root.is_dir() {
            return Err(MetadataError::CacheDir {
                source: std::io::Error::other(format!("{} is not a directory", root.display())),
                path: root,
            });
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `file_name`. The name must already be validated.
    pub fn entry_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Raw text of the entry for `file_name`.
    pub async fn read(&self, file_name: &str) -> Result<String, TierError> {
        Ok(tokio::fs::read_to_string(self.entry_path(file_name)).await?)
    }

    /// Read, parse and validate the entry for `file_name`.
    ///
    /// A missing entry, an unreadable one, bad JSON and a wrong version all
    /// come back as a [`TierError`].
    pub async fn load<T: MetadataDocument>(&self, file_name: &str) -> Result<T, TierError> {
        let text = self.read(file_name).await?;
        decode(&text)
    }

    /// Replace the entry for `file_name` with `text`.
    ///
    /// Written to a uniquely named sibling first and renamed into place, so
    /// concurrent writers of the same name end last-write-wins and readers
    /// never see a partial file.
    pub async fn write(&self, file_name: &str, text: &str) -> std::io::Result<()> {
        let target = self.entry_path(file_name);
        let staging = self
            .root
            .join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

        replace_via(&staging, &target, text).await
    }
}

/// Write `text` to `staging`, then rename it over `target`.
///
/// On any failure the staging file is removed.
async fn replace_via(staging: &Path, target: &Path, text: &str) -> std::io::Result<()> {
    let result = async {
        tokio::fs::write(staging, text).await?;
        tokio::fs::rename(staging, target).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(staging).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::Tracks;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("tracks.json").is_ok());
        assert!(validate_file_name("tracks-1.20.json").is_ok());

        for bad in [
            "",
            ".",
            "..",
            "../etc/passwd",
            "a/b.json",
            "a\\b.json",
            "c:x",
            "nul\0",
            "%2e%2e",
            "%2E%2E%2Fsecret.json",
            "tracks.json?v=2",
            "tracks.json#top",
        ] {
            assert!(
                matches!(validate_file_name(bad), Err(MetadataError::InvalidFileName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data").join("wailt");

        let cache = MetadataCache::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(cache.root(), root.as_path());

        // Opening an existing directory is fine.
        MetadataCache::open(&root).unwrap();
    }

    #[test]
    fn test_open_rejects_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("wailt");
        std::fs::write(&root, "not a directory").unwrap();

        let err = MetadataCache::open(&root).unwrap_err();
        assert!(matches!(err, MetadataError::CacheDir { .. }));
    }

    #[tokio::test]
    async fn test_write_then_read_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(dir.path()).unwrap();
        let raw = "{ \"version\": 1,\n  \"tracks\": {} }\n";

        cache.write("tracks.json", raw).await.unwrap();
        assert_eq!(cache.read("tracks.json").await.unwrap(), raw);

        cache.write("tracks.json", "{\"version\":1}").await.unwrap();
        assert_eq!(cache.read("tracks.json").await.unwrap(), "{\"version\":1}");

        // No staging files left behind.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("tracks.json")]);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(dir.path()).unwrap();
        // A non-empty directory cannot be replaced by a file, even as root.
        std::fs::create_dir(dir.path().join("tracks.json")).unwrap();
        std::fs::write(dir.path().join("tracks.json").join("keep"), "x").unwrap();

        assert!(cache.write("tracks.json", "{\"version\":1}").await.is_err());

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        assert_eq!(names, vec![std::ffi::OsString::from("tracks.json")]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_staging_write_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join(".tracks.json.fixed.tmp");
        let target = dir.path().join("tracks.json");
        // Writes through this link fail with ENOSPC, like a full disk.
        std::os::unix::fs::symlink("/dev/full", &staging).unwrap();

        let err = replace_via(&staging, &target, "{\"version\":1}")
            .await
            .unwrap_err();
        assert_eq!(err.raw_os_error(), Some(28));
        assert!(std::fs::symlink_metadata(&staging).is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_load_missing_and_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(dir.path()).unwrap();

        let missing = cache.load::<Tracks>("tracks.json").await.unwrap_err();
        assert!(matches!(missing, TierError::Io(_)));

        cache
            .write("tracks.json", r#"{"version":2,"tracks":{}}"#)
            .await
            .unwrap();
        let stale = cache.load::<Tracks>("tracks.json").await.unwrap_err();
        assert!(matches!(stale, TierError::UnsupportedVersion { found: 2, .. }));

        cache
            .write("tracks.json", r#"{"version":1,"tracks":{}}"#)
            .await
            .unwrap();
        let tracks = cache.load::<Tracks>("tracks.json").await.unwrap();
        assert_eq!(tracks.version, 1);
    }
}
