//! Fallback documents compiled into the binary.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::types::{decode, MetadataDocument, TierError};

const BUILTIN_TRACKS: &str = include_str!("../resources/tracks.json");

/// A set of named payloads shipped with the distributable.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedBundle {
    files: HashMap<String, Cow<'static, str>>,
}

impl EmbeddedBundle {
    /// A bundle with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The payloads this crate ships: `tracks.json`.
    pub fn builtin() -> Self {
        Self::empty().with_file("tracks.json", BUILTIN_TRACKS)
    }

    /// Add or replace a payload.
    pub fn with_file(
        mut self,
        name: impl Into<String>,
        content: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Parse and validate the payload for `file_name`.
    ///
    /// Version is still checked here: a bundled copy with the wrong version
    /// is a packaging mistake and must not reach the caller.
    pub fn load<T: MetadataDocument>(&self, file_name: &str) -> Result<T, TierError> {
        let text = self
            .get(file_name)
            .ok_or_else(|| TierError::NotBundled(file_name.to_string()))?;
        decode(text)
    }
}
