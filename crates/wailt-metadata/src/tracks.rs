//! Music track metadata: the document shape served as `tracks.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::MetadataDocument;

/// Colour given to artists that have no component of their own.
pub const DEFAULT_ARTIST_COLOR: u32 = 0xFFA500;

/// Namespace assumed when a sound location has none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Raw `tracks.json` document.
///
/// `tracks` maps namespace -> artist -> track id -> title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracks {
    pub version: u32,
    #[serde(default)]
    pub tracks: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
    #[serde(default)]
    pub artists: BTreeMap<String, Artist>,
}

impl MetadataDocument for Tracks {
    fn version(&self) -> u32 {
        self.version
    }
}

/// Presentation details for an artist, as a JSON text component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub component: serde_json::Value,
}

/// How an artist should be labelled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtistLabel {
    /// A text component supplied by the metadata.
    Component { component: serde_json::Value },
    /// The bare artist key, coloured with [`DEFAULT_ARTIST_COLOR`].
    Literal { name: String, color: u32 },
}

impl ArtistLabel {
    /// Best-effort plain text for the label.
    pub fn plain_text(&self) -> String {
        match self {
            ArtistLabel::Literal { name, .. } => name.clone(),
            ArtistLabel::Component { component } => match component {
                serde_json::Value::String(s) => s.clone(),
                other => other
                    .get("text")
                    .and_then(|t| t.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            },
        }
    }
}

/// A resolved track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub title: String,
    pub artist: ArtistLabel,
}

/// Tracks keyed by namespace, then by track id.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    namespaces: BTreeMap<String, BTreeMap<String, Track>>,
}

impl TrackIndex {
    /// Flatten the artist level away and attach an artist label to each track.
    pub fn from_tracks(metadata: &Tracks) -> Self {
        let namespaces = metadata
            .tracks
            .iter()
            .map(|(namespace, artists)| {
                let tracks = artists
                    .iter()
                    .flat_map(|(artist, titles)| {
                        let label = match metadata.artists.get(artist) {
                            Some(a) => ArtistLabel::Component {
                                component: a.component.clone(),
                            },
                            None => ArtistLabel::Literal {
                                name: artist.clone(),
                                color: DEFAULT_ARTIST_COLOR,
                            },
                        };
                        titles.iter().map(move |(id, title)| {
                            (
                                id.clone(),
                                Track {
                                    title: title.clone(),
                                    artist: label.clone(),
                                },
                            )
                        })
                    })
                    .collect();
                (namespace.clone(), tracks)
            })
            .collect();

        Self { namespaces }
    }

    /// Look up a track by namespace and sound path (`music/` prefix optional).
    pub fn get(&self, namespace: &str, path: &str) -> Option<&Track> {
        let id = path.strip_prefix("music/").unwrap_or(path);
        self.namespaces.get(namespace)?.get(id)
    }

    /// Look up a `namespace:path` sound location.
    pub fn lookup(&self, location: &str) -> Option<&Track> {
        let (namespace, path) = location
            .split_once(':')
            .unwrap_or((DEFAULT_NAMESPACE, location));
        self.get(namespace, path)
    }

    pub fn track_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }
}
