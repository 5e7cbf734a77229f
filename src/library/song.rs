use std::fmt;
use std::path::{Path, PathBuf};

use lofty::file::TaggedFileExt;
use lofty::tag::Accessor;
use serde::Serialize;

use crate::player::PlayerError;

pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Immutable descriptor of a playable audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    path: PathBuf,
    name: String,
    artist: String,
    file_name: String,
}

impl Song {
    /// Build a song from its path, deriving the display name from the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, PlayerError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(PlayerError::InvalidSongDescriptor(
                "empty resource path".to_string(),
            ));
        }
        let Some(file_name) = path.file_name() else {
            return Err(PlayerError::InvalidSongDescriptor(format!(
                "{} does not name a file",
                path.display()
            )));
        };
        // Names that are not UTF-8 still play; only the display text is lossy.
        let file_name = file_name.to_string_lossy().into_owned();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        Ok(Self {
            path,
            name,
            artist: UNKNOWN_ARTIST.to_string(),
            file_name,
        })
    }

    /// Like [`Song::new`], but prefers title/artist from embedded tags.
    ///
    /// Unreadable or untagged files keep the path-derived defaults.
    pub fn from_tags(path: impl Into<PathBuf>) -> Result<Self, PlayerError> {
        let mut song = Self::new(path)?;

        if let Ok(tagged) = lofty::read_from_path(&song.path) {
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    let v = v.trim();
                    if !v.is_empty() {
                        song.name = v.to_string();
                    }
                }
                if let Some(v) = tag.artist() {
                    let v = v.trim();
                    if !v.is_empty() {
                        song.artist = v.to_string();
                    }
                }
            }
        }

        Ok(song)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.artist)
    }
}

/// Anything `append_song` accepts: a prepared descriptor or a bare path.
#[derive(Debug, Clone)]
pub enum SongSource {
    Song(Song),
    Path(PathBuf),
}

impl SongSource {
    pub fn into_song(self) -> Result<Song, PlayerError> {
        match self {
            SongSource::Song(song) => Ok(song),
            SongSource::Path(path) => Song::new(path),
        }
    }
}

impl From<Song> for SongSource {
    fn from(song: Song) -> Self {
        SongSource::Song(song)
    }
}

impl From<PathBuf> for SongSource {
    fn from(path: PathBuf) -> Self {
        SongSource::Path(path)
    }
}

impl From<&Path> for SongSource {
    fn from(path: &Path) -> Self {
        SongSource::Path(path.to_path_buf())
    }
}

impl From<&str> for SongSource {
    fn from(path: &str) -> Self {
        SongSource::Path(PathBuf::from(path))
    }
}

impl From<String> for SongSource {
    fn from(path: String) -> Self {
        SongSource::Path(PathBuf::from(path))
    }
}
