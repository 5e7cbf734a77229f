//! Ordered song list with a play cursor.

use super::song::Song;

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    songs: Vec<Song>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `song` at `index` (clamped to the end), or append when `None`.
    ///
    /// The very first insertion pins the cursor to 0.
    pub fn insert(&mut self, song: Song, index: Option<usize>) {
        match index {
            Some(i) => {
                let i = i.min(self.songs.len());
                self.songs.insert(i, song);
            }
            None => self.songs.push(song),
        }
        self.pin_cursor();
    }

    /// Append all `songs` in order. Returns how many were added.
    pub fn extend(&mut self, songs: impl IntoIterator<Item = Song>) -> usize {
        let before = self.songs.len();
        self.songs.extend(songs);
        let added = self.songs.len() - before;
        if added > 0 {
            self.pin_cursor();
        }
        added
    }

    fn pin_cursor(&mut self) {
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|i| self.songs.get(i))
    }

    /// Move the cursor. Returns `false` (cursor untouched) when `index` is out of range.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.songs.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Index after the cursor, wrapping to 0 past the last song.
    pub fn next_index(&self) -> Option<usize> {
        let cur = self.current?;
        if self.songs.is_empty() {
            return None;
        }
        Some(if cur + 1 < self.songs.len() { cur + 1 } else { 0 })
    }

    /// Index before the cursor. Stays at 0 on the first song (no wrap).
    pub fn previous_index(&self) -> Option<usize> {
        let cur = self.current?;
        if self.songs.is_empty() {
            return None;
        }
        Some(cur.saturating_sub(1).min(self.songs.len() - 1))
    }
}
