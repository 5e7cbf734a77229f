//! Songs, the playlist and folder scanning.

mod playlist;
mod scan;
mod song;

pub use playlist::Playlist;
pub use scan::scan_folder;
pub use song::{Song, SongSource, UNKNOWN_ARTIST};
