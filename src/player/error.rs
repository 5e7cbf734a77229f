//! Error types for the playback controller.

use thiserror::Error;

use crate::device::DeviceError;

use super::state::PlaybackState;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// A transition was requested with neither a trigger nor a target state.
    #[error("a transition needs a trigger or a target state")]
    InvalidArgumentCombination,

    /// A target state name that the state machine does not know.
    #[error("no such playback state: {0:?}")]
    InvalidStatus(String),

    /// The state machine says a track is active but the device is idle.
    #[error("device is not busy while player is {state}")]
    InconsistentDeviceState { state: PlaybackState },

    /// `append_song` got something that cannot be turned into a song.
    #[error("invalid song descriptor: {0}")]
    InvalidSongDescriptor(String),

    #[error("playlist index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("failed to start end-of-track monitor: {0}")]
    Monitor(#[source] std::io::Error),

    #[error("failed to scan folder: {0}")]
    Scan(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
