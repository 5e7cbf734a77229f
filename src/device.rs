//! Audio output seam.
//!
//! The player only talks to an [`AudioDevice`]: it loads a file, starts,
//! pauses and stops it, asks whether something is loaded and playing, and
//! polls for end-of-track notifications. [`RodioDevice`] is the real backend.

mod output;

#[cfg(test)]
pub(crate) mod fake;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use output::RodioDevice;

/// Notification produced by a device between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The loaded track played to its end.
    TrackFinished,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output device: {0}")]
    Open(String),
    #[error("failed to start the audio thread")]
    Spawn(#[source] std::io::Error),
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("play() called with nothing loaded")]
    NothingLoaded,
    #[error("audio thread is gone")]
    Disconnected,
}

/// Primitives the playback controller drives.
///
/// Calls block until the device has acted on them and are not time-bounded.
pub trait AudioDevice: Send + 'static {
    /// Prepare `path` for playback, replacing whatever was loaded.
    fn load(&mut self, path: &Path) -> Result<(), DeviceError>;
    /// Start the loaded track from the beginning.
    fn play(&mut self) -> Result<(), DeviceError>;
    fn pause(&mut self) -> Result<(), DeviceError>;
    fn unpause(&mut self) -> Result<(), DeviceError>;
    fn stop(&mut self) -> Result<(), DeviceError>;
    /// `true` while a track is loaded and has not finished, paused or not.
    fn is_busy(&self) -> bool;
    /// Take every notification queued since the last call.
    fn drain_events(&mut self) -> Vec<DeviceEvent>;
}

impl<D: AudioDevice + ?Sized> AudioDevice for Box<D> {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        (**self).load(path)
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        (**self).pause()
    }

    fn unpause(&mut self) -> Result<(), DeviceError> {
        (**self).unpause()
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        (**self).stop()
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        (**self).drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn thread_spawn_failure_is_not_reported_as_missing_output() {
        let err = DeviceError::Spawn(std::io::Error::other("thread limit reached"));
        assert_eq!(err.to_string(), "failed to start the audio thread");
        assert_eq!(err.source().unwrap().to_string(), "thread limit reached");
        assert!(!matches!(err, DeviceError::Open(_)));
    }
}
