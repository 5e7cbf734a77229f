use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{LibrarySettings, Settings};
use crate::device::AudioDevice;
use crate::library::{Song, SongSource, scan_folder};

use super::error::Result;
use super::lock;
use super::monitor::MonitorLauncher;
use super::session::Session;
use super::state::PlaybackState;

pub(crate) struct Shared<D> {
    /// Playback mutex: serializes every transition + device command + cursor update.
    pub(super) session: Mutex<Session<D>>,
    /// Stop-coordination mutex, shared by `stop` and the monitor's exit check.
    /// Always taken before `session`.
    pub(super) stop_lock: Mutex<()>,
    poll_interval: Duration,
    library: LibrarySettings,
}

/// Handle to one playback session.
///
/// Cloning is cheap and every clone drives the same session, so the handle
/// can be given to the control listener, an API layer, or both.
pub struct PlayerController<D: AudioDevice> {
    shared: Arc<Shared<D>>,
}

impl<D: AudioDevice> Clone for PlayerController<D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<D: AudioDevice> PlayerController<D> {
    /// Create a session around `device` with default settings.
    pub fn new(device: D) -> Self {
        Self::with_settings(device, &Settings::default())
    }

    pub fn with_settings(device: D, settings: &Settings) -> Self {
        let shared = Shared {
            session: Mutex::new(Session::new(device)),
            stop_lock: Mutex::new(()),
            poll_interval: Duration::from_millis(settings.player.poll_interval_ms.max(1)),
            library: settings.library.clone(),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    fn launcher(&self) -> MonitorLauncher<D> {
        MonitorLauncher::new(Arc::downgrade(&self.shared), self.shared.poll_interval)
    }

    /// Start the current song. `Ok(false)` when there is nothing to play or
    /// the player is not stopped.
    pub fn play(&self) -> Result<bool> {
        let launcher = self.launcher();
        lock(&self.shared.session).play(&launcher)
    }

    /// Stop playback from any state and wait for the monitor to exit.
    pub fn stop(&self) -> Result<bool> {
        let (stopped, retired) = {
            let _stop_guard = lock(&self.shared.stop_lock);
            lock(&self.shared.session).stop()?
        };

        // Joined outside both locks: the monitor needs them for its exit check.
        if let Some(monitor) = retired {
            monitor.join();
            debug!("end-of-track monitor joined");
        }
        Ok(stopped)
    }

    /// Pause playback. Fails with `InconsistentDeviceState` if the device is idle.
    pub fn pause(&self) -> Result<bool> {
        lock(&self.shared.session).pause()
    }

    /// Resume paused playback. Fails with `InconsistentDeviceState` if the device is idle.
    pub fn unpause(&self) -> Result<bool> {
        lock(&self.shared.session).unpause()
    }

    /// Switch to the next song, wrapping to the first after the last.
    pub fn next_song(&self) -> Result<bool> {
        let launcher = self.launcher();
        lock(&self.shared.session).next_song(&launcher)
    }

    /// Switch to the previous song. Stays on the first song when already there.
    pub fn previous_song(&self) -> Result<bool> {
        let launcher = self.launcher();
        lock(&self.shared.session).previous_song(&launcher)
    }

    /// Play the song at `index`, interrupting whatever is playing.
    pub fn switch_song(&self, index: usize) -> Result<bool> {
        let launcher = self.launcher();
        lock(&self.shared.session).switch_song(index, &launcher)
    }

    /// Insert a song (or a path to one) at `index`, or at the end when `None`.
    pub fn append_song(&self, song: impl Into<SongSource>, index: Option<usize>) -> Result<()> {
        let song = song.into().into_song()?;
        debug!(song = %song, ?index, "appending song");
        lock(&self.shared.session).playlist.insert(song, index);
        Ok(())
    }

    /// Append every audio file directly inside `dir`. Returns how many were added.
    pub fn append_songs_from_folder(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let songs = scan_folder(dir, &self.shared.library)?;
        let added = lock(&self.shared.session).playlist.extend(songs);
        info!(dir = %dir.display(), added, "added songs from folder");
        Ok(added)
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared.session).state()
    }

    pub fn current_index(&self) -> Option<usize> {
        lock(&self.shared.session).playlist.current_index()
    }

    pub fn current_song(&self) -> Option<Song> {
        lock(&self.shared.session).playlist.current_song().cloned()
    }

    /// Snapshot of the playlist in play order.
    pub fn playlist(&self) -> Vec<Song> {
        lock(&self.shared.session).playlist.songs().to_vec()
    }

    pub fn is_monitor_running(&self) -> bool {
        lock(&self.shared.session)
            .monitor
            .as_ref()
            .is_some_and(|m| !m.is_finished())
    }

    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval
    }
}
