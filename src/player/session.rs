//! The mutable state behind the playback mutex.
//!
//! Every method here runs with the playback mutex held. Each state-changing
//! method opens a guarded transition and drives the device from inside it,
//! so a failing device call puts the state back where it was.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::device::{AudioDevice, DeviceEvent};
use crate::library::{Playlist, Song};

use super::error::{PlayerError, Result};
use super::monitor::{MonitorHandle, MonitorLauncher};
use super::state::{PlaybackState, StateMachine, Transition, Trigger};

pub(crate) struct Session<D> {
    pub(super) machine: StateMachine,
    pub(super) playlist: Playlist,
    pub(super) device: D,
    pub(super) monitor: Option<MonitorHandle>,
}

impl<D: AudioDevice> Session<D> {
    pub(super) fn new(device: D) -> Self {
        Self {
            machine: StateMachine::new(),
            playlist: Playlist::new(),
            device,
            monitor: None,
        }
    }

    pub(super) fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub(super) fn play(&mut self, launcher: &MonitorLauncher<D>) -> Result<bool> {
        if self.playlist.is_empty() {
            debug!("play ignored: playlist is empty");
            return Ok(false);
        }
        let Some(index) = self.playlist.current_index() else {
            debug!("play ignored: no current song");
            return Ok(false);
        };

        let Session {
            machine,
            playlist,
            device,
            monitor,
        } = self;

        machine.guarded(Trigger::Play.into(), |succeeded| {
            if !succeeded {
                return Ok(false);
            }
            let song = song_at(playlist, index)?;
            load_fresh(device, song.path())?;
            device.play()?;
            start_monitor(launcher, monitor, device)?;
            info!(index, song = %song, "playing");
            Ok(true)
        })
    }

    /// Stop the device. On success the running monitor (if any) is told to
    /// exit and handed back so the caller can wait for it outside the locks.
    pub(super) fn stop(&mut self) -> Result<(bool, Option<MonitorHandle>)> {
        let Session {
            machine,
            device,
            monitor,
            ..
        } = self;

        machine.guarded(Trigger::Stop.into(), |succeeded| {
            if !succeeded {
                return Ok((false, None));
            }
            device.stop()?;
            let retired = monitor.take();
            if let Some(m) = retired.as_ref() {
                m.request_stop();
            }
            info!("stopped");
            Ok((true, retired))
        })
    }

    pub(super) fn pause(&mut self) -> Result<bool> {
        let Session {
            machine, device, ..
        } = self;

        machine.guarded(Trigger::Pause.into(), |succeeded| {
            if !succeeded {
                return Ok(false);
            }
            if !device.is_busy() {
                return Err(PlayerError::InconsistentDeviceState {
                    state: PlaybackState::Paused,
                });
            }
            device.pause()?;
            info!("paused");
            Ok(true)
        })
    }

    pub(super) fn unpause(&mut self) -> Result<bool> {
        let Session {
            machine, device, ..
        } = self;

        machine.guarded(Trigger::Unpause.into(), |succeeded| {
            if !succeeded {
                return Ok(false);
            }
            if !device.is_busy() {
                return Err(PlayerError::InconsistentDeviceState {
                    state: PlaybackState::Playing,
                });
            }
            device.unpause()?;
            info!("resumed");
            Ok(true)
        })
    }

    pub(super) fn next_song(&mut self, launcher: &MonitorLauncher<D>) -> Result<bool> {
        match self.playlist.next_index() {
            Some(index) => self.switch_song(index, launcher),
            None => Ok(false),
        }
    }

    pub(super) fn previous_song(&mut self, launcher: &MonitorLauncher<D>) -> Result<bool> {
        match self.playlist.previous_index() {
            Some(index) => self.switch_song(index, launcher),
            None => Ok(false),
        }
    }

    /// Play the song at `index`, whatever the current state is.
    pub(super) fn switch_song(
        &mut self,
        index: usize,
        launcher: &MonitorLauncher<D>,
    ) -> Result<bool> {
        let Session {
            machine,
            playlist,
            device,
            monitor,
        } = self;

        machine.guarded(Transition::Set(PlaybackState::Playing), |succeeded| {
            if !succeeded {
                return Ok(false);
            }
            let song = song_at(playlist, index)?;
            load_fresh(device, song.path())?;
            device.play()?;
            start_monitor(launcher, monitor, device)?;
            info!(index, song = %song, "switched song");
            playlist.set_current(index);
            Ok(true)
        })
    }

    pub(super) fn drain_events(&mut self) -> Vec<DeviceEvent> {
        self.device.drain_events()
    }
}

/// Load `path` and drop notifications that still refer to the old track.
fn load_fresh<D: AudioDevice>(device: &mut D, path: &Path) -> Result<()> {
    device.load(path)?;
    let stale = device.drain_events().len();
    if stale > 0 {
        debug!(stale, "dropped notifications for the previous track");
    }
    Ok(())
}

/// Make sure a monitor watches the track that just started. If none can be
/// started the device is stopped again, so the rolled-back state holds.
fn start_monitor<D: AudioDevice>(
    launcher: &MonitorLauncher<D>,
    slot: &mut Option<MonitorHandle>,
    device: &mut D,
) -> Result<()> {
    launcher.ensure_running(slot).inspect_err(|_| {
        if let Err(e) = device.stop() {
            warn!(error = %e, "could not stop device after monitor failed to start");
        }
    })
}

fn song_at(playlist: &Playlist, index: usize) -> Result<&Song> {
    playlist.get(index).ok_or(PlayerError::IndexOutOfRange {
        index,
        len: playlist.len(),
    })
}
