//! Background loop that advances the playlist when a track finishes.
//!
//! One monitor runs per play session: it is started by the first successful
//! `play` and exits at its next poll after `stop`. Exit is cooperative: the
//! termination check runs under the stop-coordination lock, so a `stop` in
//! progress and the check never interleave.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::device::{AudioDevice, DeviceEvent};

use super::controller::Shared;
use super::error::{PlayerError, Result};
use super::lock;
use super::state::PlaybackState;

pub(crate) struct MonitorHandle {
    stop_requested: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Ask the loop to exit at its next termination check.
    pub(super) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub(super) fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the loop has exited.
    pub(super) fn join(self) {
        if self.join.join().is_err() {
            error!("end-of-track monitor panicked");
        }
    }
}

pub(super) type Spawn<D> =
    fn(Weak<Shared<D>>, Arc<AtomicBool>, Duration) -> io::Result<JoinHandle<()>>;

/// What a session needs to start its monitor.
pub(crate) struct MonitorLauncher<D> {
    shared: Weak<Shared<D>>,
    poll_interval: Duration,
    spawn: Spawn<D>,
}

impl<D: AudioDevice> MonitorLauncher<D> {
    pub(super) fn new(shared: Weak<Shared<D>>, poll_interval: Duration) -> Self {
        Self {
            shared,
            poll_interval,
            spawn: spawn_thread::<D>,
        }
    }

    #[cfg(test)]
    pub(super) fn with_spawn(mut self, spawn: Spawn<D>) -> Self {
        self.spawn = spawn;
        self
    }

    /// Start a monitor in `slot` unless a live one is already there.
    pub(super) fn ensure_running(&self, slot: &mut Option<MonitorHandle>) -> Result<()> {
        if slot.as_ref().is_some_and(|m| !m.is_finished()) {
            return Ok(());
        }

        let stop_requested = Arc::new(AtomicBool::new(false));
        let join = (self.spawn)(
            self.shared.clone(),
            stop_requested.clone(),
            self.poll_interval,
        )
        .map_err(PlayerError::Monitor)?;

        debug!("end-of-track monitor started");
        *slot = Some(MonitorHandle {
            stop_requested,
            join,
        });
        Ok(())
    }
}

fn spawn_thread<D: AudioDevice>(
    shared: Weak<Shared<D>>,
    stop_requested: Arc<AtomicBool>,
    poll_interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("segue-monitor".into())
        .spawn(move || run(shared, stop_requested, poll_interval))
}

fn run<D: AudioDevice>(
    shared: Weak<Shared<D>>,
    stop_requested: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    let launcher = MonitorLauncher::new(shared.clone(), poll_interval);
    let should_exit = |state: PlaybackState| {
        state == PlaybackState::Stopped || stop_requested.load(Ordering::Acquire)
    };

    loop {
        let Some(strong) = shared.upgrade() else {
            debug!("session dropped, end-of-track monitor exiting");
            return;
        };

        {
            let _stop_guard = lock(&strong.stop_lock);
            let mut session = lock(&strong.session);
            if should_exit(session.state()) {
                let dropped = session.drain_events().len();
                debug!(dropped, "end-of-track monitor exiting");
                return;
            }
        }

        let events = lock(&strong.session).drain_events();
        for event in events {
            match event {
                DeviceEvent::TrackFinished => {
                    let mut session = lock(&strong.session);
                    if should_exit(session.state()) {
                        continue;
                    }
                    debug!("track finished, advancing");
                    match session.next_song(&launcher) {
                        Ok(true) => {}
                        Ok(false) => warn!("track finished but nothing to advance to"),
                        Err(e) => error!(error = %e, "failed to advance to next song"),
                    }
                }
            }
        }

        drop(strong);
        thread::sleep(poll_interval);
    }
}
