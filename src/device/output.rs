//! `rodio`-backed [`AudioDevice`].
//!
//! rodio's `OutputStream` has to stay on the thread that opened it, so the
//! device owns a dedicated audio thread and talks to it over channels. Every
//! command waits for the thread's reply. Between commands the thread polls the
//! sink and queues a [`DeviceEvent::TrackFinished`] once the track runs dry.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::{AudioDevice, DeviceError, DeviceEvent};

type Reply = Sender<Result<(), DeviceError>>;

#[derive(Debug)]
enum DeviceCmd {
    Load(PathBuf, Reply),
    Play(Reply),
    Pause(Reply),
    Unpause(Reply),
    Stop(Reply),
    Busy(Sender<bool>),
    Quit,
}

pub struct RodioDevice {
    tx: Sender<DeviceCmd>,
    events: Receiver<DeviceEvent>,
    join: Option<JoinHandle<()>>,
}

impl RodioDevice {
    /// Open the default output device and start the audio thread.
    ///
    /// `poll_interval` is how often the thread checks for a finished track.
    pub fn open(poll_interval: Duration) -> Result<Self, DeviceError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (events_tx, events) = mpsc::channel::<DeviceEvent>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), DeviceError>>();

        let join = thread::Builder::new()
            .name("segue-audio".into())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = ready_tx.send(Err(DeviceError::Open(e.to_string())));
                        return;
                    }
                };
                // rodio logs to stderr when the stream is dropped.
                stream.log_on_drop(false);
                let _ = ready_tx.send(Ok(()));
                run_audio_thread(&stream, &rx, &events_tx, poll_interval);
            })
            .map_err(DeviceError::Spawn)?;

        ready_rx.recv().map_err(|_| DeviceError::Disconnected)??;

        Ok(Self {
            tx,
            events,
            join: Some(join),
        })
    }

    fn call(&self, make: impl FnOnce(Reply) -> DeviceCmd) -> Result<(), DeviceError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| DeviceError::Disconnected)?;
        reply_rx.recv().map_err(|_| DeviceError::Disconnected)?
    }
}

impl AudioDevice for RodioDevice {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        let path = path.to_path_buf();
        self.call(|reply| DeviceCmd::Load(path, reply))
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.call(DeviceCmd::Play)
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.call(DeviceCmd::Pause)
    }

    fn unpause(&mut self) -> Result<(), DeviceError> {
        self.call(DeviceCmd::Unpause)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.call(DeviceCmd::Stop)
    }

    fn is_busy(&self) -> bool {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.tx.send(DeviceCmd::Busy(reply_tx)).is_err() {
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for RodioDevice {
    fn drop(&mut self) {
        let _ = self.tx.send(DeviceCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

/// Open and decode `path` into a paused sink on `stream`.
fn create_sink(stream: &OutputStream, path: &Path) -> Result<Sink, DeviceError> {
    let file = File::open(path).map_err(|source| DeviceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = Decoder::new(BufReader::new(file)).map_err(|source| DeviceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.append(source);
    Ok(sink)
}

fn run_audio_thread(
    stream: &OutputStream,
    rx: &Receiver<DeviceCmd>,
    events_tx: &Sender<DeviceEvent>,
    poll_interval: Duration,
) {
    let mut sink: Option<Sink> = None;
    // Set once the finish of the current sink has been announced.
    let mut finish_reported = false;

    loop {
        match rx.recv_timeout(poll_interval) {
            Ok(cmd) => match cmd {
                DeviceCmd::Load(path, reply) => {
                    let result = create_sink(stream, &path).map(|new_sink| {
                        if let Some(old) = sink.take() {
                            old.stop();
                        }
                        debug!(path = %path.display(), "loaded");
                        sink = Some(new_sink);
                        finish_reported = false;
                    });
                    let _ = reply.send(result);
                }
                DeviceCmd::Play(reply) | DeviceCmd::Unpause(reply) => {
                    let result = match sink.as_ref() {
                        Some(s) => {
                            s.play();
                            Ok(())
                        }
                        None => Err(DeviceError::NothingLoaded),
                    };
                    let _ = reply.send(result);
                }
                DeviceCmd::Pause(reply) => {
                    if let Some(s) = sink.as_ref() {
                        s.pause();
                    }
                    let _ = reply.send(Ok(()));
                }
                DeviceCmd::Stop(reply) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    let _ = reply.send(Ok(()));
                }
                DeviceCmd::Busy(reply) => {
                    let busy = sink.as_ref().is_some_and(|s| !s.empty());
                    let _ = reply.send(busy);
                }
                DeviceCmd::Quit => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                if let Some(s) = sink.as_ref() {
                    if !finish_reported && !s.is_paused() && s.empty() {
                        finish_reported = true;
                        if events_tx.send(DeviceEvent::TrackFinished).is_err() {
                            warn!("end-of-track receiver dropped");
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
