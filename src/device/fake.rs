//! Scripted in-memory device for controller and monitor tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{AudioDevice, DeviceError, DeviceEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(PathBuf),
    Play,
    Pause,
    Unpause,
    Stop,
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    pending: Vec<DeviceEvent>,
    loaded: Option<PathBuf>,
    busy: bool,
    fail_loads: bool,
    force_idle: bool,
}

pub struct FakeDevice {
    script: Arc<Mutex<Script>>,
}

/// Test-side view of a [`FakeDevice`] that has been moved into a controller.
#[derive(Clone)]
pub struct FakeProbe {
    script: Arc<Mutex<Script>>,
}

impl FakeDevice {
    pub fn new() -> (Self, FakeProbe) {
        let script = Arc::new(Mutex::new(Script::default()));
        (
            Self {
                script: script.clone(),
            },
            FakeProbe { script },
        )
    }
}

impl FakeProbe {
    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn loaded(&self) -> Option<PathBuf> {
        self.script.lock().unwrap().loaded.clone()
    }

    /// Simulate the loaded track reaching its end.
    pub fn finish_track(&self) {
        let mut s = self.script.lock().unwrap();
        s.busy = false;
        s.pending.push(DeviceEvent::TrackFinished);
    }

    pub fn pending_events(&self) -> usize {
        self.script.lock().unwrap().pending.len()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.script.lock().unwrap().fail_loads = fail;
    }

    /// Make `is_busy` report `false` no matter what is loaded.
    pub fn force_idle(&self, idle: bool) {
        self.script.lock().unwrap().force_idle = idle;
    }
}

impl AudioDevice for FakeDevice {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        let mut s = self.script.lock().unwrap();
        if s.fail_loads {
            return Err(DeviceError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            });
        }
        s.calls.push(Call::Load(path.to_path_buf()));
        s.loaded = Some(path.to_path_buf());
        s.busy = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        let mut s = self.script.lock().unwrap();
        if s.loaded.is_none() {
            return Err(DeviceError::NothingLoaded);
        }
        s.calls.push(Call::Play);
        s.busy = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.script.lock().unwrap().calls.push(Call::Pause);
        Ok(())
    }

    fn unpause(&mut self) -> Result<(), DeviceError> {
        self.script.lock().unwrap().calls.push(Call::Unpause);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        let mut s = self.script.lock().unwrap();
        s.calls.push(Call::Stop);
        s.busy = false;
        s.loaded = None;
        Ok(())
    }

    fn is_busy(&self) -> bool {
        let s = self.script.lock().unwrap();
        s.busy && !s.force_idle
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.script.lock().unwrap().pending)
    }
}
