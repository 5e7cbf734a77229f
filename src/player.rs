//! Playback controller: state machine, session, and end-of-track monitor.
//!
//! [`PlayerController`] is the public face. It owns one session (playlist,
//! state machine, audio device, monitor handle) behind the playback mutex,
//! plus the stop-coordination mutex shared with the monitor.

mod controller;
mod error;
mod monitor;
mod session;
mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use controller::PlayerController;
pub use error::{PlayerError, Result};
pub use state::{PlaybackState, StateMachine, Transition, Trigger};

/// Lock `m`, recovering the guard if a previous holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
