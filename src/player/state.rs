//! Playback state machine.
//!
//! | From    | Trigger | To      |
//! |---------|---------|---------|
//! | Stopped | play    | Playing |
//! | Stopped | stop    | Stopped |
//! | Playing | pause   | Paused  |
//! | Playing | stop    | Stopped |
//! | Paused  | unpause | Playing |
//! | Paused  | stop    | Stopped |
//!
//! Anything else is an invalid transition: it is logged and reported as
//! `false`, never as an error.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{PlayerError, Result};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub const ALL: [PlaybackState; 3] = [Self::Stopped, Self::Playing, Self::Paused];

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }

    /// Look up `trigger` in the transition table.
    pub fn on(self, trigger: Trigger) -> Option<PlaybackState> {
        use PlaybackState::*;
        match (self, trigger) {
            (Stopped, Trigger::Play) => Some(Playing),
            (Playing, Trigger::Pause) => Some(Paused),
            (Paused, Trigger::Unpause) => Some(Playing),
            (_, Trigger::Stop) => Some(Stopped),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackState {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stopped" | "stop" => Ok(PlaybackState::Stopped),
            "playing" => Ok(PlaybackState::Playing),
            "paused" | "pause" => Ok(PlaybackState::Paused),
            _ => Err(PlayerError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    Play,
    Pause,
    Unpause,
    Stop,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [Self::Play, Self::Pause, Self::Unpause, Self::Stop];

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Play => "play",
            Trigger::Pause => "pause",
            Trigger::Unpause => "unpause",
            Trigger::Stop => "stop",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested state change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Follow the transition table.
    Trigger(Trigger),
    /// Force the state, bypassing the table.
    Set(PlaybackState),
}

impl Transition {
    /// Build a transition from optional parts; a target state wins over a trigger.
    pub fn from_parts(trigger: Option<Trigger>, status: Option<&str>) -> Result<Self> {
        match (trigger, status) {
            (_, Some(status)) => Ok(Transition::Set(status.parse()?)),
            (Some(trigger), None) => Ok(Transition::Trigger(trigger)),
            (None, None) => Err(PlayerError::InvalidArgumentCombination),
        }
    }
}

impl From<Trigger> for Transition {
    fn from(trigger: Trigger) -> Self {
        Transition::Trigger(trigger)
    }
}

#[derive(Debug, Default)]
pub struct StateMachine {
    state: PlaybackState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Apply `transition`. Returns whether the state machine accepted it.
    pub fn apply(&mut self, transition: Transition) -> bool {
        match transition {
            Transition::Set(state) => {
                debug!(from = %self.state, to = %state, "state forced");
                self.state = state;
                true
            }
            Transition::Trigger(trigger) => match self.state.on(trigger) {
                Some(next) => {
                    debug!(from = %self.state, to = %next, %trigger, "state changed");
                    self.state = next;
                    true
                }
                None => {
                    warn!(state = %self.state, %trigger, "invalid transition ignored");
                    false
                }
            },
        }
    }

    /// Apply `transition`, then run `work` with the outcome.
    ///
    /// If `work` fails the state goes back to what it was before the
    /// transition and the error is returned unchanged.
    pub fn guarded<T, F>(&mut self, transition: Transition, work: F) -> Result<T>
    where
        F: FnOnce(bool) -> Result<T>,
    {
        let original = self.state;
        let succeeded = self.apply(transition);

        match work(succeeded) {
            Ok(v) => Ok(v),
            Err(e) => {
                if self.state != original {
                    warn!(from = %self.state, to = %original, error = %e, "rolling back state");
                    self.state = original;
                }
                Err(e)
            }
        }
    }
}
