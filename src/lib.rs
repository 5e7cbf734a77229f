//! segue: a remotely controllable music playback session.
//!
//! A [`player::PlayerController`] owns a playlist, a Stopped/Playing/Paused
//! state machine and an [`device::AudioDevice`]. A background monitor
//! advances the playlist when a track ends, and [`control::ControlListener`]
//! exposes the controller over a line-based TCP channel.

pub mod config;
pub mod control;
pub mod device;
pub mod library;
pub mod player;
pub mod runtime;
