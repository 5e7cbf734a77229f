//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive the player, the folder
//! scanner, the control listener and logging, plus helpers to load them.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;
