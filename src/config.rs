//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive the backend client, the
//! playback engine and the audio thread, plus helpers to load them from disk
//! and the environment.

mod load;
mod schema;

pub use load::*;
pub use schema::*;

#[cfg(test)]
mod tests;
