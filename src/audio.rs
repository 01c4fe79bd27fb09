//! Audio output: a dedicated thread that owns the rodio output stream and
//! the single active sink.
//!
//! The engine drives it with `AudioCmd`s and hears back through
//! `SinkEvent`s. Every load carries the engine's transition generation, and
//! every event echoes it, so events from a superseded load can be told
//! apart.

mod fetch;
mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
