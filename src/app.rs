//! Application module: the playback continuity engine.
//!
//! `App` is the single explicit state object: section, query, source lists,
//! the projected active playlist, the playback cursor and the transport
//! phase. It performs no I/O. Every input arrives as an `Event` and every
//! side effect leaves as an `Effect` for the runtime to carry out.

mod cursor;
mod model;
mod projector;
mod types;

pub use cursor::*;
pub use model::*;
pub use projector::*;
pub use types::*;
