//! Backend collaborator: the betawave HTTP API and the worker threads that
//! call it on behalf of the engine.
//!
//! The engine never performs I/O itself. It emits `BackendJob`s; the worker
//! runs them against a `Backend` implementation and posts the matching
//! `BackendReply` back onto the engine's event channel.

mod http;
mod types;
mod wire;
mod worker;

pub use http::{HttpBackend, stream_agent};
pub use types::*;
pub use worker::BackendWorker;

#[cfg(test)]
mod tests;
