//! Track catalog types and the view filter.
//!
//! Tracks are produced by the backend and never mutated afterwards; the
//! engine only swaps whole lists. `filter` derives the visible subsequence
//! for a search query.

mod cover;
mod filter;
mod model;

pub use cover::cover_from_url;
pub use filter::filter;
pub use model::*;

#[cfg(test)]
mod tests;
