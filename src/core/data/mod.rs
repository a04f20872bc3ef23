//! Core data types shared by the classifier, the locale store and the rewriters.
//!
//! ## Module Structure
//!
//! - `candidate`: Extracted text spans (`FoundString`, `RestrictedCandidate`, `CandidateKind`)
//! - `key_map`: Per-run text → key index driving the source rewriter

pub mod candidate;
pub mod key_map;

pub use candidate::{CandidateKind, FileCandidates, FoundString, RestrictedCandidate};
pub use key_map::KeyMap;
