//! Core extraction engine.
//!
//! ## Module Structure
//!
//! - `file_scanner`: Source tree discovery
//! - `parsers`: swc TypeScript parsing
//! - `offset`: Line/column ↔ byte offset conversion
//! - `data`: Candidates and the per-run text → key map
//! - `markup`: Template scanner for text nodes, attributes and interpolations
//! - `classify`: Two-pass candidate classifier and its policy table
//! - `keys`: Path-namespaced key generation
//! - `store`: Locale trees, languages file and manifest
//! - `rewrite`: Offset-validated source rewriting and scaffolding
//! - `reverse`: Key references back to literals
//! - `translate`: Machine-translation collaborator
//! - `context`: One project run wiring the phases together

pub mod classify;
pub mod context;
pub mod data;
pub mod file_scanner;
pub mod keys;
pub mod markup;
pub mod offset;
pub mod parsers;
pub mod reverse;
pub mod rewrite;
pub mod store;
pub mod translate;

pub use context::{Classification, ExtractOutcome, ProjectContext, PruneOutcome, RevertOutcome};
