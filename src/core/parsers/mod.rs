//! Source parsers.
//!
//! - `ts`: TypeScript source parser (uses swc for AST generation)

pub mod ts;
