//! glot-ng - hardcoded text extraction for Angular projects using ngx-translate
//!
//! glot-ng is a CLI tool and library that finds user-facing text in Angular
//! templates and TypeScript sources, moves it into JSON locale files under
//! generated keys, and replaces it with `translate` pipe or service references.
//! The rewrite can be reversed from the base locale.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, reporting)
//! - `config`: `.glotngrc.json` loading and validation
//! - `core`: Classification, key generation, locale store and source rewriting
//! - `issues`: Finding and failure types, and the `Report` trait
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
