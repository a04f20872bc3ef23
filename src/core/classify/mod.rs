//! Candidate classifier.
//!
//! Decides which string literals, template literals and markup spans of a file
//! are user-facing text. TypeScript files are walked twice: the first pass
//! hands inline component templates to the markup scanner, the second judges
//! every remaining literal against the policy table.
//!
//! ## Module Structure
//!
//! - `policy`: Heuristic table and the `low|moderate|high` permissiveness tiers
//! - `arena`: Node ids used to mark literals consumed by the template pass
//! - `visitor`: The two swc visitors

pub mod arena;
pub mod policy;
mod visitor;


use std::{fs, path::Path};

use anyhow::{Context, Result};
use swc_ecma_visit::VisitWith;

pub use policy::{AggressiveMode, CallContext, Permissiveness, PolicyTable, Verdict};

use crate::core::classify::arena::NodeArena;
use crate::core::classify::visitor::{FileScope, LiteralClassifier, TemplateExtractor};
use crate::core::data::FileCandidates;
use crate::core::markup::{MarkupScanner, MarkupSource};
use crate::core::offset::LineIndex;
use crate::core::parsers::ts::{ParsedSource, parse_ts_source};

/// Policy parameters for one classification run.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub policy: PolicyTable,
    pub permissiveness: Permissiveness,
    pub min_length: usize,
    /// Markup attributes whose values are extracted.
    pub attributes: Vec<String>,
    /// Source literals are only accepted inside instance members, where the
    /// rewritten `this.<accessor>` call resolves.
    pub instance_only: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            policy: PolicyTable::default(),
            permissiveness: Permissiveness::default(),
            min_length: 3,
            attributes: ["placeholder", "title", "alt", "aria-label"]
                .map(String::from)
                .to_vec(),
            instance_only: false,
        }
    }
}

impl ClassifierOptions {
    pub fn markup_scanner(&self) -> MarkupScanner<'_> {
        MarkupScanner::new(&self.policy, &self.attributes, self.min_length)
    }
}

/// Classify a parsed TypeScript file.
pub fn classify_source(
    parsed: &ParsedSource,
    file_abs: &str,
    file_rel: &str,
    options: &ClassifierOptions,
) -> FileCandidates {
    let index = LineIndex::new(&parsed.code);
    let scope = FileScope {
        parsed,
        index: &index,
        options,
        file_abs,
        file_rel,
    };
    let mut arena = NodeArena::build(&parsed.module);

    let mut templates = TemplateExtractor::new(&scope, &mut arena);
    parsed.module.visit_with(&mut templates);
    let mut found = templates.found;

    let mut literals = LiteralClassifier::new(&scope, &arena);
    parsed.module.visit_with(&mut literals);
    found.extend(literals.found);

    found.sort_by_key(|f| (f.line, f.column));
    FileCandidates {
        found,
        restricted: literals.restricted,
    }
}

/// Classify a standalone markup file.
pub fn classify_markup(
    markup: &str,
    file_abs: &str,
    file_rel: &str,
    options: &ClassifierOptions,
) -> FileCandidates {
    let found = options
        .markup_scanner()
        .scan(markup, &MarkupSource::file(file_abs, file_rel));
    FileCandidates {
        found,
        restricted: Vec::new(),
    }
}

/// Read and classify one file, choosing the scanner by `is_markup`.
///
/// Returns an error when the file cannot be read or parsed; callers record it
/// as a parse failure and continue with the other files.
pub fn classify_file(
    path: &Path,
    file_rel: &str,
    is_markup: bool,
    options: &ClassifierOptions,
) -> Result<FileCandidates> {
    let file_abs = path.to_string_lossy();
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;

    if is_markup {
        return Ok(classify_markup(&code, &file_abs, file_rel, options));
    }
    let parsed = parse_ts_source(code, &file_abs)?;
    Ok(classify_source(&parsed, &file_abs, file_rel, options))
}
