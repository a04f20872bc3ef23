use std::fmt;

use crate::core::offset::Position;

/// Where in the source a candidate was found.
///
/// Drives the replacement syntax the source rewriter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// Text between markup tags: `<a>Source CVs</a>`
    TextNode,
    /// Value of an allow-listed markup attribute: `placeholder="Search"`
    AttributeValue,
    /// String literal inside a `{{ ... }}` markup interpolation.
    InterpolationExpression,
    /// Quoted TypeScript string literal.
    StringLiteral,
    /// TypeScript template literal without substitutions.
    TemplateLiteral,
}

impl CandidateKind {
    /// True for kinds produced by the markup scanner.
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            CandidateKind::TextNode
                | CandidateKind::AttributeValue
                | CandidateKind::InterpolationExpression
        )
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateKind::TextNode => write!(f, "text-node"),
            CandidateKind::AttributeValue => write!(f, "attribute-value"),
            CandidateKind::InterpolationExpression => write!(f, "interpolation-expression"),
            CandidateKind::StringLiteral => write!(f, "string-literal"),
            CandidateKind::TemplateLiteral => write!(f, "template-literal"),
        }
    }
}

/// A span of text considered for translation extraction.
///
/// Created per scan pass and consumed by the locale store and the source
/// rewriter; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundString {
    /// Absolute path of the file the text was found in.
    pub file_abs: String,
    /// Path relative to the source root, `/`-separated.
    pub file_rel: String,
    /// 1-based line of the first character of `raw_text`.
    pub line: usize,
    /// 1-based character column of the first character of `raw_text`.
    pub column: usize,
    /// Normalized value (trimmed, entity-decoded). Used as the locale value
    /// and as the KeyMap lookup key. For already-translated candidates this
    /// is the key itself.
    pub text: String,
    /// Exact substring at `(line, column)` in the untouched file.
    pub raw_text: Option<String>,
    pub kind: CandidateKind,
    /// The span already references a translation key (`'KEY' | translate`,
    /// `translate.instant('KEY')`); captured but never rewritten.
    pub is_already_translated: bool,
    /// Quote characters that enclose the span (attribute quote, inline
    /// template delimiter). The rewriter must not emit these unescaped.
    pub enclosing_quotes: Vec<char>,
}

impl FoundString {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// A call-argument literal that the permissiveness policy refused.
///
/// Kept for audit reporting only; never reaches the locale store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedCandidate {
    pub candidate: FoundString,
    /// Human-readable rejection reason.
    pub reason: String,
    /// `callee(argIndex)` of the enclosing call.
    pub call_context: String,
}

/// Classification output for one file.
#[derive(Debug, Clone, Default)]
pub struct FileCandidates {
    pub found: Vec<FoundString>,
    pub restricted: Vec<RestrictedCandidate>,
}

impl FileCandidates {
    pub fn extend(&mut self, other: FileCandidates) {
        self.found.extend(other.found);
        self.restricted.extend(other.restricted);
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty() && self.restricted.is_empty()
    }
}
