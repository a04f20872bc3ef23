//! Report types for extraction results.
//!
//! Per-file and per-candidate problems never abort a run; they are collected
//! as `Failure` values and shown in the command summary. Everything the CLI
//! prints goes through the `Report` trait on the `Finding` enum.

use enum_dispatch::enum_dispatch;

use crate::core::data::{FoundString, RestrictedCandidate};
use crate::core::offset::Position;

// ============================================================
// Severity and Failure kinds
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// What went wrong with one file, candidate or reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The file could not be read or parsed; it yields no candidates.
    ParseFailure,
    /// The file no longer holds the expected text at the candidate position.
    OffsetMismatch,
    /// No key was assigned to a candidate's text.
    KeyNotFound,
    /// A rewritten reference was not found at revert time.
    ReversalNotFound,
    /// A key path runs through an existing string leaf.
    LocaleConflict,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ParseFailure => write!(f, "parse-failure"),
            FailureKind::OffsetMismatch => write!(f, "offset-mismatch"),
            FailureKind::KeyNotFound => write!(f, "key-not-found"),
            FailureKind::ReversalNotFound => write!(f, "reversal-not-found"),
            FailureKind::LocaleConflict => write!(f, "locale-conflict"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub file: String,
    pub position: Option<Position>,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            position: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}:{}: {}", self.file, pos, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

// ============================================================
// Finding Enum
// ============================================================

/// Anything a command reports about a file.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Candidate(FoundString),
    Restricted(RestrictedCandidate),
    Failure(Failure),
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported to the CLI.
#[enum_dispatch]
pub trait Report {
    /// Path shown in the report, relative where possible.
    fn file(&self) -> &str;

    fn location(&self) -> Option<Position>;

    /// Primary message (the text, or the failure description).
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    /// Short identifier shown in brackets.
    fn label(&self) -> String;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for FoundString {
    fn file(&self) -> &str {
        &self.file_rel
    }

    fn location(&self) -> Option<Position> {
        Some(self.position())
    }

    fn message(&self) -> String {
        self.text.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Info
    }

    fn label(&self) -> String {
        if self.is_already_translated {
            "translated".to_string()
        } else {
            self.kind.to_string()
        }
    }
}

impl Report for RestrictedCandidate {
    fn file(&self) -> &str {
        &self.candidate.file_rel
    }

    fn location(&self) -> Option<Position> {
        Some(self.candidate.position())
    }

    fn message(&self) -> String {
        self.candidate.text.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn label(&self) -> String {
        "restricted".to_string()
    }

    fn details(&self) -> Option<String> {
        Some(format!("{} in {}", self.reason, self.call_context))
    }
}

impl Report for Failure {
    fn file(&self) -> &str {
        &self.file
    }

    fn location(&self) -> Option<Position> {
        self.position
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn label(&self) -> String {
        self.kind.to_string()
    }
}
