//! Error and diagnostic taxonomy.
//!
//! Library operations that touch I/O or the database return `PgDeltaError`.
//! Diff, planning and analysis never abort on malformed input; they
//! accumulate `Diagnostic` records instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgDeltaError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    ParseError,
    DiscoveryError,
    UnknownStatementClass,
    UnresolvedDependency,
    DuplicateProducer,
    CycleDetected,
    InvalidAnnotation,
    RuntimeExecutionError,
}

/// A non-fatal problem found while diffing, planning or analyzing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// Statement or change identifiers this diagnostic is about, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subjects: vec![],
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = String>) -> Self {
        self.subjects.extend(subjects);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = serde_json::to_string(&self.code).unwrap_or_default();
        write!(f, "{}: {}", code.trim_matches('"'), self.message)?;
        if !self.subjects.is_empty() {
            write!(f, " [{}]", self.subjects.join(", "))?;
        }
        Ok(())
    }
}
