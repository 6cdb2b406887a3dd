//! `-- pg-topo:` annotation parsing.
//!
//! Leading single-line comments carry directives, one per line:
//!
//! ```text
//! -- pg-topo:phase data_structures
//! -- pg-topo:depends_on app.users, app.orders
//! -- pg-topo:requires function:app.audit()
//! -- pg-topo:provides view:app.daily_totals
//! ```

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, DiagnosticCode};
use crate::ident::{ObjectKind, StableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Bootstrap,
    PreData,
    DataStructures,
    Routines,
    PostData,
    Privileges,
}

impl Phase {
    pub fn rank(&self) -> u8 {
        match self {
            Phase::Bootstrap => 0,
            Phase::PreData => 1,
            Phase::DataStructures => 2,
            Phase::Routines => 3,
            Phase::PostData => 4,
            Phase::Privileges => 5,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "bootstrap" => Phase::Bootstrap,
            "pre_data" => Phase::PreData,
            "data_structures" => Phase::DataStructures,
            "routines" => Phase::Routines,
            "post_data" => Phase::PostData,
            "privileges" => Phase::Privileges,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationHints {
    pub phase: Option<Phase>,
    /// Qualified names treated as table references.
    pub depends_on: Vec<String>,
    pub requires: Vec<StableId>,
    pub provides: Vec<StableId>,
}

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*--\s*pg-topo:(\w+)\s+(.+?)\s*$").unwrap());

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+):([^(]+)(?:\((.*)\))?$").unwrap());

/// Parse directives from the leading comment lines of one statement.
/// Malformed or conflicting directives become `INVALID_ANNOTATION`
/// diagnostics; parsing never fails.
pub fn parse_annotations(text: &str, subject: &str) -> (AnnotationHints, Vec<Diagnostic>) {
    let mut hints = AnnotationHints::default();
    let mut diagnostics = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with("--") {
            break;
        }
        let Some(captures) = DIRECTIVE.captures(trimmed) else {
            continue;
        };
        let directive = &captures[1];
        let value = captures[2].trim();

        match directive {
            "phase" => match Phase::from_tag(value) {
                Some(phase) if hints.phase.is_none() => hints.phase = Some(phase),
                Some(_) => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidAnnotation,
                        "phase may be given at most once",
                    )
                    .with_subject(subject),
                ),
                None => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidAnnotation,
                        format!("unknown phase tag {value:?}"),
                    )
                    .with_subject(subject),
                ),
            },
            "depends_on" => {
                for name in value.split(',') {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    hints.depends_on.push(name.to_string());
                }
            }
            "requires" | "provides" => match parse_reference(value) {
                Some(id) => {
                    if directive == "requires" {
                        hints.requires.push(id);
                    } else {
                        hints.provides.push(id);
                    }
                }
                None => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidAnnotation,
                        format!("malformed reference {value:?}"),
                    )
                    .with_subject(subject),
                ),
            },
            other => diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::InvalidAnnotation,
                    format!("unknown directive {other:?}"),
                )
                .with_subject(subject),
            ),
        }
    }

    let required: BTreeSet<&StableId> = hints.requires.iter().collect();
    let conflicting: Vec<String> = hints
        .provides
        .iter()
        .filter(|id| required.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !conflicting.is_empty() {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::InvalidAnnotation,
                "requires and provides name the same id",
            )
            .with_subject(subject)
            .with_subjects(conflicting),
        );
    }

    (hints, diagnostics)
}

fn parse_reference(value: &str) -> Option<StableId> {
    let captures = REFERENCE.captures(value.trim())?;
    let kind = ObjectKind::from_key(&captures[1])?;
    let name = captures[2].trim();
    if name.is_empty() {
        return None;
    }
    let signature = captures.get(3).map(|m| m.as_str());
    Some(StableId::from_reference(kind, name, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_directives() {
        let text = "-- pg-topo:phase routines\n\
                    -- pg-topo:depends_on app.users, app.orders\n\
                    -- pg-topo:requires function:app.audit(int4)\n\
                    CREATE VIEW app.v AS SELECT 1;";
        let (hints, diagnostics) = parse_annotations(text, "stmt");
        assert!(diagnostics.is_empty());
        assert_eq!(hints.phase, Some(Phase::Routines));
        assert_eq!(hints.depends_on, vec!["app.users", "app.orders"]);
        assert_eq!(hints.requires[0].as_str(), "function:app.audit(int4)");
    }

    #[test]
    fn test_duplicate_phase_is_invalid() {
        let text = "-- pg-topo:phase routines\n-- pg-topo:phase post_data\nSELECT 1;";
        let (hints, diagnostics) = parse_annotations(text, "stmt");
        assert_eq!(hints.phase, Some(Phase::Routines));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidAnnotation);
    }

    #[test]
    fn test_unknown_kind_is_invalid() {
        let text = "-- pg-topo:requires gadget:app.widget\nSELECT 1;";
        let (hints, diagnostics) = parse_annotations(text, "stmt");
        assert!(hints.requires.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_conflicting_requires_provides() {
        let text = "-- pg-topo:requires table:app.t\n-- pg-topo:provides table:app.t\nSELECT 1;";
        let (_, diagnostics) = parse_annotations(text, "stmt");
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::InvalidAnnotation));
    }

    #[test]
    fn test_annotations_stop_at_statement_text() {
        let text = "CREATE TABLE t (id int);\n-- pg-topo:phase bootstrap";
        let (hints, _) = parse_annotations(text, "stmt");
        assert_eq!(hints.phase, None);
    }
}
