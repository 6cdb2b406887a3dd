//! The statement analyzer: an alternative entry point that orders raw SQL
//! instead of snapshot diffs.
//!
//! Inputs are split into statements, classified over sqlparser tokens,
//! enriched with `-- pg-topo:` annotations, mined for provides/requires
//! references and topologically sorted. Problems accumulate as diagnostics;
//! analysis itself never fails.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, DiagnosticCode};
use crate::ident::StableId;

mod annotations;
mod classify;
mod refs;
mod splitter;
mod topo;

#[cfg(test)]
mod tests;

pub use annotations::{parse_annotations, AnnotationHints, Phase};
pub use classify::{classify, ClassifyError, StatementClass};
pub use splitter::{split_statements, RawStatement};
pub use topo::{EdgeReason, EdgeSummary, GraphSummary};

/// One analyzable input: a named SQL string or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerInput {
    Sql { name: String, sql: String },
    File(PathBuf),
}

impl AnalyzerInput {
    pub fn sql(name: impl Into<String>, sql: impl Into<String>) -> Self {
        AnalyzerInput::Sql {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementNode {
    /// Source file path, when the statement came from a file.
    pub file: Option<String>,
    /// Statement position within its input, zero-based.
    pub index: usize,
    pub class: Option<StatementClass>,
    pub text: String,
    pub line: usize,
    pub phase: Option<Phase>,
    pub provides: Vec<StableId>,
    pub requires: Vec<(StableId, EdgeReason)>,
    /// Requires that came from annotations; these get louder diagnostics
    /// when they resolve to nothing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub annotated_requires: BTreeSet<StableId>,
}

impl StatementNode {
    pub fn display_id(&self) -> String {
        match &self.file {
            Some(file) => format!("{file}:{}", self.index),
            None => format!("input:{}", self.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub ordered: Vec<StatementNode>,
    pub diagnostics: Vec<Diagnostic>,
    pub graph: GraphSummary,
}

/// Analyze a set of inputs into an ordered statement list.
pub fn analyze(inputs: &[AnalyzerInput]) -> AnalyzeResult {
    let mut diagnostics = Vec::new();
    let mut nodes: Vec<StatementNode> = Vec::new();

    for input in inputs {
        let (name, sql) = match input {
            AnalyzerInput::Sql { name, sql } => (Some(name.clone()), sql.clone()),
            AnalyzerInput::File(path) => match std::fs::read_to_string(path) {
                Ok(sql) => (Some(path.display().to_string()), sql),
                Err(error) => {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DiscoveryError,
                            format!("cannot read {}: {error}", path.display()),
                        )
                        .with_subject(path.display().to_string()),
                    );
                    continue;
                }
            },
        };

        for (index, raw) in split_statements(&sql).into_iter().enumerate() {
            let node = build_node(name.clone(), index, raw, &mut diagnostics);
            nodes.push(node);
        }
    }

    let output = topo::sort_nodes(&nodes);
    diagnostics.extend(output.diagnostics);

    let ordered = output
        .order
        .iter()
        .map(|&index| nodes[index].clone())
        .collect();

    AnalyzeResult {
        ordered,
        diagnostics,
        graph: output.graph,
    }
}

/// Convenience wrapper over one anonymous SQL string.
pub fn analyze_sql(sql: &str) -> AnalyzeResult {
    analyze(&[AnalyzerInput::sql("input", sql)])
}

fn build_node(
    file: Option<String>,
    index: usize,
    raw: RawStatement,
    diagnostics: &mut Vec<Diagnostic>,
) -> StatementNode {
    let subject = match &file {
        Some(name) => format!("{name}:{index}"),
        None => format!("input:{index}"),
    };

    let class = match classify(&raw.text) {
        Ok(class) => Some(class),
        Err(ClassifyError::Parse(message)) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ParseError,
                    format!("statement could not be tokenized: {message}"),
                )
                .with_subject(subject.clone()),
            );
            None
        }
        Err(ClassifyError::Unknown) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::UnknownStatementClass,
                    "no classifier matched this statement",
                )
                .with_subject(subject.clone()),
            );
            None
        }
    };

    let (hints, annotation_diagnostics) = parse_annotations(&raw.text, &subject);
    diagnostics.extend(annotation_diagnostics);

    let refs = refs::extract_refs(class, &raw.text, &hints);
    let mut annotated_requires: BTreeSet<StableId> = hints.requires.iter().cloned().collect();
    for name in &hints.depends_on {
        let (schema, table) =
            crate::ident::split_qualified_name(name, crate::ident::NameMode::Raw);
        let schema = schema.unwrap_or_else(|| "public".to_string());
        annotated_requires.insert(StableId::table(&schema, &table));
    }

    StatementNode {
        file,
        index,
        class,
        line: raw.line,
        text: raw.text,
        phase: hints.phase,
        provides: refs.provides,
        requires: refs.requires,
        annotated_requires,
    }
}
