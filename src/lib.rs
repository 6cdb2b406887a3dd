//! pgdelta: schema diff, migration planning and round-apply for PostgreSQL.
//!
//! The crate compares two schema snapshots into an ordered list of DDL
//! changes, renders them as SQL, and can apply the result against a live
//! database with retry rounds. A standalone analyzer orders raw SQL
//! corpora by their statement-level dependencies.

pub mod analyzer;
pub mod apply;
pub mod change;
pub mod diff;
pub mod error;
pub mod ident;
pub mod model;
pub mod plan;
pub mod sql;

// Re-export commonly used types
pub use analyzer::{analyze, analyze_sql, AnalyzeResult, AnalyzerInput, StatementClass};
pub use apply::{
    apply_to_pool, round_apply, ApplyOptions, ApplyStatement, ApplyStatus, RoundOutcome,
};
pub use change::{Change, ChangeOperation, ChangeScope};
pub use diff::{compute_schema_diff, DiffContext};
pub use error::{Diagnostic, DiagnosticCode, PgDeltaError};
pub use ident::{ObjectKind, StableId};
pub use model::SchemaSnapshot;
pub use plan::{plan_changes, Plan, PlannedChange};
