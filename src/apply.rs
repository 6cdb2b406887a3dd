//! The round-applier: executes a statement list against one pooled
//! connection, deferring dependency failures to later rounds.
//!
//! Classification is driven by two central tables: dependency SQLSTATEs
//! defer the statement to the next round, environment-capability states and
//! message patterns skip it permanently, anything else aborts the run. The
//! borrowed connection is released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, error, warn};

use crate::analyzer::StatementClass;
use crate::error::PgDeltaError;
use crate::sql::normalize_create_head;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyStatement {
    pub id: String,
    pub sql: String,
    #[serde(default)]
    pub class: Option<StatementClass>,
}

/// One failed execution, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFailure {
    pub sqlstate: Option<String>,
    pub message: String,
}

/// The seam between round semantics and the database: one statement in,
/// success or a classified failure out.
#[async_trait]
pub trait StatementExecutor: Send {
    async fn execute(&mut self, sql: &str) -> Result<(), SqlFailure>;
}

/// Executor over one borrowed pool connection.
pub struct PoolExecutor {
    connection: sqlx::pool::PoolConnection<sqlx::Postgres>,
}

#[async_trait]
impl StatementExecutor for PoolExecutor {
    async fn execute(&mut self, sql: &str) -> Result<(), SqlFailure> {
        match sqlx::query(sql).execute(self.connection.as_mut()).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_error)) => Err(SqlFailure {
                sqlstate: db_error.code().map(|c| c.to_string()),
                message: db_error.message().to_string(),
            }),
            Err(other) => Err(SqlFailure {
                sqlstate: None,
                message: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub max_rounds: u32,
    /// Replay applied function and procedure bodies with
    /// `check_function_bodies = on` after a successful run.
    pub final_validation: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            final_validation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Success,
    Error,
    Stuck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: u32,
    pub applied: usize,
    pub deferred: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementError {
    pub id: String,
    pub sqlstate: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub status: ApplyStatus,
    pub total_rounds: u32,
    pub total_applied: usize,
    pub total_skipped: usize,
    pub rounds: Vec<RoundStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<StatementError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stuck_statements: Vec<String>,
    /// Failures from the final-validation replay; they do not undo the
    /// statements already applied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<StatementError>,
}

/// SQLSTATEs meaning "a dependency is not there yet": undefined table,
/// column, object, function, schema.
const DEPENDENCY_SQLSTATES: &[&str] = &["42P01", "42703", "42704", "42883", "3F000"];

/// SQLSTATEs meaning the target environment lacks a capability: extension
/// control file missing, feature not supported.
const ENVIRONMENT_SQLSTATES: &[&str] = &["58P01", "0A000"];

struct SkipRule {
    /// Restrict the rule to one statement class; `None` matches any.
    class: Option<StatementClass>,
    pattern: Regex,
    note: &'static str,
}

/// Message-matched capability skips. Anything added here needs a test; the
/// substring branch is the fragile one.
static SKIP_RULES: Lazy<Vec<SkipRule>> = Lazy::new(|| {
    vec![
        SkipRule {
            class: Some(StatementClass::CreateSubscription),
            pattern: Regex::new(r"(?i)walreceiver|could not connect to the publisher")
                .unwrap(),
            note: "subscription needs a reachable publisher",
        },
        SkipRule {
            class: Some(StatementClass::CreateSubscription),
            pattern: Regex::new(r"(?i)must be superuser").unwrap(),
            note: "subscription needs superuser",
        },
        SkipRule {
            class: Some(StatementClass::CreateEventTrigger),
            pattern: Regex::new(r"(?i)must be superuser").unwrap(),
            note: "event trigger needs superuser",
        },
        SkipRule {
            class: Some(StatementClass::CreateFunction),
            pattern: Regex::new(r#"(?i)language "[^"]+" does not exist"#).unwrap(),
            note: "procedural language not installed",
        },
        SkipRule {
            class: Some(StatementClass::CreateRole),
            pattern: Regex::new(r"(?i)already exists").unwrap(),
            note: "role predates this migration",
        },
        SkipRule {
            class: None,
            pattern: Regex::new(r"(?i)does not have a replica identity").unwrap(),
            note: "table lacks a replica identity; fix and re-run",
        },
    ]
});

enum FailureKind {
    Defer,
    Skip(&'static str),
    Hard,
}

fn classify_failure(failure: &SqlFailure, class: Option<StatementClass>) -> FailureKind {
    if let Some(sqlstate) = &failure.sqlstate {
        if ENVIRONMENT_SQLSTATES.contains(&sqlstate.as_str()) {
            return FailureKind::Skip("environment lacks the capability");
        }
    }
    for rule in SKIP_RULES.iter() {
        let class_matches = match rule.class {
            Some(rule_class) => class == Some(rule_class),
            None => true,
        };
        if class_matches && rule.pattern.is_match(&failure.message) {
            return FailureKind::Skip(rule.note);
        }
    }
    if let Some(sqlstate) = &failure.sqlstate {
        if DEPENDENCY_SQLSTATES.contains(&sqlstate.as_str()) {
            return FailureKind::Defer;
        }
    }
    FailureKind::Hard
}

/// Apply statements in retry rounds.
///
/// Every round walks the remaining queue in order. Dependency failures are
/// re-queued for the next round in their original relative order; a round
/// that applies nothing while work remains means the queue is stuck. The
/// optional cancel flag is honored between statements; execution never
/// aborts a statement midway.
pub async fn round_apply<E: StatementExecutor>(
    executor: &mut E,
    statements: &[ApplyStatement],
    options: &ApplyOptions,
    mut on_round: Option<&mut (dyn FnMut(&RoundStats) + Send)>,
    cancel: Option<&AtomicBool>,
) -> RoundOutcome {
    let mut outcome = RoundOutcome {
        status: ApplyStatus::Success,
        total_rounds: 0,
        total_applied: 0,
        total_skipped: 0,
        rounds: vec![],
        errors: vec![],
        stuck_statements: vec![],
        validation_errors: vec![],
    };

    // Body checking stays off until every object exists; the final
    // validation pass re-enables it
    if let Err(failure) = executor.execute("SET check_function_bodies = off").await {
        outcome.status = ApplyStatus::Error;
        outcome.errors.push(StatementError {
            id: "check_function_bodies".to_string(),
            sqlstate: failure.sqlstate,
            message: failure.message,
        });
        return outcome;
    }

    let mut queue: Vec<usize> = (0..statements.len()).collect();
    let mut applied: Vec<usize> = Vec::new();
    let mut cancelled = false;

    for round in 1..=options.max_rounds {
        let mut stats = RoundStats {
            round,
            applied: 0,
            deferred: 0,
            skipped: 0,
        };
        let mut deferred: Vec<usize> = Vec::new();

        for &index in &queue {
            if cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false) {
                cancelled = true;
                deferred.push(index);
                continue;
            }
            let statement = &statements[index];
            match executor.execute(&statement.sql).await {
                Ok(()) => {
                    stats.applied += 1;
                    applied.push(index);
                }
                Err(failure) => match classify_failure(&failure, statement.class) {
                    FailureKind::Defer => {
                        debug!(
                            id = %statement.id,
                            sqlstate = failure.sqlstate.as_deref().unwrap_or(""),
                            message = %failure.message,
                            "deferring statement to next round"
                        );
                        stats.deferred += 1;
                        deferred.push(index);
                    }
                    FailureKind::Skip(note) => {
                        warn!(
                            id = %statement.id,
                            sqlstate = failure.sqlstate.as_deref().unwrap_or(""),
                            message = %failure.message,
                            "skipping statement: {note}"
                        );
                        stats.skipped += 1;
                    }
                    FailureKind::Hard => {
                        error!(
                            id = %statement.id,
                            sqlstate = failure.sqlstate.as_deref().unwrap_or(""),
                            message = %failure.message,
                            "statement failed"
                        );
                        stats.round = round;
                        outcome.total_rounds = round;
                        outcome.total_applied += stats.applied;
                        outcome.total_skipped += stats.skipped;
                        outcome.rounds.push(stats);
                        outcome.status = ApplyStatus::Error;
                        outcome.errors.push(StatementError {
                            id: statement.id.clone(),
                            sqlstate: failure.sqlstate,
                            message: failure.message,
                        });
                        return outcome;
                    }
                },
            }
        }

        outcome.total_rounds = round;
        outcome.total_applied += stats.applied;
        outcome.total_skipped += stats.skipped;
        let applied_this_round = stats.applied;
        outcome.rounds.push(stats);
        if let Some(callback) = &mut on_round {
            callback(outcome.rounds.last().expect("round recorded"));
        }

        if deferred.is_empty() {
            outcome.status = ApplyStatus::Success;
            break;
        }
        if cancelled || applied_this_round == 0 || round == options.max_rounds {
            outcome.status = ApplyStatus::Stuck;
            outcome.stuck_statements = deferred
                .iter()
                .map(|&i| statements[i].id.clone())
                .collect();
            break;
        }
        queue = deferred;
    }

    if outcome.status == ApplyStatus::Success && options.final_validation {
        validate_bodies(executor, statements, &applied, &mut outcome).await;
    }

    outcome
}

/// Re-issue every applied routine body with body checking on. Failures are
/// reported, not rolled back.
async fn validate_bodies<E: StatementExecutor>(
    executor: &mut E,
    statements: &[ApplyStatement],
    applied: &[usize],
    outcome: &mut RoundOutcome,
) {
    if let Err(failure) = executor.execute("SET check_function_bodies = on").await {
        outcome.validation_errors.push(StatementError {
            id: "check_function_bodies".to_string(),
            sqlstate: failure.sqlstate,
            message: failure.message,
        });
        return;
    }
    for &index in applied {
        let statement = &statements[index];
        let is_routine = matches!(
            statement.class,
            Some(StatementClass::CreateFunction) | Some(StatementClass::CreateProcedure)
        );
        if !is_routine {
            continue;
        }
        let replay = normalize_create_head(&statement.sql, true);
        if let Err(failure) = executor.execute(&replay).await {
            error!(
                id = %statement.id,
                sqlstate = failure.sqlstate.as_deref().unwrap_or(""),
                message = %failure.message,
                "function body failed validation"
            );
            outcome.validation_errors.push(StatementError {
                id: statement.id.clone(),
                sqlstate: failure.sqlstate,
                message: failure.message,
            });
        }
    }
}

/// Borrow one connection from the pool and run the rounds on it. The
/// connection goes back to the pool on success, error and cancellation
/// alike.
pub async fn apply_to_pool(
    pool: &PgPool,
    statements: &[ApplyStatement],
    options: &ApplyOptions,
    on_round: Option<&mut (dyn FnMut(&RoundStats) + Send)>,
    cancel: Option<&AtomicBool>,
) -> Result<RoundOutcome, PgDeltaError> {
    let connection = pool.acquire().await?;
    let mut executor = PoolExecutor { connection };
    Ok(round_apply(&mut executor, statements, options, on_round, cancel).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Executor scripted by a closure over (sql, attempt-count).
    struct ScriptedExecutor<F>
    where
        F: FnMut(&str, u32) -> Result<(), SqlFailure> + Send,
    {
        script: F,
        attempts: std::collections::HashMap<String, u32>,
        log: Vec<String>,
    }

    impl<F> ScriptedExecutor<F>
    where
        F: FnMut(&str, u32) -> Result<(), SqlFailure> + Send,
    {
        fn new(script: F) -> Self {
            Self {
                script,
                attempts: std::collections::HashMap::new(),
                log: vec![],
            }
        }
    }

    #[async_trait]
    impl<F> StatementExecutor for ScriptedExecutor<F>
    where
        F: FnMut(&str, u32) -> Result<(), SqlFailure> + Send,
    {
        async fn execute(&mut self, sql: &str) -> Result<(), SqlFailure> {
            let attempt = self.attempts.entry(sql.to_string()).or_insert(0);
            *attempt += 1;
            self.log.push(sql.to_string());
            (self.script)(sql, *attempt)
        }
    }

    fn statement(id: &str, sql: &str) -> ApplyStatement {
        ApplyStatement {
            id: id.to_string(),
            sql: sql.to_string(),
            class: None,
        }
    }

    fn classified(id: &str, sql: &str, class: StatementClass) -> ApplyStatement {
        ApplyStatement {
            id: id.to_string(),
            sql: sql.to_string(),
            class: Some(class),
        }
    }

    fn failure(sqlstate: &str, message: &str) -> SqlFailure {
        SqlFailure {
            sqlstate: Some(sqlstate.to_string()),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_single_round_success() {
        let mut executor = ScriptedExecutor::new(|_, _| Ok(()));
        let statements = vec![
            statement("1", "CREATE SCHEMA test"),
            statement("2", "CREATE TABLE test.users (id int)"),
        ];
        let mut round_calls = 0u32;
        let mut on_round = |_: &RoundStats| round_calls += 1;

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            Some(&mut on_round),
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_rounds, 1);
        assert_eq!(outcome.total_applied, 2);
        assert_eq!(outcome.rounds[0].deferred, 0);
        assert_eq!(round_calls, 1);
    }

    #[tokio::test]
    async fn test_dependency_resolved_in_round_two() {
        // Table first, schema second; the table defers once on 3F000
        let mut executor = ScriptedExecutor::new(|sql, attempt| {
            if sql.starts_with("CREATE TABLE") && attempt == 1 {
                Err(failure("3F000", "schema \"test\" does not exist"))
            } else {
                Ok(())
            }
        });
        let statements = vec![
            statement("table", "CREATE TABLE test.users (id int)"),
            statement("schema", "CREATE SCHEMA test"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_rounds, 2);
        assert_eq!(outcome.total_applied, 2);
        assert_eq!(outcome.rounds[0].deferred, 1);
        assert_eq!(outcome.rounds[1].applied, 1);
    }

    #[tokio::test]
    async fn test_three_level_chain_reversed() {
        let mut executor = ScriptedExecutor::new(|sql, attempt| {
            if sql.starts_with("CREATE INDEX") && attempt <= 2 {
                Err(failure("42P01", "relation \"test.users\" does not exist"))
            } else if sql.starts_with("CREATE TABLE") && attempt == 1 {
                Err(failure("3F000", "schema \"test\" does not exist"))
            } else {
                Ok(())
            }
        });
        let statements = vec![
            statement("idx", "CREATE INDEX idx ON test.users (name)"),
            statement("table", "CREATE TABLE test.users (id int, name text)"),
            statement("schema", "CREATE SCHEMA test"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_rounds, 3);
        assert_eq!(outcome.total_applied, 3);
    }

    #[tokio::test]
    async fn test_stuck_on_circular_failure() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("SET") {
                Ok(())
            } else {
                Err(failure("42P01", "relation does not exist"))
            }
        });
        let statements = vec![
            statement("a", "ALTER TABLE a ADD CONSTRAINT fk_b FOREIGN KEY (b) REFERENCES b(id)"),
            statement("b", "ALTER TABLE b ADD CONSTRAINT fk_a FOREIGN KEY (a) REFERENCES a(id)"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Stuck);
        assert_eq!(outcome.total_applied, 0);
        assert_eq!(outcome.stuck_statements.len(), 2);
    }

    #[tokio::test]
    async fn test_environment_skip() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("CREATE EXTENSION") {
                Err(failure(
                    "58P01",
                    "could not open extension control file \"pgaudit.control\"",
                ))
            } else {
                Ok(())
            }
        });
        let statements = vec![
            classified("ext", "CREATE EXTENSION pgaudit", StatementClass::CreateExtension),
            statement("schema", "CREATE SCHEMA test"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_applied, 1);
        assert_eq!(outcome.total_skipped, 1);
    }

    #[tokio::test]
    async fn test_hard_failure_aborts() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("INVALID") {
                Err(failure("42601", "syntax error at or near \"INVALID\""))
            } else {
                Ok(())
            }
        });
        let statements = vec![
            statement("ok", "CREATE TABLE test (id int)"),
            statement("bad", "INVALID SQL"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Error);
        assert_eq!(outcome.total_applied, 1);
        assert_eq!(outcome.errors[0].id, "bad");
        assert_eq!(outcome.errors[0].sqlstate.as_deref(), Some("42601"));
    }

    #[tokio::test]
    async fn test_language_skip_for_functions() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("CREATE FUNCTION") {
                Err(failure("42704", "language \"plv8\" does not exist"))
            } else {
                Ok(())
            }
        });
        let statements = vec![classified(
            "fn",
            "CREATE FUNCTION f() RETURNS int LANGUAGE plv8 AS $$ return 1 $$",
            StatementClass::CreateFunction,
        )];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        // 42704 normally defers, but a missing language never resolves
        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_skipped, 1);
        assert_eq!(outcome.total_rounds, 1);
    }

    #[tokio::test]
    async fn test_replica_identity_skip() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("ALTER PUBLICATION") {
                Err(failure(
                    "55000",
                    "table \"events\" does not have a replica identity and publishes updates",
                ))
            } else {
                Ok(())
            }
        });
        let statements = vec![statement("pub", "ALTER PUBLICATION p ADD TABLE events")];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            None,
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.total_skipped, 1);
    }

    #[tokio::test]
    async fn test_final_validation_replays_functions() {
        let mut executor = ScriptedExecutor::new(|_, _| Ok(()));
        let statements = vec![classified(
            "fn",
            "CREATE FUNCTION test.f() RETURNS int LANGUAGE sql AS $$ SELECT 1 $$",
            StatementClass::CreateFunction,
        )];
        let options = ApplyOptions {
            final_validation: true,
            ..ApplyOptions::default()
        };

        let outcome = round_apply(&mut executor, &statements, &options, None, None).await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert!(outcome.validation_errors.is_empty());
        assert!(executor
            .log
            .iter()
            .any(|sql| sql == "SET check_function_bodies = on"));
        assert!(executor
            .log
            .iter()
            .any(|sql| sql.starts_with("CREATE OR REPLACE FUNCTION test.f()")));
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_success() {
        let mut executor = ScriptedExecutor::new(|sql, _| {
            if sql.starts_with("CREATE OR REPLACE") {
                Err(failure("42703", "column \"missing\" does not exist"))
            } else {
                Ok(())
            }
        });
        let statements = vec![classified(
            "fn",
            "CREATE FUNCTION test.f() RETURNS int LANGUAGE sql AS $$ SELECT missing $$",
            StatementClass::CreateFunction,
        )];
        let options = ApplyOptions {
            final_validation: true,
            ..ApplyOptions::default()
        };

        let outcome = round_apply(&mut executor, &statements, &options, None, None).await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert_eq!(outcome.validation_errors.len(), 1);
        assert_eq!(outcome.validation_errors[0].id, "fn");
    }

    #[tokio::test]
    async fn test_cancellation_returns_stuck() {
        use std::sync::Arc;

        let cancel = Arc::new(AtomicBool::new(false));
        // The flag flips after the first statement executes
        let flag = cancel.clone();
        let mut executor = ScriptedExecutor::new(move |sql, _| {
            if sql.starts_with("CREATE SCHEMA") {
                flag.store(true, Ordering::Relaxed);
            }
            Ok(())
        });
        let statements = vec![
            statement("schema", "CREATE SCHEMA test"),
            statement("table", "CREATE TABLE test.users (id int)"),
        ];

        let outcome = round_apply(
            &mut executor,
            &statements,
            &ApplyOptions::default(),
            None,
            Some(cancel.as_ref()),
        )
        .await;

        assert_eq!(outcome.status, ApplyStatus::Stuck);
        assert_eq!(outcome.total_applied, 1);
        assert_eq!(outcome.stuck_statements, vec!["table".to_string()]);
    }

    #[tokio::test]
    async fn test_max_rounds_limit() {
        // A four-deep dependency chain cannot finish in three rounds
        let mut executor = ScriptedExecutor::new(|sql, attempt| {
            let needed: u32 = sql
                .rsplit("c")
                .next()
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(1);
            if sql.starts_with("SET") || attempt >= needed {
                Ok(())
            } else {
                Err(failure("42P01", "relation does not exist"))
            }
        });
        let statements = vec![
            statement("c4", "CREATE VIEW v4 AS SELECT * FROM c4"),
            statement("c3", "CREATE VIEW v3 AS SELECT * FROM c3"),
            statement("c2", "CREATE VIEW v2 AS SELECT * FROM c2"),
            statement("c1", "CREATE VIEW v1 AS SELECT * FROM c1"),
        ];
        let options = ApplyOptions {
            max_rounds: 3,
            ..ApplyOptions::default()
        };

        let outcome = round_apply(&mut executor, &statements, &options, None, None).await;

        assert_eq!(outcome.status, ApplyStatus::Stuck);
        assert_eq!(outcome.total_rounds, 3);
        assert_eq!(outcome.stuck_statements, vec!["c4".to_string()]);
    }
}
