use super::*;
use crate::error::DiagnosticCode;

#[test]
fn test_split_basic_statements() {
    let sql = "CREATE SCHEMA app;\nCREATE TABLE app.users (id int);\n";
    let statements = split_statements(sql);
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].text, "CREATE SCHEMA app");
    assert_eq!(statements[1].text, "CREATE TABLE app.users (id int)");
}

#[test]
fn test_split_respects_dollar_quotes() {
    let sql = "CREATE FUNCTION f() RETURNS void LANGUAGE plpgsql AS $body$\n\
               BEGIN\n  PERFORM 1;\n  -- not a terminator: ;\nEND;\n$body$;\n\
               SELECT 1;";
    let statements = split_statements(sql);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].text.contains("END;"));
    assert_eq!(statements[1].text, "SELECT 1");
}

#[test]
fn test_split_respects_quoted_semicolons() {
    let sql = "INSERT INTO t VALUES ('a;b', E'c\\';d', \"odd;name\");\nSELECT 2;";
    let statements = split_statements(sql);
    assert_eq!(statements.len(), 2);
}

#[test]
fn test_split_respects_nested_block_comments() {
    let sql = "/* outer /* inner; */ still; */ SELECT 1; SELECT 2;";
    let statements = split_statements(sql);
    assert_eq!(statements.len(), 2);
}

#[test]
fn test_split_keeps_leading_comments() {
    let sql = "-- pg-topo:phase bootstrap\nCREATE SCHEMA app;";
    let statements = split_statements(sql);
    assert_eq!(statements.len(), 1);
    assert!(statements[0].text.starts_with("-- pg-topo:phase bootstrap"));
}

#[test]
fn test_analyze_orders_reversed_corpus() {
    let sql = "CREATE INDEX idx ON test.users (name);\n\
               CREATE TABLE test.users (id int, name text);\n\
               CREATE SCHEMA test;";
    let result = analyze_sql(sql);

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let classes: Vec<Option<StatementClass>> =
        result.ordered.iter().map(|n| n.class).collect();
    assert_eq!(
        classes,
        vec![
            Some(StatementClass::CreateSchema),
            Some(StatementClass::CreateTable),
            Some(StatementClass::CreateIndex),
        ]
    );
    assert_eq!(result.graph.node_count, 3);
    assert!(result.graph.edges.len() >= 2);
}

#[test]
fn test_analyze_function_before_trigger() {
    let sql = "CREATE TRIGGER audit BEFORE UPDATE ON users \
               FOR EACH ROW EXECUTE FUNCTION audit_row();\n\
               CREATE FUNCTION audit_row() RETURNS trigger LANGUAGE plpgsql AS $$\n\
               BEGIN RETURN NEW; END;\n$$;\n\
               CREATE TABLE users (id int);";
    let result = analyze_sql(sql);

    let position = |class: StatementClass| {
        result
            .ordered
            .iter()
            .position(|n| n.class == Some(class))
            .unwrap()
    };
    assert!(position(StatementClass::CreateTable) < position(StatementClass::CreateTrigger));
    assert!(position(StatementClass::CreateFunction) < position(StatementClass::CreateTrigger));
}

#[test]
fn test_annotations_drive_edges() {
    let sql = "-- pg-topo:provides view:app.totals\n\
               CREATE VIEW app.totals AS SELECT count(*) FROM app.orders;\n\
               -- pg-topo:depends_on app.totals_is_wrong\n\
               SELECT 1;";
    // depends_on names a table nobody provides
    let result = analyze_sql(sql);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::UnresolvedDependency));
}

#[test]
fn test_requires_annotation_orders_statements() {
    let sql = "-- pg-topo:requires view:app.totals\n\
               GRANT SELECT ON app.totals TO reporting;\n\
               CREATE VIEW app.totals AS SELECT 1;";
    let result = analyze_sql(sql);

    assert_eq!(
        result.ordered[0].class,
        Some(StatementClass::CreateView),
        "{:?}",
        result.ordered
    );
    assert_eq!(result.ordered[1].class, Some(StatementClass::Grant));
}

#[test]
fn test_duplicate_producer_diagnostic() {
    let sql = "CREATE TABLE app.users (id int);\nCREATE TABLE app.users (id int);";
    let result = analyze_sql(sql);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::DuplicateProducer));
}

#[test]
fn test_unknown_statement_class_diagnostic() {
    let result = analyze_sql("FROBNICATE THE WIDGETS;");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::UnknownStatementClass));
    assert_eq!(result.ordered.len(), 1);
}

#[test]
fn test_circular_foreign_keys_report_cycle() {
    let sql = "CREATE TABLE a (id int PRIMARY KEY, b_id int REFERENCES b(id));\n\
               CREATE TABLE b (id int PRIMARY KEY, a_id int REFERENCES a(id));";
    let result = analyze_sql(sql);

    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::CycleDetected));
    assert_eq!(result.graph.cycle_groups.len(), 1);
    assert_eq!(result.graph.cycle_groups[0].len(), 2);
    // Cycle members keep their input order at the end
    assert_eq!(result.ordered.len(), 2);
    assert!(result.ordered[0].text.starts_with("CREATE TABLE a"));
}

#[test]
fn test_missing_file_is_discovery_error() {
    let result = analyze(&[AnalyzerInput::File("does/not/exist.sql".into())]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::DiscoveryError);
}

#[test]
fn test_analyze_files_from_disk() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("01_schema.sql");
    let table_path = dir.path().join("02_tables.sql");
    let mut schema_file = std::fs::File::create(&schema_path).unwrap();
    writeln!(schema_file, "CREATE SCHEMA app;").unwrap();
    let mut table_file = std::fs::File::create(&table_path).unwrap();
    writeln!(table_file, "CREATE TABLE app.users (id int);").unwrap();

    let result = analyze(&[
        AnalyzerInput::File(table_path),
        AnalyzerInput::File(schema_path),
    ]);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.ordered[0].class, Some(StatementClass::CreateSchema));
}

#[test]
fn test_analysis_is_deterministic() {
    let sql = "CREATE TABLE b (id int);\nCREATE TABLE a (id int);\n\
               CREATE VIEW v AS SELECT 1;\nGRANT SELECT ON a TO r;";
    let first = analyze_sql(sql);
    let second = analyze_sql(sql);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_grant_waits_for_target() {
    let sql = "GRANT SELECT ON app.users TO reporting;\n\
               CREATE TABLE app.users (id int);\n\
               CREATE SCHEMA app;";
    let result = analyze_sql(sql);
    let classes: Vec<Option<StatementClass>> =
        result.ordered.iter().map(|n| n.class).collect();
    assert_eq!(
        classes,
        vec![
            Some(StatementClass::CreateSchema),
            Some(StatementClass::CreateTable),
            Some(StatementClass::Grant),
        ]
    );
}
