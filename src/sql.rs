//! SQL text helpers: identifier quoting, literal escaping, script rendering.

/// Reserved words that must be quoted even when lowercase.
const QUOTE_ALWAYS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_date", "current_role",
    "current_time", "current_timestamp", "current_user", "default", "deferrable", "desc",
    "distinct", "do", "else", "end", "except", "false", "fetch", "for", "foreign", "from", "grant",
    "group", "having", "in", "initially", "intersect", "into", "lateral", "leading", "limit",
    "localtime", "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "placing",
    "primary", "references", "returning", "select", "session_user", "some", "symmetric", "table",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when",
    "where", "window", "with",
];

/// Quote an identifier only when folding would lose fidelity: anything that
/// is not all-lowercase `[a-z_][a-z0-9_$]*`, or is a reserved word.
pub fn quote_ident(name: &str) -> String {
    let simple = !name.is_empty()
        && name
            .chars()
            .next()
            .map(|c| c.is_ascii_lowercase() || c == '_')
            .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$');

    if simple && !QUOTE_ALWAYS.contains(&name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// `schema.name`, each part quoted as needed.
pub fn quote_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Single-quoted literal with the doubling rule.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Join statements into an executable script: `;\n` separated, with a
/// trailing terminator.
pub fn render_statements(statements: &[String]) -> String {
    if statements.is_empty() {
        return String::new();
    }
    let mut out = statements.join(";\n");
    out.push_str(";\n");
    out
}

/// Join statements into a script file: one blank line between statements.
pub fn render_script(statements: &[String]) -> String {
    if statements.is_empty() {
        return String::new();
    }
    let mut out = statements.join(";\n\n");
    out.push_str(";\n");
    out
}

/// Rewrite the head of a routine definition so it starts with
/// `CREATE FUNCTION` or `CREATE OR REPLACE FUNCTION` as requested. The
/// definition body is emitted verbatim.
pub fn normalize_create_head(definition: &str, or_replace: bool) -> String {
    let trimmed = definition.trim();
    let upper = trimmed.to_uppercase();

    let rest = if upper.starts_with("CREATE OR REPLACE") {
        trimmed["CREATE OR REPLACE".len()..].trim_start()
    } else if upper.starts_with("CREATE") {
        trimmed["CREATE".len()..].trim_start()
    } else {
        trimmed
    };

    if or_replace {
        format!("CREATE OR REPLACE {rest}")
    } else {
        format!("CREATE {rest}")
    }
}

/// Strip a single trailing semicolon; change serialization emits exactly one
/// unterminated statement.
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim_end().trim_end_matches(';').trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "users");
        assert_eq!(quote_ident("Users"), "\"Users\"");
        assert_eq!(quote_ident("my table"), "\"my table\"");
        assert_eq!(quote_ident("order"), "\"order\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_ident("_private"), "_private");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("plain"), "'plain'");
    }

    #[test]
    fn test_normalize_create_head() {
        assert_eq!(
            normalize_create_head("CREATE FUNCTION f() RETURNS int AS $$ SELECT 1 $$", true),
            "CREATE OR REPLACE FUNCTION f() RETURNS int AS $$ SELECT 1 $$"
        );
        assert_eq!(
            normalize_create_head(
                "CREATE OR REPLACE FUNCTION f() RETURNS int AS $$ SELECT 1 $$",
                false
            ),
            "CREATE FUNCTION f() RETURNS int AS $$ SELECT 1 $$"
        );
    }

    #[test]
    fn test_render_script() {
        let stmts = vec!["CREATE SCHEMA app".to_string(), "CREATE TABLE app.t (id int4)".to_string()];
        assert_eq!(
            render_script(&stmts),
            "CREATE SCHEMA app;\n\nCREATE TABLE app.t (id int4);\n"
        );
        assert_eq!(
            render_statements(&stmts),
            "CREATE SCHEMA app;\nCREATE TABLE app.t (id int4);\n"
        );
    }
}
