//! Statement classification over sqlparser tokens.

use serde::{Deserialize, Serialize};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementClass {
    CreateSchema,
    CreateExtension,
    CreateLanguage,
    CreateCollation,
    CreateType,
    CreateDomain,
    CreateSequence,
    CreateTable,
    CreateIndex,
    CreateFunction,
    CreateProcedure,
    CreateAggregate,
    CreateView,
    CreateMaterializedView,
    CreateRule,
    CreateTrigger,
    CreateEventTrigger,
    CreatePolicy,
    CreatePublication,
    CreateSubscription,
    CreateRole,
    CreateServer,
    CreateForeignDataWrapper,
    CreateForeignTable,
    CreateUserMapping,
    AlterTable,
    AlterSequence,
    AlterOwner,
    AlterDefaultPrivileges,
    AlterOther,
    DropObject,
    Grant,
    Revoke,
    Comment,
    Do,
    Select,
    Insert,
    Update,
    Delete,
    VariableSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// The statement could not be tokenized.
    Parse(String),
    /// Tokenization worked but no classifier matched.
    Unknown,
}

/// The leading word tokens of a statement, uppercased, comments skipped.
pub(crate) fn leading_words(sql: &str, count: usize) -> Result<Vec<String>, ClassifyError> {
    let dialect = PostgreSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|e| ClassifyError::Parse(e.to_string()))?;
    Ok(tokens
        .iter()
        .filter_map(|token| match token {
            Token::Word(word) => Some(word.value.to_uppercase()),
            _ => None,
        })
        .take(count)
        .collect())
}

pub fn classify(sql: &str) -> Result<StatementClass, ClassifyError> {
    let words = leading_words(sql, 12)?;
    let mut iter = words.iter().map(String::as_str);

    let class = match iter.next() {
        Some("CREATE") => classify_create(&words)?,
        Some("ALTER") => classify_alter(&words),
        Some("DROP") => StatementClass::DropObject,
        Some("GRANT") => StatementClass::Grant,
        Some("REVOKE") => StatementClass::Revoke,
        Some("COMMENT") => StatementClass::Comment,
        Some("DO") => StatementClass::Do,
        Some("SELECT") | Some("WITH") | Some("TABLE") => StatementClass::Select,
        Some("INSERT") => StatementClass::Insert,
        Some("UPDATE") => StatementClass::Update,
        Some("DELETE") => StatementClass::Delete,
        Some("SET") | Some("RESET") => StatementClass::VariableSet,
        _ => return Err(ClassifyError::Unknown),
    };
    Ok(class)
}

/// Modifier keywords that may sit between `CREATE` and the object keyword.
const CREATE_MODIFIERS: &[&str] = &[
    "OR",
    "REPLACE",
    "GLOBAL",
    "LOCAL",
    "TEMP",
    "TEMPORARY",
    "UNLOGGED",
    "UNIQUE",
    "TRUSTED",
    "RECURSIVE",
    "CONSTRAINT",
];

fn classify_create(words: &[String]) -> Result<StatementClass, ClassifyError> {
    let mut rest = words[1..].iter().map(String::as_str);
    let object = loop {
        match rest.next() {
            Some(word) if CREATE_MODIFIERS.contains(&word) => continue,
            Some(word) => break word,
            None => return Err(ClassifyError::Unknown),
        }
    };

    let class = match object {
        "SCHEMA" => StatementClass::CreateSchema,
        "EXTENSION" => StatementClass::CreateExtension,
        "LANGUAGE" => StatementClass::CreateLanguage,
        "COLLATION" => StatementClass::CreateCollation,
        "TYPE" => StatementClass::CreateType,
        "DOMAIN" => StatementClass::CreateDomain,
        "SEQUENCE" => StatementClass::CreateSequence,
        "TABLE" => StatementClass::CreateTable,
        "INDEX" => StatementClass::CreateIndex,
        "FUNCTION" => StatementClass::CreateFunction,
        "PROCEDURE" => StatementClass::CreateProcedure,
        "AGGREGATE" => StatementClass::CreateAggregate,
        "VIEW" => StatementClass::CreateView,
        "MATERIALIZED" => match rest.next() {
            Some("VIEW") => StatementClass::CreateMaterializedView,
            _ => return Err(ClassifyError::Unknown),
        },
        "RULE" => StatementClass::CreateRule,
        "TRIGGER" => StatementClass::CreateTrigger,
        "EVENT" => match rest.next() {
            Some("TRIGGER") => StatementClass::CreateEventTrigger,
            _ => return Err(ClassifyError::Unknown),
        },
        "POLICY" => StatementClass::CreatePolicy,
        "PUBLICATION" => StatementClass::CreatePublication,
        "SUBSCRIPTION" => StatementClass::CreateSubscription,
        "ROLE" | "GROUP" => StatementClass::CreateRole,
        "USER" => match rest.next() {
            Some("MAPPING") => StatementClass::CreateUserMapping,
            _ => StatementClass::CreateRole,
        },
        "SERVER" => StatementClass::CreateServer,
        "FOREIGN" => match rest.next() {
            Some("DATA") => StatementClass::CreateForeignDataWrapper,
            Some("TABLE") => StatementClass::CreateForeignTable,
            _ => return Err(ClassifyError::Unknown),
        },
        _ => return Err(ClassifyError::Unknown),
    };
    Ok(class)
}

fn classify_alter(words: &[String]) -> StatementClass {
    // `OWNER TO` anywhere wins: ownership transfer is its own class
    let has_owner_to = words
        .windows(2)
        .any(|pair| pair[0] == "OWNER" && pair[1] == "TO");
    if has_owner_to {
        return StatementClass::AlterOwner;
    }
    match words.get(1).map(String::as_str) {
        Some("TABLE") | Some("FOREIGN") => StatementClass::AlterTable,
        Some("SEQUENCE") => StatementClass::AlterSequence,
        Some("DEFAULT") => StatementClass::AlterDefaultPrivileges,
        _ => StatementClass::AlterOther,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_creates() {
        assert_eq!(classify("CREATE TABLE t (id int)"), Ok(StatementClass::CreateTable));
        assert_eq!(
            classify("CREATE UNIQUE INDEX CONCURRENTLY i ON t (c)"),
            Ok(StatementClass::CreateIndex)
        );
        assert_eq!(
            classify("CREATE OR REPLACE FUNCTION f() RETURNS int AS $$ SELECT 1 $$ LANGUAGE sql"),
            Ok(StatementClass::CreateFunction)
        );
        assert_eq!(
            classify("CREATE MATERIALIZED VIEW mv AS SELECT 1"),
            Ok(StatementClass::CreateMaterializedView)
        );
        assert_eq!(
            classify("CREATE EVENT TRIGGER et ON ddl_command_end EXECUTE FUNCTION f()"),
            Ok(StatementClass::CreateEventTrigger)
        );
        assert_eq!(
            classify("CREATE USER MAPPING FOR bob SERVER s"),
            Ok(StatementClass::CreateUserMapping)
        );
        assert_eq!(classify("CREATE USER bob"), Ok(StatementClass::CreateRole));
        assert_eq!(
            classify("CREATE FOREIGN DATA WRAPPER w"),
            Ok(StatementClass::CreateForeignDataWrapper)
        );
        assert_eq!(
            classify("CREATE FOREIGN TABLE ft (id int) SERVER s"),
            Ok(StatementClass::CreateForeignTable)
        );
    }

    #[test]
    fn test_classify_alters() {
        assert_eq!(
            classify("ALTER TABLE t ADD COLUMN c int"),
            Ok(StatementClass::AlterTable)
        );
        assert_eq!(
            classify("ALTER SEQUENCE s RESTART"),
            Ok(StatementClass::AlterSequence)
        );
        assert_eq!(
            classify("ALTER TABLE t OWNER TO admin"),
            Ok(StatementClass::AlterOwner)
        );
        assert_eq!(
            classify("ALTER DEFAULT PRIVILEGES IN SCHEMA s GRANT SELECT ON TABLES TO r"),
            Ok(StatementClass::AlterDefaultPrivileges)
        );
        assert_eq!(
            classify("ALTER PUBLICATION p ADD TABLE t"),
            Ok(StatementClass::AlterOther)
        );
    }

    #[test]
    fn test_classify_misc() {
        assert_eq!(classify("GRANT SELECT ON t TO r"), Ok(StatementClass::Grant));
        assert_eq!(
            classify("COMMENT ON TABLE t IS 'users'"),
            Ok(StatementClass::Comment)
        );
        assert_eq!(classify("SET search_path = public"), Ok(StatementClass::VariableSet));
        assert_eq!(classify("DO $$ BEGIN END $$"), Ok(StatementClass::Do));
        assert_eq!(classify("DROP TABLE t"), Ok(StatementClass::DropObject));
        assert_eq!(classify("FROBNICATE"), Err(ClassifyError::Unknown));
    }
}
