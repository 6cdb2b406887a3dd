//! Stable identifiers and name normalization.
//!
//! Every schema entity is addressed by a stable identifier of the form
//! `kind:scope.name` (routines additionally carry a normalized argument
//! signature: `function:public.add(int4,int4)`). Subordinate identifiers are
//! derived from their owner: `comment:<id>`, `acl:<id>@<grantee>`.
//!
//! Normalization follows PostgreSQL rules: unquoted identifiers fold to
//! lowercase, quoted identifiers keep their case with `""` unescaped to `"`.

use serde::{Deserialize, Serialize};

/// Canonical identifier for one schema entity, unique across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn schema(name: &str) -> Self {
        Self(format!("schema:{name}"))
    }

    pub fn table(schema: &str, name: &str) -> Self {
        Self(format!("table:{schema}.{name}"))
    }

    pub fn column(schema: &str, table: &str, column: &str) -> Self {
        Self(format!("column:{schema}.{table}.{column}"))
    }

    pub fn index(schema: &str, name: &str) -> Self {
        Self(format!("index:{schema}.{name}"))
    }

    pub fn constraint(schema: &str, table: &str, name: &str) -> Self {
        Self(format!("constraint:{schema}.{table}.{name}"))
    }

    pub fn view(schema: &str, name: &str) -> Self {
        Self(format!("view:{schema}.{name}"))
    }

    pub fn materialized_view(schema: &str, name: &str) -> Self {
        Self(format!("materialized_view:{schema}.{name}"))
    }

    pub fn sequence(schema: &str, name: &str) -> Self {
        Self(format!("sequence:{schema}.{name}"))
    }

    pub fn function(schema: &str, name: &str, signature: &str) -> Self {
        Self(format!(
            "function:{schema}.{name}({})",
            normalize_signature(signature)
        ))
    }

    pub fn procedure(schema: &str, name: &str, signature: &str) -> Self {
        Self(format!(
            "procedure:{schema}.{name}({})",
            normalize_signature(signature)
        ))
    }

    pub fn aggregate(schema: &str, name: &str, signature: &str) -> Self {
        Self(format!(
            "aggregate:{schema}.{name}({})",
            normalize_signature(signature)
        ))
    }

    pub fn type_(schema: &str, name: &str) -> Self {
        Self(format!("type:{schema}.{name}"))
    }

    pub fn domain(schema: &str, name: &str) -> Self {
        Self(format!("domain:{schema}.{name}"))
    }

    pub fn collation(schema: &str, name: &str) -> Self {
        Self(format!("collation:{schema}.{name}"))
    }

    pub fn extension(name: &str) -> Self {
        Self(format!("extension:{name}"))
    }

    pub fn language(name: &str) -> Self {
        Self(format!("language:{name}"))
    }

    pub fn role(name: &str) -> Self {
        Self(format!("role:{name}"))
    }

    pub fn rule(schema: &str, table: &str, name: &str) -> Self {
        Self(format!("rule:{schema}.{table}.{name}"))
    }

    pub fn trigger(schema: &str, table: &str, name: &str) -> Self {
        Self(format!("trigger:{schema}.{table}.{name}"))
    }

    pub fn event_trigger(name: &str) -> Self {
        Self(format!("event_trigger:{name}"))
    }

    pub fn policy(schema: &str, table: &str, name: &str) -> Self {
        Self(format!("policy:{schema}.{table}.{name}"))
    }

    pub fn publication(name: &str) -> Self {
        Self(format!("publication:{name}"))
    }

    pub fn subscription(name: &str) -> Self {
        Self(format!("subscription:{name}"))
    }

    pub fn foreign_data_wrapper(name: &str) -> Self {
        Self(format!("fdw:{name}"))
    }

    pub fn server(name: &str) -> Self {
        Self(format!("server:{name}"))
    }

    pub fn user_mapping(server: &str, user: &str) -> Self {
        Self(format!("user_mapping:{server}.{user}"))
    }

    pub fn foreign_table(schema: &str, name: &str) -> Self {
        Self(format!("foreign_table:{schema}.{name}"))
    }

    pub fn default_acl(role: &str, schema: Option<&str>, objects: &str) -> Self {
        match schema {
            Some(s) => Self(format!("default_acl:{role}.{s}.{objects}")),
            None => Self(format!("default_acl:{role}.{objects}")),
        }
    }

    /// Identifier of the comment attached to `target`.
    pub fn comment_on(target: &StableId) -> Self {
        Self(format!("comment:{}", target.0))
    }

    /// Identifier of one grantee's privileges on `target`.
    pub fn acl(target: &StableId, grantee: &str) -> Self {
        Self(format!("acl:{}@{grantee}", target.0))
    }

    /// Build an id from an annotation-style reference: `kind`, qualified
    /// name and optional signature.
    pub fn from_reference(kind: ObjectKind, qualified: &str, signature: Option<&str>) -> Self {
        let (schema, name) = split_qualified_name(qualified, NameMode::Raw);
        let schema = schema.unwrap_or_else(|| "public".to_string());
        match kind {
            ObjectKind::Function => Self::function(&schema, &name, signature.unwrap_or("")),
            ObjectKind::Procedure => Self::procedure(&schema, &name, signature.unwrap_or("")),
            ObjectKind::Aggregate => Self::aggregate(&schema, &name, signature.unwrap_or("")),
            ObjectKind::Schema => Self::schema(&name),
            ObjectKind::Extension => Self::extension(&name),
            ObjectKind::Language => Self::language(&name),
            ObjectKind::Role => Self::role(&name),
            ObjectKind::EventTrigger => Self::event_trigger(&name),
            ObjectKind::Publication => Self::publication(&name),
            ObjectKind::Subscription => Self::subscription(&name),
            ObjectKind::ForeignDataWrapper => Self::foreign_data_wrapper(&name),
            ObjectKind::Server => Self::server(&name),
            _ => Self(format!("{}:{schema}.{name}", kind.key())),
        }
    }
}

impl std::fmt::Display for StableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw identifier should be folded.
///
/// `Raw` applies PostgreSQL case folding (unquoted lowercases); `Ast` is for
/// names that already came out of a parsed statement and keep their case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    Raw,
    Ast,
}

pub fn normalize_identifier(raw: &str, mode: NameMode) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        match mode {
            NameMode::Raw => trimmed.to_lowercase(),
            NameMode::Ast => trimmed.to_string(),
        }
    }
}

/// Split `schema.name` at top-level dots, respecting quoted segments.
/// Returns `(schema, name)`; a bare name has no schema. For catalog-style
/// three-part names the last two segments win.
pub fn split_qualified_name(raw: &str, mode: NameMode) -> (Option<String>, String) {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = raw.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                // "" inside quotes is an escaped quote, not a boundary
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    current.push(chars.next().unwrap());
                } else {
                    in_quotes = !in_quotes;
                    current.push('"');
                }
            }
            '.' if !in_quotes => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);

    let name = normalize_identifier(parts.last().map(String::as_str).unwrap_or(""), mode);
    let schema = if parts.len() >= 2 {
        Some(normalize_identifier(&parts[parts.len() - 2], mode))
    } else {
        None
    };
    (schema, name)
}

/// Normalize a routine argument signature.
///
/// Takes the substring inside the outermost balanced parens when present,
/// splits at top-level commas and normalizes each type expression:
/// whitespace collapsed, lowercased outside quotes, no spaces around
/// commas, brackets and parens.
pub fn normalize_signature(raw: &str) -> String {
    let inner = match (raw.find('('), raw.rfind(')')) {
        (Some(open), Some(close)) if close > open => &raw[open + 1..close],
        _ => raw,
    };

    split_top_level(inner, ',')
        .iter()
        .map(|arg| normalize_type_expression(arg))
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split at `sep` occurrences that sit outside quotes and parens.
pub fn split_top_level(raw: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;

    for c in raw.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' | '[' if !in_single && !in_double => depth += 1,
            ')' | ']' if !in_single && !in_double => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == sep && depth == 0 && !in_single && !in_double {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

fn normalize_type_expression(raw: &str) -> String {
    let mut out = String::new();
    let mut in_double = false;
    let mut pending_space = false;

    for c in raw.trim().chars() {
        if c == '"' {
            in_double = !in_double;
        }
        if !in_double && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            // No space next to punctuation; a single space elsewhere
            let prev = out.chars().last();
            let keep = !matches!(c, ',' | '(' | ')' | '[' | ']')
                && !matches!(prev, Some(',') | Some('(') | Some('[') | None);
            if keep {
                out.push(' ');
            }
            pending_space = false;
        }
        if in_double || c == '"' {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// The categories of schema objects the engine understands.
///
/// Also serves as the planner's priority key: lower `priority()` builds
/// earlier (and, reversed, drops later).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Schema,
    Extension,
    Language,
    Collation,
    Type,
    Domain,
    Sequence,
    Table,
    Column,
    Constraint,
    Index,
    Function,
    Procedure,
    Aggregate,
    View,
    MaterializedView,
    Rule,
    Trigger,
    EventTrigger,
    Policy,
    Publication,
    Subscription,
    #[serde(rename = "fdw")]
    ForeignDataWrapper,
    Server,
    UserMapping,
    ForeignTable,
    Role,
}

impl ObjectKind {
    /// The `kind:` prefix used in stable identifiers and annotations.
    pub fn key(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "schema",
            ObjectKind::Extension => "extension",
            ObjectKind::Language => "language",
            ObjectKind::Collation => "collation",
            ObjectKind::Type => "type",
            ObjectKind::Domain => "domain",
            ObjectKind::Sequence => "sequence",
            ObjectKind::Table => "table",
            ObjectKind::Column => "column",
            ObjectKind::Constraint => "constraint",
            ObjectKind::Index => "index",
            ObjectKind::Function => "function",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Aggregate => "aggregate",
            ObjectKind::View => "view",
            ObjectKind::MaterializedView => "materialized_view",
            ObjectKind::Rule => "rule",
            ObjectKind::Trigger => "trigger",
            ObjectKind::EventTrigger => "event_trigger",
            ObjectKind::Policy => "policy",
            ObjectKind::Publication => "publication",
            ObjectKind::Subscription => "subscription",
            ObjectKind::ForeignDataWrapper => "fdw",
            ObjectKind::Server => "server",
            ObjectKind::UserMapping => "user_mapping",
            ObjectKind::ForeignTable => "foreign_table",
            ObjectKind::Role => "role",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "schema" => ObjectKind::Schema,
            "extension" => ObjectKind::Extension,
            "language" => ObjectKind::Language,
            "collation" => ObjectKind::Collation,
            "type" => ObjectKind::Type,
            "domain" => ObjectKind::Domain,
            "sequence" => ObjectKind::Sequence,
            "table" => ObjectKind::Table,
            "column" => ObjectKind::Column,
            "constraint" => ObjectKind::Constraint,
            "index" => ObjectKind::Index,
            "function" => ObjectKind::Function,
            "procedure" => ObjectKind::Procedure,
            "aggregate" => ObjectKind::Aggregate,
            "view" => ObjectKind::View,
            "materialized_view" => ObjectKind::MaterializedView,
            "rule" => ObjectKind::Rule,
            "trigger" => ObjectKind::Trigger,
            "event_trigger" => ObjectKind::EventTrigger,
            "policy" => ObjectKind::Policy,
            "publication" => ObjectKind::Publication,
            "subscription" => ObjectKind::Subscription,
            "fdw" => ObjectKind::ForeignDataWrapper,
            "server" => ObjectKind::Server,
            "user_mapping" => ObjectKind::UserMapping,
            "foreign_table" => ObjectKind::ForeignTable,
            "role" => ObjectKind::Role,
            _ => return None,
        })
    }

    /// Build-order tiebreak. Hard dependencies always dominate; this only
    /// decides between otherwise-unordered changes.
    pub fn priority(&self) -> u8 {
        match self {
            ObjectKind::Schema => 0,
            ObjectKind::Extension => 1,
            ObjectKind::Language => 2,
            ObjectKind::Collation => 3,
            ObjectKind::Type => 4,
            ObjectKind::Domain => 5,
            ObjectKind::Sequence => 6,
            ObjectKind::Table => 7,
            ObjectKind::Column => 8,
            ObjectKind::Constraint => 9,
            ObjectKind::Index => 10,
            ObjectKind::Function => 11,
            ObjectKind::Procedure => 12,
            ObjectKind::Aggregate => 13,
            ObjectKind::View => 14,
            ObjectKind::MaterializedView => 15,
            ObjectKind::Rule => 16,
            ObjectKind::Trigger => 17,
            ObjectKind::EventTrigger => 18,
            ObjectKind::Policy => 19,
            ObjectKind::Publication => 20,
            ObjectKind::Subscription => 21,
            ObjectKind::ForeignDataWrapper => 22,
            ObjectKind::Server => 23,
            ObjectKind::UserMapping => 24,
            ObjectKind::ForeignTable => 25,
            ObjectKind::Role => 26,
        }
    }
}

/// Types that never need to be provided by a change before use.
const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "bytea",
    "date",
    "float4",
    "float8",
    "int2",
    "int4",
    "int8",
    "json",
    "jsonb",
    "numeric",
    "record",
    "text",
    "time",
    "timestamp",
    "timestamptz",
    "trigger",
    "uuid",
    "varchar",
    "void",
];

const BUILTIN_LANGUAGES: &[&str] = &["internal", "c", "sql", "plpgsql"];

/// True when a reference points at something the engine treats as always
/// present: system schemas, the default `public` schema as a schema
/// reference, roles, builtin languages and the builtin type allow-list.
pub fn is_builtin(kind: ObjectKind, schema: Option<&str>, name: &str) -> bool {
    if matches!(schema, Some("pg_catalog") | Some("information_schema")) {
        return true;
    }
    match kind {
        ObjectKind::Schema => {
            name == "public" || name == "pg_catalog" || name == "information_schema"
        }
        ObjectKind::Role => true,
        ObjectKind::Language => BUILTIN_LANGUAGES.contains(&name),
        ObjectKind::Type | ObjectKind::Domain => {
            if schema.is_some() && schema != Some("public") {
                return false;
            }
            // Strip array brackets and type parameters before the lookup
            let base = name
                .trim_end_matches("[]")
                .split('(')
                .next()
                .unwrap_or(name)
                .trim();
            BUILTIN_TYPES.contains(&base)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier_unquoted() {
        assert_eq!(normalize_identifier("  Users ", NameMode::Raw), "users");
        assert_eq!(normalize_identifier("Users", NameMode::Ast), "Users");
    }

    #[test]
    fn test_normalize_identifier_quoted() {
        assert_eq!(normalize_identifier("\"Users\"", NameMode::Raw), "Users");
        assert_eq!(
            normalize_identifier("\"we\"\"ird\"", NameMode::Raw),
            "we\"ird"
        );
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(
            split_qualified_name("public.users", NameMode::Raw),
            (Some("public".into()), "users".into())
        );
        assert_eq!(
            split_qualified_name("users", NameMode::Raw),
            (None, "users".into())
        );
        assert_eq!(
            split_qualified_name("\"My Schema\".\"My.Table\"", NameMode::Raw),
            (Some("My Schema".into()), "My.Table".into())
        );
    }

    #[test]
    fn test_normalize_signature() {
        assert_eq!(normalize_signature("(INT4 ,  Text)"), "int4,text");
        assert_eq!(
            normalize_signature("numeric(10, 2), character varying"),
            "numeric(10,2),character varying"
        );
        assert_eq!(normalize_signature("()"), "");
        assert_eq!(normalize_signature("int4, int4[]"), "int4,int4[]");
    }

    #[test]
    fn test_stable_id_formats() {
        assert_eq!(StableId::table("public", "users").as_str(), "table:public.users");
        assert_eq!(
            StableId::function("public", "add", "INT4, INT4").as_str(),
            "function:public.add(int4,int4)"
        );
        let table = StableId::table("public", "users");
        assert_eq!(
            StableId::comment_on(&table).as_str(),
            "comment:table:public.users"
        );
        assert_eq!(
            StableId::acl(&table, "reporting").as_str(),
            "acl:table:public.users@reporting"
        );
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin(ObjectKind::Type, None, "int4"));
        assert!(is_builtin(ObjectKind::Type, Some("pg_catalog"), "tsvector"));
        assert!(is_builtin(ObjectKind::Type, None, "varchar(255)"));
        assert!(is_builtin(ObjectKind::Type, None, "int4[]"));
        assert!(!is_builtin(ObjectKind::Type, Some("app"), "status"));
        assert!(is_builtin(ObjectKind::Schema, None, "public"));
        assert!(!is_builtin(ObjectKind::Schema, None, "app"));
        assert!(is_builtin(ObjectKind::Role, None, "anybody"));
        assert!(is_builtin(ObjectKind::Language, None, "plpgsql"));
        assert!(!is_builtin(ObjectKind::Language, None, "plv8"));
    }
}
