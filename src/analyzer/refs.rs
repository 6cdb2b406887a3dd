//! Class-specific reference extraction.
//!
//! For each classified statement this pulls out the ids it provides and the
//! ids it needs, by inspecting the statement head plus a handful of
//! well-known clauses (`ON <table>`, `REFERENCES …`, `LANGUAGE …`,
//! `SERVER …`). Annotation hints add to both sides; everything is filtered
//! through the builtin allow-list.

use once_cell::sync::Lazy;
use regex::Regex;

use super::annotations::AnnotationHints;
use super::classify::StatementClass;
use super::splitter::strip_noise;
use super::topo::EdgeReason;
use crate::ident::{is_builtin, split_qualified_name, NameMode, ObjectKind, StableId};

/// A possibly-quoted, possibly-qualified SQL name.
const QNAME: &str = r#"(?:"[^"]+"|[A-Za-z_][A-Za-z0-9_$]*)(?:\s*\.\s*(?:"[^"]+"|[A-Za-z_][A-Za-z0-9_$]*))*"#;

macro_rules! head_regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| {
            Regex::new(&format!($pattern, qname = QNAME)).unwrap()
        });
    };
}

head_regex!(CREATE_TARGET, r#"(?is)^\s*create\s+(?:or\s+replace\s+)?(?:global\s+|local\s+|temp(?:orary)?\s+|unlogged\s+|unique\s+|trusted\s+|recursive\s+)*(?:schema|extension|language|collation|type|domain|sequence|table|index(?:\s+concurrently)?|function|procedure|aggregate|materialized\s+view|view|rule|trigger|event\s+trigger|policy|publication|subscription|role|user(?:\s+mapping)?|group|server|foreign\s+data\s+wrapper|foreign\s+table)\s+(?:if\s+not\s+exists\s+)?({qname})"#);
head_regex!(ON_TABLE, r#"(?is)\bon\s+(?:only\s+)?({qname})"#);
head_regex!(REFERENCES_TABLE, r#"(?is)\breferences\s+({qname})"#);
head_regex!(LANGUAGE_NAME, r#"(?is)\blanguage\s+({qname})"#);
head_regex!(SERVER_NAME, r#"(?is)\bserver\s+({qname})"#);
head_regex!(WRAPPER_NAME, r#"(?is)\bforeign\s+data\s+wrapper\s+({qname})"#);
head_regex!(WITH_SCHEMA, r#"(?is)\bwith\s+schema\s+({qname})"#);
head_regex!(EXECUTE_FUNCTION, r#"(?is)\bexecute\s+(?:function|procedure)\s+({qname})"#);
head_regex!(GRANT_TARGET, r#"(?is)\bon\s+(?:(table|sequence|schema|function|procedure|routine|type|domain|language|foreign\s+data\s+wrapper|foreign\s+server|database|all)\s+)?({qname})"#);
head_regex!(COMMENT_TARGET, r#"(?is)^\s*comment\s+on\s+(materialized\s+view|foreign\s+table|foreign\s+data\s+wrapper|event\s+trigger|[a-z]+)\s+({qname})"#);
head_regex!(ROUTINE_SIGNATURE, r#"(?is)^\s*create\s+(?:or\s+replace\s+)?(?:function|procedure)\s+(?:{qname})\s*\("#);

pub(super) struct ExtractedRefs {
    pub provides: Vec<StableId>,
    pub requires: Vec<(StableId, EdgeReason)>,
}

fn qualified(raw: &str) -> (Option<String>, String) {
    // Collapse whitespace around dots that the regex admits
    let compact: String = raw.split_whitespace().collect::<Vec<_>>().join("");
    split_qualified_name(&compact, NameMode::Raw)
}

/// The object id plus, when the name is schema-qualified, the schema
/// requirement that comes with it.
fn object_ref(
    kind: ObjectKind,
    raw: &str,
    requires: &mut Vec<(StableId, EdgeReason)>,
) -> Option<StableId> {
    let (schema, name) = qualified(raw);
    if let Some(schema) = &schema {
        if !is_builtin(ObjectKind::Schema, None, schema) {
            requires.push((StableId::schema(schema), EdgeReason::Requires));
        }
    }
    let schema = schema.unwrap_or_else(|| "public".to_string());
    if is_builtin(kind, Some(&schema), &name) {
        return None;
    }
    Some(match kind {
        ObjectKind::Schema => StableId::schema(&name),
        ObjectKind::Extension => StableId::extension(&name),
        ObjectKind::Language => StableId::language(&name),
        ObjectKind::Role => StableId::role(&name),
        ObjectKind::EventTrigger => StableId::event_trigger(&name),
        ObjectKind::Publication => StableId::publication(&name),
        ObjectKind::Subscription => StableId::subscription(&name),
        ObjectKind::ForeignDataWrapper => StableId::foreign_data_wrapper(&name),
        ObjectKind::Server => StableId::server(&name),
        _ => StableId::from_reference(kind, &format!("{schema}.{name}"), None),
    })
}

pub(super) fn extract_refs(
    class: Option<StatementClass>,
    sql: &str,
    hints: &AnnotationHints,
) -> ExtractedRefs {
    let text = strip_noise(sql);
    let mut provides: Vec<StableId> = Vec::new();
    let mut requires: Vec<(StableId, EdgeReason)> = Vec::new();

    if let Some(class) = class {
        extract_class_refs(class, &text, &mut provides, &mut requires);
    }

    provides.extend(hints.provides.iter().cloned());
    for id in &hints.requires {
        requires.push((id.clone(), EdgeReason::Requires));
    }
    for name in &hints.depends_on {
        let (schema, table) = qualified(name);
        let schema = schema.unwrap_or_else(|| "public".to_string());
        requires.push((StableId::table(&schema, &table), EdgeReason::Requires));
    }

    provides.sort();
    provides.dedup();
    requires.sort_by(|a, b| a.0.cmp(&b.0));
    requires.dedup_by(|a, b| a.0 == b.0);
    // A statement never depends on what it itself creates
    requires.retain(|(id, _)| !provides.contains(id));

    ExtractedRefs { provides, requires }
}

fn extract_class_refs(
    class: StatementClass,
    text: &str,
    provides: &mut Vec<StableId>,
    requires: &mut Vec<(StableId, EdgeReason)>,
) {
    use StatementClass::*;

    let target = CREATE_TARGET
        .captures(text)
        .map(|captures| captures[1].to_string());

    match class {
        CreateSchema => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::schema(&name));
            }
        }
        CreateExtension => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::extension(&name));
            }
            if let Some(captures) = WITH_SCHEMA.captures(text) {
                let (_, schema) = qualified(&captures[1]);
                if !is_builtin(ObjectKind::Schema, None, &schema) {
                    requires.push((StableId::schema(&schema), EdgeReason::Requires));
                }
            }
        }
        CreateLanguage => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::language(&name));
            }
        }
        CreateCollation => {
            push_target(ObjectKind::Collation, target, provides, requires);
        }
        CreateType => {
            push_target(ObjectKind::Type, target, provides, requires);
        }
        CreateDomain => {
            push_target(ObjectKind::Domain, target, provides, requires);
        }
        CreateSequence => {
            push_target(ObjectKind::Sequence, target, provides, requires);
        }
        CreateTable => {
            push_target(ObjectKind::Table, target, provides, requires);
            for captures in REFERENCES_TABLE.captures_iter(text) {
                if let Some(id) = object_ref(ObjectKind::Table, &captures[1], requires) {
                    requires.push((id, EdgeReason::RequiresConstraintKey));
                }
            }
        }
        CreateIndex => {
            // The table reference drives both the dependency and the schema
            // of an unqualified index name
            let table = ON_TABLE
                .captures(text)
                .map(|captures| captures[1].to_string());
            let table_schema = table.as_ref().and_then(|raw| qualified(raw).0);
            if let Some(raw) = &table {
                if let Some(id) = object_ref(ObjectKind::Table, raw, requires) {
                    requires.push((id, EdgeReason::Requires));
                }
            }
            // Anonymous indexes (CREATE INDEX ON t) capture the ON keyword
            let named = target.filter(|raw| !raw.eq_ignore_ascii_case("on"));
            if let Some(raw) = named {
                let (schema, name) = qualified(&raw);
                let schema = schema
                    .or(table_schema)
                    .unwrap_or_else(|| "public".to_string());
                provides.push(StableId::index(&schema, &name));
            }
        }
        CreateFunction | CreateProcedure => {
            if let Some(raw) = &target {
                let signature = routine_signature(text);
                let (schema, name) = qualified(raw);
                if let Some(schema_name) = &schema {
                    if !is_builtin(ObjectKind::Schema, None, schema_name) {
                        requires.push((StableId::schema(schema_name), EdgeReason::Requires));
                    }
                }
                let schema = schema.unwrap_or_else(|| "public".to_string());
                provides.push(if class == CreateProcedure {
                    StableId::procedure(&schema, &name, &signature)
                } else {
                    StableId::function(&schema, &name, &signature)
                });
            }
            if let Some(captures) = LANGUAGE_NAME.captures(text) {
                let (_, language) = qualified(&captures[1]);
                if !is_builtin(ObjectKind::Language, None, &language) {
                    requires.push((
                        StableId::language(&language),
                        EdgeReason::RequiresCompatible,
                    ));
                }
            }
        }
        CreateAggregate => {
            push_target(ObjectKind::Aggregate, target, provides, requires);
        }
        CreateView => {
            push_target(ObjectKind::View, target, provides, requires);
        }
        CreateMaterializedView => {
            push_target(ObjectKind::MaterializedView, target, provides, requires);
        }
        CreateRule | CreateTrigger | CreatePolicy => {
            let kind = match class {
                CreateRule => ObjectKind::Rule,
                CreateTrigger => ObjectKind::Trigger,
                _ => ObjectKind::Policy,
            };
            let table = ON_TABLE
                .captures(text)
                .map(|captures| captures[1].to_string());
            if let Some(raw) = &table {
                if let Some(id) = object_ref(ObjectKind::Table, raw, requires) {
                    requires.push((id, EdgeReason::Requires));
                }
                if let Some(target_raw) = target {
                    let (table_schema, table_name) = qualified(raw);
                    let schema = table_schema.unwrap_or_else(|| "public".to_string());
                    let (_, name) = qualified(&target_raw);
                    provides.push(match kind {
                        ObjectKind::Rule => StableId::rule(&schema, &table_name, &name),
                        ObjectKind::Trigger => StableId::trigger(&schema, &table_name, &name),
                        _ => StableId::policy(&schema, &table_name, &name),
                    });
                }
            }
            if class == CreateTrigger {
                if let Some(captures) = EXECUTE_FUNCTION.captures(text) {
                    let (schema, name) = qualified(&captures[1]);
                    let schema = schema.unwrap_or_else(|| "public".to_string());
                    requires.push((
                        StableId::function(&schema, &name, ""),
                        EdgeReason::Requires,
                    ));
                }
            }
        }
        CreateEventTrigger => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::event_trigger(&name));
            }
            if let Some(captures) = EXECUTE_FUNCTION.captures(text) {
                let (schema, name) = qualified(&captures[1]);
                let schema = schema.unwrap_or_else(|| "public".to_string());
                requires.push((StableId::function(&schema, &name, ""), EdgeReason::Requires));
            }
        }
        CreatePublication => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::publication(&name));
            }
        }
        CreateSubscription => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::subscription(&name));
            }
        }
        CreateRole => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::role(&name));
            }
        }
        CreateServer => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::server(&name));
            }
            if let Some(captures) = WRAPPER_NAME.captures(text) {
                let (_, wrapper) = qualified(&captures[1]);
                requires.push((
                    StableId::foreign_data_wrapper(&wrapper),
                    EdgeReason::Requires,
                ));
            }
        }
        CreateForeignDataWrapper => {
            if let Some(raw) = target {
                let (_, name) = qualified(&raw);
                provides.push(StableId::foreign_data_wrapper(&name));
            }
        }
        CreateForeignTable => {
            push_target(ObjectKind::ForeignTable, target, provides, requires);
            if let Some(captures) = SERVER_NAME.captures(text) {
                let (_, server) = qualified(&captures[1]);
                requires.push((StableId::server(&server), EdgeReason::Requires));
            }
        }
        CreateUserMapping => {
            if let Some(captures) = SERVER_NAME.captures(text) {
                let (_, server) = qualified(&captures[1]);
                requires.push((StableId::server(&server), EdgeReason::Requires));
            }
        }
        AlterTable => {
            if let Some(captures) = alter_target(text) {
                if let Some(id) = object_ref(ObjectKind::Table, &captures, requires) {
                    requires.push((id, EdgeReason::Requires));
                }
            }
            for captures in REFERENCES_TABLE.captures_iter(text) {
                if let Some(id) = object_ref(ObjectKind::Table, &captures[1], requires) {
                    requires.push((id, EdgeReason::RequiresConstraintKey));
                }
            }
        }
        AlterSequence => {
            if let Some(raw) = alter_target(text) {
                if let Some(id) = object_ref(ObjectKind::Sequence, &raw, requires) {
                    requires.push((id, EdgeReason::Requires));
                }
            }
        }
        Grant | Revoke => {
            if let Some(captures) = GRANT_TARGET.captures(text) {
                let kind = match captures.get(1).map(|m| m.as_str().to_lowercase()) {
                    Some(keyword) => match keyword.as_str() {
                        "sequence" => ObjectKind::Sequence,
                        "schema" => ObjectKind::Schema,
                        "function" | "procedure" | "routine" => ObjectKind::Function,
                        "type" => ObjectKind::Type,
                        "domain" => ObjectKind::Domain,
                        "language" => ObjectKind::Language,
                        "database" | "all" => return,
                        keyword if keyword.starts_with("foreign") => return,
                        _ => ObjectKind::Table,
                    },
                    None => ObjectKind::Table,
                };
                if kind == ObjectKind::Function {
                    let (schema, name) = qualified(&captures[2]);
                    let schema = schema.unwrap_or_else(|| "public".to_string());
                    requires.push((
                        StableId::function(&schema, &name, ""),
                        EdgeReason::Requires,
                    ));
                } else if let Some(id) = object_ref(kind, &captures[2], requires) {
                    requires.push((id, EdgeReason::Requires));
                }
            }
        }
        Comment => {
            if let Some(captures) = COMMENT_TARGET.captures(text) {
                let keyword = captures[1]
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                let kind = match keyword.as_str() {
                    "table" | "column" => ObjectKind::Table,
                    "view" => ObjectKind::View,
                    "materialized view" => ObjectKind::MaterializedView,
                    "schema" => ObjectKind::Schema,
                    "function" => ObjectKind::Function,
                    "procedure" => ObjectKind::Procedure,
                    "type" => ObjectKind::Type,
                    "domain" => ObjectKind::Domain,
                    "sequence" => ObjectKind::Sequence,
                    "extension" => ObjectKind::Extension,
                    "index" => ObjectKind::Index,
                    _ => return,
                };
                let raw = if keyword == "column" {
                    // schema.table.column -> the table carries the dependency
                    let compact: String =
                        captures[2].split_whitespace().collect::<Vec<_>>().join("");
                    let mut parts = crate::ident::split_top_level(&compact, '.');
                    if parts.len() < 2 {
                        return;
                    }
                    parts.pop();
                    parts.join(".")
                } else {
                    captures[2].to_string()
                };
                if kind == ObjectKind::Function || kind == ObjectKind::Procedure {
                    let (schema, name) = qualified(&raw);
                    let schema = schema.unwrap_or_else(|| "public".to_string());
                    requires.push((
                        StableId::function(&schema, &name, ""),
                        EdgeReason::Requires,
                    ));
                } else if let Some(id) = object_ref(kind, &raw, requires) {
                    requires.push((id, EdgeReason::Requires));
                }
            }
        }
        AlterOwner | AlterDefaultPrivileges | AlterOther | DropObject | Do | Select | Insert
        | Update | Delete | VariableSet => {}
    }
}

fn push_target(
    kind: ObjectKind,
    target: Option<String>,
    provides: &mut Vec<StableId>,
    requires: &mut Vec<(StableId, EdgeReason)>,
) {
    if let Some(raw) = target {
        let (schema, name) = qualified(&raw);
        if let Some(schema_name) = &schema {
            if !is_builtin(ObjectKind::Schema, None, schema_name) {
                requires.push((StableId::schema(schema_name), EdgeReason::Requires));
            }
        }
        let schema = schema.unwrap_or_else(|| "public".to_string());
        provides.push(StableId::from_reference(
            kind,
            &format!("{schema}.{name}"),
            None,
        ));
    }
}

static ALTER_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?is)^\s*alter\s+(?:foreign\s+)?(?:table|sequence)\s+(?:if\s+exists\s+)?(?:only\s+)?({QNAME})"#
    ))
    .unwrap()
});

fn alter_target(text: &str) -> Option<String> {
    ALTER_TARGET
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Normalized signature of the routine being created, from the balanced
/// argument list after its name.
fn routine_signature(text: &str) -> String {
    let Some(found) = ROUTINE_SIGNATURE.find(text) else {
        return String::new();
    };
    // The match ends on the opening paren
    let tail = &text[found.end() - 1..];
    let mut depth = 0i32;
    let mut close = None;
    for (offset, c) in tail.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(offset);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return String::new();
    };
    let inner = &tail[1..close];
    let types: Vec<String> = crate::ident::split_top_level(&inner, ',')
        .iter()
        .filter_map(|argument| argument_type(argument))
        .collect();
    crate::ident::normalize_signature(&types.join(", "))
}

/// Drop the name and mode from one argument declaration, keeping the type.
fn argument_type(argument: &str) -> Option<String> {
    let without_default = argument
        .split_once(" DEFAULT ")
        .or_else(|| argument.split_once(" default "))
        .map(|(head, _)| head)
        .unwrap_or(argument)
        .trim();
    if without_default.is_empty() {
        return None;
    }
    let mut words: Vec<&str> = without_default.split_whitespace().collect();
    match words.first().map(|w| w.to_uppercase()) {
        Some(mode) if matches!(mode.as_str(), "IN" | "OUT" | "INOUT" | "VARIADIC") => {
            words.remove(0);
        }
        _ => {}
    }
    if words.len() >= 2 {
        let first = words[0];
        let looks_like_name = first
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '"');
        let type_keywords = ["character", "double", "timestamp", "time", "numeric", "bit"];
        if looks_like_name && !type_keywords.contains(&first.to_lowercase().as_str()) {
            words.remove(0);
        }
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
