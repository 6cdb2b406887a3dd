//! Changes for schemas, extensions, languages, collations, sequences,
//! views, rules, triggers, event triggers and policies.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{is_builtin, ObjectKind, StableId};
use crate::model::{
    Collation, CollationProvider, EventTrigger, Extension, Language, Policy, Rule, SchemaEntity,
    Sequence, Trigger, View,
};
use crate::sql::{quote_ident, quote_literal, quote_qualified, strip_terminator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChange {
    Create { name: String },
    Drop { name: String },
    ChangeOwner { name: String, owner: String },
}

impl SchemaChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            SchemaChange::Create { .. } => ChangeOperation::Create,
            SchemaChange::Drop { .. } => ChangeOperation::Drop,
            SchemaChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            SchemaChange::Create { name } => vec![StableId::schema(name)],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            SchemaChange::ChangeOwner { name, .. } => vec![StableId::schema(name)],
            _ => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            SchemaChange::Drop { name } => vec![StableId::schema(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            SchemaChange::Create { name } => format!("CREATE SCHEMA {}", quote_ident(name)),
            SchemaChange::Drop { name } => format!("DROP SCHEMA {}", quote_ident(name)),
            SchemaChange::ChangeOwner { name, owner } => format!(
                "ALTER SCHEMA {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            SchemaChange::Create { name }
            | SchemaChange::Drop { name }
            | SchemaChange::ChangeOwner { name, .. } => StableId::schema(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionChange {
    Create { extension: Extension },
    Drop { name: String },
    SetSchema { name: String, schema: String },
    UpdateVersion { name: String, version: Option<String> },
}

impl ExtensionChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ExtensionChange::Create { .. } => ChangeOperation::Create,
            ExtensionChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Extension
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ExtensionChange::Create { extension } => vec![extension.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            ExtensionChange::Create { extension } => match &extension.schema {
                Some(schema) if !is_builtin(ObjectKind::Schema, None, schema) => {
                    vec![StableId::schema(schema)]
                }
                _ => vec![],
            },
            ExtensionChange::SetSchema { name, schema } => {
                let mut ids = vec![StableId::extension(name)];
                if !is_builtin(ObjectKind::Schema, None, schema) {
                    ids.push(StableId::schema(schema));
                }
                ids
            }
            ExtensionChange::UpdateVersion { name, .. } => vec![StableId::extension(name)],
            ExtensionChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ExtensionChange::Drop { name } => vec![StableId::extension(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ExtensionChange::Create { extension } => {
                let mut sql = format!("CREATE EXTENSION {}", quote_ident(&extension.name));
                if let Some(schema) = &extension.schema {
                    sql.push_str(&format!(" WITH SCHEMA {}", quote_ident(schema)));
                }
                if let Some(version) = &extension.version {
                    sql.push_str(&format!(" VERSION {}", quote_literal(version)));
                }
                sql
            }
            ExtensionChange::Drop { name } => format!("DROP EXTENSION {}", quote_ident(name)),
            ExtensionChange::SetSchema { name, schema } => format!(
                "ALTER EXTENSION {} SET SCHEMA {}",
                quote_ident(name),
                quote_ident(schema)
            ),
            ExtensionChange::UpdateVersion { name, version } => match version {
                Some(v) => format!(
                    "ALTER EXTENSION {} UPDATE TO {}",
                    quote_ident(name),
                    quote_literal(v)
                ),
                None => format!("ALTER EXTENSION {} UPDATE", quote_ident(name)),
            },
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ExtensionChange::Create { extension } => extension.stable_id(),
            ExtensionChange::Drop { name }
            | ExtensionChange::SetSchema { name, .. }
            | ExtensionChange::UpdateVersion { name, .. } => StableId::extension(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageChange {
    Create { language: Language },
    Drop { name: String },
    ChangeOwner { name: String, owner: String },
}

impl LanguageChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            LanguageChange::Create { .. } => ChangeOperation::Create,
            LanguageChange::Drop { .. } => ChangeOperation::Drop,
            LanguageChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Language
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            LanguageChange::Create { language } => vec![language.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            LanguageChange::ChangeOwner { name, .. } => vec![StableId::language(name)],
            _ => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            LanguageChange::Drop { name } => vec![StableId::language(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            LanguageChange::Create { language } => {
                if language.trusted {
                    format!("CREATE TRUSTED LANGUAGE {}", quote_ident(&language.name))
                } else {
                    format!("CREATE LANGUAGE {}", quote_ident(&language.name))
                }
            }
            LanguageChange::Drop { name } => format!("DROP LANGUAGE {}", quote_ident(name)),
            LanguageChange::ChangeOwner { name, owner } => format!(
                "ALTER LANGUAGE {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            LanguageChange::Create { language } => language.stable_id(),
            LanguageChange::Drop { name } | LanguageChange::ChangeOwner { name, .. } => {
                StableId::language(name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollationChange {
    Create { collation: Collation },
    Drop { schema: String, name: String },
    RefreshVersion { schema: String, name: String },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl CollationChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            CollationChange::Create { .. } => ChangeOperation::Create,
            CollationChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Collation
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            CollationChange::Create { collation } => vec![collation.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            CollationChange::Create { collation } => {
                if is_builtin(ObjectKind::Schema, None, &collation.schema) {
                    vec![]
                } else {
                    vec![StableId::schema(&collation.schema)]
                }
            }
            CollationChange::RefreshVersion { schema, name }
            | CollationChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::collation(schema, name)]
            }
            CollationChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            CollationChange::Drop { schema, name } => vec![StableId::collation(schema, name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            CollationChange::Create { collation } => {
                let mut options = Vec::new();
                if collation.provider != CollationProvider::Default {
                    options.push(format!("provider = {}", collation.provider.sql_keyword()));
                }
                if let Some(locale) = &collation.locale {
                    options.push(format!("locale = {}", quote_literal(locale)));
                } else {
                    if let Some(collate) = &collation.collate {
                        options.push(format!("lc_collate = {}", quote_literal(collate)));
                    }
                    if let Some(ctype) = &collation.ctype {
                        options.push(format!("lc_ctype = {}", quote_literal(ctype)));
                    }
                }
                if let Some(rules) = &collation.icu_rules {
                    options.push(format!("rules = {}", quote_literal(rules)));
                }
                if !collation.is_deterministic {
                    options.push("deterministic = false".to_string());
                }
                format!(
                    "CREATE COLLATION {} ({})",
                    quote_qualified(&collation.schema, &collation.name),
                    options.join(", ")
                )
            }
            CollationChange::Drop { schema, name } => {
                format!("DROP COLLATION {}", quote_qualified(schema, name))
            }
            CollationChange::RefreshVersion { schema, name } => {
                format!("ALTER COLLATION {} REFRESH VERSION", quote_qualified(schema, name))
            }
            CollationChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER COLLATION {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            CollationChange::Create { collation } => collation.stable_id(),
            CollationChange::Drop { schema, name }
            | CollationChange::RefreshVersion { schema, name }
            | CollationChange::ChangeOwner { schema, name, .. } => {
                StableId::collation(schema, name)
            }
        }
    }
}

/// Only the options that changed; unset fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<i64>,
}

impl SequenceOptions {
    pub fn is_empty(&self) -> bool {
        self.data_type.is_none()
            && self.start.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
            && self.increment.is_none()
            && self.cycle.is_none()
            && self.cache.is_none()
    }

    fn clauses(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(data_type) = &self.data_type {
            parts.push(format!("AS {data_type}"));
        }
        if let Some(increment) = self.increment {
            parts.push(format!("INCREMENT BY {increment}"));
        }
        if let Some(min) = self.min_value {
            parts.push(format!("MINVALUE {min}"));
        }
        if let Some(max) = self.max_value {
            parts.push(format!("MAXVALUE {max}"));
        }
        if let Some(start) = self.start {
            parts.push(format!("START WITH {start}"));
        }
        if let Some(cache) = self.cache {
            parts.push(format!("CACHE {cache}"));
        }
        if let Some(cycle) = self.cycle {
            parts.push(if cycle { "CYCLE".into() } else { "NO CYCLE".into() });
        }
        parts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceChange {
    Create { sequence: Sequence },
    Drop { schema: String, name: String },
    SetOptions { schema: String, name: String, options: SequenceOptions },
    SetOwnedBy { schema: String, name: String, owned_by: Option<String> },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl SequenceChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            SequenceChange::Create { .. } => ChangeOperation::Create,
            SequenceChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Sequence
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            SequenceChange::Create { sequence } => vec![sequence.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            SequenceChange::Create { sequence } => {
                if is_builtin(ObjectKind::Schema, None, &sequence.schema) {
                    vec![]
                } else {
                    vec![StableId::schema(&sequence.schema)]
                }
            }
            SequenceChange::SetOwnedBy { schema, name, owned_by } => {
                let mut ids = vec![StableId::sequence(schema, name)];
                if let Some(owned_by) = owned_by {
                    if let Some(column_id) = owned_column_id(owned_by) {
                        ids.push(column_id);
                    }
                }
                ids
            }
            SequenceChange::SetOptions { schema, name, .. }
            | SequenceChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::sequence(schema, name)]
            }
            SequenceChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            SequenceChange::Drop { schema, name } => vec![StableId::sequence(schema, name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            SequenceChange::Create { sequence } => {
                let mut sql =
                    format!("CREATE SEQUENCE {}", quote_qualified(&sequence.schema, &sequence.name));
                if sequence.data_type != "bigint" {
                    sql.push_str(&format!(" AS {}", sequence.data_type));
                }
                sql.push_str(&format!(" START WITH {}", sequence.start));
                sql.push_str(&format!(" INCREMENT BY {}", sequence.increment));
                sql.push_str(&format!(" MINVALUE {}", sequence.min_value));
                sql.push_str(&format!(" MAXVALUE {}", sequence.max_value));
                sql.push_str(&format!(" CACHE {}", sequence.cache));
                if sequence.cycle {
                    sql.push_str(" CYCLE");
                }
                sql
            }
            SequenceChange::Drop { schema, name } => {
                format!("DROP SEQUENCE {}", quote_qualified(schema, name))
            }
            SequenceChange::SetOptions { schema, name, options } => format!(
                "ALTER SEQUENCE {} {}",
                quote_qualified(schema, name),
                options.clauses().join(" ")
            ),
            SequenceChange::SetOwnedBy { schema, name, owned_by } => {
                let target = match owned_by {
                    Some(column) => {
                        let parts: Vec<&str> = column.split('.').collect();
                        parts
                            .iter()
                            .map(|p| quote_ident(p))
                            .collect::<Vec<_>>()
                            .join(".")
                    }
                    None => "NONE".to_string(),
                };
                format!(
                    "ALTER SEQUENCE {} OWNED BY {}",
                    quote_qualified(schema, name),
                    target
                )
            }
            SequenceChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER SEQUENCE {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            SequenceChange::Create { sequence } => sequence.stable_id(),
            SequenceChange::Drop { schema, name }
            | SequenceChange::SetOptions { schema, name, .. }
            | SequenceChange::SetOwnedBy { schema, name, .. }
            | SequenceChange::ChangeOwner { schema, name, .. } => {
                StableId::sequence(schema, name)
            }
        }
    }
}

/// `schema.table.column` → the column's stable id.
fn owned_column_id(owned_by: &str) -> Option<StableId> {
    let parts: Vec<&str> = owned_by.split('.').collect();
    match parts.as_slice() {
        [schema, table, column] => Some(StableId::column(schema, table, column)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewChange {
    Create { view: View, or_replace: bool },
    Drop { schema: String, name: String },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl ViewChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ViewChange::Create { .. } => ChangeOperation::Create,
            ViewChange::Drop { .. } => ChangeOperation::Drop,
            ViewChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::View
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ViewChange::Create { view, .. } => vec![view.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            ViewChange::Create { view, .. } => {
                if is_builtin(ObjectKind::Schema, None, &view.schema) {
                    vec![]
                } else {
                    vec![StableId::schema(&view.schema)]
                }
            }
            ViewChange::ChangeOwner { schema, name, .. } => vec![StableId::view(schema, name)],
            ViewChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ViewChange::Drop { schema, name } => vec![StableId::view(schema, name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ViewChange::Create { view, or_replace } => {
                let mut sql = String::from("CREATE ");
                if *or_replace {
                    sql.push_str("OR REPLACE ");
                }
                sql.push_str(&format!("VIEW {}", quote_qualified(&view.schema, &view.name)));
                if !view.options.is_empty() {
                    sql.push_str(&format!(" WITH ({})", view.options.join(", ")));
                }
                sql.push_str(&format!(" AS\n{}", strip_terminator(&view.definition)));
                if let Some(check_option) = &view.check_option {
                    sql.push_str(&format!("\nWITH {check_option} CHECK OPTION"));
                }
                sql
            }
            ViewChange::Drop { schema, name } => {
                format!("DROP VIEW {}", quote_qualified(schema, name))
            }
            ViewChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER VIEW {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ViewChange::Create { view, .. } => view.stable_id(),
            ViewChange::Drop { schema, name } | ViewChange::ChangeOwner { schema, name, .. } => {
                StableId::view(schema, name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleChange {
    Create { rule: Rule },
    Drop { schema: String, table: String, name: String },
}

impl RuleChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            RuleChange::Create { .. } => ChangeOperation::Create,
            RuleChange::Drop { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Rule
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            RuleChange::Create { rule } => vec![rule.stable_id()],
            RuleChange::Drop { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            RuleChange::Create { rule } => vec![StableId::table(&rule.schema, &rule.table)],
            RuleChange::Drop { schema, table, .. } => vec![StableId::table(schema, table)],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            RuleChange::Drop { schema, table, name } => {
                vec![StableId::rule(schema, table, name)]
            }
            RuleChange::Create { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            RuleChange::Create { rule } => strip_terminator(&rule.definition).to_string(),
            RuleChange::Drop { schema, table, name } => format!(
                "DROP RULE {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            RuleChange::Create { rule } => rule.stable_id(),
            RuleChange::Drop { schema, table, name } => StableId::rule(schema, table, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerChange {
    Create { trigger: Trigger },
    Drop { schema: String, table: String, name: String },
}

impl TriggerChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            TriggerChange::Create { .. } => ChangeOperation::Create,
            TriggerChange::Drop { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Trigger
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            TriggerChange::Create { trigger } => vec![trigger.stable_id()],
            TriggerChange::Drop { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            TriggerChange::Create { trigger } => {
                let mut ids = vec![StableId::table(&trigger.schema, &trigger.table)];
                if let (Some(fs), Some(fname)) =
                    (&trigger.function_schema, &trigger.function_name)
                {
                    // Trigger functions take no declared arguments
                    ids.push(StableId::function(fs, fname, ""));
                }
                ids
            }
            TriggerChange::Drop { schema, table, .. } => vec![StableId::table(schema, table)],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            TriggerChange::Drop { schema, table, name } => {
                vec![StableId::trigger(schema, table, name)]
            }
            TriggerChange::Create { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            TriggerChange::Create { trigger } => strip_terminator(&trigger.definition).to_string(),
            TriggerChange::Drop { schema, table, name } => format!(
                "DROP TRIGGER {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            TriggerChange::Create { trigger } => trigger.stable_id(),
            TriggerChange::Drop { schema, table, name } => {
                StableId::trigger(schema, table, name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTriggerChange {
    Create { trigger: EventTrigger },
    Drop { name: String },
    SetEnabled { name: String, enabled: bool },
    ChangeOwner { name: String, owner: String },
}

impl EventTriggerChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            EventTriggerChange::Create { .. } => ChangeOperation::Create,
            EventTriggerChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::EventTrigger
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            EventTriggerChange::Create { trigger } => vec![trigger.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            EventTriggerChange::Create { trigger } => {
                vec![StableId::function(
                    &trigger.function_schema,
                    &trigger.function_name,
                    "",
                )]
            }
            EventTriggerChange::SetEnabled { name, .. }
            | EventTriggerChange::ChangeOwner { name, .. } => {
                vec![StableId::event_trigger(name)]
            }
            EventTriggerChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            EventTriggerChange::Drop { name } => vec![StableId::event_trigger(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            EventTriggerChange::Create { trigger } => {
                let mut sql = format!(
                    "CREATE EVENT TRIGGER {} ON {}",
                    quote_ident(&trigger.name),
                    trigger.event
                );
                if !trigger.tags.is_empty() {
                    let tags: Vec<String> =
                        trigger.tags.iter().map(|t| quote_literal(t)).collect();
                    sql.push_str(&format!("\n    WHEN TAG IN ({})", tags.join(", ")));
                }
                sql.push_str(&format!(
                    "\n    EXECUTE FUNCTION {}()",
                    quote_qualified(&trigger.function_schema, &trigger.function_name)
                ));
                sql
            }
            EventTriggerChange::Drop { name } => {
                format!("DROP EVENT TRIGGER {}", quote_ident(name))
            }
            EventTriggerChange::SetEnabled { name, enabled } => format!(
                "ALTER EVENT TRIGGER {} {}",
                quote_ident(name),
                if *enabled { "ENABLE" } else { "DISABLE" }
            ),
            EventTriggerChange::ChangeOwner { name, owner } => format!(
                "ALTER EVENT TRIGGER {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            EventTriggerChange::Create { trigger } => trigger.stable_id(),
            EventTriggerChange::Drop { name }
            | EventTriggerChange::SetEnabled { name, .. }
            | EventTriggerChange::ChangeOwner { name, .. } => StableId::event_trigger(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyChange {
    Create { policy: Policy },
    Drop { schema: String, table: String, name: String },
}

impl PolicyChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            PolicyChange::Create { .. } => ChangeOperation::Create,
            PolicyChange::Drop { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Policy
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            PolicyChange::Create { policy } => vec![policy.stable_id()],
            PolicyChange::Drop { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            PolicyChange::Create { policy } => {
                vec![StableId::table(&policy.schema, &policy.table)]
            }
            PolicyChange::Drop { schema, table, .. } => vec![StableId::table(schema, table)],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            PolicyChange::Drop { schema, table, name } => {
                vec![StableId::policy(schema, table, name)]
            }
            PolicyChange::Create { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            PolicyChange::Create { policy } => {
                let mut sql = format!(
                    "CREATE POLICY {} ON {}",
                    quote_ident(&policy.name),
                    quote_qualified(&policy.schema, &policy.table)
                );
                if !policy.permissive {
                    sql.push_str(" AS RESTRICTIVE");
                }
                if !policy.command.eq_ignore_ascii_case("all") {
                    sql.push_str(&format!(" FOR {}", policy.command.to_uppercase()));
                }
                if !policy.roles.is_empty() {
                    let roles: Vec<String> = policy
                        .roles
                        .iter()
                        .map(|r| {
                            if r.eq_ignore_ascii_case("public") {
                                "PUBLIC".to_string()
                            } else {
                                quote_ident(r)
                            }
                        })
                        .collect();
                    sql.push_str(&format!(" TO {}", roles.join(", ")));
                }
                if let Some(using) = &policy.using_expr {
                    sql.push_str(&format!(" USING ({using})"));
                }
                if let Some(check) = &policy.check_expr {
                    sql.push_str(&format!(" WITH CHECK ({check})"));
                }
                sql
            }
            PolicyChange::Drop { schema, table, name } => format!(
                "DROP POLICY {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            PolicyChange::Create { policy } => policy.stable_id(),
            PolicyChange::Drop { schema, table, name } => {
                StableId::policy(schema, table, name)
            }
        }
    }
}
