//! Schemas, views, sequences, extensions, languages, rules, triggers,
//! event triggers and policies.

use serde::{Deserialize, Serialize};

use super::{AclEntry, SchemaEntity};
use crate::ident::StableId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for SchemaDef {
    fn stable_id(&self) -> StableId {
        StableId::schema(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub owner: String,
    /// Body after `AS`, as `pg_get_viewdef` prints it.
    pub definition: String,
    /// `WITH (…)` options as `key=value` strings.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub check_option: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for View {
    fn stable_id(&self) -> StableId {
        StableId::view(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub data_type: String,
    pub start: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub increment: i64,
    #[serde(default)]
    pub cycle: bool,
    pub cache: i64,
    /// `schema.table.column` when the sequence is owned by a column.
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for Sequence {
    fn stable_id(&self) -> StableId {
        StableId::sequence(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Extension {
    fn stable_id(&self) -> StableId {
        StableId::extension(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub trusted: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Language {
    fn stable_id(&self) -> StableId {
        StableId::language(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Complete `CREATE RULE …` statement as the server prints it.
    pub definition: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Rule {
    fn stable_id(&self) -> StableId {
        StableId::rule(&self.schema, &self.table, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Complete `CREATE TRIGGER …` statement as `pg_get_triggerdef` prints it.
    pub definition: String,
    /// The routine the trigger executes, for dependency tracking.
    #[serde(default)]
    pub function_schema: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Trigger {
    fn stable_id(&self) -> StableId {
        StableId::trigger(&self.schema, &self.table, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    pub name: String,
    pub owner: String,
    /// `ddl_command_start`, `ddl_command_end`, `table_rewrite` or `sql_drop`.
    pub event: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub function_schema: String,
    pub function_name: String,
    #[serde(default = "super::objects::enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

pub(crate) fn enabled_default() -> bool {
    true
}

impl SchemaEntity for EventTrigger {
    fn stable_id(&self) -> StableId {
        StableId::event_trigger(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// `ALL`, `SELECT`, `INSERT`, `UPDATE` or `DELETE`.
    pub command: String,
    #[serde(default = "super::objects::enabled_default")]
    pub permissive: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub using_expr: Option<String>,
    #[serde(default)]
    pub check_expr: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Policy {
    fn stable_id(&self) -> StableId {
        StableId::policy(&self.schema, &self.table, &self.name)
    }
}
