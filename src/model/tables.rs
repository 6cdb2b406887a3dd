//! Tables, columns, constraints, indexes and materialized views.

use serde::{Deserialize, Serialize};

use super::{AclEntry, SchemaEntity};
use crate::ident::StableId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub owner: String,
    /// Declared order; the differ compares columns by name, not position.
    pub columns: Vec<Column>,
    #[serde(default)]
    pub partition_by: Option<String>,
    #[serde(default)]
    pub rls_enabled: bool,
    #[serde(default)]
    pub replica_identity: ReplicaIdentity,
    /// Storage parameters as `key=value` strings.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for Table {
    fn stable_id(&self) -> StableId {
        StableId::table(&self.schema, &self.name)
    }
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_ids(&self) -> Vec<StableId> {
        self.columns
            .iter()
            .map(|c| StableId::column(&self.schema, &self.name, &c.name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub position: i32,
    pub data_type: String,
    /// Schema of the column's type when it is a user-defined one.
    #[serde(default)]
    pub type_schema: Option<String>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub identity: ColumnIdentity,
    #[serde(default)]
    pub generated: ColumnGenerated,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnIdentity {
    #[default]
    None,
    Always,
    ByDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGenerated {
    #[default]
    None,
    Stored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaIdentity {
    #[default]
    Default,
    Full,
    Nothing,
    Index(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub schema: String,
    pub name: String,
    pub table: String,
    /// Complete `CREATE [UNIQUE] INDEX …` statement as the server prints it.
    pub definition: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Index {
    fn stable_id(&self) -> StableId {
        StableId::index(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    Exclusion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub kind: ConstraintKind,
    /// Body after `ADD CONSTRAINT <name>`, e.g. `FOREIGN KEY (a) REFERENCES b(id)`.
    pub definition: String,
    /// For foreign keys, the `(schema, table)` the constraint points at.
    #[serde(default)]
    pub referenced_table: Option<(String, String)>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Constraint {
    fn stable_id(&self) -> StableId {
        StableId::constraint(&self.schema, &self.table, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub definition: String,
    /// Output column names, in order.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for MaterializedView {
    fn stable_id(&self) -> StableId {
        StableId::materialized_view(&self.schema, &self.name)
    }
}
