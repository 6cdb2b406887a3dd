//! Table, column, constraint, index and materialized-view changes.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{is_builtin, ObjectKind, StableId};
use crate::model::{
    Column, ColumnGenerated, ColumnIdentity, Constraint, Index, MaterializedView, ReplicaIdentity,
    SchemaEntity, Table,
};
use crate::sql::{quote_ident, quote_qualified, strip_terminator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableChange {
    Create {
        table: Table,
    },
    Drop {
        schema: String,
        name: String,
        /// Needed so the drop set covers the owned column ids.
        columns: Vec<String>,
    },
    AddColumn {
        schema: String,
        table: String,
        column: Column,
    },
    DropColumn {
        schema: String,
        table: String,
        name: String,
    },
    AlterColumn {
        schema: String,
        table: String,
        name: String,
        alteration: ColumnAlteration,
    },
    SetRowLevelSecurity {
        schema: String,
        name: String,
        enabled: bool,
    },
    SetReplicaIdentity {
        schema: String,
        name: String,
        identity: ReplicaIdentity,
    },
    SetOptions {
        schema: String,
        name: String,
        options: Vec<String>,
    },
    ChangeOwner {
        schema: String,
        name: String,
        owner: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlteration {
    SetType {
        data_type: String,
        collation: Option<String>,
    },
    SetNotNull,
    DropNotNull,
    SetDefault { expression: String },
    DropDefault,
    AddIdentity { identity: ColumnIdentity },
    SetIdentity { identity: ColumnIdentity },
    DropIdentity,
}

/// Render one column definition the way `CREATE TABLE` and `ADD COLUMN`
/// want it.
pub(crate) fn column_definition(column: &Column) -> String {
    let mut sql = format!("{} {}", quote_ident(&column.name), column.data_type);

    if let Some(collation) = &column.collation {
        sql.push_str(&format!(" COLLATE {}", quote_ident(collation)));
    }

    // Generated columns cannot carry a plain default
    if column.generated == ColumnGenerated::Stored {
        if let Some(expr) = &column.default {
            sql.push_str(&format!(" GENERATED ALWAYS AS ({expr}) STORED"));
        }
    } else if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }

    match column.identity {
        ColumnIdentity::None => {}
        ColumnIdentity::Always => sql.push_str(" GENERATED ALWAYS AS IDENTITY"),
        ColumnIdentity::ByDefault => sql.push_str(" GENERATED BY DEFAULT AS IDENTITY"),
    }

    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    sql
}

/// Custom types a column pulls in, for dependency edges.
fn column_type_requirements(column: &Column) -> Option<StableId> {
    let type_schema = column.type_schema.as_deref()?;
    let base = column
        .data_type
        .trim_end_matches("[]")
        .rsplit('.')
        .next()
        .unwrap_or(&column.data_type)
        .trim_matches('"')
        .to_string();
    if is_builtin(ObjectKind::Type, Some(type_schema), &base) {
        None
    } else {
        Some(StableId::type_(type_schema, &base))
    }
}

impl TableChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            TableChange::Create { .. } => ChangeOperation::Create,
            TableChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Table
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            TableChange::Create { table } => {
                let mut ids = vec![table.stable_id()];
                ids.extend(table.column_ids());
                ids
            }
            TableChange::AddColumn { schema, table, column } => {
                vec![StableId::column(schema, table, &column.name)]
            }
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            TableChange::Create { table } => {
                let mut ids = Vec::new();
                if !is_builtin(ObjectKind::Schema, None, &table.schema) {
                    ids.push(StableId::schema(&table.schema));
                }
                for column in &table.columns {
                    ids.extend(column_type_requirements(column));
                }
                ids
            }
            TableChange::AddColumn { schema, table, column } => {
                let mut ids = vec![StableId::table(schema, table)];
                ids.extend(column_type_requirements(column));
                ids
            }
            TableChange::DropColumn { schema, table, .. } => {
                vec![StableId::table(schema, table)]
            }
            TableChange::AlterColumn { schema, table, name, .. } => {
                vec![StableId::column(schema, table, name)]
            }
            TableChange::SetRowLevelSecurity { schema, name, .. }
            | TableChange::SetReplicaIdentity { schema, name, .. }
            | TableChange::SetOptions { schema, name, .. }
            | TableChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::table(schema, name)]
            }
            TableChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            TableChange::Drop { schema, name, columns } => {
                let mut ids = vec![StableId::table(schema, name)];
                ids.extend(
                    columns
                        .iter()
                        .map(|c| StableId::column(schema, name, c)),
                );
                ids
            }
            TableChange::DropColumn { schema, table, name } => {
                vec![StableId::column(schema, table, name)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            TableChange::Create { table } => {
                let mut columns: Vec<&Column> = table.columns.iter().collect();
                columns.sort_by_key(|c| c.position);

                let column_defs: Vec<String> =
                    columns.iter().map(|c| column_definition(c)).collect();

                let mut sql = format!(
                    "CREATE TABLE {} (\n    {}\n)",
                    quote_qualified(&table.schema, &table.name),
                    column_defs.join(",\n    ")
                );
                if let Some(partition_by) = &table.partition_by {
                    sql.push_str(&format!(" PARTITION BY {partition_by}"));
                }
                if !table.options.is_empty() {
                    sql.push_str(&format!(" WITH ({})", table.options.join(", ")));
                }
                sql
            }
            TableChange::Drop { schema, name, .. } => {
                format!("DROP TABLE {}", quote_qualified(schema, name))
            }
            TableChange::AddColumn { schema, table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_qualified(schema, table),
                column_definition(column)
            ),
            TableChange::DropColumn { schema, table, name } => format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_qualified(schema, table),
                quote_ident(name)
            ),
            TableChange::AlterColumn { schema, table, name, alteration } => {
                let head = format!(
                    "ALTER TABLE {} ALTER COLUMN {}",
                    quote_qualified(schema, table),
                    quote_ident(name)
                );
                match alteration {
                    ColumnAlteration::SetType { data_type, collation } => {
                        let mut sql = format!(
                            "{head} TYPE {data_type} USING {}::{data_type}",
                            quote_ident(name)
                        );
                        if let Some(collation) = collation {
                            sql.push_str(&format!(" COLLATE {}", quote_ident(collation)));
                        }
                        sql
                    }
                    ColumnAlteration::SetNotNull => format!("{head} SET NOT NULL"),
                    ColumnAlteration::DropNotNull => format!("{head} DROP NOT NULL"),
                    ColumnAlteration::SetDefault { expression } => {
                        format!("{head} SET DEFAULT {expression}")
                    }
                    ColumnAlteration::DropDefault => format!("{head} DROP DEFAULT"),
                    ColumnAlteration::AddIdentity { identity } => {
                        format!("{head} ADD GENERATED {} AS IDENTITY", identity_keyword(identity))
                    }
                    ColumnAlteration::SetIdentity { identity } => {
                        format!("{head} SET GENERATED {}", identity_keyword(identity))
                    }
                    ColumnAlteration::DropIdentity => format!("{head} DROP IDENTITY"),
                }
            }
            TableChange::SetRowLevelSecurity { schema, name, enabled } => format!(
                "ALTER TABLE {} {} ROW LEVEL SECURITY",
                quote_qualified(schema, name),
                if *enabled { "ENABLE" } else { "DISABLE" }
            ),
            TableChange::SetReplicaIdentity { schema, name, identity } => {
                let clause = match identity {
                    ReplicaIdentity::Default => "REPLICA IDENTITY DEFAULT".to_string(),
                    ReplicaIdentity::Full => "REPLICA IDENTITY FULL".to_string(),
                    ReplicaIdentity::Nothing => "REPLICA IDENTITY NOTHING".to_string(),
                    ReplicaIdentity::Index(index) => {
                        format!("REPLICA IDENTITY USING INDEX {}", quote_ident(index))
                    }
                };
                format!("ALTER TABLE {} {}", quote_qualified(schema, name), clause)
            }
            TableChange::SetOptions { schema, name, options } => format!(
                "ALTER TABLE {} SET ({})",
                quote_qualified(schema, name),
                options.join(", ")
            ),
            TableChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER TABLE {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            TableChange::Create { table } => table.stable_id(),
            TableChange::Drop { schema, name, .. }
            | TableChange::SetRowLevelSecurity { schema, name, .. }
            | TableChange::SetReplicaIdentity { schema, name, .. }
            | TableChange::SetOptions { schema, name, .. }
            | TableChange::ChangeOwner { schema, name, .. } => StableId::table(schema, name),
            TableChange::AddColumn { schema, table, column } => {
                StableId::column(schema, table, &column.name)
            }
            TableChange::DropColumn { schema, table, name }
            | TableChange::AlterColumn { schema, table, name, .. } => {
                StableId::column(schema, table, name)
            }
        }
    }
}

fn identity_keyword(identity: &ColumnIdentity) -> &'static str {
    match identity {
        ColumnIdentity::Always => "ALWAYS",
        ColumnIdentity::ByDefault | ColumnIdentity::None => "BY DEFAULT",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintChange {
    Add { constraint: Constraint },
    Drop { schema: String, table: String, name: String },
}

impl ConstraintChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ConstraintChange::Add { .. } => ChangeOperation::Create,
            ConstraintChange::Drop { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Constraint
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ConstraintChange::Add { constraint } => {
                vec![StableId::constraint(
                    &constraint.schema,
                    &constraint.table,
                    &constraint.name,
                )]
            }
            ConstraintChange::Drop { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        // Foreign keys deliberately do not require their referenced table:
        // mutually-referential tables would make the plan cyclic, and the
        // applier's retry rounds resolve the ordering at runtime.
        match self {
            ConstraintChange::Add { constraint } => {
                vec![StableId::table(&constraint.schema, &constraint.table)]
            }
            ConstraintChange::Drop { schema, table, .. } => {
                vec![StableId::table(schema, table)]
            }
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ConstraintChange::Drop { schema, table, name } => {
                vec![StableId::constraint(schema, table, name)]
            }
            ConstraintChange::Add { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ConstraintChange::Add { constraint } => format!(
                "ALTER TABLE {} ADD CONSTRAINT {} {}",
                quote_qualified(&constraint.schema, &constraint.table),
                quote_ident(&constraint.name),
                constraint.definition
            ),
            ConstraintChange::Drop { schema, table, name } => format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                quote_qualified(schema, table),
                quote_ident(name)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ConstraintChange::Add { constraint } => StableId::constraint(
                &constraint.schema,
                &constraint.table,
                &constraint.name,
            ),
            ConstraintChange::Drop { schema, table, name } => {
                StableId::constraint(schema, table, name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexChange {
    Create { index: Index },
    Drop { schema: String, table: String, name: String },
}

impl IndexChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            IndexChange::Create { .. } => ChangeOperation::Create,
            IndexChange::Drop { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Index
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            IndexChange::Create { index } => vec![StableId::index(&index.schema, &index.name)],
            IndexChange::Drop { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            IndexChange::Create { index } => {
                vec![StableId::table(&index.schema, &index.table)]
            }
            IndexChange::Drop { schema, table, .. } => vec![StableId::table(schema, table)],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            IndexChange::Drop { schema, name, .. } => vec![StableId::index(schema, name)],
            IndexChange::Create { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            // The definition is the complete statement as the server prints it
            IndexChange::Create { index } => strip_terminator(&index.definition).to_string(),
            IndexChange::Drop { schema, name, .. } => {
                format!("DROP INDEX {}", quote_qualified(schema, name))
            }
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            IndexChange::Create { index } => StableId::index(&index.schema, &index.name),
            IndexChange::Drop { schema, name, .. } => StableId::index(schema, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializedViewChange {
    Create { view: MaterializedView },
    Drop { schema: String, name: String },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl MaterializedViewChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            MaterializedViewChange::Create { .. } => ChangeOperation::Create,
            MaterializedViewChange::Drop { .. } => ChangeOperation::Drop,
            MaterializedViewChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::MaterializedView
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            MaterializedViewChange::Create { view } => {
                vec![StableId::materialized_view(&view.schema, &view.name)]
            }
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            MaterializedViewChange::Create { view } => {
                if is_builtin(ObjectKind::Schema, None, &view.schema) {
                    vec![]
                } else {
                    vec![StableId::schema(&view.schema)]
                }
            }
            MaterializedViewChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::materialized_view(schema, name)]
            }
            MaterializedViewChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            MaterializedViewChange::Drop { schema, name } => {
                vec![StableId::materialized_view(schema, name)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            MaterializedViewChange::Create { view } => format!(
                "CREATE MATERIALIZED VIEW {} AS\n{}",
                quote_qualified(&view.schema, &view.name),
                strip_terminator(&view.definition)
            ),
            MaterializedViewChange::Drop { schema, name } => {
                format!("DROP MATERIALIZED VIEW {}", quote_qualified(schema, name))
            }
            MaterializedViewChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER MATERIALIZED VIEW {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            MaterializedViewChange::Create { view } => {
                StableId::materialized_view(&view.schema, &view.name)
            }
            MaterializedViewChange::Drop { schema, name }
            | MaterializedViewChange::ChangeOwner { schema, name, .. } => {
                StableId::materialized_view(schema, name)
            }
        }
    }
}
