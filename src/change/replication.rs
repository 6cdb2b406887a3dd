//! Publication, subscription and foreign-data changes.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{is_builtin, ObjectKind, StableId};
use crate::model::{
    ForeignDataWrapper, ForeignServer, ForeignTable, Publication, PublicationTable, SchemaEntity,
    Subscription, UserMapping,
};
use crate::sql::{quote_ident, quote_literal, quote_qualified};

use super::tables::column_definition;

/// Option edits for objects with `OPTIONS (ADD …, SET …, DROP …)` syntax.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionsDelta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

impl OptionsDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.set.is_empty() && self.drop.is_empty()
    }

    fn to_clause(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.add {
            parts.push(format!("ADD {key} {}", quote_literal(value)));
        }
        for (key, value) in &self.set {
            parts.push(format!("SET {key} {}", quote_literal(value)));
        }
        for key in &self.drop {
            parts.push(format!("DROP {key}"));
        }
        format!("OPTIONS ({})", parts.join(", "))
    }

    /// Diff two option lists into the minimal delta.
    pub fn between(old: &[(String, String)], new: &[(String, String)]) -> Self {
        let mut delta = OptionsDelta::default();
        for (key, value) in new {
            match old.iter().find(|(k, _)| k == key) {
                None => delta.add.push((key.clone(), value.clone())),
                Some((_, old_value)) if old_value != value => {
                    delta.set.push((key.clone(), value.clone()))
                }
                Some(_) => {}
            }
        }
        for (key, _) in old {
            if !new.iter().any(|(k, _)| k == key) {
                delta.drop.push(key.clone());
            }
        }
        delta
    }
}

fn options_clause(options: &[(String, String)]) -> String {
    let parts: Vec<String> = options
        .iter()
        .map(|(key, value)| format!("{key} {}", quote_literal(value)))
        .collect();
    format!("OPTIONS ({})", parts.join(", "))
}

fn publication_table_clause(table: &PublicationTable) -> String {
    let mut sql = quote_qualified(&table.schema, &table.name);
    if let Some(columns) = &table.columns {
        let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        sql.push_str(&format!(" ({})", cols.join(", ")));
    }
    if let Some(filter) = &table.row_filter {
        sql.push_str(&format!(" WHERE ({filter})"));
    }
    sql
}

fn publish_option(publication: &Publication) -> Option<String> {
    let mut operations = Vec::new();
    if publication.publish_insert {
        operations.push("insert");
    }
    if publication.publish_update {
        operations.push("update");
    }
    if publication.publish_delete {
        operations.push("delete");
    }
    if publication.publish_truncate {
        operations.push("truncate");
    }
    if operations.len() == 4 {
        None
    } else {
        Some(format!("publish = '{}'", operations.join(", ")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationChange {
    Create { publication: Publication },
    Drop { name: String },
    AddTables { name: String, tables: Vec<PublicationTable> },
    DropTables { name: String, tables: Vec<(String, String)> },
    AddSchemas { name: String, schemas: Vec<String> },
    DropSchemas { name: String, schemas: Vec<String> },
    SetOptions {
        name: String,
        publish: Option<String>,
        publish_via_partition_root: Option<bool>,
    },
    ChangeOwner { name: String, owner: String },
}

impl PublicationChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            PublicationChange::Create { .. } => ChangeOperation::Create,
            PublicationChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Publication
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            PublicationChange::Create { publication } => vec![publication.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            PublicationChange::Create { publication } => publication
                .tables
                .iter()
                .map(|t| StableId::table(&t.schema, &t.name))
                .collect(),
            PublicationChange::AddTables { name, tables } => {
                let mut ids = vec![StableId::publication(name)];
                ids.extend(tables.iter().map(|t| StableId::table(&t.schema, &t.name)));
                ids
            }
            PublicationChange::DropTables { name, .. }
            | PublicationChange::AddSchemas { name, .. }
            | PublicationChange::DropSchemas { name, .. }
            | PublicationChange::SetOptions { name, .. }
            | PublicationChange::ChangeOwner { name, .. } => {
                vec![StableId::publication(name)]
            }
            PublicationChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            PublicationChange::Drop { name } => vec![StableId::publication(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            PublicationChange::Create { publication } => {
                let mut sql = format!("CREATE PUBLICATION {}", quote_ident(&publication.name));
                if publication.all_tables {
                    sql.push_str(" FOR ALL TABLES");
                } else {
                    let mut targets: Vec<String> = publication
                        .tables
                        .iter()
                        .map(|t| format!("TABLE {}", publication_table_clause(t)))
                        .collect();
                    targets.extend(
                        publication
                            .schemas
                            .iter()
                            .map(|s| format!("TABLES IN SCHEMA {}", quote_ident(s))),
                    );
                    if !targets.is_empty() {
                        sql.push_str(&format!(" FOR {}", targets.join(", ")));
                    }
                }
                let mut with = Vec::new();
                if let Some(publish) = publish_option(publication) {
                    with.push(publish);
                }
                if publication.publish_via_partition_root {
                    with.push("publish_via_partition_root = true".to_string());
                }
                if !with.is_empty() {
                    sql.push_str(&format!(" WITH ({})", with.join(", ")));
                }
                sql
            }
            PublicationChange::Drop { name } => {
                format!("DROP PUBLICATION {}", quote_ident(name))
            }
            PublicationChange::AddTables { name, tables } => {
                let clauses: Vec<String> =
                    tables.iter().map(publication_table_clause).collect();
                format!(
                    "ALTER PUBLICATION {} ADD TABLE {}",
                    quote_ident(name),
                    clauses.join(", ")
                )
            }
            PublicationChange::DropTables { name, tables } => {
                let clauses: Vec<String> = tables
                    .iter()
                    .map(|(schema, table)| quote_qualified(schema, table))
                    .collect();
                format!(
                    "ALTER PUBLICATION {} DROP TABLE {}",
                    quote_ident(name),
                    clauses.join(", ")
                )
            }
            PublicationChange::AddSchemas { name, schemas } => {
                let clauses: Vec<String> = schemas.iter().map(|s| quote_ident(s)).collect();
                format!(
                    "ALTER PUBLICATION {} ADD TABLES IN SCHEMA {}",
                    quote_ident(name),
                    clauses.join(", ")
                )
            }
            PublicationChange::DropSchemas { name, schemas } => {
                let clauses: Vec<String> = schemas.iter().map(|s| quote_ident(s)).collect();
                format!(
                    "ALTER PUBLICATION {} DROP TABLES IN SCHEMA {}",
                    quote_ident(name),
                    clauses.join(", ")
                )
            }
            PublicationChange::SetOptions { name, publish, publish_via_partition_root } => {
                let mut options = Vec::new();
                if let Some(publish) = publish {
                    options.push(format!("publish = {}", quote_literal(publish)));
                }
                if let Some(via_root) = publish_via_partition_root {
                    options.push(format!("publish_via_partition_root = {via_root}"));
                }
                format!(
                    "ALTER PUBLICATION {} SET ({})",
                    quote_ident(name),
                    options.join(", ")
                )
            }
            PublicationChange::ChangeOwner { name, owner } => format!(
                "ALTER PUBLICATION {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            PublicationChange::Create { publication } => publication.stable_id(),
            PublicationChange::Drop { name }
            | PublicationChange::AddTables { name, .. }
            | PublicationChange::DropTables { name, .. }
            | PublicationChange::AddSchemas { name, .. }
            | PublicationChange::DropSchemas { name, .. }
            | PublicationChange::SetOptions { name, .. }
            | PublicationChange::ChangeOwner { name, .. } => StableId::publication(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionChange {
    Create { subscription: Subscription },
    Drop { name: String },
    SetConnection { name: String, connection: String },
    SetPublications { name: String, publications: Vec<String> },
    SetEnabled { name: String, enabled: bool },
    SetOptions { name: String, options: Vec<(String, String)> },
    ChangeOwner { name: String, owner: String },
}

impl SubscriptionChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            SubscriptionChange::Create { .. } => ChangeOperation::Create,
            SubscriptionChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Subscription
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            SubscriptionChange::Create { subscription } => vec![subscription.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            SubscriptionChange::Create { .. } | SubscriptionChange::Drop { .. } => vec![],
            SubscriptionChange::SetConnection { name, .. }
            | SubscriptionChange::SetPublications { name, .. }
            | SubscriptionChange::SetEnabled { name, .. }
            | SubscriptionChange::SetOptions { name, .. }
            | SubscriptionChange::ChangeOwner { name, .. } => {
                vec![StableId::subscription(name)]
            }
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            SubscriptionChange::Drop { name } => vec![StableId::subscription(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            SubscriptionChange::Create { subscription } => {
                let publications: Vec<String> = subscription
                    .publications
                    .iter()
                    .map(|p| quote_ident(p))
                    .collect();
                let mut sql = format!(
                    "CREATE SUBSCRIPTION {} CONNECTION {} PUBLICATION {}",
                    quote_ident(&subscription.name),
                    quote_literal(&subscription.connection),
                    publications.join(", ")
                );
                let mut with = Vec::new();
                if !subscription.enabled {
                    with.push("enabled = false".to_string());
                }
                if let Some(slot) = &subscription.slot_name {
                    with.push(format!("slot_name = {}", quote_literal(slot)));
                }
                if let Some(commit) = &subscription.synchronous_commit {
                    with.push(format!("synchronous_commit = {}", quote_literal(commit)));
                }
                if subscription.binary {
                    with.push("binary = true".to_string());
                }
                if subscription.streaming {
                    with.push("streaming = true".to_string());
                }
                if subscription.two_phase {
                    with.push("two_phase = true".to_string());
                }
                if subscription.disable_on_error {
                    with.push("disable_on_error = true".to_string());
                }
                if !with.is_empty() {
                    sql.push_str(&format!(" WITH ({})", with.join(", ")));
                }
                sql
            }
            SubscriptionChange::Drop { name } => {
                format!("DROP SUBSCRIPTION {}", quote_ident(name))
            }
            SubscriptionChange::SetConnection { name, connection } => format!(
                "ALTER SUBSCRIPTION {} CONNECTION {}",
                quote_ident(name),
                quote_literal(connection)
            ),
            SubscriptionChange::SetPublications { name, publications } => {
                let publications: Vec<String> =
                    publications.iter().map(|p| quote_ident(p)).collect();
                format!(
                    "ALTER SUBSCRIPTION {} SET PUBLICATION {}",
                    quote_ident(name),
                    publications.join(", ")
                )
            }
            SubscriptionChange::SetEnabled { name, enabled } => format!(
                "ALTER SUBSCRIPTION {} {}",
                quote_ident(name),
                if *enabled { "ENABLE" } else { "DISABLE" }
            ),
            SubscriptionChange::SetOptions { name, options } => {
                let parts: Vec<String> = options
                    .iter()
                    .map(|(key, value)| format!("{key} = {value}"))
                    .collect();
                format!(
                    "ALTER SUBSCRIPTION {} SET ({})",
                    quote_ident(name),
                    parts.join(", ")
                )
            }
            SubscriptionChange::ChangeOwner { name, owner } => format!(
                "ALTER SUBSCRIPTION {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            SubscriptionChange::Create { subscription } => subscription.stable_id(),
            SubscriptionChange::Drop { name }
            | SubscriptionChange::SetConnection { name, .. }
            | SubscriptionChange::SetPublications { name, .. }
            | SubscriptionChange::SetEnabled { name, .. }
            | SubscriptionChange::SetOptions { name, .. }
            | SubscriptionChange::ChangeOwner { name, .. } => StableId::subscription(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignDataWrapperChange {
    Create { wrapper: ForeignDataWrapper },
    Drop { name: String },
    SetHandler { name: String, handler: Option<String> },
    SetValidator { name: String, validator: Option<String> },
    AlterOptions { name: String, delta: OptionsDelta },
    ChangeOwner { name: String, owner: String },
}

impl ForeignDataWrapperChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ForeignDataWrapperChange::Create { .. } => ChangeOperation::Create,
            ForeignDataWrapperChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::ForeignDataWrapper
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ForeignDataWrapperChange::Create { wrapper } => vec![wrapper.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            ForeignDataWrapperChange::Create { .. } | ForeignDataWrapperChange::Drop { .. } => {
                vec![]
            }
            ForeignDataWrapperChange::SetHandler { name, .. }
            | ForeignDataWrapperChange::SetValidator { name, .. }
            | ForeignDataWrapperChange::AlterOptions { name, .. }
            | ForeignDataWrapperChange::ChangeOwner { name, .. } => {
                vec![StableId::foreign_data_wrapper(name)]
            }
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ForeignDataWrapperChange::Drop { name } => {
                vec![StableId::foreign_data_wrapper(name)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ForeignDataWrapperChange::Create { wrapper } => {
                let mut sql =
                    format!("CREATE FOREIGN DATA WRAPPER {}", quote_ident(&wrapper.name));
                if let Some(handler) = &wrapper.handler {
                    sql.push_str(&format!(" HANDLER {handler}"));
                }
                if let Some(validator) = &wrapper.validator {
                    sql.push_str(&format!(" VALIDATOR {validator}"));
                }
                if !wrapper.options.is_empty() {
                    sql.push_str(&format!(" {}", options_clause(&wrapper.options)));
                }
                sql
            }
            ForeignDataWrapperChange::Drop { name } => {
                format!("DROP FOREIGN DATA WRAPPER {}", quote_ident(name))
            }
            ForeignDataWrapperChange::SetHandler { name, handler } => match handler {
                Some(handler) => format!(
                    "ALTER FOREIGN DATA WRAPPER {} HANDLER {handler}",
                    quote_ident(name)
                ),
                None => format!("ALTER FOREIGN DATA WRAPPER {} NO HANDLER", quote_ident(name)),
            },
            ForeignDataWrapperChange::SetValidator { name, validator } => match validator {
                Some(validator) => format!(
                    "ALTER FOREIGN DATA WRAPPER {} VALIDATOR {validator}",
                    quote_ident(name)
                ),
                None => {
                    format!("ALTER FOREIGN DATA WRAPPER {} NO VALIDATOR", quote_ident(name))
                }
            },
            ForeignDataWrapperChange::AlterOptions { name, delta } => format!(
                "ALTER FOREIGN DATA WRAPPER {} {}",
                quote_ident(name),
                delta.to_clause()
            ),
            ForeignDataWrapperChange::ChangeOwner { name, owner } => format!(
                "ALTER FOREIGN DATA WRAPPER {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ForeignDataWrapperChange::Create { wrapper } => wrapper.stable_id(),
            ForeignDataWrapperChange::Drop { name }
            | ForeignDataWrapperChange::SetHandler { name, .. }
            | ForeignDataWrapperChange::SetValidator { name, .. }
            | ForeignDataWrapperChange::AlterOptions { name, .. }
            | ForeignDataWrapperChange::ChangeOwner { name, .. } => {
                StableId::foreign_data_wrapper(name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignServerChange {
    Create { server: ForeignServer },
    Drop { name: String },
    SetVersion { name: String, version: Option<String> },
    AlterOptions { name: String, delta: OptionsDelta },
    ChangeOwner { name: String, owner: String },
}

impl ForeignServerChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ForeignServerChange::Create { .. } => ChangeOperation::Create,
            ForeignServerChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Server
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ForeignServerChange::Create { server } => vec![server.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            ForeignServerChange::Create { server } => {
                vec![StableId::foreign_data_wrapper(&server.wrapper)]
            }
            ForeignServerChange::SetVersion { name, .. }
            | ForeignServerChange::AlterOptions { name, .. }
            | ForeignServerChange::ChangeOwner { name, .. } => vec![StableId::server(name)],
            ForeignServerChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ForeignServerChange::Drop { name } => vec![StableId::server(name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ForeignServerChange::Create { server } => {
                let mut sql = format!("CREATE SERVER {}", quote_ident(&server.name));
                if let Some(server_type) = &server.server_type {
                    sql.push_str(&format!(" TYPE {}", quote_literal(server_type)));
                }
                if let Some(version) = &server.version {
                    sql.push_str(&format!(" VERSION {}", quote_literal(version)));
                }
                sql.push_str(&format!(
                    " FOREIGN DATA WRAPPER {}",
                    quote_ident(&server.wrapper)
                ));
                if !server.options.is_empty() {
                    sql.push_str(&format!(" {}", options_clause(&server.options)));
                }
                sql
            }
            ForeignServerChange::Drop { name } => format!("DROP SERVER {}", quote_ident(name)),
            ForeignServerChange::SetVersion { name, version } => match version {
                Some(version) => format!(
                    "ALTER SERVER {} VERSION {}",
                    quote_ident(name),
                    quote_literal(version)
                ),
                None => format!("ALTER SERVER {} VERSION NULL", quote_ident(name)),
            },
            ForeignServerChange::AlterOptions { name, delta } => {
                format!("ALTER SERVER {} {}", quote_ident(name), delta.to_clause())
            }
            ForeignServerChange::ChangeOwner { name, owner } => format!(
                "ALTER SERVER {} OWNER TO {}",
                quote_ident(name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ForeignServerChange::Create { server } => server.stable_id(),
            ForeignServerChange::Drop { name }
            | ForeignServerChange::SetVersion { name, .. }
            | ForeignServerChange::AlterOptions { name, .. }
            | ForeignServerChange::ChangeOwner { name, .. } => StableId::server(name),
        }
    }
}

fn mapping_user(user: &str) -> String {
    if user.eq_ignore_ascii_case("public") {
        "PUBLIC".to_string()
    } else {
        quote_ident(user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMappingChange {
    Create { mapping: UserMapping },
    Drop { server: String, user: String },
    AlterOptions { server: String, user: String, delta: OptionsDelta },
}

impl UserMappingChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            UserMappingChange::Create { .. } => ChangeOperation::Create,
            UserMappingChange::Drop { .. } => ChangeOperation::Drop,
            UserMappingChange::AlterOptions { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::UserMapping
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            UserMappingChange::Create { mapping } => vec![mapping.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            UserMappingChange::Create { mapping } => vec![StableId::server(&mapping.server)],
            UserMappingChange::AlterOptions { server, user, .. } => {
                vec![StableId::user_mapping(server, user)]
            }
            UserMappingChange::Drop { server, .. } => vec![StableId::server(server)],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            UserMappingChange::Drop { server, user } => {
                vec![StableId::user_mapping(server, user)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            UserMappingChange::Create { mapping } => {
                let mut sql = format!(
                    "CREATE USER MAPPING FOR {} SERVER {}",
                    mapping_user(&mapping.user),
                    quote_ident(&mapping.server)
                );
                if !mapping.options.is_empty() {
                    sql.push_str(&format!(" {}", options_clause(&mapping.options)));
                }
                sql
            }
            UserMappingChange::Drop { server, user } => format!(
                "DROP USER MAPPING FOR {} SERVER {}",
                mapping_user(user),
                quote_ident(server)
            ),
            UserMappingChange::AlterOptions { server, user, delta } => format!(
                "ALTER USER MAPPING FOR {} SERVER {} {}",
                mapping_user(user),
                quote_ident(server),
                delta.to_clause()
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            UserMappingChange::Create { mapping } => mapping.stable_id(),
            UserMappingChange::Drop { server, user }
            | UserMappingChange::AlterOptions { server, user, .. } => {
                StableId::user_mapping(server, user)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignTableChange {
    Create { table: ForeignTable },
    Drop { schema: String, name: String, columns: Vec<String> },
    AddColumn { schema: String, name: String, column: crate::model::Column },
    DropColumn { schema: String, name: String, column_name: String },
    AlterOptions { schema: String, name: String, delta: OptionsDelta },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl ForeignTableChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            ForeignTableChange::Create { .. } => ChangeOperation::Create,
            ForeignTableChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::ForeignTable
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            ForeignTableChange::Create { table } => {
                let mut ids = vec![table.stable_id()];
                ids.extend(
                    table
                        .columns
                        .iter()
                        .map(|c| StableId::column(&table.schema, &table.name, &c.name)),
                );
                ids
            }
            ForeignTableChange::AddColumn { schema, name, column } => {
                vec![StableId::column(schema, name, &column.name)]
            }
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            ForeignTableChange::Create { table } => {
                let mut ids = vec![StableId::server(&table.server)];
                if !is_builtin(ObjectKind::Schema, None, &table.schema) {
                    ids.push(StableId::schema(&table.schema));
                }
                ids
            }
            ForeignTableChange::AddColumn { schema, name, .. }
            | ForeignTableChange::DropColumn { schema, name, .. }
            | ForeignTableChange::AlterOptions { schema, name, .. }
            | ForeignTableChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::foreign_table(schema, name)]
            }
            ForeignTableChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            ForeignTableChange::Drop { schema, name, columns } => {
                let mut ids = vec![StableId::foreign_table(schema, name)];
                ids.extend(columns.iter().map(|c| StableId::column(schema, name, c)));
                ids
            }
            ForeignTableChange::DropColumn { schema, name, column_name } => {
                vec![StableId::column(schema, name, column_name)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            ForeignTableChange::Create { table } => {
                let mut columns: Vec<&crate::model::Column> = table.columns.iter().collect();
                columns.sort_by_key(|c| c.position);
                let column_defs: Vec<String> =
                    columns.iter().map(|c| column_definition(c)).collect();
                let mut sql = format!(
                    "CREATE FOREIGN TABLE {} (\n    {}\n) SERVER {}",
                    quote_qualified(&table.schema, &table.name),
                    column_defs.join(",\n    "),
                    quote_ident(&table.server)
                );
                if !table.options.is_empty() {
                    sql.push_str(&format!(" {}", options_clause(&table.options)));
                }
                sql
            }
            ForeignTableChange::Drop { schema, name, .. } => {
                format!("DROP FOREIGN TABLE {}", quote_qualified(schema, name))
            }
            ForeignTableChange::AddColumn { schema, name, column } => format!(
                "ALTER FOREIGN TABLE {} ADD COLUMN {}",
                quote_qualified(schema, name),
                column_definition(column)
            ),
            ForeignTableChange::DropColumn { schema, name, column_name } => format!(
                "ALTER FOREIGN TABLE {} DROP COLUMN {}",
                quote_qualified(schema, name),
                quote_ident(column_name)
            ),
            ForeignTableChange::AlterOptions { schema, name, delta } => format!(
                "ALTER FOREIGN TABLE {} {}",
                quote_qualified(schema, name),
                delta.to_clause()
            ),
            ForeignTableChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER FOREIGN TABLE {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            ForeignTableChange::Create { table } => table.stable_id(),
            ForeignTableChange::Drop { schema, name, .. }
            | ForeignTableChange::AddColumn { schema, name, .. }
            | ForeignTableChange::DropColumn { schema, name, .. }
            | ForeignTableChange::AlterOptions { schema, name, .. }
            | ForeignTableChange::ChangeOwner { schema, name, .. } => {
                StableId::foreign_table(schema, name)
            }
        }
    }
}
