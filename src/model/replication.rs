//! Publications, subscriptions and the foreign-data family.

use serde::{Deserialize, Serialize};

use super::{AclEntry, SchemaEntity};
use crate::ident::StableId;
use crate::model::Column;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub all_tables: bool,
    #[serde(default = "super::objects::enabled_default")]
    pub publish_insert: bool,
    #[serde(default = "super::objects::enabled_default")]
    pub publish_update: bool,
    #[serde(default = "super::objects::enabled_default")]
    pub publish_delete: bool,
    #[serde(default = "super::objects::enabled_default")]
    pub publish_truncate: bool,
    #[serde(default)]
    pub publish_via_partition_root: bool,
    /// Empty when `all_tables` is set.
    #[serde(default)]
    pub tables: Vec<PublicationTable>,
    /// `FOR TABLES IN SCHEMA` entries.
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Publication {
    fn stable_id(&self) -> StableId {
        StableId::publication(&self.name)
    }
}

/// One table membership in a publication. Column list or row filter edits
/// replace the whole entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicationTable {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub row_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub owner: String,
    pub connection: String,
    pub publications: Vec<String>,
    #[serde(default = "super::objects::enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub slot_name: Option<String>,
    #[serde(default)]
    pub synchronous_commit: Option<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub two_phase: bool,
    #[serde(default)]
    pub disable_on_error: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Subscription {
    fn stable_id(&self) -> StableId {
        StableId::subscription(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignDataWrapper {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub validator: Option<String>,
    #[serde(default)]
    pub options: Vec<(String, String)>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for ForeignDataWrapper {
    fn stable_id(&self) -> StableId {
        StableId::foreign_data_wrapper(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignServer {
    pub name: String,
    pub owner: String,
    pub wrapper: String,
    #[serde(default)]
    pub server_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub options: Vec<(String, String)>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for ForeignServer {
    fn stable_id(&self) -> StableId {
        StableId::server(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMapping {
    pub server: String,
    /// Role name, or `PUBLIC`.
    pub user: String,
    #[serde(default)]
    pub options: Vec<(String, String)>,
}

impl SchemaEntity for UserMapping {
    fn stable_id(&self) -> StableId {
        StableId::user_mapping(&self.server, &self.user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignTable {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub server: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub options: Vec<(String, String)>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for ForeignTable {
    fn stable_id(&self) -> StableId {
        StableId::foreign_table(&self.schema, &self.name)
    }
}
