//! Roles and default privileges.

use serde::{Deserialize, Serialize};

use super::{AclEntry, SchemaEntity};
use crate::ident::StableId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub superuser: bool,
    #[serde(default)]
    pub create_db: bool,
    #[serde(default)]
    pub create_role: bool,
    #[serde(default = "super::objects::enabled_default")]
    pub inherit: bool,
    #[serde(default)]
    pub login: bool,
    #[serde(default)]
    pub replication: bool,
    #[serde(default)]
    pub bypass_rls: bool,
    #[serde(default = "unlimited")]
    pub connection_limit: i32,
    #[serde(default)]
    pub valid_until: Option<String>,
    /// Roles this role is a member of.
    #[serde(default)]
    pub member_of: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn unlimited() -> i32 {
    -1
}

impl SchemaEntity for Role {
    fn stable_id(&self) -> StableId {
        StableId::role(&self.name)
    }
}

/// Object class targeted by `ALTER DEFAULT PRIVILEGES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAclObjects {
    Tables,
    Sequences,
    Functions,
    Types,
    Schemas,
}

impl DefaultAclObjects {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            DefaultAclObjects::Tables => "TABLES",
            DefaultAclObjects::Sequences => "SEQUENCES",
            DefaultAclObjects::Functions => "FUNCTIONS",
            DefaultAclObjects::Types => "TYPES",
            DefaultAclObjects::Schemas => "SCHEMAS",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            DefaultAclObjects::Tables => "tables",
            DefaultAclObjects::Sequences => "sequences",
            DefaultAclObjects::Functions => "functions",
            DefaultAclObjects::Types => "types",
            DefaultAclObjects::Schemas => "schemas",
        }
    }
}

/// The default privileges one role hands out for newly created objects of
/// one class, optionally scoped to a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPrivilege {
    pub role: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub objects: DefaultAclObjects,
    pub entries: Vec<AclEntry>,
}

impl SchemaEntity for DefaultPrivilege {
    fn stable_id(&self) -> StableId {
        StableId::default_acl(&self.role, self.schema.as_deref(), self.objects.key())
    }
}
