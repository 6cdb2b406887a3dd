//! User-defined types, domains and collations.

use serde::{Deserialize, Serialize};

use super::SchemaEntity;
use crate::ident::StableId;

/// One user-defined type, discriminated the way `pg_type.typtype` does it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub schema: String,
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub variant: TypeVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "typtype")]
pub enum TypeVariant {
    Composite {
        columns: Vec<TypeAttribute>,
    },
    Enum {
        /// In declared sort order; order matters for comparisons.
        labels: Vec<String>,
    },
    Range {
        subtype: String,
        #[serde(default)]
        subtype_opclass: Option<String>,
        #[serde(default)]
        collation: Option<String>,
        #[serde(default)]
        canonical_function: Option<String>,
        #[serde(default)]
        subtype_diff_function: Option<String>,
        #[serde(default)]
        multirange_name: Option<String>,
    },
    Base {
        input_function: String,
        output_function: String,
        #[serde(default)]
        internal_length: Option<i32>,
        #[serde(default)]
        alignment: Option<String>,
        #[serde(default)]
        storage: Option<String>,
    },
}

impl SchemaEntity for TypeDef {
    fn stable_id(&self) -> StableId {
        StableId::type_(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAttribute {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub base_type: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub collation: Option<String>,
    /// In declared order.
    #[serde(default)]
    pub constraints: Vec<DomainConstraint>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SchemaEntity for Domain {
    fn stable_id(&self) -> StableId {
        StableId::domain(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConstraint {
    #[serde(default)]
    pub name: Option<String>,
    /// `CHECK (…)` body including the keyword.
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollationProvider {
    Default,
    Libc,
    Icu,
    Builtin,
}

impl CollationProvider {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            CollationProvider::Default => "default",
            CollationProvider::Libc => "libc",
            CollationProvider::Icu => "icu",
            CollationProvider::Builtin => "builtin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collation {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub provider: CollationProvider,
    #[serde(default = "default_true")]
    pub is_deterministic: bool,
    #[serde(default)]
    pub encoding: Option<i32>,
    #[serde(default)]
    pub collate: Option<String>,
    #[serde(default)]
    pub ctype: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub icu_rules: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}

impl SchemaEntity for Collation {
    fn stable_id(&self) -> StableId {
        StableId::collation(&self.schema, &self.name)
    }
}
