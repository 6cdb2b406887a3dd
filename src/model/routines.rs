//! Functions, procedures and aggregates.

use serde::{Deserialize, Serialize};

use super::{AclEntry, SchemaEntity};
use crate::ident::StableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Function,
    Procedure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    #[default]
    Volatile,
    Stable,
    Immutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelSafety {
    #[default]
    Unsafe,
    Restricted,
    Safe,
}

/// A function or procedure. The `definition` field is the complete
/// `CREATE …` statement as the server prints it; serialization only
/// renormalizes the leading keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub schema: String,
    pub name: String,
    pub kind: RoutineKind,
    /// Identity argument list, e.g. `integer, text`.
    pub identity_arguments: String,
    #[serde(default)]
    pub return_type: Option<String>,
    pub language: String,
    #[serde(default)]
    pub volatility: Volatility,
    #[serde(default)]
    pub security_definer: bool,
    #[serde(default)]
    pub parallel: ParallelSafety,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub leakproof: bool,
    pub definition: String,
    #[serde(default)]
    pub argument_types: Vec<String>,
    pub owner: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for Routine {
    fn stable_id(&self) -> StableId {
        match self.kind {
            RoutineKind::Function => {
                StableId::function(&self.schema, &self.name, &self.identity_arguments)
            }
            RoutineKind::Procedure => {
                StableId::procedure(&self.schema, &self.name, &self.identity_arguments)
            }
        }
    }
}

/// `aggkind` from `pg_aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    #[default]
    Normal,
    Ordered,
    Hypothetical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub schema: String,
    pub name: String,
    pub identity_arguments: String,
    #[serde(default)]
    pub argument_types: Vec<String>,
    pub return_type: String,
    pub transition_function: String,
    pub state_data_type: String,
    #[serde(default)]
    pub final_function: Option<String>,
    /// `r` = read-only (the default, omitted on output), `s` = shareable,
    /// `w` = read-write.
    #[serde(default)]
    pub final_modify: Option<char>,
    #[serde(default)]
    pub combine_function: Option<String>,
    #[serde(default)]
    pub serial_function: Option<String>,
    #[serde(default)]
    pub deserial_function: Option<String>,
    #[serde(default)]
    pub moving_transition_function: Option<String>,
    #[serde(default)]
    pub moving_inverse_function: Option<String>,
    #[serde(default)]
    pub moving_state_data_type: Option<String>,
    #[serde(default)]
    pub moving_final_function: Option<String>,
    #[serde(default)]
    pub sort_operator: Option<String>,
    #[serde(default)]
    pub initial_condition: Option<String>,
    #[serde(default)]
    pub moving_initial_condition: Option<String>,
    #[serde(default)]
    pub parallel: ParallelSafety,
    #[serde(default)]
    pub kind: AggregateKind,
    pub owner: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub privileges: Vec<AclEntry>,
}

impl SchemaEntity for Aggregate {
    fn stable_id(&self) -> StableId {
        StableId::aggregate(&self.schema, &self.name, &self.identity_arguments)
    }
}
