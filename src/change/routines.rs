//! Routine (function/procedure) and aggregate changes.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{is_builtin, ObjectKind, StableId};
use crate::model::{Aggregate, AggregateKind, ParallelSafety, Routine, RoutineKind, SchemaEntity};
use crate::sql::{normalize_create_head, quote_ident, quote_literal, quote_qualified};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineChange {
    Create {
        routine: Routine,
        or_replace: bool,
    },
    Drop {
        schema: String,
        name: String,
        arguments: String,
        kind: RoutineKind,
    },
    ChangeOwner {
        schema: String,
        name: String,
        arguments: String,
        kind: RoutineKind,
        owner: String,
    },
}

fn routine_keyword(kind: RoutineKind) -> &'static str {
    match kind {
        RoutineKind::Function => "FUNCTION",
        RoutineKind::Procedure => "PROCEDURE",
    }
}

fn routine_id(schema: &str, name: &str, arguments: &str, kind: RoutineKind) -> StableId {
    match kind {
        RoutineKind::Function => StableId::function(schema, name, arguments),
        RoutineKind::Procedure => StableId::procedure(schema, name, arguments),
    }
}

impl RoutineChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            RoutineChange::Create { .. } => ChangeOperation::Create,
            RoutineChange::Drop { .. } => ChangeOperation::Drop,
            RoutineChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self {
            RoutineChange::Create { routine, .. } => match routine.kind {
                RoutineKind::Function => ObjectKind::Function,
                RoutineKind::Procedure => ObjectKind::Procedure,
            },
            RoutineChange::Drop { kind, .. } | RoutineChange::ChangeOwner { kind, .. } => {
                match kind {
                    RoutineKind::Function => ObjectKind::Function,
                    RoutineKind::Procedure => ObjectKind::Procedure,
                }
            }
        }
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            RoutineChange::Create { routine, .. } => vec![routine.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            RoutineChange::Create { routine, .. } => {
                let mut ids = Vec::new();
                if !is_builtin(ObjectKind::Schema, None, &routine.schema) {
                    ids.push(StableId::schema(&routine.schema));
                }
                if !is_builtin(ObjectKind::Language, None, &routine.language) {
                    ids.push(StableId::language(&routine.language));
                }
                ids
            }
            RoutineChange::ChangeOwner { schema, name, arguments, kind, .. } => {
                vec![routine_id(schema, name, arguments, *kind)]
            }
            RoutineChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            RoutineChange::Drop { schema, name, arguments, kind } => {
                vec![routine_id(schema, name, arguments, *kind)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            // The stored definition is the complete statement the server
            // printed; only the head keywords are renormalized.
            RoutineChange::Create { routine, or_replace } => {
                normalize_create_head(&routine.definition, *or_replace)
            }
            RoutineChange::Drop { schema, name, arguments, kind } => format!(
                "DROP {} {}({arguments})",
                routine_keyword(*kind),
                quote_qualified(schema, name)
            ),
            RoutineChange::ChangeOwner { schema, name, arguments, kind, owner } => format!(
                "ALTER {} {}({arguments}) OWNER TO {}",
                routine_keyword(*kind),
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            RoutineChange::Create { routine, .. } => routine.stable_id(),
            RoutineChange::Drop { schema, name, arguments, kind }
            | RoutineChange::ChangeOwner { schema, name, arguments, kind, .. } => {
                routine_id(schema, name, arguments, *kind)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateChange {
    Create {
        aggregate: Aggregate,
    },
    Drop {
        schema: String,
        name: String,
        arguments: String,
    },
    ChangeOwner {
        schema: String,
        name: String,
        arguments: String,
        owner: String,
    },
}

impl AggregateChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            AggregateChange::Create { .. } => ChangeOperation::Create,
            AggregateChange::Drop { .. } => ChangeOperation::Drop,
            AggregateChange::ChangeOwner { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Aggregate
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            AggregateChange::Create { aggregate } => vec![aggregate.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            AggregateChange::Create { aggregate } => {
                let mut ids = Vec::new();
                if !is_builtin(ObjectKind::Schema, None, &aggregate.schema) {
                    ids.push(StableId::schema(&aggregate.schema));
                }
                // The transition function carries the real work; its id uses
                // the state type plus the aggregate's own argument types.
                if let Some(id) = function_reference(
                    &aggregate.transition_function,
                    &aggregate.state_data_type,
                    &aggregate.argument_types,
                ) {
                    ids.push(id);
                }
                ids
            }
            AggregateChange::ChangeOwner { schema, name, arguments, .. } => {
                vec![StableId::aggregate(schema, name, arguments)]
            }
            AggregateChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            AggregateChange::Drop { schema, name, arguments } => {
                vec![StableId::aggregate(schema, name, arguments)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            AggregateChange::Create { aggregate } => {
                let mut options = vec![
                    format!("SFUNC = {}", aggregate.transition_function),
                    format!("STYPE = {}", aggregate.state_data_type),
                ];
                if let Some(final_function) = &aggregate.final_function {
                    options.push(format!("FINALFUNC = {final_function}"));
                }
                // READ_ONLY is the default and stays implicit
                match aggregate.final_modify {
                    Some('s') => options.push("FINALFUNC_MODIFY = SHAREABLE".to_string()),
                    Some('w') => options.push("FINALFUNC_MODIFY = READ_WRITE".to_string()),
                    _ => {}
                }
                if let Some(combine) = &aggregate.combine_function {
                    options.push(format!("COMBINEFUNC = {combine}"));
                }
                if let Some(serial) = &aggregate.serial_function {
                    options.push(format!("SERIALFUNC = {serial}"));
                }
                if let Some(deserial) = &aggregate.deserial_function {
                    options.push(format!("DESERIALFUNC = {deserial}"));
                }
                if let Some(msfunc) = &aggregate.moving_transition_function {
                    options.push(format!("MSFUNC = {msfunc}"));
                }
                if let Some(minvfunc) = &aggregate.moving_inverse_function {
                    options.push(format!("MINVFUNC = {minvfunc}"));
                }
                if let Some(mstype) = &aggregate.moving_state_data_type {
                    options.push(format!("MSTYPE = {mstype}"));
                }
                if let Some(mfinalfunc) = &aggregate.moving_final_function {
                    options.push(format!("MFINALFUNC = {mfinalfunc}"));
                }
                if let Some(sortop) = &aggregate.sort_operator {
                    options.push(format!("SORTOP = OPERATOR({sortop})"));
                }
                if let Some(initcond) = &aggregate.initial_condition {
                    options.push(format!("INITCOND = {}", quote_literal(initcond)));
                }
                if let Some(minitcond) = &aggregate.moving_initial_condition {
                    options.push(format!("MINITCOND = {}", quote_literal(minitcond)));
                }
                match aggregate.parallel {
                    ParallelSafety::Unsafe => {}
                    ParallelSafety::Restricted => {
                        options.push("PARALLEL = RESTRICTED".to_string())
                    }
                    ParallelSafety::Safe => options.push("PARALLEL = SAFE".to_string()),
                }
                if aggregate.kind == AggregateKind::Hypothetical {
                    options.push("HYPOTHETICAL".to_string());
                }
                format!(
                    "CREATE AGGREGATE {}({}) (\n    {}\n)",
                    quote_qualified(&aggregate.schema, &aggregate.name),
                    aggregate.identity_arguments,
                    options.join(",\n    ")
                )
            }
            AggregateChange::Drop { schema, name, arguments } => format!(
                "DROP AGGREGATE {}({arguments})",
                quote_qualified(schema, name)
            ),
            AggregateChange::ChangeOwner { schema, name, arguments, owner } => format!(
                "ALTER AGGREGATE {}({arguments}) OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            AggregateChange::Create { aggregate } => aggregate.stable_id(),
            AggregateChange::Drop { schema, name, arguments }
            | AggregateChange::ChangeOwner { schema, name, arguments, .. } => {
                StableId::aggregate(schema, name, arguments)
            }
        }
    }
}

/// Id of a support function referenced by name from an aggregate: the
/// signature is the state type followed by the aggregate's arguments.
fn function_reference(
    name: &str,
    state_type: &str,
    argument_types: &[String],
) -> Option<StableId> {
    let (schema, base) = match name.split_once('.') {
        Some((s, n)) => (s.to_string(), n.to_string()),
        None => ("public".to_string(), name.to_string()),
    };
    if is_builtin(ObjectKind::Function, Some(&schema), &base) {
        return None;
    }
    let mut signature = vec![state_type.to_string()];
    signature.extend(argument_types.iter().cloned());
    Some(StableId::function(&schema, &base, &signature.join(",")))
}
