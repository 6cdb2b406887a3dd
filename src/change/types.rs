//! Type and domain changes.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{is_builtin, ObjectKind, StableId};
use crate::model::{DomainConstraint, SchemaEntity, TypeDef, TypeVariant};
use crate::sql::{quote_ident, quote_literal, quote_qualified};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeChange {
    Create { type_def: TypeDef },
    Drop { schema: String, name: String },
    AddEnumLabel { schema: String, name: String, value: String },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl TypeChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            TypeChange::Create { .. } => ChangeOperation::Create,
            TypeChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Type
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            TypeChange::Create { type_def } => vec![type_def.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            TypeChange::Create { type_def } => {
                if is_builtin(ObjectKind::Schema, None, &type_def.schema) {
                    vec![]
                } else {
                    vec![StableId::schema(&type_def.schema)]
                }
            }
            TypeChange::AddEnumLabel { schema, name, .. }
            | TypeChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::type_(schema, name)]
            }
            TypeChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            TypeChange::Drop { schema, name } => vec![StableId::type_(schema, name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            TypeChange::Create { type_def } => {
                let qualified = quote_qualified(&type_def.schema, &type_def.name);
                match &type_def.variant {
                    TypeVariant::Composite { columns } => {
                        let attributes: Vec<String> = columns
                            .iter()
                            .map(|a| {
                                let mut sql =
                                    format!("{} {}", quote_ident(&a.name), a.data_type);
                                if let Some(collation) = &a.collation {
                                    sql.push_str(&format!(
                                        " COLLATE {}",
                                        quote_ident(collation)
                                    ));
                                }
                                sql
                            })
                            .collect();
                        format!(
                            "CREATE TYPE {} AS (\n    {}\n)",
                            qualified,
                            attributes.join(",\n    ")
                        )
                    }
                    TypeVariant::Enum { labels } => {
                        let values: Vec<String> =
                            labels.iter().map(|l| quote_literal(l)).collect();
                        format!("CREATE TYPE {} AS ENUM ({})", qualified, values.join(", "))
                    }
                    TypeVariant::Range {
                        subtype,
                        subtype_opclass,
                        collation,
                        canonical_function,
                        subtype_diff_function,
                        multirange_name,
                    } => {
                        let mut options = vec![format!("SUBTYPE = {subtype}")];
                        if let Some(opclass) = subtype_opclass {
                            options.push(format!("SUBTYPE_OPCLASS = {opclass}"));
                        }
                        if let Some(collation) = collation {
                            options.push(format!("COLLATION = {collation}"));
                        }
                        if let Some(canonical) = canonical_function {
                            options.push(format!("CANONICAL = {canonical}"));
                        }
                        if let Some(diff) = subtype_diff_function {
                            options.push(format!("SUBTYPE_DIFF = {diff}"));
                        }
                        if let Some(multirange) = multirange_name {
                            options.push(format!("MULTIRANGE_TYPE_NAME = {multirange}"));
                        }
                        format!("CREATE TYPE {} AS RANGE ({})", qualified, options.join(", "))
                    }
                    TypeVariant::Base {
                        input_function,
                        output_function,
                        internal_length,
                        alignment,
                        storage,
                    } => {
                        let mut options = vec![
                            format!("INPUT = {input_function}"),
                            format!("OUTPUT = {output_function}"),
                        ];
                        if let Some(length) = internal_length {
                            options.push(format!("INTERNALLENGTH = {length}"));
                        }
                        if let Some(alignment) = alignment {
                            options.push(format!("ALIGNMENT = {alignment}"));
                        }
                        if let Some(storage) = storage {
                            options.push(format!("STORAGE = {storage}"));
                        }
                        format!("CREATE TYPE {} ({})", qualified, options.join(", "))
                    }
                }
            }
            TypeChange::Drop { schema, name } => {
                format!("DROP TYPE {}", quote_qualified(schema, name))
            }
            TypeChange::AddEnumLabel { schema, name, value } => format!(
                "ALTER TYPE {} ADD VALUE {}",
                quote_qualified(schema, name),
                quote_literal(value)
            ),
            TypeChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER TYPE {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            TypeChange::Create { type_def } => type_def.stable_id(),
            TypeChange::Drop { schema, name }
            | TypeChange::AddEnumLabel { schema, name, .. }
            | TypeChange::ChangeOwner { schema, name, .. } => StableId::type_(schema, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainChange {
    Create { domain: crate::model::Domain },
    Drop { schema: String, name: String },
    SetDefault { schema: String, name: String, expression: Option<String> },
    SetNotNull { schema: String, name: String, not_null: bool },
    AddConstraint { schema: String, name: String, constraint: DomainConstraint },
    DropConstraint { schema: String, name: String, constraint_name: String },
    ChangeOwner { schema: String, name: String, owner: String },
}

impl DomainChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            DomainChange::Create { .. } => ChangeOperation::Create,
            DomainChange::Drop { .. } => ChangeOperation::Drop,
            _ => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Domain
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Object
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            DomainChange::Create { domain } => vec![domain.stable_id()],
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            DomainChange::Create { domain } => {
                let mut ids = Vec::new();
                if !is_builtin(ObjectKind::Schema, None, &domain.schema) {
                    ids.push(StableId::schema(&domain.schema));
                }
                let (type_schema, base) = match domain.base_type.split_once('.') {
                    Some((s, n)) => (s, n),
                    None => ("public", domain.base_type.as_str()),
                };
                if !is_builtin(ObjectKind::Type, Some(type_schema), base) {
                    ids.push(StableId::type_(type_schema, base));
                }
                ids
            }
            DomainChange::SetDefault { schema, name, .. }
            | DomainChange::SetNotNull { schema, name, .. }
            | DomainChange::AddConstraint { schema, name, .. }
            | DomainChange::DropConstraint { schema, name, .. }
            | DomainChange::ChangeOwner { schema, name, .. } => {
                vec![StableId::domain(schema, name)]
            }
            DomainChange::Drop { .. } => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            DomainChange::Drop { schema, name } => vec![StableId::domain(schema, name)],
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            DomainChange::Create { domain } => {
                let mut sql = format!(
                    "CREATE DOMAIN {} AS {}",
                    quote_qualified(&domain.schema, &domain.name),
                    domain.base_type
                );
                if let Some(collation) = &domain.collation {
                    sql.push_str(&format!(" COLLATE {}", quote_ident(collation)));
                }
                if let Some(default) = &domain.default {
                    sql.push_str(&format!(" DEFAULT {default}"));
                }
                if domain.not_null {
                    sql.push_str(" NOT NULL");
                }
                for constraint in &domain.constraints {
                    if let Some(name) = &constraint.name {
                        sql.push_str(&format!(" CONSTRAINT {}", quote_ident(name)));
                    }
                    sql.push_str(&format!(" {}", constraint.expression));
                }
                sql
            }
            DomainChange::Drop { schema, name } => {
                format!("DROP DOMAIN {}", quote_qualified(schema, name))
            }
            DomainChange::SetDefault { schema, name, expression } => match expression {
                Some(expr) => format!(
                    "ALTER DOMAIN {} SET DEFAULT {expr}",
                    quote_qualified(schema, name)
                ),
                None => format!("ALTER DOMAIN {} DROP DEFAULT", quote_qualified(schema, name)),
            },
            DomainChange::SetNotNull { schema, name, not_null } => format!(
                "ALTER DOMAIN {} {} NOT NULL",
                quote_qualified(schema, name),
                if *not_null { "SET" } else { "DROP" }
            ),
            DomainChange::AddConstraint { schema, name, constraint } => {
                let mut sql = format!("ALTER DOMAIN {} ADD", quote_qualified(schema, name));
                if let Some(constraint_name) = &constraint.name {
                    sql.push_str(&format!(" CONSTRAINT {}", quote_ident(constraint_name)));
                }
                sql.push_str(&format!(" {}", constraint.expression));
                sql
            }
            DomainChange::DropConstraint { schema, name, constraint_name } => format!(
                "ALTER DOMAIN {} DROP CONSTRAINT {}",
                quote_qualified(schema, name),
                quote_ident(constraint_name)
            ),
            DomainChange::ChangeOwner { schema, name, owner } => format!(
                "ALTER DOMAIN {} OWNER TO {}",
                quote_qualified(schema, name),
                quote_ident(owner)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            DomainChange::Create { domain } => domain.stable_id(),
            DomainChange::Drop { schema, name }
            | DomainChange::SetDefault { schema, name, .. }
            | DomainChange::SetNotNull { schema, name, .. }
            | DomainChange::AddConstraint { schema, name, .. }
            | DomainChange::DropConstraint { schema, name, .. }
            | DomainChange::ChangeOwner { schema, name, .. } => StableId::domain(schema, name),
        }
    }
}
