//! Differs for user-defined types and domains.

use super::{comment_diff, expressions_equal, partition, DiffContext};
use crate::change::{Change, DomainChange, SqlObjectRef, TypeChange};
use crate::model::{Domain, SchemaSnapshot, TypeDef, TypeVariant};

pub(super) fn diff_types(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.types, &branch.types);

    for type_def in parts.created {
        push_create_type(ctx, type_def, out);
    }
    for type_def in parts.dropped {
        out.push(
            TypeChange::Drop {
                schema: type_def.schema.clone(),
                name: type_def.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::Type {
            schema: new.schema.clone(),
            name: new.name.clone(),
        };

        if let Some(appended) = enum_appended_labels(&old.variant, &new.variant) {
            for value in appended {
                out.push(
                    TypeChange::AddEnumLabel {
                        schema: new.schema.clone(),
                        name: new.name.clone(),
                        value,
                    }
                    .into(),
                );
            }
        } else if old.variant != new.variant {
            // Composite attribute edits and every other structural change
            // have no reliable ALTER path across supported server versions
            out.push(
                TypeChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            push_create_type(ctx, new, out);
            continue;
        }

        if old.owner != new.owner {
            out.push(
                TypeChange::ChangeOwner {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target, &old.comment, &new.comment) {
            out.push(change);
        }
    }
}

/// `Some(labels)` when the only difference is new enum labels appended at
/// the end, which `ALTER TYPE … ADD VALUE` can express.
fn enum_appended_labels(old: &TypeVariant, new: &TypeVariant) -> Option<Vec<String>> {
    let (TypeVariant::Enum { labels: old_labels }, TypeVariant::Enum { labels: new_labels }) =
        (old, new)
    else {
        return None;
    };
    if old_labels == new_labels {
        return None;
    }
    if new_labels.len() > old_labels.len() && new_labels[..old_labels.len()] == old_labels[..] {
        Some(new_labels[old_labels.len()..].to_vec())
    } else {
        None
    }
}

fn push_create_type(ctx: &DiffContext, type_def: &TypeDef, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Type {
        schema: type_def.schema.clone(),
        name: type_def.name.clone(),
    };
    out.push(TypeChange::Create { type_def: type_def.clone() }.into());
    if type_def.owner != ctx.current_user {
        out.push(
            TypeChange::ChangeOwner {
                schema: type_def.schema.clone(),
                name: type_def.name.clone(),
                owner: type_def.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target, &None, &type_def.comment) {
        out.push(change);
    }
}

pub(super) fn diff_domains(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.domains, &branch.domains);

    for domain in parts.created {
        push_create_domain(ctx, domain, out);
    }
    for domain in parts.dropped {
        out.push(
            DomainChange::Drop {
                schema: domain.schema.clone(),
                name: domain.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        if old.base_type != new.base_type || old.collation != new.collation {
            out.push(
                DomainChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            push_create_domain(ctx, new, out);
            continue;
        }
        diff_domain_in_place(ctx, old, new, out);
    }
}

fn diff_domain_in_place(ctx: &DiffContext, old: &Domain, new: &Domain, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Domain {
        schema: new.schema.clone(),
        name: new.name.clone(),
    };

    let defaults_differ = match (&old.default, &new.default) {
        (Some(a), Some(b)) => !expressions_equal(a, b),
        (None, None) => false,
        _ => true,
    };
    if defaults_differ {
        out.push(
            DomainChange::SetDefault {
                schema: new.schema.clone(),
                name: new.name.clone(),
                expression: new.default.clone(),
            }
            .into(),
        );
    }
    if old.not_null != new.not_null {
        out.push(
            DomainChange::SetNotNull {
                schema: new.schema.clone(),
                name: new.name.clone(),
                not_null: new.not_null,
            }
            .into(),
        );
    }

    if old.constraints != new.constraints {
        // Unnamed check constraints cannot be dropped individually
        let removable = old
            .constraints
            .iter()
            .filter(|c| !new.constraints.contains(c))
            .all(|c| c.name.is_some());
        if !removable {
            out.push(
                DomainChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            push_create_domain(ctx, new, out);
            return;
        }
        for constraint in &old.constraints {
            if !new.constraints.contains(constraint) {
                out.push(
                    DomainChange::DropConstraint {
                        schema: new.schema.clone(),
                        name: new.name.clone(),
                        constraint_name: constraint.name.clone().unwrap_or_default(),
                    }
                    .into(),
                );
            }
        }
        for constraint in &new.constraints {
            if !old.constraints.contains(constraint) {
                out.push(
                    DomainChange::AddConstraint {
                        schema: new.schema.clone(),
                        name: new.name.clone(),
                        constraint: constraint.clone(),
                    }
                    .into(),
                );
            }
        }
    }

    if old.owner != new.owner {
        out.push(
            DomainChange::ChangeOwner {
                schema: new.schema.clone(),
                name: new.name.clone(),
                owner: new.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target, &old.comment, &new.comment) {
        out.push(change);
    }
}

fn push_create_domain(ctx: &DiffContext, domain: &Domain, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Domain {
        schema: domain.schema.clone(),
        name: domain.name.clone(),
    };
    out.push(DomainChange::Create { domain: domain.clone() }.into());
    if domain.owner != ctx.current_user {
        out.push(
            DomainChange::ChangeOwner {
                schema: domain.schema.clone(),
                name: domain.name.clone(),
                owner: domain.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target, &None, &domain.comment) {
        out.push(change);
    }
}
