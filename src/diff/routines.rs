//! Differs for routines and aggregates.

use super::{acl_diff, comment_diff, expressions_equal, grant_changes, partition, DiffContext};
use crate::change::{AggregateChange, Change, RoutineChange, SqlObjectRef};
use crate::model::{Aggregate, Routine, RoutineKind, SchemaSnapshot};

fn routine_ref(routine: &Routine) -> SqlObjectRef {
    match routine.kind {
        RoutineKind::Function => SqlObjectRef::Function {
            schema: routine.schema.clone(),
            name: routine.name.clone(),
            arguments: routine.identity_arguments.clone(),
        },
        RoutineKind::Procedure => SqlObjectRef::Procedure {
            schema: routine.schema.clone(),
            name: routine.name.clone(),
            arguments: routine.identity_arguments.clone(),
        },
    }
}

pub(super) fn diff_routines(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.routines, &branch.routines);

    for routine in parts.created {
        push_create_routine(ctx, routine, false, out);
    }
    for routine in parts.dropped {
        out.push(drop_routine_change(routine));
    }
    for (old, new) in parts.altered {
        // The replace form cannot change what the routine returns
        let return_changed = old.return_type != new.return_type;
        if return_changed {
            out.push(drop_routine_change(old));
            push_create_routine(ctx, new, false, out);
            continue;
        }

        let body_changed = !expressions_equal(&old.definition, &new.definition)
            || old.language != new.language
            || old.volatility != new.volatility
            || old.security_definer != new.security_definer
            || old.parallel != new.parallel
            || old.strict != new.strict
            || old.leakproof != new.leakproof;
        if body_changed {
            out.push(
                RoutineChange::Create {
                    routine: new.clone(),
                    or_replace: true,
                }
                .into(),
            );
        }

        let target = routine_ref(new);
        if old.owner != new.owner {
            out.push(
                RoutineChange::ChangeOwner {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    arguments: new.identity_arguments.clone(),
                    kind: new.kind,
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target.clone(), &old.comment, &new.comment) {
            out.push(change);
        }
        out.extend(acl_diff(&target, &old.privileges, &new.privileges));
    }
}

fn drop_routine_change(routine: &Routine) -> Change {
    RoutineChange::Drop {
        schema: routine.schema.clone(),
        name: routine.name.clone(),
        arguments: routine.identity_arguments.clone(),
        kind: routine.kind,
    }
    .into()
}

fn push_create_routine(
    ctx: &DiffContext,
    routine: &Routine,
    or_replace: bool,
    out: &mut Vec<Change>,
) {
    let target = routine_ref(routine);
    out.push(
        RoutineChange::Create {
            routine: routine.clone(),
            or_replace,
        }
        .into(),
    );
    if routine.owner != ctx.current_user {
        out.push(
            RoutineChange::ChangeOwner {
                schema: routine.schema.clone(),
                name: routine.name.clone(),
                arguments: routine.identity_arguments.clone(),
                kind: routine.kind,
                owner: routine.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &routine.comment) {
        out.push(change);
    }
    out.extend(grant_changes(&target, &routine.privileges));
}

pub(super) fn diff_aggregates(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.aggregates, &branch.aggregates);

    for aggregate in parts.created {
        push_create_aggregate(ctx, aggregate, out);
    }
    for aggregate in parts.dropped {
        out.push(
            AggregateChange::Drop {
                schema: aggregate.schema.clone(),
                name: aggregate.name.clone(),
                arguments: aggregate.identity_arguments.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::Aggregate {
            schema: new.schema.clone(),
            name: new.name.clone(),
            arguments: new.identity_arguments.clone(),
        };

        let mut data_old = old.clone();
        let mut data_new = new.clone();
        for agg in [&mut data_old, &mut data_new] {
            agg.owner = String::new();
            agg.comment = None;
            agg.privileges = vec![];
        }

        // There is no replace form for aggregates; any body change,
        // return-type changes included, is a recreate
        if data_old != data_new {
            out.push(
                AggregateChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                    arguments: old.identity_arguments.clone(),
                }
                .into(),
            );
            push_create_aggregate(ctx, new, out);
            continue;
        }
        if old.owner != new.owner {
            out.push(
                AggregateChange::ChangeOwner {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    arguments: new.identity_arguments.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target.clone(), &old.comment, &new.comment) {
            out.push(change);
        }
        out.extend(acl_diff(&target, &old.privileges, &new.privileges));
    }
}

fn push_create_aggregate(ctx: &DiffContext, aggregate: &Aggregate, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Aggregate {
        schema: aggregate.schema.clone(),
        name: aggregate.name.clone(),
        arguments: aggregate.identity_arguments.clone(),
    };
    out.push(AggregateChange::Create { aggregate: aggregate.clone() }.into());
    if aggregate.owner != ctx.current_user {
        out.push(
            AggregateChange::ChangeOwner {
                schema: aggregate.schema.clone(),
                name: aggregate.name.clone(),
                arguments: aggregate.identity_arguments.clone(),
                owner: aggregate.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &aggregate.comment) {
        out.push(change);
    }
    out.extend(grant_changes(&target, &aggregate.privileges));
}
