//! Differs for tables (with their columns), constraints, indexes and
//! materialized views.

use super::{
    acl_diff, comment_diff, expressions_equal, grant_changes, partition, DiffContext,
};
use crate::change::{
    Change, ColumnAlteration, ConstraintChange, IndexChange, MaterializedViewChange, TableChange,
};
use crate::change::SqlObjectRef;
use crate::model::{Column, ColumnGenerated, Constraint, MaterializedView, SchemaSnapshot, Table};

pub(super) fn diff_tables(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.tables, &branch.tables);

    for table in parts.created {
        push_create_table(ctx, table, out);
    }

    for table in parts.dropped {
        out.push(drop_table_change(table));
    }

    for (old, new) in parts.altered {
        // Partitioning topology cannot be changed in place
        if old.partition_by != new.partition_by {
            out.push(drop_table_change(old));
            push_create_table(ctx, new, out);
            continue;
        }
        diff_table_in_place(ctx, old, new, out);
    }
}

fn drop_table_change(table: &Table) -> Change {
    TableChange::Drop {
        schema: table.schema.clone(),
        name: table.name.clone(),
        columns: table.columns.iter().map(|c| c.name.clone()).collect(),
    }
    .into()
}

fn push_create_table(ctx: &DiffContext, table: &Table, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Table {
        schema: table.schema.clone(),
        name: table.name.clone(),
    };

    out.push(TableChange::Create { table: table.clone() }.into());
    if table.rls_enabled {
        out.push(
            TableChange::SetRowLevelSecurity {
                schema: table.schema.clone(),
                name: table.name.clone(),
                enabled: true,
            }
            .into(),
        );
    }
    if table.replica_identity != Default::default() {
        out.push(
            TableChange::SetReplicaIdentity {
                schema: table.schema.clone(),
                name: table.name.clone(),
                identity: table.replica_identity.clone(),
            }
            .into(),
        );
    }
    if table.owner != ctx.current_user {
        out.push(
            TableChange::ChangeOwner {
                schema: table.schema.clone(),
                name: table.name.clone(),
                owner: table.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &table.comment) {
        out.push(change);
    }
    for column in &table.columns {
        let column_target = SqlObjectRef::Column {
            schema: table.schema.clone(),
            table: table.name.clone(),
            name: column.name.clone(),
        };
        if let Some(change) = comment_diff(column_target, &None, &column.comment) {
            out.push(change);
        }
    }
    out.extend(grant_changes(&target, &table.privileges));
}

fn diff_table_in_place(_ctx: &DiffContext, old: &Table, new: &Table, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Table {
        schema: new.schema.clone(),
        name: new.name.clone(),
    };

    diff_columns(old, new, out);

    if old.rls_enabled != new.rls_enabled {
        out.push(
            TableChange::SetRowLevelSecurity {
                schema: new.schema.clone(),
                name: new.name.clone(),
                enabled: new.rls_enabled,
            }
            .into(),
        );
    }
    if old.replica_identity != new.replica_identity {
        out.push(
            TableChange::SetReplicaIdentity {
                schema: new.schema.clone(),
                name: new.name.clone(),
                identity: new.replica_identity.clone(),
            }
            .into(),
        );
    }
    if old.options != new.options && !new.options.is_empty() {
        out.push(
            TableChange::SetOptions {
                schema: new.schema.clone(),
                name: new.name.clone(),
                options: new.options.clone(),
            }
            .into(),
        );
    }
    if old.owner != new.owner {
        out.push(
            TableChange::ChangeOwner {
                schema: new.schema.clone(),
                name: new.name.clone(),
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

/// True when the owning table exists in `main` but not in `branch`, i.e.
/// a table drop will cascade over the dependent object.
pub(super) fn table_is_dropped(
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    schema: &str,
    table: &str,
) -> bool {
    let id = crate::ident::StableId::table(schema, table);
    main.tables.contains_key(&id) && !branch.tables.contains_key(&id)
}

/// Column diff is keyed by name; a renamed column is a drop plus an add
/// because snapshots carry no identity across names.
fn diff_columns(old: &Table, new: &Table, out: &mut Vec<Change>) {
    for column in &new.columns {
        if old.column(&column.name).is_none() {
            out.push(
                TableChange::AddColumn {
                    schema: new.schema.clone(),
                    table: new.name.clone(),
                    column: column.clone(),
                }
                .into(),
            );
            let column_target = SqlObjectRef::Column {
                schema: new.schema.clone(),
                table: new.name.clone(),
                name: column.name.clone(),
            };
            if let Some(change) = comment_diff(column_target, &None, &column.comment) {
                out.push(change);
            }
        }
    }

    for column in &old.columns {
        if new.column(&column.name).is_none() {
            out.push(
                TableChange::DropColumn {
                    schema: new.schema.clone(),
                    table: new.name.clone(),
                    name: column.name.clone(),
                }
                .into(),
            );
        }
    }

    for new_column in &new.columns {
        let Some(old_column) = old.column(&new_column.name) else {
            continue;
        };
        diff_one_column(new, old_column, new_column, out);
    }
}

fn diff_one_column(table: &Table, old: &Column, new: &Column, out: &mut Vec<Change>) {
    // A generation change has no ALTER form; replace the column
    if old.generated != new.generated {
        out.push(
            TableChange::DropColumn {
                schema: table.schema.clone(),
                table: table.name.clone(),
                name: new.name.clone(),
            }
            .into(),
        );
        out.push(
            TableChange::AddColumn {
                schema: table.schema.clone(),
                table: table.name.clone(),
                column: new.clone(),
            }
            .into(),
        );
        return;
    }

    let mut alter = |alteration: ColumnAlteration| {
        out.push(
            TableChange::AlterColumn {
                schema: table.schema.clone(),
                table: table.name.clone(),
                name: new.name.clone(),
                alteration,
            }
            .into(),
        );
    };

    let type_changed = !old.data_type.eq_ignore_ascii_case(&new.data_type);
    if type_changed || old.collation != new.collation {
        alter(ColumnAlteration::SetType {
            data_type: new.data_type.clone(),
            collation: new.collation.clone(),
        });
    }

    if old.not_null != new.not_null {
        if new.not_null {
            alter(ColumnAlteration::SetNotNull);
        } else {
            alter(ColumnAlteration::DropNotNull);
        }
    }

    if new.generated == ColumnGenerated::None {
        let defaults_differ = match (&old.default, &new.default) {
            (Some(a), Some(b)) => !expressions_equal(a, b),
            (None, None) => false,
            _ => true,
        };
        if defaults_differ {
            match &new.default {
                Some(expression) => alter(ColumnAlteration::SetDefault {
                    expression: expression.clone(),
                }),
                None => alter(ColumnAlteration::DropDefault),
            }
        }
    }

    if old.identity != new.identity {
        use crate::model::ColumnIdentity;
        match (old.identity, new.identity) {
            (ColumnIdentity::None, identity) => alter(ColumnAlteration::AddIdentity { identity }),
            (_, ColumnIdentity::None) => alter(ColumnAlteration::DropIdentity),
            (_, identity) => alter(ColumnAlteration::SetIdentity { identity }),
        }
    }

    let column_target = SqlObjectRef::Column {
        schema: table.schema.clone(),
        table: table.name.clone(),
        name: new.name.clone(),
    };
    if let Some(change) = comment_diff(column_target, &old.comment, &new.comment) {
        out.push(change);
    }
}

pub(super) fn diff_constraints(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.constraints, &branch.constraints);

    for constraint in parts.created {
        push_add_constraint(constraint, out);
    }
    for constraint in parts.dropped {
        if table_is_dropped(main, branch, &constraint.schema, &constraint.table) {
            // The table drop cascades over its constraints
            continue;
        }
        out.push(drop_constraint_change(constraint));
    }
    for (old, new) in parts.altered {
        if !expressions_equal(&old.definition, &new.definition) || old.kind != new.kind {
            out.push(drop_constraint_change(old));
            push_add_constraint(new, out);
        } else if let Some(change) = comment_diff(
            SqlObjectRef::Constraint {
                schema: new.schema.clone(),
                table: new.table.clone(),
                name: new.name.clone(),
            },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

fn push_add_constraint(constraint: &Constraint, out: &mut Vec<Change>) {
    out.push(ConstraintChange::Add { constraint: constraint.clone() }.into());
    if let Some(change) = comment_diff(
        SqlObjectRef::Constraint {
            schema: constraint.schema.clone(),
            table: constraint.table.clone(),
            name: constraint.name.clone(),
        },
        &None,
        &constraint.comment,
    ) {
        out.push(change);
    }
}

fn drop_constraint_change(constraint: &Constraint) -> Change {
    ConstraintChange::Drop {
        schema: constraint.schema.clone(),
        table: constraint.table.clone(),
        name: constraint.name.clone(),
    }
    .into()
}

pub(super) fn diff_indexes(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.indexes, &branch.indexes);

    for index in parts.created {
        out.push(IndexChange::Create { index: index.clone() }.into());
        if let Some(change) = comment_diff(
            SqlObjectRef::Index {
                schema: index.schema.clone(),
                name: index.name.clone(),
            },
            &None,
            &index.comment,
        ) {
            out.push(change);
        }
    }
    for index in parts.dropped {
        if table_is_dropped(main, branch, &index.schema, &index.table) {
            continue;
        }
        out.push(
            IndexChange::Drop {
                schema: index.schema.clone(),
                table: index.table.clone(),
                name: index.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        if !expressions_equal(&old.definition, &new.definition) {
            out.push(
                IndexChange::Drop {
                    schema: old.schema.clone(),
                    table: old.table.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            out.push(IndexChange::Create { index: new.clone() }.into());
            if let Some(change) = comment_diff(
                SqlObjectRef::Index {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                },
                &None,
                &new.comment,
            ) {
                out.push(change);
            }
        } else if let Some(change) = comment_diff(
            SqlObjectRef::Index {
                schema: new.schema.clone(),
                name: new.name.clone(),
            },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

pub(super) fn diff_materialized_views(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.materialized_views, &branch.materialized_views);

    for view in parts.created {
        push_create_materialized_view(ctx, view, out);
    }
    for view in parts.dropped {
        out.push(
            MaterializedViewChange::Drop {
                schema: view.schema.clone(),
                name: view.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::MaterializedView {
            schema: new.schema.clone(),
            name: new.name.clone(),
        };
        if !expressions_equal(&old.definition, &new.definition) || old.columns != new.columns {
            // No in-place redefinition for materialized views; recreate and
            // replay the indexes that live on it
            out.push(
                MaterializedViewChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            push_create_materialized_view(ctx, new, out);
            for index in branch.indexes.values() {
                if index.schema == new.schema && index.table == new.name {
                    out.push(IndexChange::Create { index: index.clone() }.into());
                }
            }
            continue;
        }
        if old.owner != new.owner {
            out.push(
                MaterializedViewChange::ChangeOwner {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
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

fn push_create_materialized_view(
    ctx: &DiffContext,
    view: &MaterializedView,
    out: &mut Vec<Change>,
) {
    let target = SqlObjectRef::MaterializedView {
        schema: view.schema.clone(),
        name: view.name.clone(),
    };
    out.push(MaterializedViewChange::Create { view: view.clone() }.into());
    if view.owner != ctx.current_user {
        out.push(
            MaterializedViewChange::ChangeOwner {
                schema: view.schema.clone(),
                name: view.name.clone(),
                owner: view.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &view.comment) {
        out.push(change);
    }
    out.extend(grant_changes(&target, &view.privileges));
}
