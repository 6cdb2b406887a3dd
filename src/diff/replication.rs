//! Differs for publications, subscriptions and the foreign-data family.

use std::collections::BTreeMap;

use super::{acl_diff, comment_diff, grant_changes, partition, DiffContext};
use crate::change::{
    Change, ForeignDataWrapperChange, ForeignServerChange, ForeignTableChange, OptionsDelta,
    PublicationChange, SqlObjectRef, SubscriptionChange, UserMappingChange,
};
use crate::model::{ForeignTable, Publication, SchemaSnapshot, Subscription};

pub(super) fn diff_publications(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.publications, &branch.publications);

    for publication in parts.created {
        push_create_publication(ctx, publication, out);
    }
    for publication in parts.dropped {
        out.push(PublicationChange::Drop { name: publication.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        // Moving between FOR ALL TABLES and an explicit list does not
        // round-trip through ALTER; recreate
        if old.all_tables != new.all_tables {
            out.push(PublicationChange::Drop { name: old.name.clone() }.into());
            push_create_publication(ctx, new, out);
            continue;
        }
        diff_publication_in_place(old, new, out);
    }
}

fn push_create_publication(ctx: &DiffContext, publication: &Publication, out: &mut Vec<Change>) {
    out.push(PublicationChange::Create { publication: publication.clone() }.into());
    if publication.owner != ctx.current_user {
        out.push(
            PublicationChange::ChangeOwner {
                name: publication.name.clone(),
                owner: publication.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(
        SqlObjectRef::Publication { name: publication.name.clone() },
        &None,
        &publication.comment,
    ) {
        out.push(change);
    }
}

fn diff_publication_in_place(old: &Publication, new: &Publication, out: &mut Vec<Change>) {
    // Tables are keyed by (schema, name); a changed column list or row
    // filter replaces that entry
    let old_tables: BTreeMap<(String, String), &crate::model::PublicationTable> = old
        .tables
        .iter()
        .map(|t| ((t.schema.clone(), t.name.clone()), t))
        .collect();
    let new_tables: BTreeMap<(String, String), &crate::model::PublicationTable> = new
        .tables
        .iter()
        .map(|t| ((t.schema.clone(), t.name.clone()), t))
        .collect();

    let mut added = Vec::new();
    let mut removed = Vec::new();
    for (key, table) in &new_tables {
        match old_tables.get(key) {
            None => added.push((*table).clone()),
            Some(old_table) if old_table != table => {
                removed.push((key.0.clone(), key.1.clone()));
                added.push((*table).clone());
            }
            Some(_) => {}
        }
    }
    for (key, _) in &old_tables {
        if !new_tables.contains_key(key) {
            removed.push((key.0.clone(), key.1.clone()));
        }
    }
    if !removed.is_empty() {
        out.push(
            PublicationChange::DropTables {
                name: new.name.clone(),
                tables: removed,
            }
            .into(),
        );
    }
    if !added.is_empty() {
        out.push(
            PublicationChange::AddTables {
                name: new.name.clone(),
                tables: added,
            }
            .into(),
        );
    }

    let added_schemas: Vec<String> = new
        .schemas
        .iter()
        .filter(|s| !old.schemas.contains(s))
        .cloned()
        .collect();
    let removed_schemas: Vec<String> = old
        .schemas
        .iter()
        .filter(|s| !new.schemas.contains(s))
        .cloned()
        .collect();
    if !removed_schemas.is_empty() {
        out.push(
            PublicationChange::DropSchemas {
                name: new.name.clone(),
                schemas: removed_schemas,
            }
            .into(),
        );
    }
    if !added_schemas.is_empty() {
        out.push(
            PublicationChange::AddSchemas {
                name: new.name.clone(),
                schemas: added_schemas,
            }
            .into(),
        );
    }

    let publish_changed = old.publish_insert != new.publish_insert
        || old.publish_update != new.publish_update
        || old.publish_delete != new.publish_delete
        || old.publish_truncate != new.publish_truncate;
    let via_root_changed = old.publish_via_partition_root != new.publish_via_partition_root;
    if publish_changed || via_root_changed {
        let mut operations = Vec::new();
        if new.publish_insert {
            operations.push("insert");
        }
        if new.publish_update {
            operations.push("update");
        }
        if new.publish_delete {
            operations.push("delete");
        }
        if new.publish_truncate {
            operations.push("truncate");
        }
        out.push(
            PublicationChange::SetOptions {
                name: new.name.clone(),
                publish: publish_changed.then(|| operations.join(", ")),
                publish_via_partition_root: via_root_changed
                    .then_some(new.publish_via_partition_root),
            }
            .into(),
        );
    }

    if old.owner != new.owner {
        out.push(
            PublicationChange::ChangeOwner {
                name: new.name.clone(),
                owner: new.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(
        SqlObjectRef::Publication { name: new.name.clone() },
        &old.comment,
        &new.comment,
    ) {
        out.push(change);
    }
}

pub(super) fn diff_subscriptions(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.subscriptions, &branch.subscriptions);

    for subscription in parts.created {
        push_create_subscription(ctx, subscription, out);
    }
    for subscription in parts.dropped {
        out.push(SubscriptionChange::Drop { name: subscription.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        // two_phase only exists at creation time
        if old.two_phase != new.two_phase {
            out.push(SubscriptionChange::Drop { name: old.name.clone() }.into());
            push_create_subscription(ctx, new, out);
            continue;
        }

        if old.connection != new.connection {
            out.push(
                SubscriptionChange::SetConnection {
                    name: new.name.clone(),
                    connection: new.connection.clone(),
                }
                .into(),
            );
        }
        if old.publications != new.publications {
            out.push(
                SubscriptionChange::SetPublications {
                    name: new.name.clone(),
                    publications: new.publications.clone(),
                }
                .into(),
            );
        }
        let mut options: Vec<(String, String)> = Vec::new();
        if old.slot_name != new.slot_name {
            options.push((
                "slot_name".to_string(),
                new.slot_name.clone().unwrap_or_else(|| "NONE".to_string()),
            ));
        }
        if old.synchronous_commit != new.synchronous_commit {
            if let Some(commit) = &new.synchronous_commit {
                options.push(("synchronous_commit".to_string(), format!("'{commit}'")));
            }
        }
        if old.binary != new.binary {
            options.push(("binary".to_string(), new.binary.to_string()));
        }
        if old.streaming != new.streaming {
            options.push(("streaming".to_string(), new.streaming.to_string()));
        }
        if old.disable_on_error != new.disable_on_error {
            options.push((
                "disable_on_error".to_string(),
                new.disable_on_error.to_string(),
            ));
        }
        if !options.is_empty() {
            out.push(
                SubscriptionChange::SetOptions {
                    name: new.name.clone(),
                    options,
                }
                .into(),
            );
        }
        if old.enabled != new.enabled {
            out.push(
                SubscriptionChange::SetEnabled {
                    name: new.name.clone(),
                    enabled: new.enabled,
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                SubscriptionChange::ChangeOwner {
                    name: new.name.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Subscription { name: new.name.clone() },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

fn push_create_subscription(
    ctx: &DiffContext,
    subscription: &Subscription,
    out: &mut Vec<Change>,
) {
    out.push(SubscriptionChange::Create { subscription: subscription.clone() }.into());
    if subscription.owner != ctx.current_user {
        out.push(
            SubscriptionChange::ChangeOwner {
                name: subscription.name.clone(),
                owner: subscription.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(
        SqlObjectRef::Subscription { name: subscription.name.clone() },
        &None,
        &subscription.comment,
    ) {
        out.push(change);
    }
}

pub(super) fn diff_foreign_data_wrappers(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.foreign_data_wrappers, &branch.foreign_data_wrappers);

    for wrapper in parts.created {
        let target = SqlObjectRef::ForeignDataWrapper { name: wrapper.name.clone() };
        out.push(ForeignDataWrapperChange::Create { wrapper: wrapper.clone() }.into());
        if wrapper.owner != ctx.current_user {
            out.push(
                ForeignDataWrapperChange::ChangeOwner {
                    name: wrapper.name.clone(),
                    owner: wrapper.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target.clone(), &None, &wrapper.comment) {
            out.push(change);
        }
        out.extend(grant_changes(&target, &wrapper.privileges));
    }
    for wrapper in parts.dropped {
        out.push(ForeignDataWrapperChange::Drop { name: wrapper.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::ForeignDataWrapper { name: new.name.clone() };
        if old.handler != new.handler {
            out.push(
                ForeignDataWrapperChange::SetHandler {
                    name: new.name.clone(),
                    handler: new.handler.clone(),
                }
                .into(),
            );
        }
        if old.validator != new.validator {
            out.push(
                ForeignDataWrapperChange::SetValidator {
                    name: new.name.clone(),
                    validator: new.validator.clone(),
                }
                .into(),
            );
        }
        let delta = OptionsDelta::between(&old.options, &new.options);
        if !delta.is_empty() {
            out.push(
                ForeignDataWrapperChange::AlterOptions {
                    name: new.name.clone(),
                    delta,
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                ForeignDataWrapperChange::ChangeOwner {
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

pub(super) fn diff_foreign_servers(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.foreign_servers, &branch.foreign_servers);

    for server in parts.created {
        push_create_server(ctx, server, out);
    }
    for server in parts.dropped {
        out.push(ForeignServerChange::Drop { name: server.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::Server { name: new.name.clone() };
        // Wrapper and TYPE are fixed at creation
        if old.wrapper != new.wrapper || old.server_type != new.server_type {
            out.push(ForeignServerChange::Drop { name: old.name.clone() }.into());
            push_create_server(ctx, new, out);
            continue;
        }
        if old.version != new.version {
            out.push(
                ForeignServerChange::SetVersion {
                    name: new.name.clone(),
                    version: new.version.clone(),
                }
                .into(),
            );
        }
        let delta = OptionsDelta::between(&old.options, &new.options);
        if !delta.is_empty() {
            out.push(
                ForeignServerChange::AlterOptions {
                    name: new.name.clone(),
                    delta,
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                ForeignServerChange::ChangeOwner {
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

fn push_create_server(
    ctx: &DiffContext,
    server: &crate::model::ForeignServer,
    out: &mut Vec<Change>,
) {
    let target = SqlObjectRef::Server { name: server.name.clone() };
    out.push(ForeignServerChange::Create { server: server.clone() }.into());
    if server.owner != ctx.current_user {
        out.push(
            ForeignServerChange::ChangeOwner {
                name: server.name.clone(),
                owner: server.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &server.comment) {
        out.push(change);
    }
    out.extend(grant_changes(&target, &server.privileges));
}

pub(super) fn diff_user_mappings(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.user_mappings, &branch.user_mappings);

    for mapping in parts.created {
        out.push(UserMappingChange::Create { mapping: mapping.clone() }.into());
    }
    for mapping in parts.dropped {
        out.push(
            UserMappingChange::Drop {
                server: mapping.server.clone(),
                user: mapping.user.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let delta = OptionsDelta::between(&old.options, &new.options);
        if !delta.is_empty() {
            out.push(
                UserMappingChange::AlterOptions {
                    server: new.server.clone(),
                    user: new.user.clone(),
                    delta,
                }
                .into(),
            );
        }
    }
}

pub(super) fn diff_foreign_tables(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.foreign_tables, &branch.foreign_tables);

    for table in parts.created {
        push_create_foreign_table(ctx, table, out);
    }
    for table in parts.dropped {
        out.push(
            ForeignTableChange::Drop {
                schema: table.schema.clone(),
                name: table.name.clone(),
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::ForeignTable {
            schema: new.schema.clone(),
            name: new.name.clone(),
        };
        if old.server != new.server {
            out.push(
                ForeignTableChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                    columns: old.columns.iter().map(|c| c.name.clone()).collect(),
                }
                .into(),
            );
            push_create_foreign_table(ctx, new, out);
            continue;
        }

        for column in &new.columns {
            let old_column = old.columns.iter().find(|c| c.name == column.name);
            match old_column {
                None => out.push(
                    ForeignTableChange::AddColumn {
                        schema: new.schema.clone(),
                        name: new.name.clone(),
                        column: column.clone(),
                    }
                    .into(),
                ),
                Some(old_column) if old_column != column => {
                    out.push(
                        ForeignTableChange::DropColumn {
                            schema: new.schema.clone(),
                            name: new.name.clone(),
                            column_name: column.name.clone(),
                        }
                        .into(),
                    );
                    out.push(
                        ForeignTableChange::AddColumn {
                            schema: new.schema.clone(),
                            name: new.name.clone(),
                            column: column.clone(),
                        }
                        .into(),
                    );
                }
                Some(_) => {}
            }
        }
        for column in &old.columns {
            if !new.columns.iter().any(|c| c.name == column.name) {
                out.push(
                    ForeignTableChange::DropColumn {
                        schema: new.schema.clone(),
                        name: new.name.clone(),
                        column_name: column.name.clone(),
                    }
                    .into(),
                );
            }
        }

        let delta = OptionsDelta::between(&old.options, &new.options);
        if !delta.is_empty() {
            out.push(
                ForeignTableChange::AlterOptions {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    delta,
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                ForeignTableChange::ChangeOwner {
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

fn push_create_foreign_table(ctx: &DiffContext, table: &ForeignTable, out: &mut Vec<Change>) {
    let target = SqlObjectRef::ForeignTable {
        schema: table.schema.clone(),
        name: table.name.clone(),
    };
    out.push(ForeignTableChange::Create { table: table.clone() }.into());
    if table.owner != ctx.current_user {
        out.push(
            ForeignTableChange::ChangeOwner {
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
    out.extend(grant_changes(&target, &table.privileges));
}
