//! Differs for schemas, extensions, languages, collations, sequences,
//! views, rules, triggers, event triggers and policies.

use super::tables::table_is_dropped;
use super::{acl_diff, comment_diff, expressions_equal, grant_changes, partition, DiffContext};
use crate::change::{
    Change, CollationChange, EventTriggerChange, ExtensionChange, LanguageChange, PolicyChange,
    RuleChange, SchemaChange, SequenceChange, SequenceOptions, SqlObjectRef, TriggerChange,
    ViewChange,
};
use crate::model::{SchemaSnapshot, Sequence, View};

pub(super) fn diff_schemas(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.schemas, &branch.schemas);

    for schema in parts.created {
        let target = SqlObjectRef::Schema { name: schema.name.clone() };
        out.push(SchemaChange::Create { name: schema.name.clone() }.into());
        if schema.owner != ctx.current_user {
            out.push(
                SchemaChange::ChangeOwner {
                    name: schema.name.clone(),
                    owner: schema.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target.clone(), &None, &schema.comment) {
            out.push(change);
        }
        out.extend(grant_changes(&target, &schema.privileges));
    }

    for schema in parts.dropped {
        out.push(SchemaChange::Drop { name: schema.name.clone() }.into());
    }

    for (old, new) in parts.altered {
        let target = SqlObjectRef::Schema { name: new.name.clone() };
        if old.owner != new.owner {
            out.push(
                SchemaChange::ChangeOwner {
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

pub(super) fn diff_extensions(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.extensions, &branch.extensions);

    for extension in parts.created {
        let target = SqlObjectRef::Extension { name: extension.name.clone() };
        out.push(ExtensionChange::Create { extension: extension.clone() }.into());
        if let Some(change) = comment_diff(target, &None, &extension.comment) {
            out.push(change);
        }
    }
    for extension in parts.dropped {
        out.push(ExtensionChange::Drop { name: extension.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        if old.schema != new.schema {
            if let Some(schema) = &new.schema {
                out.push(
                    ExtensionChange::SetSchema {
                        name: new.name.clone(),
                        schema: schema.clone(),
                    }
                    .into(),
                );
            }
        }
        if old.version != new.version {
            out.push(
                ExtensionChange::UpdateVersion {
                    name: new.name.clone(),
                    version: new.version.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Extension { name: new.name.clone() },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

pub(super) fn diff_languages(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.languages, &branch.languages);

    for language in parts.created {
        let target = SqlObjectRef::Language { name: language.name.clone() };
        out.push(LanguageChange::Create { language: language.clone() }.into());
        if language.owner != ctx.current_user {
            out.push(
                LanguageChange::ChangeOwner {
                    name: language.name.clone(),
                    owner: language.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(target, &None, &language.comment) {
            out.push(change);
        }
    }
    for language in parts.dropped {
        out.push(LanguageChange::Drop { name: language.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        if old.trusted != new.trusted {
            // Trust level has no ALTER form
            out.push(LanguageChange::Drop { name: old.name.clone() }.into());
            out.push(LanguageChange::Create { language: new.clone() }.into());
            continue;
        }
        if old.owner != new.owner {
            out.push(
                LanguageChange::ChangeOwner {
                    name: new.name.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Language { name: new.name.clone() },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

pub(super) fn diff_collations(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.collations, &branch.collations);

    for collation in parts.created {
        out.push(CollationChange::Create { collation: collation.clone() }.into());
        if collation.owner != ctx.current_user {
            out.push(
                CollationChange::ChangeOwner {
                    schema: collation.schema.clone(),
                    name: collation.name.clone(),
                    owner: collation.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Collation {
                schema: collation.schema.clone(),
                name: collation.name.clone(),
            },
            &None,
            &collation.comment,
        ) {
            out.push(change);
        }
    }
    for collation in parts.dropped {
        out.push(
            CollationChange::Drop {
                schema: collation.schema.clone(),
                name: collation.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let mut data_old = old.clone();
        let mut data_new = new.clone();
        data_old.version = None;
        data_new.version = None;
        data_old.owner = String::new();
        data_new.owner = String::new();
        data_old.comment = None;
        data_new.comment = None;

        if data_old != data_new {
            // Locale and provider properties only exist at creation time
            out.push(
                CollationChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            out.push(CollationChange::Create { collation: new.clone() }.into());
            continue;
        }
        if old.version != new.version {
            out.push(
                CollationChange::RefreshVersion {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                CollationChange::ChangeOwner {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Collation {
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

pub(super) fn diff_sequences(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.sequences, &branch.sequences);

    for sequence in parts.created {
        push_create_sequence(ctx, sequence, out);
    }
    for sequence in parts.dropped {
        out.push(
            SequenceChange::Drop {
                schema: sequence.schema.clone(),
                name: sequence.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::Sequence {
            schema: new.schema.clone(),
            name: new.name.clone(),
        };
        let options = SequenceOptions {
            data_type: (old.data_type != new.data_type).then(|| new.data_type.clone()),
            start: (old.start != new.start).then_some(new.start),
            min_value: (old.min_value != new.min_value).then_some(new.min_value),
            max_value: (old.max_value != new.max_value).then_some(new.max_value),
            increment: (old.increment != new.increment).then_some(new.increment),
            cycle: (old.cycle != new.cycle).then_some(new.cycle),
            cache: (old.cache != new.cache).then_some(new.cache),
        };
        if !options.is_empty() {
            out.push(
                SequenceChange::SetOptions {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    options,
                }
                .into(),
            );
        }
        if old.owned_by != new.owned_by {
            out.push(
                SequenceChange::SetOwnedBy {
                    schema: new.schema.clone(),
                    name: new.name.clone(),
                    owned_by: new.owned_by.clone(),
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                SequenceChange::ChangeOwner {
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

fn push_create_sequence(ctx: &DiffContext, sequence: &Sequence, out: &mut Vec<Change>) {
    let target = SqlObjectRef::Sequence {
        schema: sequence.schema.clone(),
        name: sequence.name.clone(),
    };
    out.push(SequenceChange::Create { sequence: sequence.clone() }.into());
    if sequence.owned_by.is_some() {
        out.push(
            SequenceChange::SetOwnedBy {
                schema: sequence.schema.clone(),
                name: sequence.name.clone(),
                owned_by: sequence.owned_by.clone(),
            }
            .into(),
        );
    }
    if sequence.owner != ctx.current_user {
        out.push(
            SequenceChange::ChangeOwner {
                schema: sequence.schema.clone(),
                name: sequence.name.clone(),
                owner: sequence.owner.clone(),
            }
            .into(),
        );
    }
    if let Some(change) = comment_diff(target.clone(), &None, &sequence.comment) {
        out.push(change);
    }
    out.extend(grant_changes(&target, &sequence.privileges));
}

pub(super) fn diff_views(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.views, &branch.views);

    for view in parts.created {
        push_create_view(ctx, view, out);
    }
    for view in parts.dropped {
        out.push(
            ViewChange::Drop {
                schema: view.schema.clone(),
                name: view.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let target = SqlObjectRef::View {
            schema: new.schema.clone(),
            name: new.name.clone(),
        };
        let body_changed = !expressions_equal(&old.definition, &new.definition)
            || old.options != new.options
            || old.check_option != new.check_option;
        if body_changed {
            // The replace form cannot drop or retype output columns, so the
            // safe path is recreate
            out.push(
                ViewChange::Drop {
                    schema: old.schema.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            push_create_view(ctx, new, out);
            continue;
        }
        if old.owner != new.owner {
            out.push(
                ViewChange::ChangeOwner {
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

fn push_create_view(ctx: &DiffContext, view: &View, out: &mut Vec<Change>) {
    let target = SqlObjectRef::View {
        schema: view.schema.clone(),
        name: view.name.clone(),
    };
    out.push(
        ViewChange::Create {
            view: view.clone(),
            or_replace: false,
        }
        .into(),
    );
    if view.owner != ctx.current_user {
        out.push(
            ViewChange::ChangeOwner {
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

pub(super) fn diff_rules(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.rules, &branch.rules);

    for rule in parts.created {
        out.push(RuleChange::Create { rule: rule.clone() }.into());
        if let Some(change) = comment_diff(
            SqlObjectRef::Rule {
                schema: rule.schema.clone(),
                table: rule.table.clone(),
                name: rule.name.clone(),
            },
            &None,
            &rule.comment,
        ) {
            out.push(change);
        }
    }
    for rule in parts.dropped {
        if table_is_dropped(main, branch, &rule.schema, &rule.table) {
            continue;
        }
        out.push(
            RuleChange::Drop {
                schema: rule.schema.clone(),
                table: rule.table.clone(),
                name: rule.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        if !expressions_equal(&old.definition, &new.definition) {
            out.push(
                RuleChange::Drop {
                    schema: old.schema.clone(),
                    table: old.table.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            out.push(RuleChange::Create { rule: new.clone() }.into());
        } else if let Some(change) = comment_diff(
            SqlObjectRef::Rule {
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

pub(super) fn diff_triggers(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.triggers, &branch.triggers);

    for trigger in parts.created {
        out.push(TriggerChange::Create { trigger: trigger.clone() }.into());
        if let Some(change) = comment_diff(
            SqlObjectRef::Trigger {
                schema: trigger.schema.clone(),
                table: trigger.table.clone(),
                name: trigger.name.clone(),
            },
            &None,
            &trigger.comment,
        ) {
            out.push(change);
        }
    }
    for trigger in parts.dropped {
        if table_is_dropped(main, branch, &trigger.schema, &trigger.table) {
            continue;
        }
        out.push(
            TriggerChange::Drop {
                schema: trigger.schema.clone(),
                table: trigger.table.clone(),
                name: trigger.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        if !expressions_equal(&old.definition, &new.definition) {
            out.push(
                TriggerChange::Drop {
                    schema: old.schema.clone(),
                    table: old.table.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            out.push(TriggerChange::Create { trigger: new.clone() }.into());
        } else if let Some(change) = comment_diff(
            SqlObjectRef::Trigger {
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

pub(super) fn diff_event_triggers(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.event_triggers, &branch.event_triggers);

    for trigger in parts.created {
        out.push(EventTriggerChange::Create { trigger: trigger.clone() }.into());
        if !trigger.enabled {
            out.push(
                EventTriggerChange::SetEnabled {
                    name: trigger.name.clone(),
                    enabled: false,
                }
                .into(),
            );
        }
        if trigger.owner != ctx.current_user {
            out.push(
                EventTriggerChange::ChangeOwner {
                    name: trigger.name.clone(),
                    owner: trigger.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::EventTrigger { name: trigger.name.clone() },
            &None,
            &trigger.comment,
        ) {
            out.push(change);
        }
    }
    for trigger in parts.dropped {
        out.push(EventTriggerChange::Drop { name: trigger.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        let body_changed = old.event != new.event
            || old.tags != new.tags
            || old.function_schema != new.function_schema
            || old.function_name != new.function_name;
        if body_changed {
            out.push(EventTriggerChange::Drop { name: old.name.clone() }.into());
            out.push(EventTriggerChange::Create { trigger: new.clone() }.into());
            if !new.enabled {
                out.push(
                    EventTriggerChange::SetEnabled {
                        name: new.name.clone(),
                        enabled: false,
                    }
                    .into(),
                );
            }
            continue;
        }
        if old.enabled != new.enabled {
            out.push(
                EventTriggerChange::SetEnabled {
                    name: new.name.clone(),
                    enabled: new.enabled,
                }
                .into(),
            );
        }
        if old.owner != new.owner {
            out.push(
                EventTriggerChange::ChangeOwner {
                    name: new.name.clone(),
                    owner: new.owner.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::EventTrigger { name: new.name.clone() },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

pub(super) fn diff_policies(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.policies, &branch.policies);

    for policy in parts.created {
        out.push(PolicyChange::Create { policy: policy.clone() }.into());
        if let Some(change) = comment_diff(
            SqlObjectRef::Policy {
                schema: policy.schema.clone(),
                table: policy.table.clone(),
                name: policy.name.clone(),
            },
            &None,
            &policy.comment,
        ) {
            out.push(change);
        }
    }
    for policy in parts.dropped {
        if table_is_dropped(main, branch, &policy.schema, &policy.table) {
            continue;
        }
        out.push(
            PolicyChange::Drop {
                schema: policy.schema.clone(),
                table: policy.table.clone(),
                name: policy.name.clone(),
            }
            .into(),
        );
    }
    for (old, new) in parts.altered {
        let mut data_old = old.clone();
        let mut data_new = new.clone();
        data_old.comment = None;
        data_new.comment = None;
        if data_old != data_new {
            // Policies have ALTER POLICY, but it cannot change command or
            // permissiveness; recreate covers every case
            out.push(
                PolicyChange::Drop {
                    schema: old.schema.clone(),
                    table: old.table.clone(),
                    name: old.name.clone(),
                }
                .into(),
            );
            out.push(PolicyChange::Create { policy: new.clone() }.into());
        } else if let Some(change) = comment_diff(
            SqlObjectRef::Policy {
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
