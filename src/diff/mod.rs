//! The diff engine: per-kind comparison of two snapshots into change lists.
//!
//! Every differ is a pure function over id-keyed maps. Ids are partitioned
//! into created (branch only), dropped (main only) and altered (present in
//! both, data fields differ); snapshots iterate in id order, so output is
//! deterministic regardless of how the snapshots were built.

use std::collections::BTreeMap;

use crate::change::{AclChange, Change, CommentChange, SqlObjectRef};
use crate::ident::StableId;
use crate::model::{AclEntry, SchemaSnapshot};

mod acl;
mod objects;
mod replication;
mod routines;
mod tables;
mod types;

#[cfg(test)]
mod tests;

/// Ambient facts the differs need beyond the two snapshots.
#[derive(Debug, Clone)]
pub struct DiffContext {
    /// Objects created by this user don't need an explicit owner change.
    pub current_user: String,
    /// Server version number, e.g. `150004`.
    pub server_version: u32,
}

impl Default for DiffContext {
    fn default() -> Self {
        Self {
            current_user: "postgres".to_string(),
            server_version: 150000,
        }
    }
}

pub(crate) struct Partitioned<'a, E> {
    pub created: Vec<&'a E>,
    pub dropped: Vec<&'a E>,
    /// `(old, new)` pairs whose data fields differ.
    pub altered: Vec<(&'a E, &'a E)>,
}

pub(crate) fn partition<'a, E: PartialEq>(
    main: &'a BTreeMap<StableId, E>,
    branch: &'a BTreeMap<StableId, E>,
) -> Partitioned<'a, E> {
    let mut result = Partitioned {
        created: vec![],
        dropped: vec![],
        altered: vec![],
    };

    for (id, new) in branch {
        match main.get(id) {
            None => result.created.push(new),
            Some(old) if old != new => result.altered.push((old, new)),
            Some(_) => {}
        }
    }
    for (id, old) in main {
        if !branch.contains_key(id) {
            result.dropped.push(old);
        }
    }
    result
}

/// Comment transitions: set, replace and unset all serialize to a single
/// `COMMENT ON` statement.
pub(crate) fn comment_diff(
    target: SqlObjectRef,
    old: &Option<String>,
    new: &Option<String>,
) -> Option<Change> {
    if old == new {
        return None;
    }
    Some(
        CommentChange {
            target,
            comment: new.clone(),
        }
        .into(),
    )
}

/// Grants for a freshly created object, one change per
/// `(grantee, grantable)` group so no group mixes grant-option flags.
pub(crate) fn grant_changes(target: &SqlObjectRef, entries: &[AclEntry]) -> Vec<Change> {
    let mut groups: BTreeMap<(String, bool), Vec<String>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry((entry.grantee.clone(), entry.grantable))
            .or_default()
            .push(entry.privilege.clone());
    }

    groups
        .into_iter()
        .map(|((grantee, grantable), mut privileges)| {
            privileges.sort();
            privileges.dedup();
            AclChange::Grant {
                target: target.clone(),
                grantee,
                privileges,
                grantable,
            }
            .into()
        })
        .collect()
}

/// Privilege set difference with the grant-option flip rules:
/// `grantable` turning on is a fresh `GRANT … WITH GRANT OPTION`, turning
/// off is `REVOKE GRANT OPTION FOR …` keeping the base privilege.
pub(crate) fn acl_diff(target: &SqlObjectRef, old: &[AclEntry], new: &[AclEntry]) -> Vec<Change> {
    let old_flags: BTreeMap<(String, String), bool> = old
        .iter()
        .map(|e| ((e.grantee.clone(), e.privilege.clone()), e.grantable))
        .collect();
    let new_flags: BTreeMap<(String, String), bool> = new
        .iter()
        .map(|e| ((e.grantee.clone(), e.privilege.clone()), e.grantable))
        .collect();

    let mut grants: BTreeMap<(String, bool), Vec<String>> = BTreeMap::new();
    let mut revokes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut option_revokes: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for ((grantee, privilege), grantable) in &new_flags {
        match old_flags.get(&(grantee.clone(), privilege.clone())) {
            None => grants
                .entry((grantee.clone(), *grantable))
                .or_default()
                .push(privilege.clone()),
            Some(old_grantable) if !old_grantable && *grantable => grants
                .entry((grantee.clone(), true))
                .or_default()
                .push(privilege.clone()),
            Some(old_grantable) if *old_grantable && !grantable => option_revokes
                .entry(grantee.clone())
                .or_default()
                .push(privilege.clone()),
            Some(_) => {}
        }
    }
    for (grantee, privilege) in old_flags.keys() {
        if !new_flags.contains_key(&(grantee.clone(), privilege.clone())) {
            revokes
                .entry(grantee.clone())
                .or_default()
                .push(privilege.clone());
        }
    }

    let mut changes: Vec<Change> = Vec::new();
    for ((grantee, grantable), mut privileges) in grants {
        privileges.sort();
        changes.push(
            AclChange::Grant {
                target: target.clone(),
                grantee,
                privileges,
                grantable,
            }
            .into(),
        );
    }
    for (grantee, mut privileges) in option_revokes {
        privileges.sort();
        changes.push(
            AclChange::RevokeGrantOption {
                target: target.clone(),
                grantee,
                privileges,
            }
            .into(),
        );
    }
    for (grantee, mut privileges) in revokes {
        privileges.sort();
        changes.push(
            AclChange::Revoke {
                target: target.clone(),
                grantee,
                privileges,
            }
            .into(),
        );
    }
    changes
}

/// Whitespace/case-insensitive comparison for SQL expression fields that
/// the server may have reformatted.
pub(crate) fn normalize_expression(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(" (", "(")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(") ", ")")
}

pub(crate) fn expressions_equal(a: &str, b: &str) -> bool {
    normalize_expression(a) == normalize_expression(b)
}

/// Compare the full state of two databases. The output is unordered with
/// respect to dependencies; feed it to the planner.
pub fn compute_schema_diff(
    ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
) -> Vec<Change> {
    let mut changes = Vec::new();

    objects::diff_schemas(ctx, main, branch, &mut changes);
    objects::diff_extensions(ctx, main, branch, &mut changes);
    objects::diff_languages(ctx, main, branch, &mut changes);
    objects::diff_collations(ctx, main, branch, &mut changes);
    types::diff_types(ctx, main, branch, &mut changes);
    types::diff_domains(ctx, main, branch, &mut changes);
    objects::diff_sequences(ctx, main, branch, &mut changes);
    tables::diff_tables(ctx, main, branch, &mut changes);
    tables::diff_constraints(ctx, main, branch, &mut changes);
    tables::diff_indexes(ctx, main, branch, &mut changes);
    routines::diff_routines(ctx, main, branch, &mut changes);
    routines::diff_aggregates(ctx, main, branch, &mut changes);
    objects::diff_views(ctx, main, branch, &mut changes);
    tables::diff_materialized_views(ctx, main, branch, &mut changes);
    objects::diff_rules(ctx, main, branch, &mut changes);
    objects::diff_triggers(ctx, main, branch, &mut changes);
    objects::diff_event_triggers(ctx, main, branch, &mut changes);
    objects::diff_policies(ctx, main, branch, &mut changes);
    replication::diff_publications(ctx, main, branch, &mut changes);
    replication::diff_subscriptions(ctx, main, branch, &mut changes);
    replication::diff_foreign_data_wrappers(ctx, main, branch, &mut changes);
    replication::diff_foreign_servers(ctx, main, branch, &mut changes);
    replication::diff_user_mappings(ctx, main, branch, &mut changes);
    replication::diff_foreign_tables(ctx, main, branch, &mut changes);
    acl::diff_roles(ctx, main, branch, &mut changes);
    acl::diff_default_privileges(ctx, main, branch, &mut changes);

    changes
}
