//! Differs for roles and default privileges.

use std::collections::BTreeMap;

use super::{comment_diff, partition, DiffContext};
use crate::change::{Change, DefaultAclChange, RoleChange, SqlObjectRef};
use crate::model::{DefaultPrivilege, Role, SchemaSnapshot};

pub(super) fn diff_roles(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.roles, &branch.roles);

    for role in parts.created {
        out.push(RoleChange::Create { role: role.clone() }.into());
        for parent in &role.member_of {
            out.push(
                RoleChange::GrantMembership {
                    role: parent.clone(),
                    member: role.name.clone(),
                }
                .into(),
            );
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Role { name: role.name.clone() },
            &None,
            &role.comment,
        ) {
            out.push(change);
        }
    }
    for role in parts.dropped {
        out.push(RoleChange::Drop { name: role.name.clone() }.into());
    }
    for (old, new) in parts.altered {
        if flags_differ(old, new) {
            out.push(RoleChange::Alter { role: new.clone() }.into());
        }
        for parent in &new.member_of {
            if !old.member_of.contains(parent) {
                out.push(
                    RoleChange::GrantMembership {
                        role: parent.clone(),
                        member: new.name.clone(),
                    }
                    .into(),
                );
            }
        }
        for parent in &old.member_of {
            if !new.member_of.contains(parent) {
                out.push(
                    RoleChange::RevokeMembership {
                        role: parent.clone(),
                        member: new.name.clone(),
                    }
                    .into(),
                );
            }
        }
        if let Some(change) = comment_diff(
            SqlObjectRef::Role { name: new.name.clone() },
            &old.comment,
            &new.comment,
        ) {
            out.push(change);
        }
    }
}

fn flags_differ(old: &Role, new: &Role) -> bool {
    old.superuser != new.superuser
        || old.create_db != new.create_db
        || old.create_role != new.create_role
        || old.inherit != new.inherit
        || old.login != new.login
        || old.replication != new.replication
        || old.bypass_rls != new.bypass_rls
        || old.connection_limit != new.connection_limit
        || old.valid_until != new.valid_until
}

pub(super) fn diff_default_privileges(
    _ctx: &DiffContext,
    main: &SchemaSnapshot,
    branch: &SchemaSnapshot,
    out: &mut Vec<Change>,
) {
    let parts = partition(&main.default_privileges, &branch.default_privileges);

    for group in parts.created {
        push_default_grants(group, out);
    }
    for group in parts.dropped {
        push_default_revokes(group, out);
    }
    for (old, new) in parts.altered {
        // ALTER DEFAULT PRIVILEGES has no replace form; revoke what left,
        // grant what arrived
        let old_entries: BTreeMap<(String, String), bool> = old
            .entries
            .iter()
            .map(|e| ((e.grantee.clone(), e.privilege.clone()), e.grantable))
            .collect();
        let new_entries: BTreeMap<(String, String), bool> = new
            .entries
            .iter()
            .map(|e| ((e.grantee.clone(), e.privilege.clone()), e.grantable))
            .collect();

        let mut revokes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut grants: BTreeMap<(String, bool), Vec<String>> = BTreeMap::new();

        for ((grantee, privilege), grantable) in &new_entries {
            match old_entries.get(&(grantee.clone(), privilege.clone())) {
                Some(old_grantable) if old_grantable == grantable => {}
                Some(_) => {
                    revokes.entry(grantee.clone()).or_default().push(privilege.clone());
                    grants
                        .entry((grantee.clone(), *grantable))
                        .or_default()
                        .push(privilege.clone());
                }
                None => grants
                    .entry((grantee.clone(), *grantable))
                    .or_default()
                    .push(privilege.clone()),
            }
        }
        for (grantee, privilege) in old_entries.keys() {
            if !new_entries.contains_key(&(grantee.clone(), privilege.clone())) {
                revokes.entry(grantee.clone()).or_default().push(privilege.clone());
            }
        }

        for (grantee, mut privileges) in revokes {
            privileges.sort();
            privileges.dedup();
            out.push(
                DefaultAclChange::Revoke {
                    role: new.role.clone(),
                    schema: new.schema.clone(),
                    objects: new.objects,
                    grantee,
                    privileges,
                }
                .into(),
            );
        }
        for ((grantee, grantable), mut privileges) in grants {
            privileges.sort();
            out.push(
                DefaultAclChange::Grant {
                    role: new.role.clone(),
                    schema: new.schema.clone(),
                    objects: new.objects,
                    grantee,
                    privileges,
                    grantable,
                }
                .into(),
            );
        }
    }
}

fn push_default_grants(group: &DefaultPrivilege, out: &mut Vec<Change>) {
    let mut grants: BTreeMap<(String, bool), Vec<String>> = BTreeMap::new();
    for entry in &group.entries {
        grants
            .entry((entry.grantee.clone(), entry.grantable))
            .or_default()
            .push(entry.privilege.clone());
    }
    for ((grantee, grantable), mut privileges) in grants {
        privileges.sort();
        privileges.dedup();
        out.push(
            DefaultAclChange::Grant {
                role: group.role.clone(),
                schema: group.schema.clone(),
                objects: group.objects,
                grantee,
                privileges,
                grantable,
            }
            .into(),
        );
    }
}

fn push_default_revokes(group: &DefaultPrivilege, out: &mut Vec<Change>) {
    let mut revokes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in &group.entries {
        revokes
            .entry(entry.grantee.clone())
            .or_default()
            .push(entry.privilege.clone());
    }
    for (grantee, mut privileges) in revokes {
        privileges.sort();
        privileges.dedup();
        out.push(
            DefaultAclChange::Revoke {
                role: group.role.clone(),
                schema: group.schema.clone(),
                objects: group.objects,
                grantee,
                privileges,
            }
            .into(),
        );
    }
}
