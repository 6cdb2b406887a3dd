//! Cross-cutting changes: comments, privileges, default privileges, roles.

use serde::{Deserialize, Serialize};

use super::{ChangeOperation, ChangeScope};
use crate::ident::{ObjectKind, StableId};
use crate::model::{DefaultAclObjects, Role};
use crate::sql::{quote_ident, quote_literal, quote_qualified};

/// A reference to one addressable object, enough to name it in
/// `COMMENT ON …` and `GRANT … ON …` statements and to derive its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlObjectRef {
    Schema { name: String },
    Table { schema: String, name: String },
    Column { schema: String, table: String, name: String },
    Index { schema: String, name: String },
    Constraint { schema: String, table: String, name: String },
    View { schema: String, name: String },
    MaterializedView { schema: String, name: String },
    Sequence { schema: String, name: String },
    Function { schema: String, name: String, arguments: String },
    Procedure { schema: String, name: String, arguments: String },
    Aggregate { schema: String, name: String, arguments: String },
    Type { schema: String, name: String },
    Domain { schema: String, name: String },
    Collation { schema: String, name: String },
    Extension { name: String },
    Language { name: String },
    Rule { schema: String, table: String, name: String },
    Trigger { schema: String, table: String, name: String },
    EventTrigger { name: String },
    Policy { schema: String, table: String, name: String },
    Publication { name: String },
    Subscription { name: String },
    ForeignDataWrapper { name: String },
    Server { name: String },
    ForeignTable { schema: String, name: String },
    Role { name: String },
}

impl SqlObjectRef {
    pub fn stable_id(&self) -> StableId {
        match self {
            SqlObjectRef::Schema { name } => StableId::schema(name),
            SqlObjectRef::Table { schema, name } => StableId::table(schema, name),
            SqlObjectRef::Column { schema, table, name } => StableId::column(schema, table, name),
            SqlObjectRef::Index { schema, name } => StableId::index(schema, name),
            SqlObjectRef::Constraint { schema, table, name } => {
                StableId::constraint(schema, table, name)
            }
            SqlObjectRef::View { schema, name } => StableId::view(schema, name),
            SqlObjectRef::MaterializedView { schema, name } => {
                StableId::materialized_view(schema, name)
            }
            SqlObjectRef::Sequence { schema, name } => StableId::sequence(schema, name),
            SqlObjectRef::Function { schema, name, arguments } => {
                StableId::function(schema, name, arguments)
            }
            SqlObjectRef::Procedure { schema, name, arguments } => {
                StableId::procedure(schema, name, arguments)
            }
            SqlObjectRef::Aggregate { schema, name, arguments } => {
                StableId::aggregate(schema, name, arguments)
            }
            SqlObjectRef::Type { schema, name } => StableId::type_(schema, name),
            SqlObjectRef::Domain { schema, name } => StableId::domain(schema, name),
            SqlObjectRef::Collation { schema, name } => StableId::collation(schema, name),
            SqlObjectRef::Extension { name } => StableId::extension(name),
            SqlObjectRef::Language { name } => StableId::language(name),
            SqlObjectRef::Rule { schema, table, name } => StableId::rule(schema, table, name),
            SqlObjectRef::Trigger { schema, table, name } => StableId::trigger(schema, table, name),
            SqlObjectRef::EventTrigger { name } => StableId::event_trigger(name),
            SqlObjectRef::Policy { schema, table, name } => StableId::policy(schema, table, name),
            SqlObjectRef::Publication { name } => StableId::publication(name),
            SqlObjectRef::Subscription { name } => StableId::subscription(name),
            SqlObjectRef::ForeignDataWrapper { name } => StableId::foreign_data_wrapper(name),
            SqlObjectRef::Server { name } => StableId::server(name),
            SqlObjectRef::ForeignTable { schema, name } => StableId::foreign_table(schema, name),
            SqlObjectRef::Role { name } => StableId::role(name),
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self {
            SqlObjectRef::Schema { .. } => ObjectKind::Schema,
            SqlObjectRef::Table { .. } => ObjectKind::Table,
            SqlObjectRef::Column { .. } => ObjectKind::Column,
            SqlObjectRef::Index { .. } => ObjectKind::Index,
            SqlObjectRef::Constraint { .. } => ObjectKind::Constraint,
            SqlObjectRef::View { .. } => ObjectKind::View,
            SqlObjectRef::MaterializedView { .. } => ObjectKind::MaterializedView,
            SqlObjectRef::Sequence { .. } => ObjectKind::Sequence,
            SqlObjectRef::Function { .. } => ObjectKind::Function,
            SqlObjectRef::Procedure { .. } => ObjectKind::Procedure,
            SqlObjectRef::Aggregate { .. } => ObjectKind::Aggregate,
            SqlObjectRef::Type { .. } => ObjectKind::Type,
            SqlObjectRef::Domain { .. } => ObjectKind::Domain,
            SqlObjectRef::Collation { .. } => ObjectKind::Collation,
            SqlObjectRef::Extension { .. } => ObjectKind::Extension,
            SqlObjectRef::Language { .. } => ObjectKind::Language,
            SqlObjectRef::Rule { .. } => ObjectKind::Rule,
            SqlObjectRef::Trigger { .. } => ObjectKind::Trigger,
            SqlObjectRef::EventTrigger { .. } => ObjectKind::EventTrigger,
            SqlObjectRef::Policy { .. } => ObjectKind::Policy,
            SqlObjectRef::Publication { .. } => ObjectKind::Publication,
            SqlObjectRef::Subscription { .. } => ObjectKind::Subscription,
            SqlObjectRef::ForeignDataWrapper { .. } => ObjectKind::ForeignDataWrapper,
            SqlObjectRef::Server { .. } => ObjectKind::Server,
            SqlObjectRef::ForeignTable { .. } => ObjectKind::ForeignTable,
            SqlObjectRef::Role { .. } => ObjectKind::Role,
        }
    }

    /// How `COMMENT ON` names this object.
    pub fn comment_phrase(&self) -> String {
        match self {
            SqlObjectRef::Schema { name } => format!("SCHEMA {}", quote_ident(name)),
            SqlObjectRef::Table { schema, name } => {
                format!("TABLE {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Column { schema, table, name } => format!(
                "COLUMN {}.{}",
                quote_qualified(schema, table),
                quote_ident(name)
            ),
            SqlObjectRef::Index { schema, name } => {
                format!("INDEX {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Constraint { schema, table, name } => format!(
                "CONSTRAINT {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
            SqlObjectRef::View { schema, name } => {
                format!("VIEW {}", quote_qualified(schema, name))
            }
            SqlObjectRef::MaterializedView { schema, name } => {
                format!("MATERIALIZED VIEW {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Sequence { schema, name } => {
                format!("SEQUENCE {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Function { schema, name, arguments } => {
                format!("FUNCTION {}({arguments})", quote_qualified(schema, name))
            }
            SqlObjectRef::Procedure { schema, name, arguments } => {
                format!("PROCEDURE {}({arguments})", quote_qualified(schema, name))
            }
            SqlObjectRef::Aggregate { schema, name, arguments } => {
                format!("AGGREGATE {}({arguments})", quote_qualified(schema, name))
            }
            SqlObjectRef::Type { schema, name } => {
                format!("TYPE {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Domain { schema, name } => {
                format!("DOMAIN {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Collation { schema, name } => {
                format!("COLLATION {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Extension { name } => format!("EXTENSION {}", quote_ident(name)),
            SqlObjectRef::Language { name } => format!("LANGUAGE {}", quote_ident(name)),
            SqlObjectRef::Rule { schema, table, name } => format!(
                "RULE {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
            SqlObjectRef::Trigger { schema, table, name } => format!(
                "TRIGGER {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
            SqlObjectRef::EventTrigger { name } => {
                format!("EVENT TRIGGER {}", quote_ident(name))
            }
            SqlObjectRef::Policy { schema, table, name } => format!(
                "POLICY {} ON {}",
                quote_ident(name),
                quote_qualified(schema, table)
            ),
            SqlObjectRef::Publication { name } => format!("PUBLICATION {}", quote_ident(name)),
            SqlObjectRef::Subscription { name } => format!("SUBSCRIPTION {}", quote_ident(name)),
            SqlObjectRef::ForeignDataWrapper { name } => {
                format!("FOREIGN DATA WRAPPER {}", quote_ident(name))
            }
            SqlObjectRef::Server { name } => format!("SERVER {}", quote_ident(name)),
            SqlObjectRef::ForeignTable { schema, name } => {
                format!("FOREIGN TABLE {}", quote_qualified(schema, name))
            }
            SqlObjectRef::Role { name } => format!("ROLE {}", quote_ident(name)),
        }
    }

    /// How `GRANT`/`REVOKE` name this object. Kinds that cannot carry
    /// privileges fall back to the comment phrase; the differ never builds
    /// privilege changes for them.
    pub fn grant_phrase(&self) -> String {
        match self {
            SqlObjectRef::Server { name } => format!("FOREIGN SERVER {}", quote_ident(name)),
            _ => self.comment_phrase(),
        }
    }
}

/// Sets or removes the comment on one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentChange {
    pub target: SqlObjectRef,
    pub comment: Option<String>,
}

impl CommentChange {
    pub fn operation(&self) -> ChangeOperation {
        if self.comment.is_some() {
            ChangeOperation::Create
        } else {
            ChangeOperation::Drop
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.target.object_kind()
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Comment
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self.comment {
            Some(_) => vec![StableId::comment_on(&self.target.stable_id())],
            None => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        vec![self.target.stable_id()]
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self.comment {
            Some(_) => vec![],
            None => vec![StableId::comment_on(&self.target.stable_id())],
        }
    }

    pub fn to_sql(&self) -> String {
        let value = match &self.comment {
            Some(text) => quote_literal(text),
            None => "NULL".to_string(),
        };
        format!("COMMENT ON {} IS {}", self.target.comment_phrase(), value)
    }

    pub fn sort_id(&self) -> StableId {
        StableId::comment_on(&self.target.stable_id())
    }
}

fn quote_grantee(name: &str) -> String {
    if name.eq_ignore_ascii_case("public") {
        "PUBLIC".to_string()
    } else {
        quote_ident(name)
    }
}

/// Grants or revokes one grantee's privileges on one object. A grant group
/// holds one `grantable` flag for all its privileges; the differ builds one
/// change per (grantee, grantable) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclChange {
    Grant {
        target: SqlObjectRef,
        grantee: String,
        privileges: Vec<String>,
        grantable: bool,
    },
    Revoke {
        target: SqlObjectRef,
        grantee: String,
        privileges: Vec<String>,
    },
    /// `REVOKE GRANT OPTION FOR …`: drops the grant option, keeps the
    /// underlying privilege.
    RevokeGrantOption {
        target: SqlObjectRef,
        grantee: String,
        privileges: Vec<String>,
    },
}

impl AclChange {
    fn target(&self) -> &SqlObjectRef {
        match self {
            AclChange::Grant { target, .. }
            | AclChange::Revoke { target, .. }
            | AclChange::RevokeGrantOption { target, .. } => target,
        }
    }

    fn grantee(&self) -> &str {
        match self {
            AclChange::Grant { grantee, .. }
            | AclChange::Revoke { grantee, .. }
            | AclChange::RevokeGrantOption { grantee, .. } => grantee,
        }
    }

    pub fn operation(&self) -> ChangeOperation {
        match self {
            AclChange::Grant { .. } => ChangeOperation::Create,
            AclChange::Revoke { .. } => ChangeOperation::Drop,
            AclChange::RevokeGrantOption { .. } => ChangeOperation::Alter,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.target().object_kind()
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::Acl
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            AclChange::Grant { target, grantee, .. } => {
                vec![StableId::acl(&target.stable_id(), grantee)]
            }
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        vec![self.target().stable_id()]
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            AclChange::Revoke { target, grantee, .. } => {
                vec![StableId::acl(&target.stable_id(), grantee)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            AclChange::Grant { target, grantee, privileges, grantable } => {
                let mut sql = format!(
                    "GRANT {} ON {} TO {}",
                    privileges.join(", "),
                    target.grant_phrase(),
                    quote_grantee(grantee)
                );
                if *grantable {
                    sql.push_str(" WITH GRANT OPTION");
                }
                sql
            }
            AclChange::Revoke { target, grantee, privileges } => format!(
                "REVOKE {} ON {} FROM {}",
                privileges.join(", "),
                target.grant_phrase(),
                quote_grantee(grantee)
            ),
            AclChange::RevokeGrantOption { target, grantee, privileges } => format!(
                "REVOKE GRANT OPTION FOR {} ON {} FROM {}",
                privileges.join(", "),
                target.grant_phrase(),
                quote_grantee(grantee)
            ),
        }
    }

    pub fn sort_id(&self) -> StableId {
        StableId::acl(&self.target().stable_id(), self.grantee())
    }
}

/// `ALTER DEFAULT PRIVILEGES` for one granting role, object class and
/// optional schema scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAclChange {
    Grant {
        role: String,
        schema: Option<String>,
        objects: DefaultAclObjects,
        grantee: String,
        privileges: Vec<String>,
        grantable: bool,
    },
    Revoke {
        role: String,
        schema: Option<String>,
        objects: DefaultAclObjects,
        grantee: String,
        privileges: Vec<String>,
    },
}

impl DefaultAclChange {
    fn group_id(&self) -> StableId {
        match self {
            DefaultAclChange::Grant { role, schema, objects, .. }
            | DefaultAclChange::Revoke { role, schema, objects, .. } => {
                StableId::default_acl(role, schema.as_deref(), objects.key())
            }
        }
    }

    fn grantee(&self) -> &str {
        match self {
            DefaultAclChange::Grant { grantee, .. } | DefaultAclChange::Revoke { grantee, .. } => {
                grantee
            }
        }
    }

    pub fn operation(&self) -> ChangeOperation {
        match self {
            DefaultAclChange::Grant { .. } => ChangeOperation::Create,
            DefaultAclChange::Revoke { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Role
    }

    pub fn scope(&self) -> ChangeScope {
        ChangeScope::DefaultAcl
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            DefaultAclChange::Grant { .. } => {
                vec![StableId::acl(&self.group_id(), self.grantee())]
            }
            DefaultAclChange::Revoke { .. } => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        match self {
            DefaultAclChange::Grant { schema: Some(s), .. }
            | DefaultAclChange::Revoke { schema: Some(s), .. } => vec![StableId::schema(s)],
            _ => vec![],
        }
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            DefaultAclChange::Revoke { .. } => {
                vec![StableId::acl(&self.group_id(), self.grantee())]
            }
            DefaultAclChange::Grant { .. } => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            DefaultAclChange::Grant { role, schema, objects, grantee, privileges, grantable } => {
                let mut sql = format!("ALTER DEFAULT PRIVILEGES FOR ROLE {}", quote_ident(role));
                if let Some(s) = schema {
                    sql.push_str(&format!(" IN SCHEMA {}", quote_ident(s)));
                }
                sql.push_str(&format!(
                    " GRANT {} ON {} TO {}",
                    privileges.join(", "),
                    objects.sql_keyword(),
                    quote_grantee(grantee)
                ));
                if *grantable {
                    sql.push_str(" WITH GRANT OPTION");
                }
                sql
            }
            DefaultAclChange::Revoke { role, schema, objects, grantee, privileges } => {
                let mut sql = format!("ALTER DEFAULT PRIVILEGES FOR ROLE {}", quote_ident(role));
                if let Some(s) = schema {
                    sql.push_str(&format!(" IN SCHEMA {}", quote_ident(s)));
                }
                sql.push_str(&format!(
                    " REVOKE {} ON {} FROM {}",
                    privileges.join(", "),
                    objects.sql_keyword(),
                    quote_grantee(grantee)
                ));
                sql
            }
        }
    }

    pub fn sort_id(&self) -> StableId {
        self.group_id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChange {
    Create { role: Role },
    Alter { role: Role },
    Drop { name: String },
    GrantMembership { role: String, member: String },
    RevokeMembership { role: String, member: String },
}

impl RoleChange {
    pub fn operation(&self) -> ChangeOperation {
        match self {
            RoleChange::Create { .. } | RoleChange::GrantMembership { .. } => {
                ChangeOperation::Create
            }
            RoleChange::Alter { .. } => ChangeOperation::Alter,
            RoleChange::Drop { .. } | RoleChange::RevokeMembership { .. } => ChangeOperation::Drop,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::Role
    }

    pub fn scope(&self) -> ChangeScope {
        match self {
            RoleChange::GrantMembership { .. } | RoleChange::RevokeMembership { .. } => {
                ChangeScope::Membership
            }
            _ => ChangeScope::Object,
        }
    }

    pub fn provides(&self) -> Vec<StableId> {
        match self {
            RoleChange::Create { role } => vec![StableId::role(&role.name)],
            RoleChange::GrantMembership { role, member } => {
                vec![StableId::acl(&StableId::role(role), member)]
            }
            _ => vec![],
        }
    }

    pub fn requires(&self) -> Vec<StableId> {
        vec![]
    }

    pub fn drops(&self) -> Vec<StableId> {
        match self {
            RoleChange::Drop { name } => vec![StableId::role(name)],
            RoleChange::RevokeMembership { role, member } => {
                vec![StableId::acl(&StableId::role(role), member)]
            }
            _ => vec![],
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            RoleChange::Create { role } => format!(
                "CREATE ROLE {} WITH {}",
                quote_ident(&role.name),
                role_options(role)
            ),
            RoleChange::Alter { role } => format!(
                "ALTER ROLE {} WITH {}",
                quote_ident(&role.name),
                role_options(role)
            ),
            RoleChange::Drop { name } => format!("DROP ROLE {}", quote_ident(name)),
            RoleChange::GrantMembership { role, member } => {
                format!("GRANT {} TO {}", quote_ident(role), quote_ident(member))
            }
            RoleChange::RevokeMembership { role, member } => {
                format!("REVOKE {} FROM {}", quote_ident(role), quote_ident(member))
            }
        }
    }

    pub fn sort_id(&self) -> StableId {
        match self {
            RoleChange::Create { role } | RoleChange::Alter { role } => StableId::role(&role.name),
            RoleChange::Drop { name } => StableId::role(name),
            RoleChange::GrantMembership { role, member }
            | RoleChange::RevokeMembership { role, member } => {
                StableId::acl(&StableId::role(role), member)
            }
        }
    }
}

fn role_options(role: &Role) -> String {
    let mut options = Vec::new();
    options.push(if role.superuser { "SUPERUSER" } else { "NOSUPERUSER" });
    options.push(if role.create_db { "CREATEDB" } else { "NOCREATEDB" });
    options.push(if role.create_role { "CREATEROLE" } else { "NOCREATEROLE" });
    options.push(if role.inherit { "INHERIT" } else { "NOINHERIT" });
    options.push(if role.login { "LOGIN" } else { "NOLOGIN" });
    options.push(if role.replication { "REPLICATION" } else { "NOREPLICATION" });
    options.push(if role.bypass_rls { "BYPASSRLS" } else { "NOBYPASSRLS" });

    let mut out = options.join(" ");
    if role.connection_limit != -1 {
        out.push_str(&format!(" CONNECTION LIMIT {}", role.connection_limit));
    }
    if let Some(valid) = &role.valid_until {
        out.push_str(&format!(" VALID UNTIL {}", quote_literal(valid)));
    }
    out
}
