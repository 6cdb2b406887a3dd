//! The change algebra: one tagged record per DDL operation.
//!
//! A `Change` is immutable. Besides its SQL serialization it carries the
//! dependency metadata the planner and applier run on: the stable ids it
//! `provides`, the ids it `requires` to already exist, and the ids it
//! `drops`. Serialization emits exactly one statement with no trailing
//! semicolon and is deterministic over the payload.

use serde::{Deserialize, Serialize};

use crate::ident::{ObjectKind, StableId};

mod acl;
mod objects;
mod replication;
mod routines;
mod tables;
mod types;

#[cfg(test)]
mod tests;

pub use acl::{AclChange, CommentChange, DefaultAclChange, RoleChange, SqlObjectRef};
pub use objects::{
    CollationChange, EventTriggerChange, ExtensionChange, LanguageChange, PolicyChange,
    RuleChange, SchemaChange, SequenceChange, SequenceOptions, TriggerChange, ViewChange,
};
pub use replication::{
    ForeignDataWrapperChange, ForeignServerChange, ForeignTableChange, OptionsDelta,
    PublicationChange, SubscriptionChange, UserMappingChange,
};
pub use routines::{AggregateChange, RoutineChange};
pub use tables::{
    ColumnAlteration, ConstraintChange, IndexChange, MaterializedViewChange, TableChange,
};
pub use types::{DomainChange, TypeChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    Create,
    Alter,
    Drop,
}

/// Which aspect of an entity a change touches. Within one entity the engine
/// orders object changes before comments before privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    Object,
    Comment,
    Acl,
    DefaultAcl,
    Membership,
}

impl ChangeScope {
    pub fn priority(&self) -> u8 {
        match self {
            ChangeScope::Object => 0,
            ChangeScope::Comment => 1,
            ChangeScope::Acl => 2,
            ChangeScope::DefaultAcl => 3,
            ChangeScope::Membership => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Schema(SchemaChange),
    Extension(ExtensionChange),
    Language(LanguageChange),
    Collation(CollationChange),
    Type(TypeChange),
    Domain(DomainChange),
    Sequence(SequenceChange),
    Table(TableChange),
    Constraint(ConstraintChange),
    Index(IndexChange),
    Routine(RoutineChange),
    Aggregate(AggregateChange),
    View(ViewChange),
    MaterializedView(MaterializedViewChange),
    Rule(RuleChange),
    Trigger(TriggerChange),
    EventTrigger(EventTriggerChange),
    Policy(PolicyChange),
    Publication(PublicationChange),
    Subscription(SubscriptionChange),
    ForeignDataWrapper(ForeignDataWrapperChange),
    ForeignServer(ForeignServerChange),
    UserMapping(UserMappingChange),
    ForeignTable(ForeignTableChange),
    Role(RoleChange),
    Comment(CommentChange),
    Acl(AclChange),
    DefaultAcl(DefaultAclChange),
}

/// Delegate a method call to whichever family payload the change wraps.
macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Change::Schema($inner) => $body,
            Change::Extension($inner) => $body,
            Change::Language($inner) => $body,
            Change::Collation($inner) => $body,
            Change::Type($inner) => $body,
            Change::Domain($inner) => $body,
            Change::Sequence($inner) => $body,
            Change::Table($inner) => $body,
            Change::Constraint($inner) => $body,
            Change::Index($inner) => $body,
            Change::Routine($inner) => $body,
            Change::Aggregate($inner) => $body,
            Change::View($inner) => $body,
            Change::MaterializedView($inner) => $body,
            Change::Rule($inner) => $body,
            Change::Trigger($inner) => $body,
            Change::EventTrigger($inner) => $body,
            Change::Policy($inner) => $body,
            Change::Publication($inner) => $body,
            Change::Subscription($inner) => $body,
            Change::ForeignDataWrapper($inner) => $body,
            Change::ForeignServer($inner) => $body,
            Change::UserMapping($inner) => $body,
            Change::ForeignTable($inner) => $body,
            Change::Role($inner) => $body,
            Change::Comment($inner) => $body,
            Change::Acl($inner) => $body,
            Change::DefaultAcl($inner) => $body,
        }
    };
}

impl Change {
    pub fn operation(&self) -> ChangeOperation {
        dispatch!(self, c => c.operation())
    }

    pub fn object_kind(&self) -> ObjectKind {
        dispatch!(self, c => c.object_kind())
    }

    pub fn scope(&self) -> ChangeScope {
        dispatch!(self, c => c.scope())
    }

    /// Ids first valid once this change has executed.
    pub fn provides(&self) -> Vec<StableId> {
        dispatch!(self, c => c.provides())
    }

    /// Ids that must exist before this change can execute.
    pub fn requires(&self) -> Vec<StableId> {
        dispatch!(self, c => c.requires())
    }

    /// Ids that cease to exist when this change executes.
    pub fn drops(&self) -> Vec<StableId> {
        dispatch!(self, c => c.drops())
    }

    /// One SQL statement, no trailing semicolon.
    pub fn to_sql(&self) -> String {
        dispatch!(self, c => c.to_sql())
    }

    /// The id of the entity this change is about, for stable tie-breaks.
    pub fn sort_id(&self) -> StableId {
        dispatch!(self, c => c.sort_id())
    }
}

macro_rules! change_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Change {
            fn from(value: $ty) -> Self {
                Change::$variant(value)
            }
        }
    };
}

change_from!(Schema, SchemaChange);
change_from!(Extension, ExtensionChange);
change_from!(Language, LanguageChange);
change_from!(Collation, CollationChange);
change_from!(Type, TypeChange);
change_from!(Domain, DomainChange);
change_from!(Sequence, SequenceChange);
change_from!(Table, TableChange);
change_from!(Constraint, ConstraintChange);
change_from!(Index, IndexChange);
change_from!(Routine, RoutineChange);
change_from!(Aggregate, AggregateChange);
change_from!(View, ViewChange);
change_from!(MaterializedView, MaterializedViewChange);
change_from!(Rule, RuleChange);
change_from!(Trigger, TriggerChange);
change_from!(EventTrigger, EventTriggerChange);
change_from!(Policy, PolicyChange);
change_from!(Publication, PublicationChange);
change_from!(Subscription, SubscriptionChange);
change_from!(ForeignDataWrapper, ForeignDataWrapperChange);
change_from!(ForeignServer, ForeignServerChange);
change_from!(UserMapping, UserMappingChange);
change_from!(ForeignTable, ForeignTableChange);
change_from!(Role, RoleChange);
change_from!(Comment, CommentChange);
change_from!(Acl, AclChange);
change_from!(DefaultAcl, DefaultAclChange);
