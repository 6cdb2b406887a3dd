//! Schema entity value types and the snapshot they live in.
//!
//! A `SchemaSnapshot` is the observed (or desired) state of one database:
//! one id-keyed map per entity kind, exactly the shape an external extractor
//! produces from `pg_catalog`. Entities are immutable values; two entities
//! with the same stable id are equal iff all their data fields are equal,
//! which is what the differ relies on.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ident::StableId;

mod acl;
mod objects;
mod replication;
mod routines;
mod tables;
mod types;

pub use acl::{DefaultAclObjects, DefaultPrivilege, Role};
pub use objects::{
    EventTrigger, Extension, Language, Policy, Rule, SchemaDef, Sequence, Trigger, View,
};
pub use replication::{
    ForeignDataWrapper, ForeignServer, ForeignTable, Publication, PublicationTable, Subscription,
    UserMapping,
};
pub use routines::{Aggregate, AggregateKind, ParallelSafety, Routine, RoutineKind, Volatility};
pub use tables::{
    Column, ColumnGenerated, ColumnIdentity, Constraint, ConstraintKind, Index, MaterializedView,
    ReplicaIdentity, Table,
};
pub use types::{
    Collation, CollationProvider, Domain, DomainConstraint, TypeAttribute, TypeDef, TypeVariant,
};

/// One grantee's privilege on an object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AclEntry {
    pub grantee: String,
    pub privilege: String,
    #[serde(default)]
    pub grantable: bool,
}

/// Implemented by every entity type: the canonical id it is keyed under.
pub trait SchemaEntity {
    fn stable_id(&self) -> StableId;
}

/// Full schema state of one database, keyed by stable id throughout so that
/// iteration order can never leak into diff or plan output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSnapshot {
    pub schemas: BTreeMap<StableId, SchemaDef>,
    pub extensions: BTreeMap<StableId, Extension>,
    pub languages: BTreeMap<StableId, Language>,
    pub collations: BTreeMap<StableId, Collation>,
    pub types: BTreeMap<StableId, TypeDef>,
    pub domains: BTreeMap<StableId, Domain>,
    pub sequences: BTreeMap<StableId, Sequence>,
    pub tables: BTreeMap<StableId, Table>,
    pub constraints: BTreeMap<StableId, Constraint>,
    pub indexes: BTreeMap<StableId, Index>,
    pub routines: BTreeMap<StableId, Routine>,
    pub aggregates: BTreeMap<StableId, Aggregate>,
    pub views: BTreeMap<StableId, View>,
    pub materialized_views: BTreeMap<StableId, MaterializedView>,
    pub rules: BTreeMap<StableId, Rule>,
    pub triggers: BTreeMap<StableId, Trigger>,
    pub event_triggers: BTreeMap<StableId, EventTrigger>,
    pub policies: BTreeMap<StableId, Policy>,
    pub publications: BTreeMap<StableId, Publication>,
    pub subscriptions: BTreeMap<StableId, Subscription>,
    pub foreign_data_wrappers: BTreeMap<StableId, ForeignDataWrapper>,
    pub foreign_servers: BTreeMap<StableId, ForeignServer>,
    pub user_mappings: BTreeMap<StableId, UserMapping>,
    pub foreign_tables: BTreeMap<StableId, ForeignTable>,
    pub roles: BTreeMap<StableId, Role>,
    pub default_privileges: BTreeMap<StableId, DefaultPrivilege>,
}

macro_rules! snapshot_insert {
    ($fn_name:ident, $field:ident, $ty:ty) => {
        pub fn $fn_name(&mut self, entity: $ty) {
            self.$field.insert(entity.stable_id(), entity);
        }
    };
}

impl SchemaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    snapshot_insert!(add_schema, schemas, SchemaDef);
    snapshot_insert!(add_extension, extensions, Extension);
    snapshot_insert!(add_language, languages, Language);
    snapshot_insert!(add_collation, collations, Collation);
    snapshot_insert!(add_type, types, TypeDef);
    snapshot_insert!(add_domain, domains, Domain);
    snapshot_insert!(add_sequence, sequences, Sequence);
    snapshot_insert!(add_table, tables, Table);
    snapshot_insert!(add_constraint, constraints, Constraint);
    snapshot_insert!(add_index, indexes, Index);
    snapshot_insert!(add_routine, routines, Routine);
    snapshot_insert!(add_aggregate, aggregates, Aggregate);
    snapshot_insert!(add_view, views, View);
    snapshot_insert!(add_materialized_view, materialized_views, MaterializedView);
    snapshot_insert!(add_rule, rules, Rule);
    snapshot_insert!(add_trigger, triggers, Trigger);
    snapshot_insert!(add_event_trigger, event_triggers, EventTrigger);
    snapshot_insert!(add_policy, policies, Policy);
    snapshot_insert!(add_publication, publications, Publication);
    snapshot_insert!(add_subscription, subscriptions, Subscription);
    snapshot_insert!(add_foreign_data_wrapper, foreign_data_wrappers, ForeignDataWrapper);
    snapshot_insert!(add_foreign_server, foreign_servers, ForeignServer);
    snapshot_insert!(add_user_mapping, user_mappings, UserMapping);
    snapshot_insert!(add_foreign_table, foreign_tables, ForeignTable);
    snapshot_insert!(add_role, roles, Role);
    snapshot_insert!(add_default_privilege, default_privileges, DefaultPrivilege);

    /// Every stable id in the snapshot, including the column ids owned by
    /// tables and foreign tables.
    pub fn stable_ids(&self) -> BTreeSet<StableId> {
        let mut ids = BTreeSet::new();
        ids.extend(self.schemas.keys().cloned());
        ids.extend(self.extensions.keys().cloned());
        ids.extend(self.languages.keys().cloned());
        ids.extend(self.collations.keys().cloned());
        ids.extend(self.types.keys().cloned());
        ids.extend(self.domains.keys().cloned());
        ids.extend(self.sequences.keys().cloned());
        ids.extend(self.constraints.keys().cloned());
        ids.extend(self.indexes.keys().cloned());
        ids.extend(self.routines.keys().cloned());
        ids.extend(self.aggregates.keys().cloned());
        ids.extend(self.views.keys().cloned());
        ids.extend(self.materialized_views.keys().cloned());
        ids.extend(self.rules.keys().cloned());
        ids.extend(self.triggers.keys().cloned());
        ids.extend(self.event_triggers.keys().cloned());
        ids.extend(self.policies.keys().cloned());
        ids.extend(self.publications.keys().cloned());
        ids.extend(self.subscriptions.keys().cloned());
        ids.extend(self.foreign_data_wrappers.keys().cloned());
        ids.extend(self.foreign_servers.keys().cloned());
        ids.extend(self.user_mappings.keys().cloned());
        ids.extend(self.roles.keys().cloned());
        ids.extend(self.default_privileges.keys().cloned());

        for table in self.tables.values() {
            ids.insert(table.stable_id());
            for column in &table.columns {
                ids.insert(StableId::column(&table.schema, &table.name, &column.name));
            }
        }
        for table in self.foreign_tables.values() {
            ids.insert(table.stable_id());
            for column in &table.columns {
                ids.insert(StableId::column(&table.schema, &table.name, &column.name));
            }
        }
        ids
    }
}
