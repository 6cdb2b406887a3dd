//! The planner: orders a change list into an executable script.
//!
//! Changes split into two phases. Anything that drops an id runs first,
//! ordered so that dependents go before the objects they depend on; the
//! build phase follows, ordered so that providers go before requirers.
//! Within a phase, ties break on (object-kind priority, scope priority,
//! stable id, input position), which makes the output a pure function of
//! the input change list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::analyzer::StatementClass;
use crate::apply::ApplyStatement;
use crate::change::{Change, ChangeOperation, ChangeScope};
use crate::error::{Diagnostic, DiagnosticCode};
use crate::ident::ObjectKind;
use crate::sql;

pub const PLAN_VERSION: u32 = 1;

/// One ordered change plus its rendered SQL. The payload round-trips to
/// the same statement via re-serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedChange {
    pub operation: ChangeOperation,
    pub object_type: ObjectKind,
    pub scope: ChangeScope,
    pub payload: Change,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub version: u32,
    pub changes: Vec<PlannedChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Plan {
    /// Script-file rendering: statements separated by one blank line.
    pub fn to_script(&self) -> String {
        let statements: Vec<String> = self.changes.iter().map(|c| c.sql.clone()).collect();
        sql::render_script(&statements)
    }

    /// Input for the round-applier.
    pub fn to_statements(&self) -> Vec<ApplyStatement> {
        self.changes
            .iter()
            .enumerate()
            .map(|(index, change)| ApplyStatement {
                id: format!("{}:{}", index + 1, change.payload.sort_id()),
                sql: change.sql.clone(),
                class: statement_class(&change.payload),
            })
            .collect()
    }
}

/// The statement class the applier uses for capability-skip and
/// final-validation decisions.
pub fn statement_class(change: &Change) -> Option<StatementClass> {
    let class = match (change, change.operation()) {
        (Change::Extension(_), ChangeOperation::Create) => StatementClass::CreateExtension,
        (Change::Language(_), ChangeOperation::Create) => StatementClass::CreateLanguage,
        (Change::Routine(_), ChangeOperation::Create) => match change.object_kind() {
            ObjectKind::Procedure => StatementClass::CreateProcedure,
            _ => StatementClass::CreateFunction,
        },
        (Change::Aggregate(_), ChangeOperation::Create) => StatementClass::CreateAggregate,
        (Change::Table(_), ChangeOperation::Create) => StatementClass::CreateTable,
        (Change::Table(_), ChangeOperation::Alter) => StatementClass::AlterTable,
        (Change::Constraint(_), _) => StatementClass::AlterTable,
        (Change::Index(_), ChangeOperation::Create) => StatementClass::CreateIndex,
        (Change::View(_), ChangeOperation::Create) => StatementClass::CreateView,
        (Change::MaterializedView(_), ChangeOperation::Create) => {
            StatementClass::CreateMaterializedView
        }
        (Change::Schema(_), ChangeOperation::Create) => StatementClass::CreateSchema,
        (Change::Sequence(_), ChangeOperation::Create) => StatementClass::CreateSequence,
        (Change::Sequence(_), ChangeOperation::Alter) => StatementClass::AlterSequence,
        (Change::Type(_), ChangeOperation::Create) => StatementClass::CreateType,
        (Change::Domain(_), ChangeOperation::Create) => StatementClass::CreateDomain,
        (Change::Collation(_), ChangeOperation::Create) => StatementClass::CreateCollation,
        (Change::Trigger(_), ChangeOperation::Create) => StatementClass::CreateTrigger,
        (Change::EventTrigger(_), ChangeOperation::Create) => StatementClass::CreateEventTrigger,
        (Change::Rule(_), ChangeOperation::Create) => StatementClass::CreateRule,
        (Change::Policy(_), ChangeOperation::Create) => StatementClass::CreatePolicy,
        (Change::Publication(_), ChangeOperation::Create) => StatementClass::CreatePublication,
        (Change::Subscription(_), ChangeOperation::Create) => StatementClass::CreateSubscription,
        (Change::ForeignDataWrapper(_), ChangeOperation::Create) => {
            StatementClass::CreateForeignDataWrapper
        }
        (Change::ForeignServer(_), ChangeOperation::Create) => StatementClass::CreateServer,
        (Change::UserMapping(_), ChangeOperation::Create) => StatementClass::CreateUserMapping,
        (Change::ForeignTable(_), ChangeOperation::Create) => StatementClass::CreateForeignTable,
        (Change::Role(r), _) => match r {
            crate::change::RoleChange::Create { .. } => StatementClass::CreateRole,
            crate::change::RoleChange::GrantMembership { .. } => StatementClass::Grant,
            crate::change::RoleChange::RevokeMembership { .. } => StatementClass::Revoke,
            _ => return None,
        },
        (Change::Comment(_), _) => StatementClass::Comment,
        (Change::Acl(a), _) => match a {
            crate::change::AclChange::Grant { .. } => StatementClass::Grant,
            _ => StatementClass::Revoke,
        },
        (Change::DefaultAcl(_), _) => StatementClass::AlterDefaultPrivileges,
        _ => return None,
    };
    Some(class)
}

/// Topologically order a change list and render it.
pub fn plan_changes(changes: Vec<Change>) -> Plan {
    let mut diagnostics = Vec::new();

    let mut drop_phase = Vec::new();
    let mut build_phase = Vec::new();
    for (index, change) in changes.iter().enumerate() {
        if change.drops().is_empty() {
            build_phase.push(index);
        } else {
            drop_phase.push(index);
        }
    }

    let ordered_drops = order_phase(&changes, &drop_phase, Phase::Drop, &mut diagnostics);
    let ordered_builds = order_phase(&changes, &build_phase, Phase::Build, &mut diagnostics);

    check_duplicate_providers(&changes, &build_phase, &mut diagnostics);

    let mut planned = Vec::with_capacity(changes.len());
    for index in ordered_drops.into_iter().chain(ordered_builds) {
        let change = changes[index].clone();
        planned.push(PlannedChange {
            operation: change.operation(),
            object_type: change.object_kind(),
            scope: change.scope(),
            sql: change.to_sql(),
            payload: change,
        });
    }

    Plan {
        version: PLAN_VERSION,
        changes: planned,
        diagnostics,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Drop,
    Build,
}

/// Kahn's algorithm over one phase. In the build phase an edge runs from
/// provider to requirer; in the drop phase the edge inverts, so whatever
/// requires an id is dropped before the change that drops it.
fn order_phase(
    changes: &[Change],
    members: &[usize],
    phase: Phase,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<usize> {
    // id -> members supplying it (provides in build, drops in drop phase)
    let mut suppliers: BTreeMap<crate::ident::StableId, Vec<usize>> = BTreeMap::new();
    for &index in members {
        let supplied = match phase {
            Phase::Build => changes[index].provides(),
            Phase::Drop => changes[index].drops(),
        };
        for id in supplied {
            suppliers.entry(id).or_default().push(index);
        }
    }

    let mut successors: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut indegree: BTreeMap<usize, usize> = members.iter().map(|&i| (i, 0)).collect();

    for &index in members {
        for required in changes[index].requires() {
            let Some(supplier_indices) = suppliers.get(&required) else {
                // Required id is not touched by this phase: it either
                // already exists or the other phase handles it
                continue;
            };
            for &supplier in supplier_indices {
                if supplier == index {
                    continue;
                }
                let (from, to) = match phase {
                    Phase::Build => (supplier, index),
                    Phase::Drop => (index, supplier),
                };
                if successors.entry(from).or_default().insert(to) {
                    *indegree.entry(to).or_default() += 1;
                }
            }
        }
    }

    let sort_key = |index: usize| {
        let change = &changes[index];
        let kind_priority = match phase {
            Phase::Build => change.object_kind().priority(),
            // Dependents first when tearing down
            Phase::Drop => u8::MAX - change.object_kind().priority(),
        };
        (
            kind_priority,
            change.scope().priority(),
            change.sort_id(),
            index,
        )
    };

    let mut ready: BTreeSet<(u8, u8, crate::ident::StableId, usize)> = indegree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&index, _)| sort_key(index))
        .collect();

    let mut ordered = Vec::with_capacity(members.len());
    let mut placed: BTreeSet<usize> = BTreeSet::new();

    while let Some(key) = ready.iter().next().cloned() {
        ready.remove(&key);
        let index = key.3;
        ordered.push(index);
        placed.insert(index);
        if let Some(next) = successors.get(&index) {
            for &successor in next {
                let degree = indegree.get_mut(&successor).expect("member has a degree");
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(sort_key(successor));
                }
            }
        }
    }

    // Whatever could not be placed sits on a cycle; report each strongly
    // connected component and append the members in input order
    if ordered.len() < members.len() {
        let remaining: Vec<usize> =
            members.iter().copied().filter(|i| !placed.contains(i)).collect();
        for component in strongly_connected(&remaining, &successors) {
            if component.len() > 1 {
                let subjects: Vec<String> = component
                    .iter()
                    .map(|&i| changes[i].sort_id().to_string())
                    .collect();
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::CycleDetected,
                        format!("{} changes form a dependency cycle", component.len()),
                    )
                    .with_subjects(subjects),
                );
            }
        }
        ordered.extend(remaining);
    }

    ordered
}

fn check_duplicate_providers(
    changes: &[Change],
    build_members: &[usize],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut providers: BTreeMap<crate::ident::StableId, Vec<usize>> = BTreeMap::new();
    for &index in build_members {
        for id in changes[index].provides() {
            providers.entry(id).or_default().push(index);
        }
    }
    for (id, indices) in providers {
        if indices.len() > 1 {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateProducer,
                    format!("{} changes provide {id}", indices.len()),
                )
                .with_subject(id.to_string()),
            );
        }
    }
}

/// Strongly connected components among `nodes`, by pairwise
/// reachability. The leftover sets this runs on are small.
fn strongly_connected(
    nodes: &[usize],
    successors: &BTreeMap<usize, BTreeSet<usize>>,
) -> Vec<Vec<usize>> {
    let node_set: BTreeSet<usize> = nodes.iter().copied().collect();

    let reachable = |from: usize| -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut work = vec![from];
        while let Some(node) = work.pop() {
            if let Some(children) = successors.get(&node) {
                for &child in children {
                    if node_set.contains(&child) && seen.insert(child) {
                        work.push(child);
                    }
                }
            }
        }
        seen
    };

    let reach: BTreeMap<usize, BTreeSet<usize>> =
        nodes.iter().map(|&n| (n, reachable(n))).collect();

    let mut assigned: BTreeSet<usize> = BTreeSet::new();
    let mut components = Vec::new();
    for &node in nodes {
        if assigned.contains(&node) {
            continue;
        }
        let mut component = vec![node];
        for &other in nodes {
            if other != node
                && reach[&node].contains(&other)
                && reach[&other].contains(&node)
            {
                component.push(other);
            }
        }
        component.sort_unstable();
        for &member in &component {
            assigned.insert(member);
        }
        components.push(component);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{
        ConstraintChange, IndexChange, SchemaChange, TableChange, ViewChange,
    };
    use crate::diff::{compute_schema_diff, DiffContext};
    use crate::model::*;
    use std::collections::BTreeSet;

    fn column(name: &str, position: i32) -> Column {
        Column {
            name: name.into(),
            position,
            data_type: "bigint".into(),
            type_schema: None,
            not_null: false,
            identity: ColumnIdentity::None,
            generated: ColumnGenerated::None,
            default: None,
            collation: None,
            comment: None,
        }
    }

    fn table(schema: &str, name: &str) -> Table {
        Table {
            schema: schema.into(),
            name: name.into(),
            owner: "postgres".into(),
            columns: vec![column("id", 1)],
            partition_by: None,
            rls_enabled: false,
            replica_identity: ReplicaIdentity::Default,
            options: vec![],
            comment: None,
            privileges: vec![],
        }
    }

    /// Every required id is either preexisting (in `existing`) or provided
    /// by an earlier change and not dropped in between.
    fn assert_dependencies_ordered(plan: &Plan, existing: &BTreeSet<crate::ident::StableId>) {
        let mut available = existing.clone();
        for planned in &plan.changes {
            for required in planned.payload.requires() {
                assert!(
                    available.contains(&required),
                    "{} requires {} before it is available",
                    planned.sql,
                    required
                );
            }
            for dropped in planned.payload.drops() {
                available.remove(&dropped);
            }
            for provided in planned.payload.provides() {
                available.insert(provided);
            }
        }
    }

    #[test]
    fn test_build_order_respects_dependencies() {
        // Deliberately scrambled input: index, table, schema
        let changes: Vec<Change> = vec![
            IndexChange::Create {
                index: Index {
                    schema: "app".into(),
                    name: "users_idx".into(),
                    table: "users".into(),
                    definition: "CREATE INDEX users_idx ON app.users (id)".into(),
                    comment: None,
                },
            }
            .into(),
            TableChange::Create { table: table("app", "users") }.into(),
            SchemaChange::Create { name: "app".into() }.into(),
        ];
        let plan = plan_changes(changes);

        assert!(plan.diagnostics.is_empty());
        let sql: Vec<&str> = plan.changes.iter().map(|c| c.sql.as_str()).collect();
        assert!(sql[0].starts_with("CREATE SCHEMA"));
        assert!(sql[1].starts_with("CREATE TABLE"));
        assert!(sql[2].starts_with("CREATE INDEX"));
        assert_dependencies_ordered(&plan, &BTreeSet::new());
    }

    #[test]
    fn test_drop_phase_runs_first_and_inverted() {
        let changes: Vec<Change> = vec![
            TableChange::Drop {
                schema: "app".into(),
                name: "users".into(),
                columns: vec!["id".into()],
            }
            .into(),
            ConstraintChange::Drop {
                schema: "app".into(),
                table: "users".into(),
                name: "users_pkey".into(),
            }
            .into(),
            ViewChange::Create {
                view: View {
                    schema: "app".into(),
                    name: "v".into(),
                    owner: "postgres".into(),
                    definition: "SELECT 1".into(),
                    options: vec![],
                    check_option: None,
                    comment: None,
                    privileges: vec![],
                },
                or_replace: false,
            }
            .into(),
        ];
        let plan = plan_changes(changes);

        let sql: Vec<&str> = plan.changes.iter().map(|c| c.sql.as_str()).collect();
        // Constraint drop precedes the drop of its table; builds come last
        assert!(sql[0].starts_with("ALTER TABLE app.users DROP CONSTRAINT"));
        assert!(sql[1].starts_with("DROP TABLE"));
        assert!(sql[2].starts_with("CREATE VIEW"));
    }

    #[test]
    fn test_plan_is_deterministic_across_permutations() {
        let build = |order: &[usize]| {
            let pool: Vec<Change> = vec![
                SchemaChange::Create { name: "app".into() }.into(),
                TableChange::Create { table: table("app", "users") }.into(),
                TableChange::Create { table: table("app", "orders") }.into(),
                IndexChange::Create {
                    index: Index {
                        schema: "app".into(),
                        name: "orders_idx".into(),
                        table: "orders".into(),
                        definition: "CREATE INDEX orders_idx ON app.orders (id)".into(),
                        comment: None,
                    },
                }
                .into(),
            ];
            let permuted: Vec<Change> = order.iter().map(|&i| pool[i].clone()).collect();
            serde_json::to_string(&plan_changes(permuted)).unwrap()
        };

        let baseline = build(&[0, 1, 2, 3]);
        assert_eq!(baseline, build(&[3, 2, 1, 0]));
        assert_eq!(baseline, build(&[1, 3, 0, 2]));
    }

    #[test]
    fn test_duplicate_provider_diagnostic() {
        let changes: Vec<Change> = vec![
            SchemaChange::Create { name: "app".into() }.into(),
            SchemaChange::Create { name: "app".into() }.into(),
        ];
        let plan = plan_changes(changes);
        assert!(plan
            .diagnostics
            .iter()
            .any(|d| d.code == crate::error::DiagnosticCode::DuplicateProducer));
    }

    #[test]
    fn test_full_diff_plan_satisfies_dependency_invariant() {
        let mut branch = SchemaSnapshot::new();
        branch.add_schema(SchemaDef {
            name: "app".into(),
            owner: "postgres".into(),
            comment: None,
            privileges: vec![],
        });
        let mut users = table("app", "users");
        users.comment = Some("accounts".into());
        users.privileges = vec![AclEntry {
            grantee: "reporting".into(),
            privilege: "SELECT".into(),
            grantable: false,
        }];
        branch.add_table(users);
        branch.add_constraint(Constraint {
            schema: "app".into(),
            table: "users".into(),
            name: "users_pkey".into(),
            kind: ConstraintKind::PrimaryKey,
            definition: "PRIMARY KEY (id)".into(),
            referenced_table: None,
            comment: None,
        });
        branch.add_index(Index {
            schema: "app".into(),
            name: "users_id_idx".into(),
            table: "users".into(),
            definition: "CREATE INDEX users_id_idx ON app.users (id)".into(),
            comment: None,
        });

        let changes = compute_schema_diff(&DiffContext::default(), &SchemaSnapshot::new(), &branch);
        let plan = plan_changes(changes);
        assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
        assert_dependencies_ordered(&plan, &BTreeSet::new());
    }

    #[test]
    fn test_script_rendering() {
        let changes: Vec<Change> = vec![SchemaChange::Create { name: "app".into() }.into()];
        let plan = plan_changes(changes);
        assert_eq!(plan.to_script(), "CREATE SCHEMA app;\n");
        let statements = plan.to_statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].sql, "CREATE SCHEMA app");
        assert_eq!(statements[0].class, Some(StatementClass::CreateSchema));
    }

    #[test]
    fn test_statement_ids_are_stable() {
        let changes: Vec<Change> = vec![
            SchemaChange::Create { name: "app".into() }.into(),
            TableChange::Create { table: table("app", "users") }.into(),
        ];
        let first = plan_changes(changes.clone()).to_statements();
        let second = plan_changes(changes).to_statements();
        let first_ids: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first_ids[0], "1:schema:app");
    }
}
