//! Dependency graph and topological ordering over statement nodes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::annotations::Phase;
use super::classify::StatementClass;
use super::StatementNode;
use crate::error::{Diagnostic, DiagnosticCode};
use crate::ident::StableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeReason {
    Requires,
    /// The dependency is the key side of a foreign-key reference.
    RequiresConstraintKey,
    /// The dependency supplies a type, language or similar compatibility.
    RequiresCompatible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSummary {
    pub from: usize,
    pub to: usize,
    pub reason: EdgeReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edges: Vec<EdgeSummary>,
    pub cycle_groups: Vec<Vec<usize>>,
}

/// The phase a statement defaults to when no annotation names one.
pub(super) fn default_phase(class: Option<StatementClass>) -> Phase {
    use StatementClass::*;
    match class {
        Some(CreateSchema) | Some(CreateExtension) | Some(CreateLanguage) | Some(CreateRole) => {
            Phase::Bootstrap
        }
        Some(CreateCollation) | Some(CreateType) | Some(CreateDomain) | Some(CreateSequence) => {
            Phase::PreData
        }
        Some(CreateTable)
        | Some(CreateIndex)
        | Some(AlterTable)
        | Some(AlterSequence)
        | Some(CreateForeignDataWrapper)
        | Some(CreateServer)
        | Some(CreateForeignTable)
        | Some(CreateUserMapping) => Phase::DataStructures,
        Some(CreateFunction) | Some(CreateProcedure) | Some(CreateAggregate) => Phase::Routines,
        Some(Grant) | Some(Revoke) | Some(AlterDefaultPrivileges) | Some(AlterOwner) => {
            Phase::Privileges
        }
        _ => Phase::PostData,
    }
}

pub(super) struct TopoOutput {
    pub order: Vec<usize>,
    pub graph: GraphSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// Order nodes so that producers come before consumers. Ties break on
/// (phase rank, file path, statement index); nodes on a cycle are reported
/// and appended in input order.
pub(super) fn sort_nodes(nodes: &[StatementNode]) -> TopoOutput {
    let mut diagnostics = Vec::new();

    let mut producers: BTreeMap<&StableId, Vec<usize>> = BTreeMap::new();
    for (index, node) in nodes.iter().enumerate() {
        for id in &node.provides {
            producers.entry(id).or_default().push(index);
        }
    }
    for (id, indices) in &producers {
        if indices.len() > 1 {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateProducer,
                    format!("{} statements provide {id}", indices.len()),
                )
                .with_subjects(indices.iter().map(|&i| nodes[i].display_id())),
            );
        }
    }

    let mut edges: Vec<EdgeSummary> = Vec::new();
    let mut successors: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut indegree: Vec<usize> = vec![0; nodes.len()];

    for (index, node) in nodes.iter().enumerate() {
        for (id, reason) in &node.requires {
            match producers.get(id) {
                Some(producer_indices) => {
                    for &producer in producer_indices {
                        if producer == index {
                            continue;
                        }
                        if successors.entry(producer).or_default().insert(index) {
                            indegree[index] += 1;
                            edges.push(EdgeSummary {
                                from: producer,
                                to: index,
                                reason: *reason,
                            });
                        }
                    }
                }
                None => {
                    // Only annotation-declared dependencies warrant noise;
                    // ordinary references to preexisting objects are normal
                    if node.annotated_requires.contains(id) {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticCode::UnresolvedDependency,
                                format!("no statement provides {id}"),
                            )
                            .with_subject(node.display_id()),
                        );
                    }
                }
            }
        }
    }

    let sort_key = |index: usize| {
        let node = &nodes[index];
        (
            node.phase.unwrap_or_else(|| default_phase(node.class)).rank(),
            node.file.clone().unwrap_or_default(),
            node.index,
            index,
        )
    };

    let mut ready: BTreeSet<(u8, String, usize, usize)> = (0..nodes.len())
        .filter(|&i| indegree[i] == 0)
        .map(sort_key)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());
    let mut placed = vec![false; nodes.len()];

    while let Some(key) = ready.iter().next().cloned() {
        ready.remove(&key);
        let index = key.3;
        order.push(index);
        placed[index] = true;
        if let Some(next) = successors.get(&index) {
            for &successor in next {
                indegree[successor] -= 1;
                if indegree[successor] == 0 {
                    ready.insert(sort_key(successor));
                }
            }
        }
    }

    let mut cycle_groups: Vec<Vec<usize>> = Vec::new();
    if order.len() < nodes.len() {
        let remaining: Vec<usize> = (0..nodes.len()).filter(|&i| !placed[i]).collect();
        cycle_groups = components(&remaining, &successors);
        for group in &cycle_groups {
            if group.len() > 1 {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::CycleDetected,
                        format!("{} statements form a dependency cycle", group.len()),
                    )
                    .with_subjects(group.iter().map(|&i| nodes[i].display_id())),
                );
            }
        }
        // Cycle members keep their input order at the end
        order.extend(remaining);
    }

    TopoOutput {
        order,
        graph: GraphSummary {
            node_count: nodes.len(),
            edges,
            cycle_groups,
        },
        diagnostics,
    }
}

fn components(
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
    let mut groups = Vec::new();
    for &node in nodes {
        if assigned.contains(&node) {
            continue;
        }
        let mut group = vec![node];
        for &other in nodes {
            if other != node && reach[&node].contains(&other) && reach[&other].contains(&node) {
                group.push(other);
            }
        }
        group.sort_unstable();
        for &member in &group {
            assigned.insert(member);
        }
        groups.push(group);
    }
    groups
}
