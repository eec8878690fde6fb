//! One-shot, whole-graph validation run while a [`crate::TechIndex`] is built.
//!
//! Checks run in a fixed order, each relying on the previous one:
//!
//! 1. Every tech names a registered category.
//! 2. Every prerequisite name resolves to a registered tech.
//! 3. The prerequisite graph is acyclic (DFS with white/gray/black marks).
//! 4. No direct prerequisite is already implied by another one
//!    (memoized transitive closures, compared pairwise).
//!
//! The first violation found, in name order, aborts construction.

use crate::category::TechCategory;
use crate::error::TechGraphError;
use crate::id::TechIdx;
use crate::tech::TechDef;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Adjacency and closure data derived from a validated batch. Every list is
/// sorted by [`TechIdx`], i.e. by name.
#[derive(Debug, Clone, Default)]
pub(crate) struct GraphShape {
    /// Direct prerequisites of each tech.
    pub prerequisites: Vec<Vec<TechIdx>>,
    /// Reverse edges: techs that list each tech as a prerequisite.
    pub dependents: Vec<Vec<TechIdx>>,
    /// Transitive prerequisite closure of each tech (excluding itself).
    pub ancestors: Vec<BTreeSet<TechIdx>>,
    /// Every tech, prerequisites before dependents.
    pub order: Vec<TechIdx>,
}

/// Run every check over `defs`, which must be sorted by name with
/// `slots[name]` giving each def's position.
pub(crate) fn validate(
    defs: &[TechDef],
    slots: &BTreeMap<String, TechIdx>,
    categories: &BTreeMap<String, TechCategory>,
) -> Result<GraphShape, TechGraphError> {
    check_categories(defs, categories)?;
    let prerequisites = resolve_prerequisites(defs, slots)?;
    let dependents = derive_dependents(&prerequisites);

    if let Some(cycle) = find_cycle(&dependents) {
        return Err(TechGraphError::CyclicDependency {
            cycle: cycle
                .into_iter()
                .map(|idx| defs[idx.slot()].name.clone())
                .collect(),
        });
    }

    let order = topological_order(&prerequisites, &dependents);
    let ancestors = transitive_prerequisites(&prerequisites, &order);

    if let Some(edge) = find_redundant_dependency(&prerequisites, &ancestors) {
        return Err(TechGraphError::RedundantDependency {
            prerequisite: defs[edge.prerequisite.slot()].name.clone(),
            dependent: defs[edge.dependent.slot()].name.clone(),
            via: defs[edge.via.slot()].name.clone(),
        });
    }

    Ok(GraphShape {
        prerequisites,
        dependents,
        ancestors,
        order,
    })
}

// ---------------------------------------------------------------------------
// Reference checks
// ---------------------------------------------------------------------------

fn check_categories(
    defs: &[TechDef],
    categories: &BTreeMap<String, TechCategory>,
) -> Result<(), TechGraphError> {
    match defs.iter().find(|def| !categories.contains_key(&def.category)) {
        Some(def) => Err(TechGraphError::UnknownCategory {
            tech: def.name.clone(),
            category: def.category.clone(),
        }),
        None => Ok(()),
    }
}

/// Map every prerequisite name to its arena index.
fn resolve_prerequisites(
    defs: &[TechDef],
    slots: &BTreeMap<String, TechIdx>,
) -> Result<Vec<Vec<TechIdx>>, TechGraphError> {
    defs.iter()
        .map(|def| {
            def.prerequisites
                .iter()
                .map(|prereq| {
                    slots
                        .get(prereq)
                        .copied()
                        .ok_or_else(|| TechGraphError::UnknownPrerequisite {
                            tech: def.name.clone(),
                            prerequisite: prereq.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn derive_dependents(prerequisites: &[Vec<TechIdx>]) -> Vec<Vec<TechIdx>> {
    let mut dependents = vec![Vec::new(); prerequisites.len()];
    // Outer loop runs in index order, so each list comes out sorted.
    for (slot, prereqs) in prerequisites.iter().enumerate() {
        for prereq in prereqs {
            dependents[prereq.slot()].push(TechIdx::from_slot(slot));
        }
    }
    dependents
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Depth-first search along prerequisite -> dependent edges. Returns the
/// first cycle found as a path that starts and ends at the same tech.
fn find_cycle(dependents: &[Vec<TechIdx>]) -> Option<Vec<TechIdx>> {
    let mut marks = vec![Mark::White; dependents.len()];
    // Each frame is (node, next dependent to visit). The stack is exactly
    // the set of gray nodes, in discovery order.
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..dependents.len() {
        if marks[root] != Mark::White {
            continue;
        }
        marks[root] = Mark::Gray;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&child) = dependents[node].get(frame.1) else {
                marks[node] = Mark::Black;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[child.slot()] {
                Mark::White => {
                    marks[child.slot()] = Mark::Gray;
                    stack.push((child.slot(), 0));
                }
                Mark::Gray => {
                    let start = stack
                        .iter()
                        .position(|&(n, _)| n == child.slot())
                        .unwrap_or(0);
                    let mut cycle: Vec<TechIdx> = stack[start..]
                        .iter()
                        .map(|&(n, _)| TechIdx::from_slot(n))
                        .collect();
                    cycle.push(child);
                    return Some(cycle);
                }
                Mark::Black => {}
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Closures
// ---------------------------------------------------------------------------

/// Kahn's algorithm over prerequisite -> dependent edges. Only valid on an
/// acyclic graph.
fn topological_order(
    prerequisites: &[Vec<TechIdx>],
    dependents: &[Vec<TechIdx>],
) -> Vec<TechIdx> {
    let mut in_degree: Vec<usize> = prerequisites.iter().map(Vec::len).collect();

    let mut queue: VecDeque<TechIdx> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(slot, _)| TechIdx::from_slot(slot))
        .collect();

    let mut order = Vec::with_capacity(prerequisites.len());
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &dependent in &dependents[node.slot()] {
            let deg = &mut in_degree[dependent.slot()];
            *deg -= 1;
            if *deg == 0 {
                queue.push_back(dependent);
            }
        }
    }
    order
}

/// Memoized transitive prerequisite sets, accumulated in topological order
/// so every prerequisite's closure is complete before it is read.
fn transitive_prerequisites(
    prerequisites: &[Vec<TechIdx>],
    order: &[TechIdx],
) -> Vec<BTreeSet<TechIdx>> {
    let mut ancestors: Vec<BTreeSet<TechIdx>> = vec![BTreeSet::new(); prerequisites.len()];
    for &node in order {
        let mut closure = BTreeSet::new();
        for &prereq in &prerequisites[node.slot()] {
            closure.insert(prereq);
            closure.extend(ancestors[prereq.slot()].iter().copied());
        }
        ancestors[node.slot()] = closure;
    }
    ancestors
}

// ---------------------------------------------------------------------------
// Redundancy
// ---------------------------------------------------------------------------

/// A direct edge `prerequisite -> dependent` implied by the longer path
/// through `via`, another direct prerequisite of `dependent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RedundantEdge {
    prerequisite: TechIdx,
    dependent: TechIdx,
    via: TechIdx,
}

/// Compare every ordered pair of distinct direct prerequisites of each tech.
fn find_redundant_dependency(
    prerequisites: &[Vec<TechIdx>],
    ancestors: &[BTreeSet<TechIdx>],
) -> Option<RedundantEdge> {
    for (slot, prereqs) in prerequisites.iter().enumerate() {
        for &prerequisite in prereqs {
            for &via in prereqs {
                if via != prerequisite && ancestors[via.slot()].contains(&prerequisite) {
                    return Some(RedundantEdge {
                        prerequisite,
                        dependent: TechIdx::from_slot(slot),
                        via,
                    });
                }
            }
        }
    }
    None
}
