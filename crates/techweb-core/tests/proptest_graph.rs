//! Property-based tests for the tech graph.
//!
//! Uses proptest to generate random tech sets, then checks the graph
//! invariants and the progression query contracts.

use proptest::prelude::*;
use std::collections::BTreeSet;
use techweb_core::test_utils::*;
use techweb_core::*;

// ===========================================================================
// Generators
// ===========================================================================

fn name(i: usize) -> String {
    format!("TECH_{i:03}")
}

/// Random layered tech set. Each tech picks a distinct subset of the
/// previous layer as prerequisites, which can never be cyclic or redundant.
fn arb_valid_techs() -> impl Strategy<Value = Vec<TechDef>> {
    (1..6usize, 1..6usize).prop_flat_map(|(layers, width)| {
        let count = layers * width;
        (
            proptest::collection::vec(0u32..(1 << width), count),
            proptest::collection::vec(0u32..100, count),
            proptest::collection::vec(prop::bool::weighted(0.9), count),
        )
            .prop_map(move |(masks, costs, researchable)| {
                (0..count)
                    .map(|i| {
                        let layer = i / width;
                        let prereqs: BTreeSet<String> = if layer == 0 {
                            BTreeSet::new()
                        } else {
                            (0..width)
                                .filter(|bit| masks[i] & (1 << bit) != 0)
                                .map(|bit| name((layer - 1) * width + bit))
                                .collect()
                        };
                        TechDef {
                            prerequisites: prereqs,
                            researchable: researchable[i],
                            ..TechDef::new(name(i), TEST_CATEGORY, f64::from(costs[i]))
                        }
                    })
                    .collect()
            })
    })
}

/// Random forward-only edges (i -> j with i < j). Acyclic, but may contain
/// redundant shortcuts.
fn arb_forward_dag() -> impl Strategy<Value = Vec<TechDef>> {
    (2..12usize).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(move |pairs| {
            let mut defs: Vec<TechDef> = (0..n).map(|i| tech(&name(i), 1.0, &[])).collect();
            for (a, b) in pairs {
                if a < b {
                    defs[b].prerequisites.insert(name(a));
                }
            }
            defs
        })
    })
}

fn arb_known(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set((0..max).prop_map(name), 0..12)
}

fn names(techs: &[&Tech]) -> Vec<String> {
    techs.iter().map(|t| t.name().to_string()).collect()
}

/// Unknown techs reachable backwards from `goal` without passing through a
/// known tech. Empty when `goal` is known.
fn still_needed(index: &TechIndex, known: &BTreeSet<String>, goal: &str) -> BTreeSet<String> {
    let mut needed = BTreeSet::new();
    let mut stack = vec![goal.to_string()];
    while let Some(name) = stack.pop() {
        if known.contains(&name) || !needed.insert(name.clone()) {
            continue;
        }
        if let Some(tech) = index.lookup(&name) {
            stack.extend(tech.prerequisites().iter().cloned());
        }
    }
    needed
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Reverse edges match prerequisites exactly.
    #[test]
    fn unlocked_techs_mirror_prerequisites(defs in arb_valid_techs()) {
        let index = build_index(defs);
        for tech in index.iter() {
            let expected: BTreeSet<String> = index
                .iter()
                .filter(|u| u.prerequisites().contains(tech.name()))
                .map(|u| u.name().to_string())
                .collect();
            prop_assert_eq!(tech.unlocked_techs(), &expected);
        }
    }

    /// No tech is its own ancestor, and no direct prerequisite is implied
    /// by another.
    #[test]
    fn built_graph_is_acyclic_and_reduced(defs in arb_valid_techs()) {
        let index = build_index(defs);
        for tech in index.iter() {
            let closure = index.recursive_prereqs(tech.name()).unwrap();
            prop_assert!(!closure.contains(&tech.name()));
            for a in tech.prerequisites() {
                for b in tech.prerequisites() {
                    if a != b {
                        let via = index.recursive_prereqs(b).unwrap();
                        prop_assert!(!via.contains(&a.as_str()));
                    }
                }
            }
        }
    }

    /// Forward-only edges never produce a cycle error; any rejection is a
    /// genuine shortcut.
    #[test]
    fn forward_edges_never_cyclic(defs in arb_forward_dag()) {
        match TechIndex::from_parts([test_category()], defs) {
            Ok(_) => {}
            Err(TechGraphError::RedundantDependency { prerequisite, via, .. }) => {
                prop_assert!(prerequisite < via);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// Adding a back edge to a chain always closes a cycle.
    #[test]
    fn back_edge_closes_cycle(n in 2..10usize, from in 0..10usize) {
        let from = from % n;
        let mut defs: Vec<TechDef> = (0..n)
            .map(|i| {
                let prereqs: Vec<String> = if i == 0 { vec![] } else { vec![name(i - 1)] };
                TechDef::new(name(i), TEST_CATEGORY, 1.0).with_prerequisites(prereqs)
            })
            .collect();
        defs[from].prerequisites.insert(name(n - 1));
        let err = TechIndex::from_parts([test_category()], defs).unwrap_err();
        let is_cycle = matches!(err, TechGraphError::CyclicDependency { .. });
        prop_assert!(is_cycle, "expected a cycle, got {err:?}");
    }

    /// The frontier never contains known techs or techs with an unmet
    /// prerequisite.
    #[test]
    fn frontier_contract(defs in arb_valid_techs(), known in arb_known(36)) {
        let index = build_index(defs);
        let prog = index.progression();
        for tech in prog.frontier(&known) {
            prop_assert!(!known.contains(tech.name()));
            prop_assert!(tech.researchable());
            prop_assert!(tech.prerequisites().iter().all(|p| known.contains(p)));
        }
        if let Some(cheapest) = prog.cheapest_frontier(&known) {
            for tech in prog.frontier(&known) {
                prop_assert!(cheapest.research_cost() <= tech.research_cost());
            }
        }
    }

    /// Path results are valid research orders that make the goal reachable.
    #[test]
    fn path_is_valid_linearization(
        defs in arb_valid_techs(),
        known in arb_known(36),
        goal in 0..36usize,
    ) {
        let index = build_index(defs);
        let prog = index.progression();
        let goal = name(goal % index.tech_count());

        let needed = still_needed(&index, &known, &goal);

        for path in [prog.path_towards(&known, &goal), prog.cheapest_path_towards(&known, &goal)] {
            match path {
                Ok(path) => {
                    // Exactly the techs still needed, nothing hidden behind a known one.
                    let scheduled: BTreeSet<String> = names(&path).into_iter().collect();
                    prop_assert_eq!(scheduled.len(), path.len());
                    prop_assert_eq!(&scheduled, &needed);
                    let mut done = known.clone();
                    for step in &path {
                        prop_assert!(step.researchable());
                        prop_assert!(step.prerequisites().iter().all(|p| done.contains(p)));
                        done.insert(step.name().to_string());
                    }
                    prop_assert!(done.contains(&goal));
                    if known.contains(&goal) {
                        prop_assert!(path.is_empty());
                    }
                }
                Err(QueryError::UnreachableGoal { blocker, .. }) => {
                    prop_assert!(needed.contains(&blocker));
                    let blocker = index.lookup(&blocker).unwrap();
                    prop_assert!(!blocker.researchable());
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }
        }
    }

    /// Identical arguments give identical answers.
    #[test]
    fn queries_are_deterministic(defs in arb_valid_techs(), known in arb_known(36)) {
        let index = build_index(defs);
        let prog = index.progression();
        prop_assert_eq!(names(&prog.frontier(&known)), names(&prog.frontier(&known)));
        let goal = name(index.tech_count() - 1);
        let first = prog.path_towards(&known, &goal).map(|p| names(&p));
        let second = prog.path_towards(&known, &goal).map(|p| names(&p));
        prop_assert_eq!(first, second);
    }
}
