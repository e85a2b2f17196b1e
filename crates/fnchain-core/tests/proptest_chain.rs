use proptest::prelude::*;

use fnchain_core::graph::{FunctionGraph, find_all_cycles, find_cycle};
use fnchain_core::model::{Dependency, Function, FunctionSet};
use fnchain_core::percent::Percentage;
use fnchain_core::synth::{SourceMarking, SynthesisOptions, synthesize};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn name(i: usize) -> String {
    format!("fn{i:02}")
}

fn build_set(n: usize, edges: &[(usize, usize)]) -> FunctionSet {
    let mut targets: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in edges {
        if !targets[from].contains(&to) {
            targets[from].push(to);
        }
    }
    targets
        .into_iter()
        .enumerate()
        .map(|(i, outs)| {
            let function = if outs.is_empty() {
                Function::default()
            } else {
                Function::with_dependencies(
                    outs.into_iter()
                        .map(|t| Dependency::function(name(t), "Name"))
                        .collect(),
                )
            };
            (name(i), function)
        })
        .collect()
}

/// Function sets whose edges only point to later keys, so they never loop.
fn arb_acyclic_set() -> impl Strategy<Value = FunctionSet> {
    (1usize..16).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..n).prop_map(move |pairs| {
            let forward: Vec<(usize, usize)> = pairs
                .into_iter()
                .filter(|(a, b)| a < b)
                .collect();
            build_set(n, &forward)
        })
    })
}

/// Function sets with arbitrary edges, self-loops included.
fn arb_any_set() -> impl Strategy<Value = FunctionSet> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..n * 2).prop_map(move |pairs| build_set(n, &pairs))
    })
}

fn arb_options() -> impl Strategy<Value = SynthesisOptions> {
    (0i64..=100, any::<bool>()).prop_map(|(p, every)| SynthesisOptions {
        percentage: Percentage::new(p).expect("in range"),
        marking: if every {
            SourceMarking::EverySource
        } else {
            SourceMarking::FirstEdgeOnly
        },
        ..SynthesisOptions::default()
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn edge_count_bounded_by_gap(set in arb_acyclic_set(), opts in arb_options()) {
        let result = synthesize(&set, &opts).expect("acyclic input");
        let bound = usize::try_from(result.metrics.to_serialize.max(0)).expect("non-negative");
        prop_assert!(result.edges.len() <= bound);
    }

    #[test]
    fn dependent_count_never_drops(set in arb_acyclic_set(), opts in arb_options()) {
        let before = set.dependent_count();
        let result = synthesize(&set, &opts).expect("acyclic input");
        prop_assert!(result.functions.dependent_count() >= before);
        prop_assert_eq!(result.metrics.final_dependent, result.functions.dependent_count());
    }

    #[test]
    fn acyclic_input_stays_acyclic(set in arb_acyclic_set(), opts in arb_options()) {
        let result = synthesize(&set, &opts).expect("acyclic input");
        prop_assert!(find_cycle(&FunctionGraph::build(&result.functions)).is_none());
    }

    #[test]
    fn edges_join_distinct_dependency_free_functions(set in arb_acyclic_set(), opts in arb_options()) {
        let free = set.dependency_free();
        let result = synthesize(&set, &opts).expect("acyclic input");

        let mut targets: Vec<&str> = Vec::new();
        for edge in &result.edges {
            prop_assert_ne!(&edge.source, &edge.target);
            prop_assert!(free.contains(&edge.source.as_str()));
            prop_assert!(free.contains(&edge.target.as_str()));
            prop_assert!(!targets.contains(&edge.target.as_str()));
            targets.push(edge.target.as_str());
        }
    }

    #[test]
    fn existing_dependencies_are_preserved(set in arb_acyclic_set(), opts in arb_options()) {
        let result = synthesize(&set, &opts).expect("acyclic input");
        for (name, function) in set.iter() {
            let after = result.functions.get(name).expect("same keys");
            let original = function.dependencies();
            prop_assert_eq!(&after.dependencies()[..original.len()], original);
        }
        prop_assert_eq!(
            result.functions.names().collect::<Vec<_>>(),
            set.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn cycle_detection_is_deterministic(set in arb_any_set()) {
        let graph = FunctionGraph::build(&set);
        prop_assert_eq!(find_cycle(&graph), find_cycle(&graph));
    }

    #[test]
    fn first_cycle_agrees_with_all_cycles(set in arb_any_set()) {
        let graph = FunctionGraph::build(&set);
        let first = find_cycle(&graph);
        let groups = find_all_cycles(&graph);
        prop_assert_eq!(first.is_some(), !groups.is_empty());

        if let Some(path) = first {
            let repeated = path.repeated().expect("non-empty path").to_string();
            prop_assert!(groups.iter().any(|g| g.contains(&repeated)));

            // Consecutive names are real edges.
            for pair in path.nodes().windows(2) {
                prop_assert!(set.function_targets(&pair[0]).contains(&pair[1].as_str()));
            }
        }
    }

    #[test]
    fn synthesis_fails_exactly_on_cyclic_input(set in arb_any_set(), opts in arb_options()) {
        let cyclic = find_cycle(&FunctionGraph::build(&set)).is_some();
        prop_assert_eq!(synthesize(&set, &opts).is_err(), cyclic);
    }
}
