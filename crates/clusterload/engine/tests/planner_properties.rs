//! Properties of the per-namespace action planner

use clusterload_engine::{plan_namespace, Action, ActionKind};
use clusterload_types::{ObjectTemplate, OperationType};
use proptest::prelude::*;
use std::sync::Arc;

fn bundle(currents: &[u32]) -> Vec<(Arc<ObjectTemplate>, u32)> {
    currents
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let basename = format!("obj{}", i);
            let path = format!("{}.yaml", basename);
            (Arc::new(ObjectTemplate::new(basename, path)), *current)
        })
        .collect()
}

/// (replica index, operation) pairs planned for one bundle entry
fn operations_for(actions: &[Action], basename: &str) -> Vec<(u32, OperationType)> {
    actions
        .iter()
        .flat_map(|action| {
            action
                .operations
                .iter()
                .filter(move |op| op.object.basename == basename)
                .map(move |op| (action.replica_index, op.operation))
        })
        .collect()
}

proptest! {
    #[test]
    fn deletes_cover_every_surplus_index_once(
        currents in prop::collection::vec(0u32..8, 1..5),
        target in 0u32..8,
    ) {
        let bundle = bundle(&currents);
        let actions = plan_namespace("ns", &bundle, target);

        for (object, current) in &bundle {
            let deleted: Vec<u32> = operations_for(&actions, &object.basename)
                .into_iter()
                .filter(|(_, op)| *op == OperationType::Delete)
                .map(|(index, _)| index)
                .collect();
            let expected: Vec<u32> = (target..*current).collect();
            prop_assert_eq!(deleted, expected);
        }
    }

    #[test]
    fn deletes_run_in_reverse_bundle_order(
        currents in prop::collection::vec(0u32..8, 1..5),
        target in 0u32..8,
    ) {
        let bundle = bundle(&currents);
        for action in plan_namespace("ns", &bundle, target) {
            if action.kind != ActionKind::Delete {
                continue;
            }
            let positions: Vec<usize> = action
                .operations
                .iter()
                .map(|op| bundle.iter().position(|(o, _)| Arc::ptr_eq(o, &op.object)).unwrap())
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            prop_assert_eq!(positions, sorted);
        }
    }

    #[test]
    fn deletes_precede_applies(
        currents in prop::collection::vec(0u32..8, 1..5),
        target in 0u32..8,
    ) {
        let actions = plan_namespace("ns", &bundle(&currents), target);
        let first_apply = actions
            .iter()
            .position(|a| a.kind == ActionKind::Apply)
            .unwrap_or(actions.len());
        prop_assert!(actions[first_apply..].iter().all(|a| a.kind == ActionKind::Apply));
    }

    #[test]
    fn applies_reach_target(
        currents in prop::collection::vec(0u32..8, 1..5),
        target in 0u32..8,
    ) {
        let bundle = bundle(&currents);
        let actions = plan_namespace("ns", &bundle, target);

        for (object, current) in &bundle {
            let applied: Vec<(u32, OperationType)> = operations_for(&actions, &object.basename)
                .into_iter()
                .filter(|(_, op)| *op != OperationType::Delete)
                .collect();

            let expected: Vec<(u32, OperationType)> = if *current == target {
                (0..target).map(|i| (i, OperationType::Patch)).collect()
            } else if *current > target {
                Vec::new()
            } else {
                (*current..target).map(|i| (i, OperationType::Create)).collect()
            };
            prop_assert_eq!(applied, expected);
        }
    }

    #[test]
    fn second_identical_phase_only_patches(
        target in 1u32..8,
        width in 1usize..5,
    ) {
        let currents = vec![target; width];
        let actions = plan_namespace("ns", &bundle(&currents), target);

        prop_assert_eq!(actions.len() as u32, target);
        for (i, action) in actions.iter().enumerate() {
            prop_assert_eq!(action.replica_index, i as u32);
            prop_assert_eq!(action.kind, ActionKind::Apply);
            prop_assert!(action.operation_types().iter().all(|op| *op == OperationType::Patch));
            prop_assert_eq!(action.operations.len(), width);
        }
    }
}
