//! Phase reconciliation
//!
//! A phase drives every object group of its bundle, in every namespace of its
//! range, from the replica count committed by earlier phases to the phase's
//! target:
//!
//! 1. The desired count of each group is written to the state store up front.
//! 2. Indices in `[target, max_current)` get one delete action each, touching
//!    the groups that still hold that index in reverse bundle order.
//! 3. Indices in `[min_current, target)` get one apply action each, in bundle
//!    order: a group already at the target is patched, a group below the index
//!    is created. When any group already sits at the target, `min_current`
//!    drops to zero so every existing replica gets its content refreshed.
//! 4. All actions of all namespaces go to the phase's tuning set in one list,
//!    deletes of a namespace ahead of its applies.
//! 5. Once the tuning set returns, the current count of every group is
//!    advanced to its desired count, whatever the actions' outcome.

use crate::action::{Action, ActionKind};
use crate::context::ExecutionContext;
use crate::error::{ExecutionError, Result};
use crate::error_list::ErrorList;
use crate::namespace::namespace_list;
use crate::object::{execute_object, resolve_identifier};
use crate::tuning::ActionRunner;
use async_trait::async_trait;
use clusterload_state::{InstancesState, State};
use clusterload_types::{InstancesIdentifier, ObjectTemplate, OperationType, Phase};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Actions reconciling one namespace.
///
/// `bundle` pairs each template with its committed replica count, in bundle
/// order.
pub fn plan_namespace(
    namespace: &str,
    bundle: &[(Arc<ObjectTemplate>, u32)],
    target: u32,
) -> Vec<Action> {
    if bundle.is_empty() {
        return Vec::new();
    }

    let max_current = bundle.iter().map(|(_, current)| *current).max().unwrap_or(0);
    let min_current = if bundle.iter().any(|(_, current)| *current == target) {
        0
    } else {
        bundle.iter().map(|(_, current)| *current).min().unwrap_or(0)
    };

    let mut actions = Vec::new();

    for index in target..max_current {
        let mut action = Action::delete(namespace, index);
        for (object, current) in bundle.iter().rev() {
            if index < *current {
                action.push(object.clone(), OperationType::Delete);
            }
        }
        actions.push(action);
    }

    for index in min_current..target {
        let mut action = Action::apply(namespace, index);
        for (object, current) in bundle {
            if *current == target {
                action.push(object.clone(), OperationType::Patch);
            } else if index >= *current {
                action.push(object.clone(), OperationType::Create);
            }
        }
        actions.push(action);
    }

    actions
}

/// Advances current counts to desired counts when dropped, so the commit runs
/// on every exit path of the phase.
struct DeferredCommit<'a> {
    state: &'a State,
    pending: Vec<(String, InstancesIdentifier, InstancesState)>,
}

impl<'a> DeferredCommit<'a> {
    fn new(state: &'a State) -> Self {
        Self {
            state,
            pending: Vec::new(),
        }
    }

    fn push(&mut self, namespace: &str, id: InstancesIdentifier, instances: InstancesState) {
        self.pending.push((namespace.to_string(), id, instances));
    }
}

impl Drop for DeferredCommit<'_> {
    fn drop(&mut self) {
        for (namespace, id, mut instances) in self.pending.drain(..) {
            instances.current_replica_count = instances.desired_replica_count;
            self.state.namespaces().set(&namespace, &id, instances);
        }
    }
}

/// Runs the object operations of one action against the cluster
struct PhaseActionRunner {
    ctx: Arc<ExecutionContext>,
    errors: Arc<ErrorList>,
}

impl PhaseActionRunner {
    async fn run_operations(&self, action: &Action) {
        for op in &action.operations {
            let result = execute_object(
                &self.ctx,
                &op.object,
                &action.namespace,
                action.replica_index,
                op.operation,
            )
            .await;

            if let Err(e) = result {
                warn!(
                    namespace = %action.namespace,
                    object = %op.object.object_name(action.replica_index),
                    operation = %op.operation,
                    error = %e,
                    "Object operation failed"
                );
                self.errors.append(e);
                if action.kind == ActionKind::Apply {
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ActionRunner for PhaseActionRunner {
    async fn run(&self, action: Action) {
        let outcome = AssertUnwindSafe(self.run_operations(&action))
            .catch_unwind()
            .await;

        if let Err(panic) = outcome {
            let reason = panic_message(panic.as_ref());
            error!(
                namespace = %action.namespace,
                replica_index = action.replica_index,
                reason = %reason,
                "Action panicked"
            );
            self.errors.append(ExecutionError::Task {
                unit: format!(
                    "namespace {:?} replica {} action",
                    action.namespace, action.replica_index
                ),
                reason,
            });
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

fn resolve_identifiers(
    ctx: &ExecutionContext,
    bundle: &[Arc<ObjectTemplate>],
) -> Result<Vec<InstancesIdentifier>> {
    bundle
        .iter()
        .map(|object| resolve_identifier(ctx, object))
        .collect()
}

/// Reconcile every namespace of `phase` to its target replica count.
///
/// Errors of individual object operations are collected, never returned
/// early. A phase whose tuning set or object identities cannot be resolved
/// does no work and leaves the state store untouched.
#[instrument(
    skip_all,
    fields(tuning_set = %phase.tuning_set, replicas = phase.replicas_per_namespace)
)]
pub async fn execute_phase(ctx: &Arc<ExecutionContext>, phase: &Phase) -> ErrorList {
    let namespaces = namespace_list(ctx.namespace_prefix(), phase.namespace_range.as_ref());
    if namespaces.is_empty() {
        debug!("Namespace range is empty, nothing to reconcile");
        return ErrorList::new();
    }

    let tuning_set = match ctx.tuning_sets().create(&phase.tuning_set) {
        Ok(tuning_set) => tuning_set,
        Err(e) => return ErrorList::from(ExecutionError::from(e)),
    };

    let bundle: Vec<Arc<ObjectTemplate>> = phase
        .object_bundle
        .iter()
        .cloned()
        .map(Arc::new)
        .collect();
    let identifiers = match resolve_identifiers(ctx, &bundle) {
        Ok(identifiers) => identifiers,
        Err(e) => return ErrorList::from(e),
    };

    let target = phase.replicas_per_namespace;
    let store = ctx.state().namespaces();
    let mut commit = DeferredCommit::new(ctx.state());
    let mut actions = Vec::new();

    for namespace in &namespaces {
        let mut planned = Vec::with_capacity(bundle.len());
        for (object, id) in bundle.iter().zip(&identifiers) {
            let mut instances = store
                .get(namespace, id)
                .unwrap_or_else(|| InstancesState::new(object.as_ref().clone()));
            instances.desired_replica_count = target;
            store.set(namespace, id, instances.clone());

            planned.push((object.clone(), instances.current_replica_count));
            commit.push(namespace, id.clone(), instances);
        }
        actions.extend(plan_namespace(namespace, &planned, target));
    }

    info!(
        namespaces = namespaces.len(),
        actions = actions.len(),
        "Dispatching phase actions"
    );

    let errors = Arc::new(ErrorList::new());
    let runner: Arc<dyn ActionRunner> = Arc::new(PhaseActionRunner {
        ctx: ctx.clone(),
        errors: errors.clone(),
    });
    tuning_set.execute(actions, runner).await;
    drop(commit);

    errors.take()
}
