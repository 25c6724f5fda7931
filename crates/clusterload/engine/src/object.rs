//! Single object operations

use crate::context::ExecutionContext;
use crate::error::{ExecutionError, Result};
use clusterload_types::{
    InstancesIdentifier, Object, ObjectTemplate, OperationType, ResourceTypeIdentifier,
};
use serde_json::Value;
use tracing::debug;

/// Placeholder receiving the replica's object name
pub const NAME_PLACEHOLDER: &str = "Name";
/// Placeholder receiving the replica index
pub const INDEX_PLACEHOLDER: &str = "Index";

/// Run one create, patch or delete for replica `replica_index` of `object`.
///
/// Create and patch render the template with the object's fill map plus the
/// `Name` and `Index` placeholders; delete only needs the raw template to
/// learn the kind. Nothing reaches the cluster when rendering fails.
pub async fn execute_object(
    ctx: &ExecutionContext,
    object: &ObjectTemplate,
    namespace: &str,
    replica_index: u32,
    operation: OperationType,
) -> Result<()> {
    let name = object.object_name(replica_index);
    let path = &object.object_template_path;

    if operation == OperationType::Delete {
        let raw = ctx
            .templates()
            .raw_to_object(path)
            .map_err(|source| ExecutionError::TemplateForDeletion {
                path: path.clone(),
                source,
            })?;
        ctx.cluster()
            .delete_object(&raw.group_version_kind(), namespace, &name)
            .await
            .map_err(|source| ExecutionError::Delete {
                namespace: namespace.to_string(),
                name: name.clone(),
                source,
            })?;
        debug!(namespace, object = %name, replica_index, "Object deleted");
        return Ok(());
    }

    let mut mapping = object.template_fill_map.clone().unwrap_or_default();
    mapping.insert(NAME_PLACEHOLDER.to_string(), Value::from(name.clone()));
    mapping.insert(INDEX_PLACEHOLDER.to_string(), Value::from(replica_index));

    let rendered = ctx
        .templates()
        .template_to_object(path, &mapping)
        .map_err(|source| ExecutionError::Template {
            path: path.clone(),
            source,
        })?;

    let stored = if operation == OperationType::Create {
        ctx.cluster()
            .create_object(namespace, &name, &rendered)
            .await
            .map_err(|source| ExecutionError::Create {
                namespace: namespace.to_string(),
                name: name.clone(),
                source,
            })?
    } else {
        ctx.cluster()
            .patch_object(namespace, &name, &rendered)
            .await
            .map_err(|source| ExecutionError::Patch {
                namespace: namespace.to_string(),
                name: name.clone(),
                source,
            })?
    };

    record_resource_version(ctx, &stored).map_err(|source| ExecutionError::ResourceVersion {
        namespace: namespace.to_string(),
        name: name.clone(),
        source,
    })?;

    debug!(namespace, object = %name, replica_index, %operation, "Object operation succeeded");
    Ok(())
}

/// Keyed by the kind and group of the object the cluster returned.
fn record_resource_version(
    ctx: &ExecutionContext,
    stored: &Object,
) -> clusterload_state::Result<()> {
    let gvk = stored.group_version_kind();
    let resource = ResourceTypeIdentifier::new(gvk.kind, gvk.group);
    ctx.state()
        .resource_versions()
        .set(&resource, stored.resource_version().unwrap_or_default())
}

/// Discover the object group identity of a template from its raw render.
pub fn resolve_identifier(
    ctx: &ExecutionContext,
    object: &ObjectTemplate,
) -> Result<InstancesIdentifier> {
    let raw = ctx
        .templates()
        .raw_to_object(&object.object_template_path)
        .map_err(|source| ExecutionError::Identifier {
            path: object.object_template_path.clone(),
            source,
        })?;
    let gvk = raw.group_version_kind();
    Ok(InstancesIdentifier::new(
        object.basename.clone(),
        gvk.kind,
        gvk.group,
    ))
}
