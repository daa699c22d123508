//! Commands for GPO management

use crate::cli::OutputFormat;
use crate::domain::GroupPolicyInfo;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{PolicyManager, RegistryStore};
use crate::output::render_gpos;

/// Turn a placeholder `false` into an error the operator can tell apart from a failure
pub(crate) fn require_done(done: bool, what: String) -> AppResult<()> {
    if done {
        Ok(())
    } else {
        Err(AppError::NotImplemented(what))
    }
}

/// List all GPOs in the manager's scope
pub async fn list_gpos<S: RegistryStore>(
    manager: &PolicyManager<S>,
    format: OutputFormat,
) -> AppResult<String> {
    let gpos = manager.get_all_gpos().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list GPOs");
        e
    })?;
    let infos: Vec<GroupPolicyInfo> = gpos.iter().map(GroupPolicyInfo::from).collect();
    render_gpos(&infos, format)
}

/// Show a single GPO, looked up by id or by name
pub async fn get_gpo<S: RegistryStore>(
    manager: &PolicyManager<S>,
    id: Option<&str>,
    name: Option<&str>,
    format: OutputFormat,
) -> AppResult<String> {
    let (gpo, wanted) = match (id, name) {
        (Some(id), _) => (manager.get_gpo_by_id(id).await?, id),
        (None, Some(name)) => (manager.get_gpo_by_name(name).await?, name),
        (None, None) => {
            return Err(AppError::InvalidValue(
                "either an id or a name is required".to_string(),
            ))
        }
    };

    let gpo = gpo.ok_or_else(|| AppError::GpoNotFound(wanted.to_string()))?;
    render_gpos(&[GroupPolicyInfo::from(&gpo)], format)
}

pub async fn create_gpo<S: RegistryStore>(
    manager: &PolicyManager<S>,
    name: &str,
    description: Option<&str>,
) -> AppResult<String> {
    let created = manager.create_gpo(name, description).await?;
    require_done(created, format!("creating GPO '{}' in {}", name, manager.scope()))?;
    Ok(format!("GPO '{}' created successfully", name))
}

pub async fn delete_gpo<S: RegistryStore>(
    manager: &PolicyManager<S>,
    id: &str,
) -> AppResult<String> {
    let deleted = manager.delete_gpo(id).await?;
    require_done(deleted, format!("deleting GPO '{}' in {}", id, manager.scope()))?;
    Ok(format!("GPO '{}' deleted successfully", id))
}

pub async fn link_gpo<S: RegistryStore>(
    manager: &PolicyManager<S>,
    gpo_id: &str,
    ou: &str,
) -> AppResult<String> {
    let linked = manager.link_gpo(gpo_id, ou).await?;
    require_done(linked, format!("linking GPO '{}' to '{}'", gpo_id, ou))?;
    Ok(format!("GPO '{}' linked to '{}'", gpo_id, ou))
}

pub async fn unlink_gpo<S: RegistryStore>(
    manager: &PolicyManager<S>,
    gpo_id: &str,
    ou: &str,
) -> AppResult<String> {
    let unlinked = manager.unlink_gpo(gpo_id, ou).await?;
    require_done(unlinked, format!("unlinking GPO '{}' from '{}'", gpo_id, ou))?;
    Ok(format!("GPO '{}' unlinked from '{}'", gpo_id, ou))
}
