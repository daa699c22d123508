//! Policy manager
//!
//! Stateless orchestrator over the registry store: the only per-instance
//! state is the scope chosen at construction and a shared store handle.
//! Every call re-reads the store.
//!
//! Result conventions:
//! - `Err(AppError::UnsupportedOperation)`: the scope can never do this
//!   (local policies cannot be created, deleted or linked). The store is
//!   never touched.
//! - `Ok(false)` from a domain-scope write: placeholder, not implemented.
//! - `Err(AppError::Registry { .. })`: the store rejected the operation.

use std::sync::Arc;

use super::gpo_identity::{domain_placeholder, local_policy};
use super::registry::{join_path, RegistryKey, RegistryRoot, RegistryStore};
use super::settings_walker::{find_value, walk_settings};
use super::SystemRegistry;
use crate::domain::{GroupPolicyObject, PolicyScope, PolicySetting, PolicyType, POLICIES_ROOT};
use crate::error::{AppError, AppResult};

/// Entry point for reading and writing group policy
#[derive(Debug)]
pub struct PolicyManager<S: RegistryStore = SystemRegistry> {
    scope: PolicyScope,
    store: Arc<S>,
}

impl PolicyManager<SystemRegistry> {
    /// Manager over the system store; an empty or missing domain means local scope
    pub fn new(domain: Option<&str>) -> Self {
        Self::with_store(PolicyScope::from_domain(domain), SystemRegistry::default())
    }
}

impl<S: RegistryStore> PolicyManager<S> {
    pub fn with_store(scope: PolicyScope, store: S) -> Self {
        Self::with_shared_store(scope, Arc::new(store))
    }

    pub fn with_shared_store(scope: PolicyScope, store: Arc<S>) -> Self {
        tracing::debug!(scope = %scope, "Policy manager created");
        Self { scope, store }
    }

    pub fn scope(&self) -> &PolicyScope {
        &self.scope
    }

    pub fn is_local_policy(&self) -> bool {
        self.scope.is_local()
    }

    /// Run store I/O on the blocking pool
    async fn blocking<T, F>(&self, context: &str, f: F) -> AppResult<T>
    where
        F: FnOnce(&S) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| AppError::OperationFailed(format!("{}: {}", context, e)))?
    }

    fn unsupported(&self, operation: &'static str) -> AppError {
        tracing::warn!(operation, scope = %self.scope, "Operation not supported for this scope");
        AppError::UnsupportedOperation {
            operation,
            scope: self.scope.label(),
        }
    }

    fn not_implemented(&self, operation: &str) -> bool {
        tracing::warn!(operation, scope = %self.scope, "Domain policy operation is not implemented");
        false
    }

    /// List all GPOs visible in this scope
    pub async fn get_all_gpos(&self) -> AppResult<Vec<GroupPolicyObject>> {
        match &self.scope {
            PolicyScope::Local => {
                let gpo = self
                    .blocking("Failed to resolve local policy", |store| Ok(local_policy(store)))
                    .await?;
                Ok(vec![gpo])
            }
            PolicyScope::Domain(domain) => Ok(vec![domain_placeholder(domain)]),
        }
    }

    /// Find a GPO by id, ignoring case
    pub async fn get_gpo_by_id(&self, id: &str) -> AppResult<Option<GroupPolicyObject>> {
        let gpos = self.get_all_gpos().await?;
        Ok(gpos.into_iter().find(|gpo| gpo.id.eq_ignore_ascii_case(id)))
    }

    /// Find a GPO by display name, ignoring case
    pub async fn get_gpo_by_name(&self, name: &str) -> AppResult<Option<GroupPolicyObject>> {
        let gpos = self.get_all_gpos().await?;
        Ok(gpos
            .into_iter()
            .find(|gpo| gpo.name.eq_ignore_ascii_case(name)))
    }

    pub async fn create_gpo(&self, name: &str, description: Option<&str>) -> AppResult<bool> {
        match &self.scope {
            PolicyScope::Local => Err(self.unsupported("create GPO")),
            PolicyScope::Domain(_) => {
                tracing::debug!(gpo_name = name, description, "Domain GPO creation requested");
                Ok(self.not_implemented("create GPO"))
            }
        }
    }

    pub async fn delete_gpo(&self, id: &str) -> AppResult<bool> {
        match &self.scope {
            PolicyScope::Local => Err(self.unsupported("delete GPO")),
            PolicyScope::Domain(_) => {
                tracing::debug!(gpo_id = id, "Domain GPO deletion requested");
                Ok(self.not_implemented("delete GPO"))
            }
        }
    }

    /// Updating GPO metadata is not implemented for either scope
    pub async fn update_gpo(&self, gpo: &GroupPolicyObject) -> AppResult<bool> {
        tracing::debug!(gpo_id = %gpo.id, "GPO update requested");
        Ok(self.not_implemented("update GPO"))
    }

    /// All settings of a GPO: machine policies first, then user policies
    pub async fn get_settings(&self, gpo_id: &str) -> AppResult<Vec<PolicySetting>> {
        match &self.scope {
            PolicyScope::Local => {
                tracing::debug!(gpo_id, "Reading local policy settings");
                self.blocking("Failed to read policy settings", |store| {
                    let mut settings = walk_settings(store, RegistryRoot::Machine, POLICIES_ROOT);
                    settings.extend(walk_settings(store, RegistryRoot::User, POLICIES_ROOT));
                    Ok(settings)
                })
                .await
            }
            PolicyScope::Domain(_) => {
                tracing::warn!(gpo_id, "Domain policy settings are not available");
                Ok(Vec::new())
            }
        }
    }

    /// Create or overwrite a setting's registry value
    pub async fn set_setting(&self, gpo_id: &str, setting: &PolicySetting) -> AppResult<bool> {
        if !self.scope.is_local() {
            return Ok(self.not_implemented("set setting"));
        }

        if setting.registry_path.trim().is_empty() {
            return Err(AppError::InvalidValue(format!(
                "setting '{}' has no registry path",
                setting.name
            )));
        }

        let root = root_for(setting.policy_type);
        let data = setting.value.to_registry_data(setting.value_type)?;
        let path = setting.registry_path.clone();
        let name = setting.registry_key.clone();
        let owner = gpo_id.to_string();

        tracing::info!(
            gpo_id,
            root = %root,
            path = %path,
            value = %name,
            value_type = %setting.value_type,
            "Writing policy setting"
        );

        self.blocking("Failed to write policy setting", move |store| {
            let full_path = format!("{}\\{}", root, join_path(&path, &name));
            let key = store
                .open_write(root, &path)
                .map_err(|source| AppError::Registry {
                    action: "open for write",
                    gpo_id: owner.clone(),
                    path: full_path.clone(),
                    source,
                })?;
            key.set_value(&name, &data)
                .map_err(|source| AppError::Registry {
                    action: "set value",
                    gpo_id: owner,
                    path: full_path,
                    source,
                })?;
            Ok(true)
        })
        .await
    }

    /// Delete the first value named `setting_name`, machine policies first.
    ///
    /// Returns `Ok(false)` in local scope when no such value exists.
    pub async fn remove_setting(&self, gpo_id: &str, setting_name: &str) -> AppResult<bool> {
        if !self.scope.is_local() {
            return Ok(self.not_implemented("remove setting"));
        }

        let name = setting_name.to_string();
        let gpo_id = gpo_id.to_string();

        self.blocking("Failed to remove policy setting", move |store| {
            for root in [RegistryRoot::Machine, RegistryRoot::User] {
                let Some(location) = find_value(store, root, POLICIES_ROOT, &name) else {
                    continue;
                };

                let full_path = format!("{}\\{}", root, join_path(&location.path, &location.name));
                let key = store
                    .open_write(root, &location.path)
                    .map_err(|source| AppError::Registry {
                        action: "open for delete",
                        gpo_id: gpo_id.clone(),
                        path: full_path.clone(),
                        source,
                    })?;
                let removed = key
                    .delete_value(&location.name)
                    .map_err(|source| AppError::Registry {
                        action: "delete value",
                        gpo_id: gpo_id.clone(),
                        path: full_path.clone(),
                        source,
                    })?;

                tracing::info!(gpo_id = %gpo_id, path = %full_path, removed, "Removed policy setting");
                return Ok(removed);
            }

            tracing::debug!(gpo_id = %gpo_id, setting = %name, "No policy setting with that name");
            Ok(false)
        })
        .await
    }

    pub async fn link_gpo(&self, gpo_id: &str, ou: &str) -> AppResult<bool> {
        match &self.scope {
            PolicyScope::Local => Err(self.unsupported("link GPO")),
            PolicyScope::Domain(_) => {
                tracing::debug!(gpo_id, ou, "Domain GPO link requested");
                Ok(self.not_implemented("link GPO"))
            }
        }
    }

    pub async fn unlink_gpo(&self, gpo_id: &str, ou: &str) -> AppResult<bool> {
        match &self.scope {
            PolicyScope::Local => Err(self.unsupported("unlink GPO")),
            PolicyScope::Domain(_) => {
                tracing::debug!(gpo_id, ou, "Domain GPO unlink requested");
                Ok(self.not_implemented("unlink GPO"))
            }
        }
    }
}

/// User settings live in the current user's hive, everything else machine-wide
pub fn root_for(policy_type: PolicyType) -> RegistryRoot {
    match policy_type {
        PolicyType::UserConfiguration => RegistryRoot::User,
        _ => RegistryRoot::Machine,
    }
}
