//! RBAC manager
//!
//! The [`Manager`] is the entry point for defining resources and roles and for
//! answering permission checks. It resolves resource paths, enforces the
//! existence rules below, and reads and writes through an injected
//! [`Storage`] backend.
//!
//! ## Strict create vs. permissive extend
//!
//! [`Manager::create_resource`] refuses to create a root resource whose key is
//! already taken. [`Manager::create_resources`] does the opposite for
//! sub-resources: a key that already exists under the parent is extended with
//! the candidate's actions instead of failing.
//!
//! ## Concurrency
//!
//! Permission changes are read-modify-write sequences. Lost updates are caught
//! by the role version check in storage and surface as
//! [`RbacError::ConcurrentModification`]; the manager does not retry.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::actions::{Action, ActionDef};
use crate::error::{RbacError, RbacResult};
use crate::permissions::{check_permissions, merge_permissions, strip_permissions};
use crate::resolver::PathResolver;
use crate::resources::{Resource, ResourceConfig, ResourceUpdate};
use crate::roles::{Role, RoleConfig, RoleUpdate};
use crate::storage::Storage;

/// Builder for [`Manager`].
///
/// Storage is the only dependency and is required.
#[derive(Default)]
pub struct ManagerBuilder {
    storage: Option<Arc<dyn Storage>>,
}

impl ManagerBuilder {
    /// Create a builder with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Initialize storage and build the manager.
    ///
    /// # Errors
    ///
    /// [`RbacError::Config`] if no storage was set, or whatever
    /// [`Storage::initialize`] reports.
    pub async fn build(self) -> RbacResult<Manager> {
        let storage = self
            .storage
            .ok_or_else(|| RbacError::Config("storage backend is not configured".to_string()))?;

        storage.initialize().await?;
        debug!("RBAC storage initialized");

        Ok(Manager { storage })
    }
}

/// Manages resources, actions and roles.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use privy::{define_action, Manager, MemoryStorage, ResourceConfig, RoleConfig};
///
/// # async fn example() -> privy::RbacResult<()> {
/// let manager = Manager::new(Arc::new(MemoryStorage::new())).await?;
///
/// manager
///     .create_resource(
///         ResourceConfig::new("article", "Article", "News article entity")
///             .with_action(define_action("read", "Read", "Read article content")),
///     )
///     .await?;
///
/// manager
///     .create_role("viewer", RoleConfig::new("Viewer", "").with_permissions(["article.read"]))
///     .await?;
///
/// assert!(manager.check_role_permission("viewer", "article.read").await?);
/// # Ok(())
/// # }
/// ```
pub struct Manager {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager").finish_non_exhaustive()
    }
}

impl Manager {
    /// Start building a manager.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// Build a manager over the given storage.
    pub async fn new(storage: Arc<dyn Storage>) -> RbacResult<Self> {
        Self::builder().with_storage(storage).build().await
    }

    /// The storage backend this manager writes through.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(self.storage.as_ref())
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Create a root resource together with its actions and subtree.
    ///
    /// Sub-resources are created without existence checks since the tree is
    /// new. The result is reloaded from storage.
    ///
    /// # Errors
    ///
    /// [`RbacError::ResourceExists`] if a root with this key exists. Earlier
    /// steps are not rolled back when a later step fails.
    #[instrument(skip(self, config), fields(key = %config.key))]
    pub async fn create_resource(&self, config: ResourceConfig) -> RbacResult<Resource> {
        match self.storage.get_resource(&config.key, None).await {
            Ok(_) => return Err(RbacError::ResourceExists(config.key.clone())),
            Err(RbacError::ResourceNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let resource = config.to_record(None);
        self.storage.create_resource(&resource).await?;
        if !config.actions.is_empty() {
            self.storage.create_actions(resource.id, &config.actions).await?;
        }
        self.create_subtree(resource.id, &config.sub_resources, false).await?;

        info!(resource_id = %resource.id, "Resource created");
        self.storage.get_resource_by_id(resource.id).await
    }

    /// Add actions to the resource at `resource_path`.
    ///
    /// Keys already present on the resource fail in storage with
    /// [`RbacError::DuplicateKey`].
    #[instrument(skip(self, actions), fields(count = actions.len()))]
    pub async fn add_actions(&self, resource_path: &str, actions: &[ActionDef]) -> RbacResult<()> {
        let resource = self.resolver().resolve(resource_path).await?;
        self.storage.create_actions(resource.id, actions).await?;

        debug!(resource_id = %resource.id, "Actions added");
        Ok(())
    }

    /// Create or extend sub-resources under the resource at `parent_path`.
    ///
    /// A candidate whose key already exists under the parent is not an error:
    /// its actions are appended to the existing resource and its own
    /// sub-resources are merged the same way. New candidates are created with
    /// their whole subtree.
    #[instrument(skip(self, sub_resources), fields(count = sub_resources.len()))]
    pub async fn create_resources(&self, parent_path: &str, sub_resources: &[ResourceConfig]) -> RbacResult<()> {
        let parent = self.resolver().resolve(parent_path).await?;
        self.create_subtree(parent.id, sub_resources, true).await
    }

    /// Create `configs` below `parent_id`, depth first in input order.
    ///
    /// With `upsert`, a key that already exists at its level is extended
    /// instead of created, and its children are merged recursively.
    async fn create_subtree(&self, parent_id: Uuid, configs: &[ResourceConfig], upsert: bool) -> RbacResult<()> {
        let mut pending: Vec<(Uuid, &ResourceConfig, bool)> =
            configs.iter().rev().map(|c| (parent_id, c, upsert)).collect();

        while let Some((parent_id, config, upsert)) = pending.pop() {
            if upsert {
                match self.storage.get_resource(&config.key, Some(parent_id)).await {
                    Ok(existing) => {
                        debug!(key = %config.key, resource_id = %existing.id, "Extending existing sub-resource");
                        if !config.actions.is_empty() {
                            self.storage.create_actions(existing.id, &config.actions).await?;
                        }
                        pending.extend(config.sub_resources.iter().rev().map(|c| (existing.id, c, true)));
                        continue;
                    }
                    Err(RbacError::ResourceNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }

            let resource = config.to_record(Some(parent_id));
            self.storage.create_resource(&resource).await?;
            if !config.actions.is_empty() {
                self.storage.create_actions(resource.id, &config.actions).await?;
            }
            debug!(key = %config.key, resource_id = %resource.id, "Sub-resource created");

            pending.extend(config.sub_resources.iter().rev().map(|c| (resource.id, c, false)));
        }

        Ok(())
    }

    /// Get the resource at `path`.
    #[instrument(skip(self))]
    pub async fn get_resource(&self, path: &str) -> RbacResult<Resource> {
        self.resolver().resolve(path).await
    }

    /// List root resources.
    pub async fn list_resources(&self) -> RbacResult<Vec<Resource>> {
        self.storage.list_resources(None).await
    }

    /// List the children of the resource at `path`, each with its actions.
    #[instrument(skip(self))]
    pub async fn list_sub_resources(&self, path: &str) -> RbacResult<Vec<Resource>> {
        let parent = self.resolver().resolve(path).await?;
        self.storage.list_resources(Some(parent.id)).await
    }

    /// Change the name or description of the resource at `path`.
    #[instrument(skip(self, update))]
    pub async fn update_resource(&self, path: &str, update: ResourceUpdate) -> RbacResult<Resource> {
        let mut resource = self.resolver().resolve(path).await?;
        update.apply(&mut resource);
        self.storage.update_resource(&resource).await?;

        self.storage.get_resource_by_id(resource.id).await
    }

    /// Delete the resource at `path` with all descendants and their actions.
    #[instrument(skip(self))]
    pub async fn delete_resource(&self, path: &str) -> RbacResult<()> {
        let resource = self.resolver().resolve(path).await?;
        self.storage.delete_resource(resource.id).await?;

        info!(resource_id = %resource.id, "Resource deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// List the actions of the resource at `path`.
    pub async fn list_actions(&self, path: &str) -> RbacResult<Vec<Action>> {
        let resource = self.resolver().resolve(path).await?;
        self.storage.list_actions(resource.id).await
    }

    /// Get one action of the resource at `path`.
    pub async fn get_action(&self, path: &str, action_key: &str) -> RbacResult<Action> {
        let resource = self.resolver().resolve(path).await?;
        self.storage.get_action(resource.id, action_key).await
    }

    /// Delete one action of the resource at `path`.
    #[instrument(skip(self))]
    pub async fn delete_action(&self, path: &str, action_key: &str) -> RbacResult<()> {
        let action = self.get_action(path, action_key).await?;
        self.storage.delete_action(action.id).await?;

        debug!(action_id = %action.id, "Action deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Create a role.
    ///
    /// The permission list is stored as given; duplicates are not collapsed.
    ///
    /// # Errors
    ///
    /// [`RbacError::RoleExists`] if the key is taken.
    #[instrument(skip(self, config))]
    pub async fn create_role(&self, key: &str, config: RoleConfig) -> RbacResult<Role> {
        match self.storage.get_role(key).await {
            Ok(_) => return Err(RbacError::RoleExists(key.to_string())),
            Err(RbacError::RoleNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let role = Role::new(key, config);
        self.storage.create_role(&role).await?;

        info!(role_id = %role.id, permissions = role.permissions.len(), "Role created");
        Ok(role)
    }

    /// Grant permissions to a role, skipping ones it already holds.
    #[instrument(skip(self, permissions), fields(count = permissions.len()))]
    pub async fn assign_permissions<S: AsRef<str> + Sync>(&self, role_key: &str, permissions: &[S]) -> RbacResult<()> {
        let mut role = self.storage.get_role(role_key).await?;
        let added = merge_permissions(&mut role.permissions, permissions);
        self.storage.update_role(&role).await?;

        debug!(added, "Permissions assigned");
        Ok(())
    }

    /// Revoke permissions from a role. Permissions it does not hold are ignored.
    #[instrument(skip(self, permissions), fields(count = permissions.len()))]
    pub async fn remove_permissions<S: AsRef<str> + Sync>(&self, role_key: &str, permissions: &[S]) -> RbacResult<()> {
        let mut role = self.storage.get_role(role_key).await?;
        let removed = strip_permissions(&mut role.permissions, permissions);
        self.storage.update_role(&role).await?;

        debug!(removed, "Permissions removed");
        Ok(())
    }

    /// Get a role by key.
    pub async fn get_role(&self, key: &str) -> RbacResult<Role> {
        self.storage.get_role(key).await
    }

    /// List every role.
    pub async fn list_roles(&self) -> RbacResult<Vec<Role>> {
        self.storage.list_roles().await
    }

    /// Change the name or description of a role.
    #[instrument(skip(self, update))]
    pub async fn update_role(&self, key: &str, update: RoleUpdate) -> RbacResult<Role> {
        let mut role = self.storage.get_role(key).await?;
        update.apply(&mut role);
        self.storage.update_role(&role).await?;

        self.storage.get_role_by_id(role.id).await
    }

    /// Delete a role by key.
    #[instrument(skip(self))]
    pub async fn delete_role(&self, key: &str) -> RbacResult<()> {
        let role = self.storage.get_role(key).await?;
        self.storage.delete_role(role.id).await?;

        info!(role_id = %role.id, "Role deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Permission checks
    // ------------------------------------------------------------------

    /// Check if a role's permissions satisfy `required`.
    ///
    /// # Errors
    ///
    /// [`RbacError::RoleNotFound`] if the role does not exist.
    #[instrument(skip(self))]
    pub async fn check_role_permission(&self, role_key: &str, required: &str) -> RbacResult<bool> {
        let role = self.storage.get_role(role_key).await?;
        let granted = check_permissions(required, role.permissions.as_slice());

        debug!(granted, "Role permission checked");
        Ok(granted)
    }

    /// Check if any of the roles satisfies `required`.
    ///
    /// Roles are tried in order and the first match wins. Roles that do not
    /// exist are skipped; any other error aborts the check.
    #[instrument(skip(self, role_keys), fields(roles = role_keys.len()))]
    pub async fn check_roles_permission<S: AsRef<str> + Sync>(&self, role_keys: &[S], required: &str) -> RbacResult<bool> {
        for role_key in role_keys {
            let role_key = role_key.as_ref();
            match self.check_role_permission(role_key, required).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(RbacError::RoleNotFound(_)) => {
                    warn!(role_key, "Skipping unknown role");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(false)
    }
}
