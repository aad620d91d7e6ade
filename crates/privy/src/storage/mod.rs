//! Storage abstraction
//!
//! The manager never touches persistence directly. It calls the [`Storage`]
//! trait, which any backend (relational, embedded, in-memory) can implement.
//!
//! ## Contract
//!
//! - Resource lookups eagerly include the resource's actions and its
//!   immediate children. Children are shallow: no actions, no grandchildren.
//! - `(parent_id, key)` is unique for resources, `(resource_id, key)` for
//!   actions and `key` for roles. Violations fail with
//!   [`RbacError::DuplicateKey`](crate::RbacError::DuplicateKey).
//! - Misses fail with the matching not-found variant
//!   (`ResourceNotFound`, `ActionNotFound`, `RoleNotFound`).
//! - [`Storage::delete_resource`] removes the whole subtree and every action
//!   owned by it. Backends must do this explicitly rather than rely on
//!   foreign-key cascades.
//! - [`Storage::update_role`] compares `version` and fails with
//!   [`RbacError::ConcurrentModification`](crate::RbacError::ConcurrentModification)
//!   on a mismatch.

use async_trait::async_trait;
use uuid::Uuid;

use crate::actions::{Action, ActionDef};
use crate::error::RbacResult;
use crate::resources::Resource;
use crate::roles::Role;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::MemoryStorage;

/// Persistence backend for resources, actions and roles.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepare the backend (tables, buckets, ...). Must be idempotent.
    async fn initialize(&self) -> RbacResult<()>;

    // Resources

    /// Insert a resource record. Its `actions` and `sub_resources` are ignored.
    async fn create_resource(&self, resource: &Resource) -> RbacResult<()>;

    /// Look up a resource by key within one tree level (`None` = roots).
    async fn get_resource(&self, key: &str, parent_id: Option<Uuid>) -> RbacResult<Resource>;

    /// Look up a resource by id.
    async fn get_resource_by_id(&self, id: Uuid) -> RbacResult<Resource>;

    /// List every resource at one tree level (`None` = roots).
    async fn list_resources(&self, parent_id: Option<Uuid>) -> RbacResult<Vec<Resource>>;

    /// Replace the key, name and description of a resource.
    async fn update_resource(&self, resource: &Resource) -> RbacResult<()>;

    /// Delete a resource, its descendants and all of their actions.
    async fn delete_resource(&self, id: Uuid) -> RbacResult<()>;

    // Actions

    /// Insert a batch of actions bound to one resource. All or nothing.
    async fn create_actions(&self, resource_id: Uuid, actions: &[ActionDef]) -> RbacResult<()>;

    /// Look up an action by key on a resource.
    async fn get_action(&self, resource_id: Uuid, key: &str) -> RbacResult<Action>;

    /// List the actions of a resource.
    async fn list_actions(&self, resource_id: Uuid) -> RbacResult<Vec<Action>>;

    /// Delete one action.
    async fn delete_action(&self, id: Uuid) -> RbacResult<()>;

    // Roles

    /// Insert a role.
    async fn create_role(&self, role: &Role) -> RbacResult<()>;

    /// Look up a role by key.
    async fn get_role(&self, key: &str) -> RbacResult<Role>;

    /// Look up a role by id.
    async fn get_role_by_id(&self, id: Uuid) -> RbacResult<Role>;

    /// List every role.
    async fn list_roles(&self) -> RbacResult<Vec<Role>>;

    /// Replace the mutable fields of a role, permissions included.
    ///
    /// The stored version must equal `role.version`; it is incremented on
    /// success.
    async fn update_role(&self, role: &Role) -> RbacResult<()>;

    /// Delete a role.
    async fn delete_role(&self, id: Uuid) -> RbacResult<()>;
}
