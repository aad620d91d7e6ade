//! In-memory storage backend.
//!
//! Suitable for single-process applications and tests. All state lives behind
//! one `RwLock`, so each trait call is atomic with respect to the others.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Storage;
use crate::actions::{Action, ActionDef};
use crate::error::{RbacError, RbacResult};
use crate::resources::Resource;
use crate::roles::Role;

/// Record counts held by a [`MemoryStorage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStorageStats {
    /// Resources at every tree level
    pub resources: usize,
    /// Actions across all resources
    pub actions: usize,
    /// Roles
    pub roles: usize,
}

#[derive(Default)]
struct Inner {
    /// Resource rows, kept shallow (no actions, no children)
    resources: Vec<Resource>,
    actions: Vec<Action>,
    roles: Vec<Role>,
}

impl Inner {
    fn resource_row(&self, id: Uuid) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Attach actions and shallow children to a row.
    fn hydrate(&self, row: &Resource) -> Resource {
        let mut resource = row.clone();
        resource.actions = self
            .actions
            .iter()
            .filter(|a| a.resource_id == row.id)
            .cloned()
            .collect();
        resource.sub_resources = self
            .resources
            .iter()
            .filter(|r| r.parent_id == Some(row.id))
            .cloned()
            .collect();
        resource
    }

    fn has_sibling(&self, key: &str, parent_id: Option<Uuid>, except: Option<Uuid>) -> bool {
        self.resources
            .iter()
            .any(|r| r.key == key && r.parent_id == parent_id && Some(r.id) != except)
    }

    /// Ids of a resource and all of its descendants.
    fn subtree(&self, id: Uuid) -> HashSet<Uuid> {
        let mut ids = HashSet::from([id]);
        let mut pending = vec![id];

        while let Some(current) = pending.pop() {
            for child in self.resources.iter().filter(|r| r.parent_id == Some(current)) {
                if ids.insert(child.id) {
                    pending.push(child.id);
                }
            }
        }

        ids
    }
}

/// In-memory [`Storage`] implementation.
///
/// Cloning is cheap and clones share the same state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use privy::{Manager, MemoryStorage};
///
/// # async fn example() -> privy::RbacResult<()> {
/// let manager = Manager::new(Arc::new(MemoryStorage::new())).await?;
/// assert!(manager.list_roles().await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage").finish_non_exhaustive()
    }
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get record counts.
    pub async fn stats(&self) -> MemoryStorageStats {
        let inner = self.inner.read().await;
        MemoryStorageStats {
            resources: inner.resources.len(),
            actions: inner.actions.len(),
            roles: inner.roles.len(),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> RbacResult<()> {
        // Nothing to migrate.
        Ok(())
    }

    async fn create_resource(&self, resource: &Resource) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        if let Some(parent_id) = resource.parent_id {
            if inner.resource_row(parent_id).is_none() {
                return Err(RbacError::ResourceNotFound(parent_id.to_string()));
            }
        }
        if inner.has_sibling(&resource.key, resource.parent_id, None) {
            return Err(RbacError::DuplicateKey(format!("resource '{}'", resource.key)));
        }

        let mut row = resource.clone();
        row.actions.clear();
        row.sub_resources.clear();
        inner.resources.push(row);

        Ok(())
    }

    async fn get_resource(&self, key: &str, parent_id: Option<Uuid>) -> RbacResult<Resource> {
        let inner = self.inner.read().await;
        inner
            .resources
            .iter()
            .find(|r| r.key == key && r.parent_id == parent_id)
            .map(|row| inner.hydrate(row))
            .ok_or_else(|| RbacError::ResourceNotFound(key.to_string()))
    }

    async fn get_resource_by_id(&self, id: Uuid) -> RbacResult<Resource> {
        let inner = self.inner.read().await;
        inner
            .resource_row(id)
            .map(|row| inner.hydrate(row))
            .ok_or_else(|| RbacError::ResourceNotFound(id.to_string()))
    }

    async fn list_resources(&self, parent_id: Option<Uuid>) -> RbacResult<Vec<Resource>> {
        let inner = self.inner.read().await;
        Ok(inner
            .resources
            .iter()
            .filter(|r| r.parent_id == parent_id)
            .map(|row| inner.hydrate(row))
            .collect())
    }

    async fn update_resource(&self, resource: &Resource) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        let parent_id = inner
            .resource_row(resource.id)
            .map(|r| r.parent_id)
            .ok_or_else(|| RbacError::ResourceNotFound(resource.id.to_string()))?;

        if inner.has_sibling(&resource.key, parent_id, Some(resource.id)) {
            return Err(RbacError::DuplicateKey(format!("resource '{}'", resource.key)));
        }

        if let Some(row) = inner.resources.iter_mut().find(|r| r.id == resource.id) {
            row.key = resource.key.clone();
            row.name = resource.name.clone();
            row.description = resource.description.clone();
            row.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn delete_resource(&self, id: Uuid) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        if inner.resource_row(id).is_none() {
            return Err(RbacError::ResourceNotFound(id.to_string()));
        }

        let doomed = inner.subtree(id);
        inner.actions.retain(|a| !doomed.contains(&a.resource_id));
        inner.resources.retain(|r| !doomed.contains(&r.id));

        Ok(())
    }

    async fn create_actions(&self, resource_id: Uuid, actions: &[ActionDef]) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        if inner.resource_row(resource_id).is_none() {
            return Err(RbacError::ResourceNotFound(resource_id.to_string()));
        }

        // Validate the whole batch before inserting anything.
        let mut keys: HashSet<&str> = inner
            .actions
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .map(|a| a.key.as_str())
            .collect();
        for def in actions {
            if !keys.insert(def.key.as_str()) {
                return Err(RbacError::DuplicateKey(format!("action '{}'", def.key)));
            }
        }
        drop(keys);

        let records: Vec<Action> = actions.iter().map(|def| Action::new(resource_id, def)).collect();
        inner.actions.extend(records);

        Ok(())
    }

    async fn get_action(&self, resource_id: Uuid, key: &str) -> RbacResult<Action> {
        let inner = self.inner.read().await;
        inner
            .actions
            .iter()
            .find(|a| a.resource_id == resource_id && a.key == key)
            .cloned()
            .ok_or_else(|| RbacError::ActionNotFound(key.to_string()))
    }

    async fn list_actions(&self, resource_id: Uuid) -> RbacResult<Vec<Action>> {
        let inner = self.inner.read().await;
        Ok(inner
            .actions
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn delete_action(&self, id: Uuid) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        let before = inner.actions.len();
        inner.actions.retain(|a| a.id != id);
        if inner.actions.len() == before {
            return Err(RbacError::ActionNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn create_role(&self, role: &Role) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        if inner.roles.iter().any(|r| r.key == role.key) {
            return Err(RbacError::DuplicateKey(format!("role '{}'", role.key)));
        }

        inner.roles.push(role.clone());
        Ok(())
    }

    async fn get_role(&self, key: &str) -> RbacResult<Role> {
        let inner = self.inner.read().await;
        inner
            .roles
            .iter()
            .find(|r| r.key == key)
            .cloned()
            .ok_or_else(|| RbacError::RoleNotFound(key.to_string()))
    }

    async fn get_role_by_id(&self, id: Uuid) -> RbacResult<Role> {
        let inner = self.inner.read().await;
        inner
            .roles
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RbacError::RoleNotFound(id.to_string()))
    }

    async fn list_roles(&self) -> RbacResult<Vec<Role>> {
        Ok(self.inner.read().await.roles.clone())
    }

    async fn update_role(&self, role: &Role) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        if inner.roles.iter().any(|r| r.key == role.key && r.id != role.id) {
            return Err(RbacError::DuplicateKey(format!("role '{}'", role.key)));
        }

        let stored = inner
            .roles
            .iter_mut()
            .find(|r| r.id == role.id)
            .ok_or_else(|| RbacError::RoleNotFound(role.key.clone()))?;

        if stored.version != role.version {
            return Err(RbacError::ConcurrentModification(format!(
                "role '{}' is at version {}, update was based on {}",
                role.key, stored.version, role.version
            )));
        }

        stored.key = role.key.clone();
        stored.name = role.name.clone();
        stored.description = role.description.clone();
        stored.permissions = role.permissions.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();

        Ok(())
    }

    async fn delete_role(&self, id: Uuid) -> RbacResult<()> {
        let mut inner = self.inner.write().await;

        let before = inner.roles.len();
        inner.roles.retain(|r| r.id != id);
        if inner.roles.len() == before {
            return Err(RbacError::RoleNotFound(id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::define_action;
    use crate::roles::RoleConfig;

    async fn seeded() -> (MemoryStorage, Resource, Resource) {
        let storage = MemoryStorage::new();

        let article = Resource::new("article", "Article", "", None);
        storage.create_resource(&article).await.unwrap();
        storage
            .create_actions(article.id, &[define_action("read", "Read", "")])
            .await
            .unwrap();

        let comment = Resource::new("comment", "Comment", "", Some(article.id));
        storage.create_resource(&comment).await.unwrap();
        storage
            .create_actions(comment.id, &[define_action("delete", "Delete", "")])
            .await
            .unwrap();

        (storage, article, comment)
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.initialize().await.unwrap();
        storage.initialize().await.unwrap();
        assert_eq!(storage.stats().await, MemoryStorageStats::default());
    }

    #[tokio::test]
    async fn test_eager_load_is_one_level_deep() {
        let (storage, article, comment) = seeded().await;

        let loaded = storage.get_resource("article", None).await.unwrap();
        assert_eq!(loaded.id, article.id);
        assert_eq!(loaded.actions.len(), 1);
        assert_eq!(loaded.sub_resources.len(), 1);

        // Children come back shallow.
        let child = &loaded.sub_resources[0];
        assert_eq!(child.id, comment.id);
        assert!(child.actions.is_empty());

        let by_id = storage.get_resource_by_id(comment.id).await.unwrap();
        assert_eq!(by_id.actions[0].key, "delete");
    }

    #[tokio::test]
    async fn test_lookup_is_parent_scoped() {
        let (storage, article, _) = seeded().await;

        // "comment" exists only under article, not at the root.
        let err = storage.get_resource("comment", None).await.unwrap_err();
        assert!(matches!(err, RbacError::ResourceNotFound(_)));
        assert!(storage.get_resource("comment", Some(article.id)).await.is_ok());

        // The same key is allowed under a different parent.
        let page = Resource::new("page", "Page", "", None);
        storage.create_resource(&page).await.unwrap();
        storage
            .create_resource(&Resource::new("comment", "Comment", "", Some(page.id)))
            .await
            .unwrap();

        assert_eq!(storage.list_resources(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_keys_rejected() {
        let (storage, article, _) = seeded().await;

        let err = storage
            .create_resource(&Resource::new("article", "Again", "", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::DuplicateKey(_)));

        let err = storage
            .create_actions(article.id, &[define_action("share", "Share", ""), define_action("read", "Read", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::DuplicateKey(_)));

        // Batch is all-or-nothing.
        assert!(storage.get_action(article.id, "share").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_parent_rejected() {
        let storage = MemoryStorage::new();
        let orphan = Resource::new("orphan", "Orphan", "", Some(Uuid::now_v7()));

        let err = storage.create_resource(&orphan).await.unwrap_err();
        assert!(matches!(err, RbacError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (storage, article, comment) = seeded().await;
        let tag = Resource::new("tag", "Tag", "", Some(comment.id));
        storage.create_resource(&tag).await.unwrap();
        storage
            .create_actions(tag.id, &[define_action("assign", "Assign", "")])
            .await
            .unwrap();

        storage.delete_resource(article.id).await.unwrap();

        assert_eq!(storage.stats().await, MemoryStorageStats::default());
        assert!(storage.get_resource_by_id(tag.id).await.is_err());
    }

    #[tokio::test]
    async fn test_action_lifecycle() {
        let (storage, article, _) = seeded().await;

        let action = storage.get_action(article.id, "read").await.unwrap();
        storage.delete_action(action.id).await.unwrap();

        let err = storage.get_action(article.id, "read").await.unwrap_err();
        assert!(matches!(err, RbacError::ActionNotFound(_)));
        assert!(storage.list_actions(article.id).await.unwrap().is_empty());

        let err = storage.delete_action(action.id).await.unwrap_err();
        assert!(matches!(err, RbacError::ActionNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_resource() {
        let (storage, article, _) = seeded().await;

        let mut renamed = article.clone();
        renamed.name = "Story".to_string();
        storage.update_resource(&renamed).await.unwrap();
        assert_eq!(storage.get_resource_by_id(article.id).await.unwrap().name, "Story");

        let other = Resource::new("page", "Page", "", None);
        storage.create_resource(&other).await.unwrap();
        let mut clash = other.clone();
        clash.key = "article".to_string();
        let err = storage.update_resource(&clash).await.unwrap_err();
        assert!(matches!(err, RbacError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_role_version_check() {
        let storage = MemoryStorage::new();
        let role = Role::new("editor", RoleConfig::new("Editor", ""));
        storage.create_role(&role).await.unwrap();

        let mut first = storage.get_role("editor").await.unwrap();
        let mut second = first.clone();

        first.permissions.push("article.read".to_string());
        storage.update_role(&first).await.unwrap();

        second.permissions.push("article.delete".to_string());
        let err = storage.update_role(&second).await.unwrap_err();
        assert!(matches!(err, RbacError::ConcurrentModification(_)));

        let stored = storage.get_role_by_id(role.id).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.permissions, vec!["article.read"]);
    }

    #[tokio::test]
    async fn test_role_lifecycle() {
        let storage = MemoryStorage::new();
        let role = Role::new("viewer", RoleConfig::new("Viewer", ""));
        storage.create_role(&role).await.unwrap();

        let err = storage.create_role(&Role::new("viewer", RoleConfig::default())).await.unwrap_err();
        assert!(matches!(err, RbacError::DuplicateKey(_)));

        storage.delete_role(role.id).await.unwrap();
        assert!(storage.list_roles().await.unwrap().is_empty());

        let err = storage.delete_role(role.id).await.unwrap_err();
        assert!(matches!(err, RbacError::RoleNotFound(_)));
    }
}
