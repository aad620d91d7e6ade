//! Roles
//!
//! A role is a named bundle of permission strings. Roles own nothing else, so
//! deleting one never cascades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::check_permissions;

/// A named bundle of permission strings.
///
/// `version` is bumped by storage on every successful update and is compared
/// on write, so two writers working from the same snapshot cannot both win.
///
/// # Examples
///
/// ```
/// use privy::{Role, RoleConfig};
///
/// let role = Role::new("viewer", RoleConfig::new("Viewer", "Can only view articles")
///     .with_permissions(["article.read"]));
///
/// assert!(role.has_permission("article.read"));
/// assert!(role.has_permission("article"));
/// assert!(!role.has_permission("article.delete"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Unique identifier
    pub id: Uuid,

    /// Unique key (e.g. `"editor"`)
    pub key: String,

    /// Display name
    pub name: String,

    /// Human readable description
    pub description: String,

    /// Granted permission strings
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Optimistic concurrency counter
    #[serde(default)]
    pub version: u64,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last updated
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role record from its config.
    ///
    /// Permissions are kept exactly as given, duplicates included.
    pub fn new(key: impl Into<String>, config: RoleConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            key: key.into(),
            name: config.name,
            description: config.description,
            permissions: config.permissions,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if any granted permission satisfies `required`.
    pub fn has_permission(&self, required: &str) -> bool {
        check_permissions(required, self.permissions.as_slice())
    }
}

/// Input for creating a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleConfig {
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Initial permission strings
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RoleConfig {
    /// Create a config with no permissions.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permissions: Vec::new(),
        }
    }

    /// Set the initial permissions.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// Changes to a role's descriptive fields.
///
/// Permissions are changed through
/// [`Manager::assign_permissions`](crate::Manager::assign_permissions) and
/// [`Manager::remove_permissions`](crate::Manager::remove_permissions) instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
}

impl RoleUpdate {
    pub(crate) fn apply(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
        if let Some(description) = self.description {
            role.description = description;
        }
    }
}
