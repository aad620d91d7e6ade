//! # Actions
//!
//! Operations that can be performed on a resource. An action is always keyed
//! within the scope of exactly one resource, so `comment.read` and
//! `article.read` are two unrelated actions sharing the key `read`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An action definition not yet bound to a resource.
///
/// This is what callers hand to the manager when creating or extending
/// resources. Storage backends turn it into an [`Action`] record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionDef {
    /// Key unique within the owning resource (e.g. `"read"`).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Human readable description.
    pub description: String,
}

impl ActionDef {
    /// Create a new action definition.
    pub fn new(key: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Build an [`ActionDef`] from its key, display name and description.
///
/// Pure value construction; nothing is persisted.
///
/// # Example
///
/// ```
/// use privy::define_action;
///
/// let action = define_action("read", "Read", "Read article content");
/// assert_eq!(action.key, "read");
/// ```
pub fn define_action(key: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> ActionDef {
    ActionDef::new(key, name, description)
}

/// A persisted action bound to one resource.
///
/// `(resource_id, key)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    /// Unique identifier
    pub id: Uuid,

    /// Key unique within the owning resource
    pub key: String,

    /// Display name
    pub name: String,

    /// Human readable description
    pub description: String,

    /// Owning resource
    pub resource_id: Uuid,

    /// When the action was created
    pub created_at: DateTime<Utc>,

    /// When the action was last updated
    pub updated_at: DateTime<Utc>,
}

impl Action {
    /// Bind a definition to a resource, assigning a fresh id.
    pub fn new(resource_id: Uuid, def: &ActionDef) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            key: def.key.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            resource_id,
            created_at: now,
            updated_at: now,
        }
    }
}
