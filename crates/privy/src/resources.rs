//! # Resources
//!
//! Resources form a tree. Each node has a key that is unique among its
//! siblings, and the dot-joined keys from the root down to a node make up its
//! path (`article`, `article.comment`, `article.comment.tag`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::{Action, ActionDef};

/// A node in the resource tree.
///
/// Records returned by storage carry their own actions and their immediate
/// children. Children are shallow: they do not carry actions or grandchildren.
///
/// # Architecture
///
/// ```text
/// Resource (parent_id = None)
///   ├─ Actions
///   └─ Sub-resources (parent_id = Some(id))
///         └─ Actions
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// Unique identifier
    pub id: Uuid,

    /// Segment name, unique among siblings
    pub key: String,

    /// Display name
    pub name: String,

    /// Human readable description
    pub description: String,

    /// Parent resource, `None` for roots
    pub parent_id: Option<Uuid>,

    /// Actions owned by this resource
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Immediate children
    #[serde(default)]
    pub sub_resources: Vec<Resource>,

    /// When the resource was created
    pub created_at: DateTime<Utc>,

    /// When the resource was last updated
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Create a new resource record with no actions or children.
    ///
    /// # Arguments
    ///
    /// * `key` - Segment name
    /// * `name` - Display name
    /// * `description` - Description
    /// * `parent_id` - Parent resource, `None` for a root
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            key: key.into(),
            name: name.into(),
            description: description.into(),
            parent_id,
            actions: Vec::new(),
            sub_resources: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this resource sits at the top of the tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Find one of this resource's actions by key.
    pub fn action(&self, key: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.key == key)
    }

    /// Find one of this resource's immediate children by key.
    pub fn sub_resource(&self, key: &str) -> Option<&Resource> {
        self.sub_resources.iter().find(|r| r.key == key)
    }
}

/// Input for creating a resource together with its actions and subtree.
///
/// # Example
///
/// ```
/// use privy::{define_action, ResourceConfig};
///
/// let config = ResourceConfig::new("article", "Article", "News article entity")
///     .with_action(define_action("read", "Read", "Read article content"))
///     .with_sub_resource(
///         ResourceConfig::new("comment", "Comment", "Article comments")
///             .with_action(define_action("delete", "Delete Comment", "Delete comment")),
///     );
///
/// assert_eq!(config.sub_resources.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Segment name
    pub key: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Actions to create on this resource
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    /// Children to create below this resource
    #[serde(default)]
    pub sub_resources: Vec<ResourceConfig>,
}

impl ResourceConfig {
    /// Create a config with no actions or children.
    pub fn new(key: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
            sub_resources: Vec::new(),
        }
    }

    /// Add one action.
    pub fn with_action(mut self, action: ActionDef) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions.
    pub fn with_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionDef>,
    {
        self.actions.extend(actions);
        self
    }

    /// Add a child resource.
    pub fn with_sub_resource(mut self, sub_resource: ResourceConfig) -> Self {
        self.sub_resources.push(sub_resource);
        self
    }

    /// Build the record for this config under the given parent.
    pub(crate) fn to_record(&self, parent_id: Option<Uuid>) -> Resource {
        Resource::new(&self.key, &self.name, &self.description, parent_id)
    }
}

/// Changes to a resource's descriptive fields.
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
}

impl ResourceUpdate {
    /// Apply the changes to a record.
    pub(crate) fn apply(self, resource: &mut Resource) {
        if let Some(name) = self.name {
            resource.name = name;
        }
        if let Some(description) = self.description {
            resource.description = description;
        }
    }
}
