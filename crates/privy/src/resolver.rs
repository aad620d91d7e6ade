//! Resource path resolution
//!
//! Turns a dot-delimited path such as `article.comment` into the resource at
//! its last segment by walking the tree one level at a time.

use tracing::debug;
use uuid::Uuid;

use crate::error::{RbacError, RbacResult};
use crate::permissions::SEPARATOR;
use crate::resources::Resource;
use crate::storage::Storage;

/// Split a resource path into its keys.
///
/// An empty path, or a path with an empty segment (`"a..b"`, `".a"`, `"a."`),
/// fails with [`RbacError::InvalidPath`].
///
/// # Example
///
/// ```
/// use privy::parse_resource_path;
///
/// assert_eq!(parse_resource_path("article.comment").unwrap(), vec!["article", "comment"]);
/// assert!(parse_resource_path("").is_err());
/// ```
pub fn parse_resource_path(path: &str) -> RbacResult<Vec<&str>> {
    let keys: Vec<&str> = path.split(SEPARATOR).collect();
    if keys.iter().any(|k| k.is_empty()) {
        return Err(RbacError::InvalidPath(path.to_string()));
    }
    Ok(keys)
}

/// Walks resource paths against a storage backend.
pub struct PathResolver<'a> {
    storage: &'a dyn Storage,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over the given storage.
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Resolve a path to the resource at its last segment.
    ///
    /// The first key is looked up among roots and every following key under
    /// the previous resource. The first miss fails with
    /// [`RbacError::ResourceNotFound`] naming the full path; any other storage
    /// error is returned unchanged.
    pub async fn resolve(&self, path: &str) -> RbacResult<Resource> {
        let keys = parse_resource_path(path)?;

        let mut parent_id: Option<Uuid> = None;
        let mut resolved = None;

        for key in keys {
            let resource = self.storage.get_resource(key, parent_id).await.map_err(|e| match e {
                RbacError::ResourceNotFound(_) => {
                    debug!(path, key, "Resource path segment not found");
                    RbacError::ResourceNotFound(path.to_string())
                }
                other => other,
            })?;
            parent_id = Some(resource.id);
            resolved = Some(resource);
        }

        // parse_resource_path never yields an empty list.
        resolved.ok_or_else(|| RbacError::InvalidPath(path.to_string()))
    }
}
