//! Error types for RBAC operations
//!
//! This module defines every failure the manager, the path resolver and the
//! storage backends can report. Not-found and already-exists failures are kept
//! as distinct variants per entity so callers can branch on them.

use thiserror::Error;

/// RBAC error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RbacError {
    /// Resource path is empty or contains an empty segment
    #[error("Invalid resource path: {0:?}")]
    InvalidPath(String),

    /// No resource matches the key or path
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// No action with this key exists on the resource
    #[error("Action not found: {0}")]
    ActionNotFound(String),

    /// No role with this key or id exists
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// A root resource with this key already exists
    #[error("Resource already exists: {0}")]
    ResourceExists(String),

    /// A role with this key already exists
    #[error("Role already exists: {0}")]
    RoleExists(String),

    /// A uniqueness constraint was violated inside the storage backend
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The record changed since it was read (version mismatch)
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Manager is missing a required dependency
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opaque failure from a storage backend
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Check if this error reports a missing resource, action or role.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RbacError::ResourceNotFound(_) | RbacError::ActionNotFound(_) | RbacError::RoleNotFound(_)
        )
    }

    /// Check if this error reports a uniqueness or version conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RbacError::ResourceExists(_)
                | RbacError::RoleExists(_)
                | RbacError::DuplicateKey(_)
                | RbacError::ConcurrentModification(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::InvalidPath(_) => "INVALID_PATH",
            RbacError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            RbacError::ActionNotFound(_) => "ACTION_NOT_FOUND",
            RbacError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            RbacError::ResourceExists(_) => "RESOURCE_EXISTS",
            RbacError::RoleExists(_) => "ROLE_EXISTS",
            RbacError::DuplicateKey(_) => "DUPLICATE_KEY",
            RbacError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            RbacError::Config(_) => "CONFIG_ERROR",
            RbacError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(RbacError::RoleNotFound("ghost".into()).is_not_found());
        assert!(RbacError::ActionNotFound("read".into()).is_not_found());
        assert!(!RbacError::InvalidPath(String::new()).is_not_found());

        assert!(RbacError::DuplicateKey("article".into()).is_conflict());
        assert!(RbacError::ConcurrentModification("editor".into()).is_conflict());
        assert!(!RbacError::Storage("disk full".into()).is_conflict());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RbacError::RoleExists("editor".into()).error_code(), "ROLE_EXISTS");
        assert_eq!(RbacError::Config("storage".into()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = RbacError::InvalidPath(String::new());
        assert_eq!(err.to_string(), "Invalid resource path: \"\"");

        let err = RbacError::ResourceNotFound("article.missing".into());
        assert_eq!(err.to_string(), "Resource not found: article.missing");
    }
}
