//! # Privy
//!
//! Hierarchical role-based access control: a tree of resources with the
//! actions allowed on them, roles holding permission strings, and a matcher
//! that decides whether granted permissions satisfy a required one.
//!
//! ## Overview
//!
//! The privy crate handles:
//! - **Resources**: A tree of named nodes, addressed by dot paths
//! - **Actions**: Operations keyed within one resource
//! - **Roles**: Named lists of permission strings
//! - **Permission matching**: Ancestor/descendant matching on dot paths
//! - **Storage**: A backend trait, with an in-memory implementation
//!
//! ## Architecture
//!
//! ```text
//! Manager ──→ PathResolver ──→ Storage (trait)
//!    │                            └─ MemoryStorage
//!    └──→ permissions (pure matching)
//!
//! Permission = resource path [+ "." + action]
//!
//! Examples:
//!   "article"                 - Everything under article
//!   "article.read"            - Read articles
//!   "article.comment.delete"  - Delete article comments
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use privy::{define_action, Manager, MemoryStorage, ResourceConfig, RoleConfig};
//!
//! # async fn example() -> privy::RbacResult<()> {
//! let manager = Manager::new(Arc::new(MemoryStorage::new())).await?;
//!
//! manager
//!     .create_resource(
//!         ResourceConfig::new("article", "Article", "News article entity")
//!             .with_action(define_action("read", "Read", "Read article content"))
//!             .with_sub_resource(
//!                 ResourceConfig::new("comment", "Comment", "Article comments")
//!                     .with_action(define_action("delete", "Delete Comment", "Delete comment")),
//!             ),
//!     )
//!     .await?;
//!
//! manager
//!     .create_role("moderator", RoleConfig::new("Moderator", "").with_permissions(["article.comment"]))
//!     .await?;
//!
//! assert!(manager.check_role_permission("moderator", "article.comment.delete").await?);
//! assert!(!manager.check_role_permission("moderator", "article.read").await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Matching Rules
//!
//! - Exact: `"user.create"` satisfies `"user.create"`
//! - Group: given `"user"` satisfies required `"user.create"`
//! - Descendant: given `"infrastructure.vm.start"` satisfies `"infrastructure"`
//! - Segments only: `"user"` never matches `"username"`
//!
//! ## Feature Flags
//!
//! - `memory` (default): In-memory storage backend

pub mod actions;
pub mod error;
pub mod manager;
pub mod permissions;
pub mod resolver;
pub mod resources;
pub mod roles;
pub mod storage;

// Re-export main types for convenience
pub use actions::{define_action, Action, ActionDef};
pub use error::{RbacError, RbacResult};
pub use manager::{Manager, ManagerBuilder};
pub use permissions::{build_permission_string, check_permission, check_permissions};
pub use resolver::{parse_resource_path, PathResolver};
pub use resources::{Resource, ResourceConfig, ResourceUpdate};
pub use roles::{Role, RoleConfig, RoleUpdate};
pub use storage::Storage;

#[cfg(feature = "memory")]
pub use storage::{memory::MemoryStorageStats, MemoryStorage};
