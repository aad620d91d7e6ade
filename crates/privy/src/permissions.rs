//! # Permissions
//!
//! Permission strings are dot-joined paths such as `"article"`,
//! `"article.comment"` or `"article.comment.delete"`. They are never checked
//! against the resource tree; matching works on the strings alone.
//!
//! ## Matching
//!
//! A given permission satisfies a required one when the two are equal, or
//! when one is an ancestor of the other on a segment boundary:
//!
//! ```text
//! required              given                   result
//! user.create           user.create             true   (exact)
//! user.create           user                    true   (given is an ancestor)
//! infrastructure        infrastructure.vm.stop  true   (given is a descendant)
//! user.delete           user.update             false
//! user                  username                false  (no segment boundary)
//! ```
//!
//! Both directions are accepted, so the relation is symmetric.

use std::collections::HashSet;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Check if `given` satisfies `required`.
///
/// # Example
///
/// ```
/// use privy::check_permission;
///
/// assert!(check_permission("user.create", "user"));
/// assert!(check_permission("infrastructure", "infrastructure.vm.start"));
/// assert!(!check_permission("user", "username"));
/// ```
pub fn check_permission(required: &str, given: &str) -> bool {
    if required == given {
        return true;
    }

    // given is a coarser group containing required
    if is_ancestor(given, required) {
        return true;
    }

    // given is a more specific grant inside required
    is_ancestor(required, given)
}

/// True when `path` starts with `ancestor` followed immediately by a separator.
fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Check if any of `given` satisfies `required`.
///
/// Returns `false` for an empty list.
pub fn check_permissions<S: AsRef<str>>(required: &str, given: &[S]) -> bool {
    given.iter().any(|g| check_permission(required, g.as_ref()))
}

/// Build the canonical permission string for an action on a resource path.
///
/// # Example
///
/// ```
/// use privy::build_permission_string;
///
/// assert_eq!(build_permission_string("article.comment", "delete"), "article.comment.delete");
/// ```
pub fn build_permission_string(resource_path: &str, action: &str) -> String {
    format!("{}{}{}", resource_path, SEPARATOR, action)
}

/// Append every incoming permission not already granted.
///
/// Existing entries keep their order (and any duplicates they already had);
/// new ones are appended in input order, each at most once.
///
/// # Returns
///
/// The number of permissions appended
pub fn merge_permissions<S: AsRef<str>>(existing: &mut Vec<String>, incoming: &[S]) -> usize {
    let mut seen: HashSet<String> = existing.iter().cloned().collect();
    let before = existing.len();

    for perm in incoming {
        let perm = perm.as_ref();
        if seen.insert(perm.to_string()) {
            existing.push(perm.to_string());
        }
    }

    existing.len() - before
}

/// Drop every occurrence of the given permissions.
///
/// Values that are not granted are ignored.
///
/// # Returns
///
/// The number of entries removed
pub fn strip_permissions<S: AsRef<str>>(existing: &mut Vec<String>, removed: &[S]) -> usize {
    let removed: HashSet<&str> = removed.iter().map(AsRef::as_ref).collect();
    let before = existing.len();

    existing.retain(|p| !removed.contains(p.as_str()));

    before - existing.len()
}
