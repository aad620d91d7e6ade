//! Walkthrough of the RBAC manager over in-memory storage.
//!
//! Run with `RUST_LOG=privy=debug` to see the manager's spans.

use privy::{build_permission_string, define_action, Manager, MemoryStorage, RbacResult, ResourceConfig, RoleConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> RbacResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let manager = Manager::new(Arc::new(MemoryStorage::new())).await?;

    println!("=== Creating Resources ===");
    let article = manager
        .create_resource(
            ResourceConfig::new("article", "Article", "News article entity")
                .with_actions([
                    define_action("read", "Read", "Read article content"),
                    define_action("create", "Create", "Create new article"),
                    define_action("update", "Update", "Edit existing article"),
                    define_action("delete", "Delete", "Delete article"),
                    define_action("publish", "Publish", "Publish article"),
                ])
                .with_sub_resource(ResourceConfig::new("comment", "Comment", "Article comments").with_actions([
                    define_action("read", "Read Comment", "Read comment content"),
                    define_action("create", "Create Comment", "Create a new comment"),
                    define_action("delete", "Delete Comment", "Delete comment"),
                ])),
        )
        .await?;
    println!("Created resource: {} ({})", article.key, article.name);
    println!("  Actions: {}", article.actions.len());
    println!("  Sub-resources: {}", article.sub_resources.len());

    println!("\n=== Extending Resources ===");
    manager
        .add_actions(
            "article",
            &[
                define_action("share", "Share", "Share article with others"),
                define_action("like", "Like", "Like an article"),
            ],
        )
        .await?;
    println!("Added 'share' and 'like' actions to article");

    manager
        .create_resources(
            "article",
            &[ResourceConfig::new("tag", "Tag", "Article tags")
                .with_action(define_action("assign", "Assign Tag", "Assign tag to article"))],
        )
        .await?;
    println!("Added 'tag' sub-resource to article");

    println!("\n=== Creating Roles ===");
    let editor = manager
        .create_role(
            "editor",
            RoleConfig::new("Editor", "Can edit and publish articles").with_permissions([
                "article.read",
                "article.create",
                "article.update",
                "article.publish",
                "article.comment.read",
                "article.comment.create",
            ]),
        )
        .await?;
    println!("Created role: {} ({})", editor.key, editor.name);
    println!("  Permissions: {:?}", editor.permissions);

    let viewer = manager
        .create_role(
            "viewer",
            RoleConfig::new("Viewer", "Can only view articles").with_permissions(["article.read", "article.comment.read"]),
        )
        .await?;
    println!("Created role: {} ({})", viewer.key, viewer.name);

    manager
        .assign_permissions("editor", &[build_permission_string("article", "delete")])
        .await?;
    println!("Granted article.delete to editor");

    println!("\n=== Checking Permissions ===");
    let checks = [
        ("editor", "article.update"),
        ("editor", "article.delete"),
        ("editor", "article.comment"),
        ("viewer", "article.update"),
        ("viewer", "article.comment.read"),
    ];
    for (role, permission) in checks {
        let allowed = manager.check_role_permission(role, permission).await?;
        println!("{:<8} {:<24} {}", role, permission, if allowed { "allowed" } else { "denied" });
    }

    let allowed = manager
        .check_roles_permission(&["guest", "viewer"], "article.read")
        .await?;
    println!("guest|viewer article.read {}", if allowed { "allowed" } else { "denied" });

    println!("\n=== Listing ===");
    for resource in manager.list_resources().await? {
        println!("{} ({} actions)", resource.key, resource.actions.len());
        for child in manager.list_sub_resources(&resource.key).await? {
            println!("  {}.{} ({} actions)", resource.key, child.key, child.actions.len());
        }
    }
    for role in manager.list_roles().await? {
        println!("role {} -> {:?}", role.key, role.permissions);
    }

    Ok(())
}
