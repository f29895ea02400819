//! Projection of upstream records into governed resources.
//!
//! All functions here are pure; ids of synthetic resources (users, roles) are
//! derived from the parent id and a stable key.

use idsync_core::{Resource, ResourceId, ResourceType, UserStatus, UserTrait};

use crate::resource_types;
use crate::types::{Account, Container};

/// Principal id of a user inside an account: `account_id:email`.
#[must_use]
pub fn user_id(account_id: &str, email: &str) -> String {
    format!("{account_id}:{email}")
}

/// Project an account. Accounts are roots and own users, containers and
/// roles.
#[must_use]
pub fn account_resource(account: &Account) -> Resource {
    let display_name = if account.name.is_empty() {
        account.account_id.as_str()
    } else {
        account.name.as_str()
    };

    Resource::new(display_name, &resource_types::account(), &account.account_id)
        .with_child_resource_type(&resource_types::user())
        .with_child_resource_type(&resource_types::container())
        .with_child_resource_type(&resource_types::role())
}

/// Project a container under its parent account.
#[must_use]
pub fn container_resource(container: &Container, parent: &ResourceId) -> Resource {
    let display_name = if container.name.is_empty() {
        container.container_id.as_str()
    } else {
        container.name.as_str()
    };

    Resource::new(
        display_name,
        &resource_types::container(),
        &container.container_id,
    )
    .with_parent(parent.clone())
    .with_child_resource_type(&resource_types::role())
}

/// Project the user behind a permission record.
#[must_use]
pub fn user_resource(email: &str, parent: &ResourceId) -> Resource {
    let profile = UserTrait::new(UserStatus::Enabled)
        .with_email(email, true)
        .with_login(email);

    Resource::new_user(
        email,
        &resource_types::user(),
        user_id(&parent.resource, email),
        profile,
    )
    .with_parent(parent.clone())
}

/// Project a catalog role under an account or container.
#[must_use]
pub fn role_resource(role: &str, parent: &ResourceId, role_type: &ResourceType) -> Resource {
    Resource::new_role(role, role_type, format!("{}:{role}", parent.resource))
        .with_parent(parent.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_account_announces_children() {
        let r = account_resource(&Account {
            path: "accounts/123".into(),
            account_id: "123".into(),
            name: "Marketing".into(),
        });
        assert_eq!(r.id, ResourceId::new("account", "123"));
        assert_eq!(r.display_name, "Marketing");
        assert_eq!(r.parent_resource_id, None);
        assert_eq!(
            r.annotations.child_resource_types().collect::<Vec<_>>(),
            vec!["user", "container", "role"]
        );
    }

    #[test]
    fn test_container_links_parent_account() {
        let parent = ResourceId::new("account", "123");
        let r = container_resource(
            &Container {
                account_id: "123".into(),
                container_id: "9".into(),
                ..Container::default()
            },
            &parent,
        );
        assert_eq!(r.id, ResourceId::new("container", "9"));
        assert_eq!(r.display_name, "9");
        assert_eq!(r.parent_resource_id, Some(parent));
        assert_eq!(
            r.annotations.child_resource_types().collect::<Vec<_>>(),
            vec!["role"]
        );
    }

    #[test]
    fn test_user_id_is_parent_and_email() {
        let parent = ResourceId::new("account", "123");
        let r = user_resource("alice@example.com", &parent);
        assert_eq!(r.id.resource, "123:alice@example.com");

        let profile = r.user_trait.unwrap();
        assert_eq!(profile.status, UserStatus::Enabled);
        assert_eq!(profile.login.as_deref(), Some("alice@example.com"));
        assert!(profile.emails[0].is_primary);
    }

    #[test]
    fn test_role_id_is_parent_and_role() {
        let parent = ResourceId::new("container", "9");
        let r = role_resource("publish", &parent, &resource_types::role());
        assert_eq!(r.id, ResourceId::new("role", "9:publish"));
        assert!(r.is_role);
        assert_eq!(r.parent_resource_id, Some(parent));
    }
}
