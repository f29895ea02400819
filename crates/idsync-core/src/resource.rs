//! Governed resources and their types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, Annotations};

/// Behavioural trait a resource type exposes to the governance model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    /// Resources of this type are principals that can hold grants.
    User,
    /// Resources of this type are named roles.
    Role,
}

/// Static description of a kind of resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Stable type id (e.g. `account`).
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Traits carried by every resource of this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<ResourceTrait>,
    /// Type-level annotations.
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ResourceType {
    /// Create a resource type without traits.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            traits: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Builder: add a trait.
    #[must_use]
    pub fn with_trait(mut self, resource_trait: ResourceTrait) -> Self {
        if !self.traits.contains(&resource_trait) {
            self.traits.push(resource_trait);
        }
        self
    }

    /// Builder: add a type-level annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.update(annotation);
        self
    }

    /// Check whether the type carries a trait.
    #[must_use]
    pub fn has_trait(&self, resource_trait: ResourceTrait) -> bool {
        self.traits.contains(&resource_trait)
    }
}

/// Typed identifier of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource type id.
    pub resource_type: String,
    /// Id of the resource within its type.
    pub resource: String,
}

impl ResourceId {
    /// Create a resource id.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource: resource.into(),
        }
    }

    /// Check whether this id belongs to the given resource type.
    #[must_use]
    pub fn is_type(&self, resource_type: &ResourceType) -> bool {
        self.resource_type == resource_type.id
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status of a user principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Status is not known.
    Unspecified,
    /// The user can sign in.
    Enabled,
    /// The user is disabled upstream.
    Disabled,
}

/// Email address attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    /// Address.
    pub address: String,
    /// Whether this is the primary address.
    pub is_primary: bool,
}

/// Profile data carried by user resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTrait {
    /// Known email addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<UserEmail>,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Account status.
    pub status: UserStatus,
}

impl UserTrait {
    /// Create an empty user trait with the given status.
    #[must_use]
    pub const fn new(status: UserStatus) -> Self {
        Self {
            emails: Vec::new(),
            login: None,
            status,
        }
    }

    /// Builder: add an email address.
    #[must_use]
    pub fn with_email(mut self, address: impl Into<String>, is_primary: bool) -> Self {
        self.emails.push(UserEmail {
            address: address.into(),
            is_primary,
        });
        self
    }

    /// Builder: set the login.
    #[must_use]
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }
}

/// One governed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Typed id.
    pub id: ResourceId,
    /// Human-readable name.
    pub display_name: String,
    /// Parent resource, if this resource is nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_resource_id: Option<ResourceId>,
    /// User profile, for user resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_trait: Option<UserTrait>,
    /// Whether the resource is a role.
    #[serde(default)]
    pub is_role: bool,
    /// Resource-level annotations.
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Resource {
    /// Create a plain resource.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id.clone(), id),
            display_name: display_name.into(),
            parent_resource_id: None,
            user_trait: None,
            is_role: false,
            annotations: Annotations::new(),
        }
    }

    /// Create a user resource.
    #[must_use]
    pub fn new_user(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        id: impl Into<String>,
        user_trait: UserTrait,
    ) -> Self {
        let mut resource = Self::new(display_name, resource_type, id);
        resource.user_trait = Some(user_trait);
        resource
    }

    /// Create a role resource.
    #[must_use]
    pub fn new_role(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        id: impl Into<String>,
    ) -> Self {
        let mut resource = Self::new(display_name, resource_type, id);
        resource.is_role = true;
        resource
    }

    /// Builder: set the parent resource.
    #[must_use]
    pub fn with_parent(mut self, parent: ResourceId) -> Self {
        self.parent_resource_id = Some(parent);
        self
    }

    /// Builder: announce a child resource type.
    #[must_use]
    pub fn with_child_resource_type(mut self, resource_type: &ResourceType) -> Self {
        self.annotations.update(Annotation::ChildResourceType {
            resource_type_id: resource_type.id.clone(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_type() -> ResourceType {
        ResourceType::new("account", "Account")
    }

    #[test]
    fn test_resource_id_display() {
        let id = ResourceId::new("user", "123:alice@example.com");
        assert_eq!(id.to_string(), "user:123:alice@example.com");
    }

    #[test]
    fn test_resource_type_traits_are_unique() {
        let rt = ResourceType::new("user", "User")
            .with_trait(ResourceTrait::User)
            .with_trait(ResourceTrait::User);
        assert_eq!(rt.traits, vec![ResourceTrait::User]);
        assert!(rt.has_trait(ResourceTrait::User));
        assert!(!rt.has_trait(ResourceTrait::Role));
    }

    #[test]
    fn test_resource_builder_sets_parent_and_children() {
        let container_type = ResourceType::new("container", "Container");
        let account = Resource::new("Main", &account_type(), "123")
            .with_child_resource_type(&container_type);
        assert_eq!(account.id, ResourceId::new("account", "123"));
        assert_eq!(
            account.annotations.child_resource_types().collect::<Vec<_>>(),
            vec!["container"]
        );

        let container =
            Resource::new("Web", &container_type, "9").with_parent(account.id.clone());
        assert_eq!(container.parent_resource_id, Some(account.id));
        assert!(container.id.is_type(&container_type));
    }

    #[test]
    fn test_user_trait_builder() {
        let user_trait = UserTrait::new(UserStatus::Enabled)
            .with_email("alice@example.com", true)
            .with_login("alice@example.com");
        assert_eq!(user_trait.emails.len(), 1);
        assert!(user_trait.emails[0].is_primary);
        assert_eq!(user_trait.login.as_deref(), Some("alice@example.com"));
    }
}
