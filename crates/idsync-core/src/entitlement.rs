//! Entitlements: grantable permission levels attached to a resource.

use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceType};

/// What holding an entitlement means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    /// A permission level on the resource.
    Permission,
    /// Membership/assignment of the resource.
    Assignment,
}

/// A nameable permission level attachable to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Stable id, `resource_type:resource:slug`.
    pub id: String,
    /// Resource the entitlement is attached to.
    pub resource: Resource,
    /// Permission name.
    pub slug: String,
    /// Purpose.
    pub purpose: EntitlementPurpose,
    /// Resource type ids of principals that may receive this entitlement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grantable_to: Vec<String>,
    /// Human-readable name.
    pub display_name: String,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entitlement {
    /// Build the stable entitlement id for a resource and slug.
    #[must_use]
    pub fn id_for(resource: &Resource, slug: &str) -> String {
        format!(
            "{}:{}:{}",
            resource.id.resource_type, resource.id.resource, slug
        )
    }

    /// Create a permission entitlement on a resource.
    #[must_use]
    pub fn permission(resource: &Resource, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: Self::id_for(resource, &slug),
            resource: resource.clone(),
            display_name: slug.clone(),
            slug,
            purpose: EntitlementPurpose::Permission,
            grantable_to: Vec::new(),
            description: None,
        }
    }

    /// Builder: allow a principal resource type to receive this entitlement.
    #[must_use]
    pub fn with_grantable_to(mut self, resource_type: &ResourceType) -> Self {
        if !self.grantable_to.contains(&resource_type.id) {
            self.grantable_to.push(resource_type.id.clone());
        }
        self
    }

    /// Builder: set the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Builder: set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
