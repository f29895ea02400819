//! Grants: observed "principal holds entitlement" facts.

use serde::{Deserialize, Serialize};

use crate::entitlement::Entitlement;
use crate::resource::{Resource, ResourceId};

/// The fact that a principal holds an entitlement on a resource.
///
/// Grants are derived from upstream state at enumeration time and are never
/// persisted by a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Stable id, `entitlement_id:principal_type:principal`.
    pub id: String,
    /// Entitlement held.
    pub entitlement: Entitlement,
    /// Principal holding it.
    pub principal: ResourceId,
}

impl Grant {
    /// Create a grant of the permission `slug` on `resource` to `principal`.
    #[must_use]
    pub fn new(resource: &Resource, slug: impl Into<String>, principal: ResourceId) -> Self {
        let entitlement = Entitlement::permission(resource, slug);
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement.id, principal.resource_type, principal.resource
            ),
            entitlement,
            principal,
        }
    }
}
