//! Role resource syncer: the permission catalog surfaced as roles.

use async_trait::async_trait;
use idsync_core::{
    Entitlement, Grant, Page, Resource, ResourceId, ResourceSyncer, ResourceType, SyncResult,
    Token,
};

use crate::catalog::PermissionScope;
use crate::projector::role_resource;
use crate::resource_types;

/// Lists the catalog roles of an account or container. Never calls upstream.
#[derive(Debug, Clone)]
pub struct RoleSyncer {
    resource_type: ResourceType,
}

impl Default for RoleSyncer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleSyncer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resource_type: resource_types::role(),
        }
    }
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn list(&self, parent: Option<&ResourceId>, _token: &Token) -> SyncResult<Page<Resource>> {
        let Some(parent) = parent else {
            return Ok(Page::empty());
        };
        let scope = match parent.resource_type.as_str() {
            resource_types::ACCOUNT => PermissionScope::Account,
            resource_types::CONTAINER => PermissionScope::Container,
            _ => return Ok(Page::empty()),
        };

        let roles = scope
            .names()
            .into_iter()
            .map(|role| role_resource(role, parent, &self.resource_type))
            .collect();
        Ok(Page::last(roles))
    }

    async fn entitlements(
        &self,
        _resource: &Resource,
        _token: &Token,
    ) -> SyncResult<Page<Entitlement>> {
        Ok(Page::empty())
    }

    async fn grants(&self, _resource: &Resource, _token: &Token) -> SyncResult<Page<Grant>> {
        Ok(Page::empty())
    }
}
