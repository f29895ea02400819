//! Closed dispatch over the connector's resource kinds.

use async_trait::async_trait;
use idsync_core::{
    Entitlement, Grant, Page, Resource, ResourceId, ResourceProvisioner, ResourceSyncer,
    ResourceType, SyncResult, Token,
};

use crate::account::AccountSyncer;
use crate::container::ContainerSyncer;
use crate::role::RoleSyncer;
use crate::user::UserSyncer;

/// One syncer per resource kind.
#[derive(Debug, Clone)]
pub enum TagManagerSyncer {
    Account(AccountSyncer),
    Container(ContainerSyncer),
    User(UserSyncer),
    Role(RoleSyncer),
}

impl TagManagerSyncer {
    /// Write side, for kinds that accept grants and revokes.
    #[must_use]
    pub fn provisioner(&self) -> Option<&dyn ResourceProvisioner> {
        match self {
            Self::Account(s) => Some(s),
            Self::Container(s) => Some(s),
            Self::User(_) | Self::Role(_) => None,
        }
    }

    fn inner(&self) -> &dyn ResourceSyncer {
        match self {
            Self::Account(s) => s,
            Self::Container(s) => s,
            Self::User(s) => s,
            Self::Role(s) => s,
        }
    }
}

#[async_trait]
impl ResourceSyncer for TagManagerSyncer {
    fn resource_type(&self) -> &ResourceType {
        self.inner().resource_type()
    }

    async fn list(&self, parent: Option<&ResourceId>, token: &Token) -> SyncResult<Page<Resource>> {
        self.inner().list(parent, token).await
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        token: &Token,
    ) -> SyncResult<Page<Entitlement>> {
        self.inner().entitlements(resource, token).await
    }

    async fn grants(&self, resource: &Resource, token: &Token) -> SyncResult<Page<Grant>> {
        self.inner().grants(resource, token).await
    }
}
