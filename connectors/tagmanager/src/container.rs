//! Container resource syncer and provisioner.
//!
//! Container access lives in the permission records of the parent account,
//! so grants and provisioning always read that account's listing.

use async_trait::async_trait;
use idsync_core::{
    Annotations, CancelSignal, Entitlement, Grant, Page, Resource, ResourceId, ResourceProvisioner,
    ResourceSyncer, ResourceType, SyncError, SyncResult, Token,
};
use tracing::instrument;

use crate::catalog::{PermissionScope, permission_entitlements};
use crate::client::{TagManagerClient, call};
use crate::grants::container_grants;
use crate::pagination::parse_page_token;
use crate::projector::container_resource;
use crate::reconcile::Reconciler;
use crate::relevance::Scope;
use crate::resource_types;

/// Syncs containers and applies container-level roles.
#[derive(Debug, Clone)]
pub struct ContainerSyncer {
    resource_type: ResourceType,
    client: TagManagerClient,
    cancel: CancelSignal,
}

/// Account id owning a container resource.
fn parent_account_id(container: &Resource) -> SyncResult<&str> {
    match &container.parent_resource_id {
        Some(parent) if parent.resource_type == resource_types::ACCOUNT => Ok(&parent.resource),
        _ => Err(SyncError::precondition(format!(
            "container {} has no parent account",
            container.id
        ))),
    }
}

impl ContainerSyncer {
    #[must_use]
    pub fn new(client: TagManagerClient, cancel: CancelSignal) -> Self {
        Self {
            resource_type: resource_types::container(),
            client,
            cancel,
        }
    }

    fn scope<'a>(&self, container: &'a Resource) -> SyncResult<Scope<'a>> {
        if container.id.resource_type != self.resource_type.id {
            return Err(SyncError::precondition(format!(
                "expected a container resource, got {}",
                container.id
            )));
        }
        Ok(Scope::Container {
            account_id: parent_account_id(container)?,
            container_id: &container.id.resource,
        })
    }
}

#[async_trait]
impl ResourceSyncer for ContainerSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn list(&self, parent: Option<&ResourceId>, token: &Token) -> SyncResult<Page<Resource>> {
        let Some(parent) = parent.filter(|p| p.resource_type == resource_types::ACCOUNT) else {
            return Ok(Page::empty());
        };

        let scope = ResourceId::new(resource_types::CONTAINER, parent.resource.clone());
        let (mut bag, page_token) = parse_page_token(&token.token, &scope)?;

        let page = call(
            &self.cancel,
            "list containers",
            self.client.list_containers(&parent.resource, &page_token),
        )
        .await?;

        let items = page
            .container
            .iter()
            .map(|c| container_resource(c, parent))
            .collect();

        Ok(Page::new(items, bag.next_token(&page.next_page_token)?))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: &Token,
    ) -> SyncResult<Page<Entitlement>> {
        self.scope(resource)?;
        Ok(Page::last(permission_entitlements(
            resource,
            PermissionScope::Container,
            &resource_types::user(),
        )))
    }

    #[instrument(skip(self, resource, token), fields(container_id = %resource.id.resource))]
    async fn grants(&self, resource: &Resource, token: &Token) -> SyncResult<Page<Grant>> {
        let account_id = self.scope(resource)?.account_id();
        let (mut bag, page_token) = parse_page_token(&token.token, &resource.id)?;

        let page = call(
            &self.cancel,
            "list user permissions",
            self.client.list_user_permissions(account_id, &page_token),
        )
        .await?;

        let grants = container_grants(resource, account_id, &page.user_permission)?;
        Ok(Page::new(grants, bag.next_token(&page.next_page_token)?))
    }
}

#[async_trait]
impl ResourceProvisioner for ContainerSyncer {
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> SyncResult<Annotations> {
        let scope = self.scope(&entitlement.resource)?;
        Reconciler::new(&self.client, &self.cancel)
            .grant(scope, &principal.id, &entitlement.slug)
            .await?;
        Ok(Annotations::new())
    }

    async fn revoke(&self, grant: &Grant) -> SyncResult<Annotations> {
        let scope = self.scope(&grant.entitlement.resource)?;
        Reconciler::new(&self.client, &self.cancel)
            .revoke(scope, &grant.principal, &grant.entitlement.slug)
            .await?;
        Ok(Annotations::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_account_is_required() {
        let orphan = Resource::new("Web", &resource_types::container(), "A");
        assert!(matches!(
            parent_account_id(&orphan),
            Err(SyncError::PreconditionFailed { .. })
        ));

        let owned = orphan.with_parent(ResourceId::new("account", "123"));
        assert_eq!(parent_account_id(&owned).unwrap(), "123");
    }
}
