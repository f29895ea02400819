//! User resource syncer.

use async_trait::async_trait;
use idsync_core::{
    CancelSignal, Entitlement, Grant, Page, Resource, ResourceId, ResourceSyncer, ResourceType,
    SyncResult, Token,
};

use crate::client::{TagManagerClient, call};
use crate::pagination::parse_page_token;
use crate::projector::user_resource;
use crate::resource_types;

/// Lists the users found in an account's permission records.
#[derive(Debug, Clone)]
pub struct UserSyncer {
    resource_type: ResourceType,
    client: TagManagerClient,
    cancel: CancelSignal,
}

impl UserSyncer {
    #[must_use]
    pub fn new(client: TagManagerClient, cancel: CancelSignal) -> Self {
        Self {
            resource_type: resource_types::user(),
            client,
            cancel,
        }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn list(&self, parent: Option<&ResourceId>, token: &Token) -> SyncResult<Page<Resource>> {
        let Some(parent) = parent.filter(|p| p.resource_type == resource_types::ACCOUNT) else {
            return Ok(Page::empty());
        };

        let scope = ResourceId::new(resource_types::USER, parent.resource.clone());
        let (mut bag, page_token) = parse_page_token(&token.token, &scope)?;

        let page = call(
            &self.cancel,
            "list users",
            self.client.list_user_permissions(&parent.resource, &page_token),
        )
        .await?;

        let items = page
            .user_permission
            .iter()
            .map(|record| user_resource(&record.email_address, parent))
            .collect();

        Ok(Page::new(items, bag.next_token(&page.next_page_token)?))
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
