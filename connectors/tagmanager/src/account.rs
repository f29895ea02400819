//! Account resource syncer and provisioner.

use std::sync::Arc;

use async_trait::async_trait;
use idsync_core::{
    Annotations, CancelSignal, Entitlement, Grant, Page, Resource, ResourceId, ResourceProvisioner,
    ResourceSyncer, ResourceType, SyncError, SyncResult, Token,
};
use tracing::{debug, instrument};

use crate::catalog::{PermissionScope, permission_entitlements};
use crate::client::{TagManagerClient, call};
use crate::config::TagManagerConfig;
use crate::grants::account_grants;
use crate::pagination::parse_page_token;
use crate::projector::account_resource;
use crate::reconcile::Reconciler;
use crate::relevance::Scope;
use crate::resource_types;

/// Syncs Tag Manager accounts and applies account-level roles.
#[derive(Debug, Clone)]
pub struct AccountSyncer {
    resource_type: ResourceType,
    client: TagManagerClient,
    config: Arc<TagManagerConfig>,
    cancel: CancelSignal,
}

impl AccountSyncer {
    #[must_use]
    pub fn new(client: TagManagerClient, config: Arc<TagManagerConfig>, cancel: CancelSignal) -> Self {
        Self {
            resource_type: resource_types::account(),
            client,
            config,
            cancel,
        }
    }

    fn account_id<'a>(&self, resource: &'a Resource) -> SyncResult<&'a str> {
        if resource.id.resource_type != self.resource_type.id {
            return Err(SyncError::precondition(format!(
                "expected an account resource, got {}",
                resource.id
            )));
        }
        Ok(&resource.id.resource)
    }
}

#[async_trait]
impl ResourceSyncer for AccountSyncer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn list(&self, _parent: Option<&ResourceId>, token: &Token) -> SyncResult<Page<Resource>> {
        let scope = ResourceId::new(resource_types::ACCOUNT, "");
        let (mut bag, page_token) = parse_page_token(&token.token, &scope)?;

        let page = call(
            &self.cancel,
            "list accounts",
            self.client.list_accounts(&page_token),
        )
        .await?;

        let items: Vec<Resource> = page
            .account
            .iter()
            .filter(|account| {
                let keep = self.config.includes_account(&account.account_id);
                if !keep {
                    debug!(account_id = %account.account_id, "account not in allow-list");
                }
                keep
            })
            .map(account_resource)
            .collect();

        Ok(Page::new(items, bag.next_token(&page.next_page_token)?))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: &Token,
    ) -> SyncResult<Page<Entitlement>> {
        self.account_id(resource)?;
        Ok(Page::last(permission_entitlements(
            resource,
            PermissionScope::Account,
            &resource_types::user(),
        )))
    }

    #[instrument(skip(self, resource, token), fields(account_id = %resource.id.resource))]
    async fn grants(&self, resource: &Resource, token: &Token) -> SyncResult<Page<Grant>> {
        let account_id = self.account_id(resource)?;
        let (mut bag, page_token) = parse_page_token(&token.token, &resource.id)?;

        let page = call(
            &self.cancel,
            "list user permissions",
            self.client.list_user_permissions(account_id, &page_token),
        )
        .await?;

        let grants = account_grants(resource, &page.user_permission)?;
        Ok(Page::new(grants, bag.next_token(&page.next_page_token)?))
    }
}

#[async_trait]
impl ResourceProvisioner for AccountSyncer {
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> SyncResult<Annotations> {
        let account_id = self.account_id(&entitlement.resource)?;
        Reconciler::new(&self.client, &self.cancel)
            .grant(Scope::Account { account_id }, &principal.id, &entitlement.slug)
            .await?;
        Ok(Annotations::new())
    }

    async fn revoke(&self, grant: &Grant) -> SyncResult<Annotations> {
        let account_id = self.account_id(&grant.entitlement.resource)?;
        Reconciler::new(&self.client, &self.cancel)
            .revoke(
                Scope::Account { account_id },
                &grant.principal,
                &grant.entitlement.slug,
            )
            .await?;
        Ok(Annotations::new())
    }
}
