//! Per-resource-type capability traits implemented by connectors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotations::Annotations;
use crate::entitlement::Entitlement;
use crate::error::SyncResult;
use crate::grant::Grant;
use crate::pagination::Token;
use crate::resource::{Resource, ResourceId, ResourceType};

/// One page of results plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Opaque cursor for the next call; empty when exhausted.
    pub next_page_token: String,
    /// Side annotations for the driver.
    pub annotations: Annotations,
}

impl<T> Page<T> {
    /// A page with a continuation cursor.
    #[must_use]
    pub const fn new(items: Vec<T>, next_page_token: String) -> Self {
        Self {
            items,
            next_page_token,
            annotations: Annotations::new(),
        }
    }

    /// A final page.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self::new(items, String::new())
    }

    /// An empty final page.
    #[must_use]
    pub const fn empty() -> Self {
        Self::last(Vec::new())
    }

    /// Check whether more pages follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.next_page_token.is_empty()
    }
}

/// Read side of a resource type: the uniform four-operation contract.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// Static description of the resource type handled.
    fn resource_type(&self) -> &ResourceType;

    /// List resources of this type under `parent`, one page per call.
    async fn list(&self, parent: Option<&ResourceId>, token: &Token) -> SyncResult<Page<Resource>>;

    /// List the entitlements offered by `resource`.
    async fn entitlements(&self, resource: &Resource, token: &Token)
    -> SyncResult<Page<Entitlement>>;

    /// List the grants currently held on `resource`.
    async fn grants(&self, resource: &Resource, token: &Token) -> SyncResult<Page<Grant>>;
}

/// Write side of a resource type.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Make `principal` hold `entitlement`.
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement)
    -> SyncResult<Annotations>;

    /// Remove the access described by `grant`.
    async fn revoke(&self, grant: &Grant) -> SyncResult<Annotations>;
}

/// Descriptive connector metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
}

/// Read every page of `list` for one parent.
///
/// Convenience for tooling and tests; sync drivers page incrementally.
///
/// # Errors
/// Propagates the first error returned by the syncer.
pub async fn list_all<S>(syncer: &S, parent: Option<&ResourceId>) -> SyncResult<Vec<Resource>>
where
    S: ResourceSyncer + ?Sized,
{
    let mut out = Vec::new();
    let mut token = Token::first();
    loop {
        let page = syncer.list(parent, &token).await?;
        debug!(
            resource_type = %syncer.resource_type().id,
            items = page.items.len(),
            more = page.has_more(),
            "listed page"
        );
        out.extend(page.items);
        if page.next_page_token.is_empty() {
            return Ok(out);
        }
        token = Token::resume(page.next_page_token);
    }
}

/// Read every page of `grants` for one resource.
///
/// # Errors
/// Propagates the first error returned by the syncer.
pub async fn grants_all<S>(syncer: &S, resource: &Resource) -> SyncResult<Vec<Grant>>
where
    S: ResourceSyncer + ?Sized,
{
    let mut out = Vec::new();
    let mut token = Token::first();
    loop {
        let page = syncer.grants(resource, &token).await?;
        out.extend(page.items);
        if page.next_page_token.is_empty() {
            return Ok(out);
        }
        token = Token::resume(page.next_page_token);
    }
}
