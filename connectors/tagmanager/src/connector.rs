//! Tag Manager connector: configuration, metadata and syncer wiring.

use std::sync::Arc;

use idsync_core::{CancelHandle, CancelSignal, ConnectorMetadata, ResourceSyncer as _, SyncResult};
use tracing::{info, instrument};

use crate::account::AccountSyncer;
use crate::client::{TagManagerClient, call};
use crate::config::TagManagerConfig;
use crate::container::ContainerSyncer;
use crate::role::RoleSyncer;
use crate::syncer::TagManagerSyncer;
use crate::user::UserSyncer;

/// Tag Manager connector.
#[derive(Debug)]
pub struct TagManagerConnector {
    config: Arc<TagManagerConfig>,
    client: TagManagerClient,
    cancel: CancelHandle,
}

impl TagManagerConnector {
    /// Create a connector from configuration.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidConfig` if the configuration is invalid.
    pub fn new(mut config: TagManagerConfig) -> SyncResult<Self> {
        config.validate()?;
        let client =
            TagManagerClient::new(&config).map_err(|e| e.to_sync_error("build client"))?;
        let (cancel, _) = CancelHandle::new();

        info!(
            base_url = %config.base_url,
            accounts = config.accounts.len(),
            "Tag Manager connector configured"
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            cancel,
        })
    }

    /// Descriptive metadata.
    #[must_use]
    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Google Tag Manager".into(),
            description:
                "Syncs Tag Manager accounts, containers, roles and users with their permissions"
                    .into(),
        }
    }

    /// Check credentials with one account listing.
    ///
    /// # Errors
    /// Returns the upstream failure if the listing is rejected.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> SyncResult<()> {
        let page = call(&self.signal(), "list accounts", self.client.list_accounts("")).await?;
        info!(visible_accounts = page.account.len(), "credentials accepted");
        Ok(())
    }

    /// Syncers for every resource kind, in dependency order.
    #[must_use]
    pub fn resource_syncers(&self) -> Vec<TagManagerSyncer> {
        let signal = self.signal();
        vec![
            TagManagerSyncer::Account(AccountSyncer::new(
                self.client.clone(),
                Arc::clone(&self.config),
                signal.clone(),
            )),
            TagManagerSyncer::Container(ContainerSyncer::new(self.client.clone(), signal.clone())),
            TagManagerSyncer::User(UserSyncer::new(self.client.clone(), signal)),
            TagManagerSyncer::Role(RoleSyncer::new()),
        ]
    }

    /// Syncer for one resource type id.
    #[must_use]
    pub fn syncer(&self, resource_type_id: &str) -> Option<TagManagerSyncer> {
        self.resource_syncers()
            .into_iter()
            .find(|s| s.resource_type().id == resource_type_id)
    }

    /// Handle that aborts in-flight upstream calls of every syncer.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn signal(&self) -> CancelSignal {
        self.cancel.signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsync_core::{ResourceSyncer as _, SyncError};

    fn connector() -> TagManagerConnector {
        TagManagerConnector::new(TagManagerConfig {
            access_token: Some("token".into()),
            ..TagManagerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_missing_token() {
        let err = TagManagerConnector::new(TagManagerConfig::default()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig { .. }));
    }

    #[test]
    fn test_syncers_cover_every_kind() {
        let c = connector();
        let ids: Vec<_> = c
            .resource_syncers()
            .iter()
            .map(|s| s.resource_type().id.clone())
            .collect();
        assert_eq!(ids, vec!["account", "container", "user", "role"]);

        assert!(c.syncer("account").unwrap().provisioner().is_some());
        assert!(c.syncer("container").unwrap().provisioner().is_some());
        assert!(c.syncer("user").unwrap().provisioner().is_none());
        assert!(c.syncer("group").is_none());
    }

    #[test]
    fn test_metadata_names_service() {
        assert_eq!(connector().metadata().display_name, "Google Tag Manager");
    }
}
