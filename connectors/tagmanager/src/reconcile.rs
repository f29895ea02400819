//! Grant/revoke reconciliation against upstream permission records.
//!
//! Each request resolves the relevant records, then runs a sequential
//! get/edit/write cycle per record. The first failed write aborts the rest;
//! records already written stay written.

use idsync_core::{CancelSignal, ResourceId, SyncError, SyncResult};
use tracing::{debug, info, instrument};

use crate::catalog::{AccountRole, ContainerRole, PermissionScope};
use crate::client::{TagManagerClient, call};
use crate::relevance::{self, Intent, RelevanceQuery, Scope};
use crate::resource_types;
use crate::types::{ContainerAccess, UserPermission};

/// What revoking an account role does to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRevoke {
    /// Replace the role with [`AccountRole::User`].
    DowngradeToUser,
    /// Delete the record.
    Delete,
}

impl AccountRevoke {
    /// Policy for revoking `role`.
    #[must_use]
    pub fn for_role(role: &str) -> Self {
        match AccountRole::parse(role) {
            Some(AccountRole::Admin) => Self::DowngradeToUser,
            _ => Self::Delete,
        }
    }
}

/// Replace the account role of a record.
pub fn set_account_role(record: &mut UserPermission, role: &str) {
    role.clone_into(&mut record.account_access.permission);
}

/// Append a container entry. Existing entries, including ones for the same
/// container, are kept.
pub fn append_container_entry(record: &mut UserPermission, container_id: &str, role: &str) {
    record
        .container_access
        .push(ContainerAccess::new(container_id, role));
}

/// Override a revoked container role with `noAccess`.
///
/// Entries of `container_id` carrying `revoked` are dropped and one
/// `noAccess` entry is appended; entries of other containers are untouched.
/// Revoking `noAccess` itself only drops the override.
pub fn override_container_entry(record: &mut UserPermission, container_id: &str, revoked: &str) {
    record
        .container_access
        .retain(|e| !(e.container_id == container_id && e.permission == revoked));
    if ContainerRole::parse(revoked) != Some(ContainerRole::NoAccess) {
        record.container_access.push(ContainerAccess::new(
            container_id,
            ContainerRole::NoAccess.as_str(),
        ));
    }
}

/// Applies grant and revoke requests for one connector.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    client: &'a TagManagerClient,
    cancel: &'a CancelSignal,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(client: &'a TagManagerClient, cancel: &'a CancelSignal) -> Self {
        Self { client, cancel }
    }

    /// Ensure `principal` holds `permission` in `scope`.
    ///
    /// Returns the number of records written; zero means nothing to do.
    ///
    /// # Errors
    /// Returns `SyncError::PreconditionFailed` for a non-user principal, a
    /// malformed user id or a permission outside the scope's vocabulary,
    /// before any upstream call. Otherwise returns the first upstream failure.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn grant(
        &self,
        scope: Scope<'_>,
        principal: &ResourceId,
        permission: &str,
    ) -> SyncResult<usize> {
        let query = prepare(scope, principal, permission, Intent::Granting)?;
        let paths = relevance::resolve(self.client, &query, self.cancel).await?;
        if paths.is_empty() {
            info!(permission, "permission already granted");
            return Ok(0);
        }

        for path in &paths {
            self.cancel.check("grant permission")?;
            let mut record = self.fetch(path).await?;
            match scope {
                Scope::Account { .. } => set_account_role(&mut record, permission),
                Scope::Container { container_id, .. } => {
                    append_container_entry(&mut record, container_id, permission);
                }
            }
            self.write(path, &record).await?;
        }

        info!(permission, records = paths.len(), "permission granted");
        Ok(paths.len())
    }

    /// Ensure `principal` no longer holds `permission` in `scope`.
    ///
    /// Returns the number of records written or deleted; zero means nothing
    /// to do.
    ///
    /// # Errors
    /// Same preconditions as [`Reconciler::grant`]; otherwise returns the
    /// first upstream failure.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn revoke(
        &self,
        scope: Scope<'_>,
        principal: &ResourceId,
        permission: &str,
    ) -> SyncResult<usize> {
        let query = prepare(scope, principal, permission, Intent::Revoking)?;
        let paths = relevance::resolve(self.client, &query, self.cancel).await?;
        if paths.is_empty() {
            info!(permission, "permission already revoked");
            return Ok(0);
        }

        for path in &paths {
            self.cancel.check("revoke permission")?;
            match scope {
                Scope::Account { .. } => match AccountRevoke::for_role(permission) {
                    AccountRevoke::DowngradeToUser => {
                        let mut record = self.fetch(path).await?;
                        set_account_role(&mut record, AccountRole::User.as_str());
                        self.write(path, &record).await?;
                    }
                    AccountRevoke::Delete => {
                        debug!(path, "deleting permission record");
                        call(
                            self.cancel,
                            &format!("delete user permission {path}"),
                            self.client.delete_user_permission(path),
                        )
                        .await?;
                    }
                },
                Scope::Container { container_id, .. } => {
                    let mut record = self.fetch(path).await?;
                    override_container_entry(&mut record, container_id, permission);
                    self.write(path, &record).await?;
                }
            }
        }

        info!(permission, records = paths.len(), "permission revoked");
        Ok(paths.len())
    }

    async fn fetch(&self, path: &str) -> SyncResult<UserPermission> {
        call(
            self.cancel,
            &format!("get user permission {path}"),
            self.client.get_user_permission(path),
        )
        .await
    }

    async fn write(&self, path: &str, record: &UserPermission) -> SyncResult<()> {
        debug!(path, "updating permission record");
        call(
            self.cancel,
            &format!("update user permission {path}"),
            self.client.update_user_permission(path, record),
        )
        .await?;
        Ok(())
    }
}

fn prepare<'a>(
    scope: Scope<'a>,
    principal: &'a ResourceId,
    permission: &'a str,
    intent: Intent,
) -> SyncResult<RelevanceQuery<'a>> {
    if principal.resource_type != resource_types::USER {
        return Err(SyncError::precondition(format!(
            "only users can hold Tag Manager permissions, got {principal}"
        )));
    }

    let vocabulary = match scope {
        Scope::Account { .. } => PermissionScope::Account,
        Scope::Container { .. } => PermissionScope::Container,
    };
    if !vocabulary.contains(permission) {
        return Err(SyncError::precondition(format!(
            "'{permission}' is not a {vocabulary:?} permission"
        )));
    }

    Ok(RelevanceQuery {
        scope,
        email: relevance::user_email(&principal.resource)?,
        permission,
        intent,
    })
}
