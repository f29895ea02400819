//! Grant enumeration over one page of permission records.

use idsync_core::{Grant, Resource, ResourceId, SyncError, SyncResult};
use tracing::warn;

use crate::catalog::PermissionScope;
use crate::projector::user_id;
use crate::resource_types;
use crate::types::UserPermission;

fn principal(account_id: &str, email: &str) -> ResourceId {
    ResourceId::new(resource_types::USER, user_id(account_id, email))
}

fn check_account(record: &UserPermission, account_id: &str) -> SyncResult<()> {
    if record.account_id == account_id {
        return Ok(());
    }
    Err(SyncError::inconsistency(format!(
        "permission record {} belongs to account {} while listing account {account_id}",
        record.path, record.account_id
    )))
}

/// Account-level grants held on `account`.
///
/// Records with an account role outside the vocabulary are skipped.
///
/// # Errors
/// Returns `SyncError::Inconsistency` if a record belongs to another account.
pub fn account_grants(account: &Resource, records: &[UserPermission]) -> SyncResult<Vec<Grant>> {
    let account_id = account.id.resource.as_str();
    let mut grants = Vec::with_capacity(records.len());

    for record in records {
        check_account(record, account_id)?;

        let permission = record.account_access.permission.as_str();
        if !PermissionScope::Account.contains(permission) {
            warn!(
                account_id,
                path = %record.path,
                permission,
                "skipping unknown account permission"
            );
            continue;
        }

        grants.push(Grant::new(
            account,
            permission,
            principal(account_id, &record.email_address),
        ));
    }

    Ok(grants)
}

/// Container-level grants held on `container`, read from the records of its
/// parent account.
///
/// # Errors
/// Returns `SyncError::Inconsistency` if a record belongs to an account other
/// than `parent_account_id`.
pub fn container_grants(
    container: &Resource,
    parent_account_id: &str,
    records: &[UserPermission],
) -> SyncResult<Vec<Grant>> {
    let container_id = container.id.resource.as_str();
    let mut grants = Vec::new();

    for record in records {
        check_account(record, parent_account_id)?;
        for entry in record.container_entries(container_id) {
            let permission = entry.permission.as_str();
            if !PermissionScope::Container.contains(permission) {
                warn!(
                    account_id = parent_account_id,
                    container_id,
                    path = %record.path,
                    permission,
                    "skipping unknown container permission"
                );
                continue;
            }

            grants.push(Grant::new(
                container,
                permission,
                principal(parent_account_id, &record.email_address),
            ));
        }
    }

    Ok(grants)
}
