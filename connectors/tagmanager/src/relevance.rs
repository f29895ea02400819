//! Relevance resolution: which permission records a grant or revoke must
//! touch.
//!
//! Selection is a pure predicate over one record ([`RelevanceQuery::selects`]);
//! [`resolve`] drains every page of the account's permission listing and
//! collects the paths of the selected records.

use std::collections::HashSet;

use idsync_core::{CancelSignal, SyncError, SyncResult};
use tracing::{debug, instrument};

use crate::client::{TagManagerClient, call};
use crate::types::UserPermission;

/// Direction of the requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Granting,
    Revoking,
}

/// Where the permission applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Account {
        account_id: &'a str,
    },
    Container {
        account_id: &'a str,
        container_id: &'a str,
    },
}

impl<'a> Scope<'a> {
    /// Account whose permission listing holds the records.
    #[must_use]
    pub const fn account_id(&self) -> &'a str {
        match *self {
            Self::Account { account_id } | Self::Container { account_id, .. } => account_id,
        }
    }
}

/// Extract the email from a user principal id (`account_id:email`).
///
/// # Errors
/// Returns `SyncError::PreconditionFailed` if the id has no `:` separator or
/// an empty email.
pub fn user_email(user_id: &str) -> SyncResult<&str> {
    match user_id.split_once(':') {
        Some((_, email)) if !email.is_empty() && !email.contains(':') => Ok(email),
        _ => Err(SyncError::precondition(format!(
            "invalid user id '{user_id}': expected 'account_id:email'"
        ))),
    }
}

/// A relevance question for one (user, resource, permission) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceQuery<'a> {
    pub scope: Scope<'a>,
    pub email: &'a str,
    pub permission: &'a str,
    pub intent: Intent,
}

impl RelevanceQuery<'_> {
    /// Decide whether `record` must be mutated.
    #[must_use]
    pub fn selects(&self, record: &UserPermission) -> bool {
        if record.email_address != self.email {
            return false;
        }

        match self.scope {
            Scope::Account { account_id } => {
                if record.account_id != account_id {
                    return false;
                }
                let held = record.account_access.permission == self.permission;
                match self.intent {
                    Intent::Granting => !held,
                    Intent::Revoking => held,
                }
            }
            Scope::Container { container_id, .. } => {
                if record.container_access.is_empty() {
                    return self.intent == Intent::Granting;
                }
                let mut entries = record.container_entries(container_id);
                match self.intent {
                    Intent::Granting => entries.any(|e| e.permission != self.permission),
                    Intent::Revoking => entries.any(|e| e.permission == self.permission),
                }
            }
        }
    }
}

/// Drain the account's permission listing and return the paths of every
/// selected record, deduplicated in first-seen order.
///
/// An empty result means the desired state already holds.
///
/// # Errors
/// Returns the first listing failure, or `SyncError::Cancelled` if `cancel`
/// fires before the drain completes. No partial result is returned.
#[instrument(skip(client, cancel), fields(account_id = query.scope.account_id()))]
pub async fn resolve(
    client: &TagManagerClient,
    query: &RelevanceQuery<'_>,
    cancel: &CancelSignal,
) -> SyncResult<Vec<String>> {
    let account_id = query.scope.account_id();
    let operation = format!("list user permissions of account {account_id}");
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    let mut page_token = String::new();
    let mut pages = 0_u32;

    loop {
        let page = call(
            cancel,
            &operation,
            client.list_user_permissions(account_id, &page_token),
        )
        .await?;
        pages += 1;

        for record in &page.user_permission {
            if query.selects(record) && seen.insert(record.path.clone()) {
                paths.push(record.path.clone());
            }
        }

        if page.next_page_token.is_empty() {
            break;
        }
        if page.next_page_token == page_token {
            return Err(SyncError::inconsistency(format!(
                "permission listing of account {account_id} repeated page token '{page_token}'"
            )));
        }
        page_token = page.next_page_token;
    }

    debug!(pages, selected = paths.len(), "resolved relevant records");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountAccess, ContainerAccess};

    fn record(email: &str, role: &str, containers: &[(&str, &str)]) -> UserPermission {
        UserPermission {
            path: format!("accounts/123/user_permissions/{email}"),
            account_id: "123".into(),
            email_address: email.into(),
            account_access: AccountAccess {
                permission: role.into(),
            },
            container_access: containers
                .iter()
                .map(|(c, p)| ContainerAccess::new(*c, *p))
                .collect(),
        }
    }

    fn account_query(permission: &'static str, intent: Intent) -> RelevanceQuery<'static> {
        RelevanceQuery {
            scope: Scope::Account { account_id: "123" },
            email: "alice@example.com",
            permission,
            intent,
        }
    }

    fn container_query(permission: &'static str, intent: Intent) -> RelevanceQuery<'static> {
        RelevanceQuery {
            scope: Scope::Container {
                account_id: "123",
                container_id: "A",
            },
            email: "alice@example.com",
            permission,
            intent,
        }
    }

    #[test]
    fn test_user_email_requires_separator() {
        assert_eq!(user_email("123:alice@example.com").unwrap(), "alice@example.com");
        assert!(matches!(
            user_email("alice@example.com"),
            Err(SyncError::PreconditionFailed { .. })
        ));
        assert!(user_email("123:").is_err());
        assert!(user_email("1:2:3").is_err());
    }

    #[test]
    fn test_account_granting_selects_differing_role() {
        let alice = record("alice@example.com", "user", &[]);
        assert!(account_query("admin", Intent::Granting).selects(&alice));
        assert!(!account_query("user", Intent::Granting).selects(&alice));
    }

    #[test]
    fn test_account_revoking_selects_equal_role() {
        let alice = record("alice@example.com", "admin", &[]);
        assert!(account_query("admin", Intent::Revoking).selects(&alice));
        assert!(!account_query("user", Intent::Revoking).selects(&alice));
    }

    #[test]
    fn test_account_scope_ignores_other_users_and_accounts() {
        let bob = record("bob@example.com", "user", &[]);
        assert!(!account_query("admin", Intent::Granting).selects(&bob));

        let mut foreign = record("alice@example.com", "user", &[]);
        foreign.account_id = "999".into();
        assert!(!account_query("admin", Intent::Granting).selects(&foreign));
    }

    #[test]
    fn test_container_record_without_entries() {
        let bare = record("alice@example.com", "user", &[]);
        assert!(container_query("edit", Intent::Granting).selects(&bare));
        assert!(!container_query("edit", Intent::Revoking).selects(&bare));
    }

    #[test]
    fn test_container_entries_of_target_container() {
        let alice = record("alice@example.com", "user", &[("A", "read"), ("B", "edit")]);
        assert!(container_query("edit", Intent::Granting).selects(&alice));
        assert!(!container_query("read", Intent::Granting).selects(&alice));
        assert!(container_query("read", Intent::Revoking).selects(&alice));
        assert!(!container_query("edit", Intent::Revoking).selects(&alice));
    }

    #[test]
    fn test_container_grant_without_target_entry_is_not_selected() {
        let alice = record("alice@example.com", "user", &[("B", "edit")]);
        assert!(!container_query("edit", Intent::Granting).selects(&alice));
    }
}
