//! Tag Manager API v2 wire types.

use serde::{Deserialize, Serialize};

/// A Tag Manager account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Relative resource path, `accounts/{account_id}`.
    #[serde(default)]
    pub path: String,
    /// Account id.
    pub account_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A container inside an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Relative resource path, `accounts/{a}/containers/{c}`.
    #[serde(default)]
    pub path: String,
    /// Owning account id.
    #[serde(default)]
    pub account_id: String,
    /// Container id.
    pub container_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Public id (`GTM-XXXX`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

/// Account-level access of a permission record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAccess {
    /// Account role.
    #[serde(default)]
    pub permission: String,
}

/// One container-level access entry of a permission record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAccess {
    /// Container the entry applies to.
    pub container_id: String,
    /// Container role.
    #[serde(default)]
    pub permission: String,
}

impl ContainerAccess {
    /// Create an entry.
    #[must_use]
    pub fn new(container_id: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            permission: permission.into(),
        }
    }
}

/// A user permission record: one email bound to one account role plus any
/// number of container entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermission {
    /// Opaque record locator, `accounts/{a}/user_permissions/{id}`.
    #[serde(default)]
    pub path: String,
    /// Owning account id.
    #[serde(default)]
    pub account_id: String,
    /// Principal email address.
    #[serde(default)]
    pub email_address: String,
    /// Account-level access.
    #[serde(default)]
    pub account_access: AccountAccess,
    /// Container-level access entries.
    #[serde(default)]
    pub container_access: Vec<ContainerAccess>,
}

impl UserPermission {
    /// Entries for one container.
    pub fn container_entries<'a>(
        &'a self,
        container_id: &'a str,
    ) -> impl Iterator<Item = &'a ContainerAccess> + 'a {
        self.container_access
            .iter()
            .filter(move |ca| ca.container_id == container_id)
    }
}

/// Response of `accounts.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsResponse {
    /// Accounts on this page.
    #[serde(default)]
    pub account: Vec<Account>,
    /// Continuation token (empty = exhausted).
    #[serde(default)]
    pub next_page_token: String,
}

/// Response of `accounts.containers.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainersResponse {
    /// Containers on this page.
    #[serde(default)]
    pub container: Vec<Container>,
    /// Continuation token (empty = exhausted).
    #[serde(default)]
    pub next_page_token: String,
}

/// Response of `accounts.user_permissions.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserPermissionsResponse {
    /// Permission records on this page.
    #[serde(default)]
    pub user_permission: Vec<UserPermission>,
    /// Continuation token (empty = exhausted).
    #[serde(default)]
    pub next_page_token: String,
}

/// Google API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error detail.
    pub error: ApiErrorDetail,
}

/// Google API error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// HTTP status code echoed by the API.
    #[serde(default)]
    pub code: u16,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status (`PERMISSION_DENIED`, ...).
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_permission_parses_camel_case() {
        let up: UserPermission = serde_json::from_value(json!({
            "path": "accounts/123/user_permissions/7",
            "accountId": "123",
            "emailAddress": "alice@example.com",
            "accountAccess": { "permission": "user" },
            "containerAccess": [
                { "containerId": "A", "permission": "edit" },
                { "containerId": "B", "permission": "read" }
            ]
        }))
        .unwrap();

        assert_eq!(up.account_access.permission, "user");
        assert_eq!(up.container_entries("A").count(), 1);
        assert_eq!(up.container_entries("C").count(), 0);
    }

    #[test]
    fn test_user_permission_tolerates_missing_access() {
        let up: UserPermission = serde_json::from_value(json!({
            "path": "accounts/123/user_permissions/8",
            "accountId": "123",
            "emailAddress": "bob@example.com"
        }))
        .unwrap();
        assert_eq!(up.account_access.permission, "");
        assert!(up.container_access.is_empty());
    }

    #[test]
    fn test_user_permission_serializes_camel_case() {
        let up = UserPermission {
            path: "accounts/1/user_permissions/2".into(),
            account_id: "1".into(),
            email_address: "a@example.com".into(),
            account_access: AccountAccess {
                permission: "admin".into(),
            },
            container_access: vec![ContainerAccess::new("9", "read")],
        };
        let value = serde_json::to_value(&up).unwrap();
        assert_eq!(value["accountAccess"]["permission"], "admin");
        assert_eq!(value["containerAccess"][0]["containerId"], "9");
    }

    #[test]
    fn test_list_response_defaults_when_empty() {
        let resp: ListUserPermissionsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.user_permission.is_empty());
        assert!(resp.next_page_token.is_empty());
    }
}
