//! Permission vocabularies and the entitlements built from them.
//!
//! The vocabulary of a resource is fixed by its kind: accounts carry one
//! [`AccountRole`], container entries carry one [`ContainerRole`].

use std::fmt;

use idsync_core::{Entitlement, Resource, ResourceType};

/// Account-level role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Unspecified,
    Admin,
    NoAccess,
    User,
}

impl AccountRole {
    /// Every account role, in catalog order.
    pub const ALL: [Self; 4] = [Self::Unspecified, Self::Admin, Self::NoAccess, Self::User];

    /// Upstream spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "accountPermissionUnspecified",
            Self::Admin => "admin",
            Self::NoAccess => "noAccess",
            Self::User => "user",
        }
    }

    /// Parse the upstream spelling. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container-level role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    Approve,
    Unspecified,
    Edit,
    Publish,
    Read,
    NoAccess,
}

impl ContainerRole {
    /// Every container role, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Approve,
        Self::Unspecified,
        Self::Edit,
        Self::Publish,
        Self::Read,
        Self::NoAccess,
    ];

    /// Upstream spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Unspecified => "containerPermissionUnspecified",
            Self::Edit => "edit",
            Self::Publish => "publish",
            Self::Read => "read",
            Self::NoAccess => "noAccess",
        }
    }

    /// Parse the upstream spelling. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which vocabulary applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    Account,
    Container,
}

impl PermissionScope {
    /// Upstream spellings of this scope's vocabulary, in catalog order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        match self {
            Self::Account => AccountRole::ALL.iter().map(|r| r.as_str()).collect(),
            Self::Container => ContainerRole::ALL.iter().map(|r| r.as_str()).collect(),
        }
    }

    /// Check whether a permission value belongs to this scope.
    #[must_use]
    pub fn contains(self, permission: &str) -> bool {
        match self {
            Self::Account => AccountRole::parse(permission).is_some(),
            Self::Container => ContainerRole::parse(permission).is_some(),
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Container => "container",
        }
    }
}

/// Build one permission entitlement per vocabulary entry for `resource`.
#[must_use]
pub fn permission_entitlements(
    resource: &Resource,
    scope: PermissionScope,
    grantable_to: &ResourceType,
) -> Vec<Entitlement> {
    scope
        .names()
        .into_iter()
        .map(|perm| {
            Entitlement::permission(resource, perm)
                .with_grantable_to(grantable_to)
                .with_display_name(format!("{perm} permission"))
                .with_description(format!(
                    "{perm} permission in Tag Manager under {} {}",
                    scope.noun(),
                    resource.display_name
                ))
        })
        .collect()
}
