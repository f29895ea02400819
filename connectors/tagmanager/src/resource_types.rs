//! Resource types exposed by the connector.

use idsync_core::{Annotation, ResourceTrait, ResourceType};

pub const ACCOUNT: &str = "account";
pub const CONTAINER: &str = "container";
pub const USER: &str = "user";
pub const ROLE: &str = "role";

/// Tag Manager accounts.
#[must_use]
pub fn account() -> ResourceType {
    ResourceType::new(ACCOUNT, "Account")
}

/// Containers, always nested under an account.
#[must_use]
pub fn container() -> ResourceType {
    ResourceType::new(CONTAINER, "Container")
}

/// Users seen in an account's permission records.
#[must_use]
pub fn user() -> ResourceType {
    ResourceType::new(USER, "User")
        .with_trait(ResourceTrait::User)
        .with_annotation(Annotation::SkipEntitlementsAndGrants)
}

/// Catalog roles of an account or container.
#[must_use]
pub fn role() -> ResourceType {
    ResourceType::new(ROLE, "Role").with_trait(ResourceTrait::Role)
}
