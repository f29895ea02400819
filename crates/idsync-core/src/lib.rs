//! Idsync core - identity-governance model for connectors
//!
//! Connectors map an upstream access-control system onto three concepts:
//!
//! - **Resources**: governed entities (accounts, containers, users, roles),
//!   arranged in a parent/child tree.
//! - **Entitlements**: grantable permission levels attached to a resource.
//! - **Grants**: observed facts that a principal holds an entitlement.
//!
//! Each resource type is served by a [`ResourceSyncer`] (read side) and, when
//! mutation is supported, a [`ResourceProvisioner`] (write side). Listings are
//! paginated through opaque [`pagination::Bag`] cursors that the sync driver
//! round-trips verbatim.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod annotations;
pub mod cancel;
pub mod entitlement;
pub mod error;
pub mod grant;
pub mod pagination;
pub mod resource;
pub mod syncer;

pub use annotations::{Annotation, Annotations};
pub use cancel::{CancelHandle, CancelSignal};
pub use entitlement::{Entitlement, EntitlementPurpose};
pub use error::{SyncError, SyncResult};
pub use grant::Grant;
pub use pagination::{Bag, PageState, Token};
pub use resource::{
    Resource, ResourceId, ResourceTrait, ResourceType, UserEmail, UserStatus, UserTrait,
};
pub use syncer::{ConnectorMetadata, Page, ResourceProvisioner, ResourceSyncer, grants_all, list_all};
