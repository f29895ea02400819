//! Tag Manager connector for idsync.
//!
//! Projects Tag Manager accounts, containers, users and catalog roles into
//! the idsync resource model, enumerates who holds which account or
//! container permission, and reconciles grant/revoke requests back into the
//! upstream user permission records.
//!
//! ## Permission model
//!
//! Each user permission record binds one email to one account role
//! (`accountAccess.permission`) plus a list of container entries
//! (`containerAccess[]`). Account access is a single field; container access
//! is additive.
//!
//! ## Policy
//!
//! - Revoking `admin` on an account downgrades the record to `user`; revoking
//!   any other account role deletes the record.
//! - Revoking a container role overrides it with a `noAccess` entry; the
//!   record is never deleted.
//! - Granting a container role appends an entry.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod account;
pub mod catalog;
pub mod client;
pub mod config;
pub mod connector;
pub mod container;
pub mod error;
pub mod grants;
pub mod pagination;
pub mod projector;
pub mod reconcile;
pub mod relevance;
pub mod resource_types;
pub mod role;
pub mod syncer;
pub mod types;
pub mod user;

pub use catalog::{AccountRole, ContainerRole, PermissionScope};
pub use client::TagManagerClient;
pub use config::TagManagerConfig;
pub use connector::TagManagerConnector;
pub use error::{TagManagerError, TagManagerResult};
pub use relevance::{Intent, RelevanceQuery, Scope};
pub use syncer::TagManagerSyncer;
