//! Core logic for provisioning an Athena table over AWS Config snapshots
//! stored in a Control Tower log-archive bucket.
//!
//! The crate is storage-agnostic: listing and catalog access go through the
//! [`PrefixLister`] and [`CatalogClient`] traits. AWS implementations live in
//! `ct-snapshot-aws`.

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod provision;
pub mod schema;
pub mod storage;
pub mod template;

pub use catalog::CatalogClient;
pub use discovery::{discover, Discovery};
pub use error::{DiscoveryError, ErrorCode, ProvisionError, TemplateError};
pub use provision::{render_create_table, ProvisionOutcome, TableProvisioner, TableTarget};
pub use storage::PrefixLister;
