//! FortiOS configuration resources
//!
//! Wires the `fortimap` engine to the FortiOS REST API: a CMDB client, the
//! generic create/read/update/delete/import lifecycle, and the object schemas.

pub mod api;
pub mod config;
pub mod data_source;
pub mod error;
pub mod provider;
pub mod resource;
pub mod resources;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{CmdbClient, Client};
pub use config::ProviderConfig;
pub use data_source::CmdbDataSource;
pub use error::{Error, Result};
pub use provider::FortiosProvider;
pub use resource::{CmdbResource, DeleteMode, ResourceDefinition, ResourceOptions};
