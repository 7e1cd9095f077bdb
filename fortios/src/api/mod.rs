pub mod client;
pub mod error;
pub mod response;

pub use client::{Client, ClientConfig};
pub use error::ApiError;

use async_trait::async_trait;
use fortimap::RemoteRecord;

/// CMDB operations the resource lifecycle needs from a device
///
/// `path` is the object path below `/api/v2/cmdb/`, e.g. `firewall/shaping-policy`.
/// `mkey` is `None` for singleton objects.
#[async_trait]
pub trait CmdbClient: Send + Sync {
    /// Returns the mkey the device assigned, when it reports one
    async fn create(
        &self,
        path: &str,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<Option<String>, ApiError>;

    /// `Ok(None)` when the object does not exist
    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Option<RemoteRecord>, ApiError>;

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn delete(&self, path: &str, mkey: Option<&str>, vdom: Option<&str>)
        -> Result<(), ApiError>;

    /// Firmware version token used for field availability checks
    async fn version(&self) -> Option<String>;
}

/// `firewall.shaping-policy` becomes `firewall/shaping-policy`
pub fn cmdb_path(schema_name: &str) -> String {
    match schema_name.rsplit_once('.') {
        Some((group, object)) => format!("{}/{}", group, object),
        None => schema_name.to_string(),
    }
}
