//! Read-only lookups of CMDB objects

use crate::api::CmdbClient;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::resource::ResourceDefinition;
use fortimap::{FieldCodec, Flattener, LocalRecord, NumericPolicy, SortMode};
use std::sync::Arc;

/// Data sources import everything the device reports, there is no prior state to merge with
pub struct CmdbDataSource {
    definition: &'static ResourceDefinition,
    client: Arc<dyn CmdbClient>,
    config: Arc<ProviderConfig>,
}

impl CmdbDataSource {
    pub fn new(
        definition: &'static ResourceDefinition,
        client: Arc<dyn CmdbClient>,
        config: Arc<ProviderConfig>,
    ) -> Self {
        Self {
            definition,
            client,
            config,
        }
    }

    pub fn definition(&self) -> &'static ResourceDefinition {
        self.definition
    }

    /// `mkey` is ignored for singleton objects
    pub async fn read(&self, mkey: Option<&str>, vdomparam: Option<&str>) -> Result<LocalRecord> {
        let schema = &self.definition.schema;
        let mkey = if schema.is_singleton() {
            None
        } else {
            Some(mkey.ok_or_else(|| Error::MissingMkey(self.definition.type_name.to_string()))?)
        };
        let vdom = vdomparam.or(self.config.vdom.as_deref());

        tracing::debug!("Reading data source {} {:?}", self.definition.type_name, mkey);

        let remote = self
            .client
            .read(&self.definition.path(), mkey, vdom)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} {}",
                    self.definition.type_name,
                    mkey.unwrap_or_default()
                ))
            })?;

        let version = self.client.version().await;
        let mut flattener = Flattener::new(schema)
            .sort(SortMode::Off)
            .codec(FieldCodec::new(NumericPolicy::ParseStrings));
        if let Some(version) = version.as_deref() {
            flattener = flattener.version(version);
        }
        Ok(flattener.flatten(&remote)?)
    }
}
