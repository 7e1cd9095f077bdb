use crate::api::CmdbClient;
use crate::config::ProviderConfig;
use crate::data_source::CmdbDataSource;
use crate::error::{Error, Result};
use crate::resource::{CmdbResource, ResourceDefinition};
use crate::resources;
use fortimap::LocalRecord;
use std::sync::Arc;

pub struct FortiosProvider {
    client: Option<Arc<dyn CmdbClient>>,
    config: Option<Arc<ProviderConfig>>,
}

impl Default for FortiosProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FortiosProvider {
    pub fn new() -> Self {
        Self {
            client: None,
            config: None,
        }
    }

    /// A configured provider talking to an existing client
    pub fn with_client(config: ProviderConfig, client: Arc<dyn CmdbClient>) -> Self {
        Self {
            client: Some(client),
            config: Some(Arc::new(config)),
        }
    }

    pub fn configure(&mut self, config: ProviderConfig) -> Result<()> {
        let client = config.client()?;
        tracing::info!("Configured FortiOS provider for {}", client.base_url());

        self.client = Some(Arc::new(client));
        self.config = Some(Arc::new(config));
        Ok(())
    }

    /// Configure from the provider block, falling back to `FORTIOS_*` variables
    pub fn configure_from_local(&mut self, config: &LocalRecord) -> Result<()> {
        self.configure(ProviderConfig::from_local(config)?)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn configured(&self) -> Result<(Arc<dyn CmdbClient>, Arc<ProviderConfig>)> {
        match (&self.client, &self.config) {
            (Some(client), Some(config)) => Ok((client.clone(), config.clone())),
            _ => Err(Error::NotConfigured),
        }
    }

    fn definition(type_name: &str) -> Option<Result<&'static ResourceDefinition>> {
        resources::lookup(type_name).map(|definition| definition().map_err(Error::from))
    }

    pub fn resource(&self, type_name: &str) -> Result<CmdbResource> {
        let (client, config) = self.configured()?;
        let definition = Self::definition(type_name)
            .ok_or_else(|| Error::UnknownResource(type_name.to_string()))??;
        Ok(CmdbResource::new(definition, client, config))
    }

    pub fn data_source(&self, type_name: &str) -> Result<CmdbDataSource> {
        let (client, config) = self.configured()?;
        let definition = Self::definition(type_name)
            .ok_or_else(|| Error::UnknownDataSource(type_name.to_string()))??;
        Ok(CmdbDataSource::new(definition, client, config))
    }

    /// Every type name usable as a resource or data source
    pub fn resource_names(&self) -> Vec<&'static str> {
        resources::REGISTRY.iter().map(|(name, _)| *name).collect()
    }
}
