use crate::api::ApiError;
use fortimap::MapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid provider configuration: {0}")]
    Config(String),

    #[error("Provider not configured")]
    NotConfigured,

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    #[error("Cannot determine mkey for {0}")]
    MissingMkey(String),

    #[error("Object {0} not found")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
