//! Provider configuration with environment variable fallbacks

use crate::api::{self, ApiError, ClientConfig};
use crate::error::{Error, Result};
use fortimap::{LocalRecord, Value};

pub const ENV_HOSTNAME: &str = "FORTIOS_ACCESS_HOSTNAME";
pub const ENV_TOKEN: &str = "FORTIOS_ACCESS_TOKEN";
pub const ENV_INSECURE: &str = "FORTIOS_INSECURE";
pub const ENV_VDOM: &str = "FORTIOS_VDOM";
pub const ENV_IMPORT_TABLE: &str = "FORTIOS_IMPORT_TABLE";

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub hostname: String,
    pub token: String,
    pub insecure: bool,
    /// Default VDOM for every request; resources may override it with `vdomparam`
    pub vdom: Option<String>,
    /// Whether `import` pulls every table the device reports
    pub import_table: bool,
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    pub fn new(hostname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: token.into(),
            insecure: false,
            vdom: None,
            import_table: true,
            timeout_seconds: ClientConfig::default().timeout_seconds,
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn vdom(mut self, vdom: impl Into<String>) -> Self {
        self.vdom = Some(vdom.into());
        self
    }

    pub fn import_table(mut self, import_table: bool) -> Self {
        self.import_table = import_table;
        self
    }

    /// Build from the provider block, falling back to the environment
    pub fn from_local(config: &LocalRecord) -> Result<Self> {
        let hostname = string_setting(config, "hostname", ENV_HOSTNAME).ok_or_else(|| {
            Error::Config(format!(
                "hostname is required (set in provider config or {} env var)",
                ENV_HOSTNAME
            ))
        })?;

        let token = string_setting(config, "token", ENV_TOKEN).ok_or_else(|| {
            Error::Config(format!(
                "token is required (set in provider config or {} env var)",
                ENV_TOKEN
            ))
        })?;

        let insecure = match bool_setting(config, "insecure", ENV_INSECURE)? {
            Some(insecure) => insecure,
            None => false,
        };

        // anything other than an explicit "false" keeps table import on
        let import_table = !matches!(
            string_setting(config, "import_table", ENV_IMPORT_TABLE).as_deref(),
            Some("false")
        );

        let timeout_seconds = match config.get("timeout_seconds") {
            Some(Value::Int(secs)) if *secs > 0 => *secs as u64,
            Some(Value::Int(secs)) => {
                return Err(Error::Config(format!(
                    "timeout_seconds must be positive, got {}",
                    secs
                )))
            }
            _ => ClientConfig::default().timeout_seconds,
        };

        let config = Self {
            hostname,
            token,
            insecure,
            vdom: string_setting(config, "vdom", ENV_VDOM),
            import_table,
            timeout_seconds,
        };
        tracing::debug!(
            "Provider configured for {} (vdom: {:?}, import_table: {})",
            config.hostname,
            config.vdom,
            config.import_table
        );
        Ok(config)
    }

    pub fn client(&self) -> std::result::Result<api::Client, ApiError> {
        api::Client::with_config(
            &self.hostname,
            &self.token,
            self.insecure,
            ClientConfig {
                timeout_seconds: self.timeout_seconds,
            },
        )
    }
}

fn string_setting(config: &LocalRecord, name: &str, env: &str) -> Option<String> {
    config
        .get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .or_else(|| std::env::var(env).ok().filter(|s| !s.is_empty()))
}

fn bool_setting(config: &LocalRecord, name: &str, env: &str) -> Result<Option<bool>> {
    match config.get(name) {
        Some(Value::Bool(b)) => return Ok(Some(*b)),
        Some(Value::Null) | None => {}
        Some(other) => {
            return Err(Error::Config(format!(
                "{} must be a bool, got {}",
                name,
                other.type_name()
            )))
        }
    }

    match std::env::var(env) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<bool>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be true or false, got {}", env, raw))),
        _ => Ok(None),
    }
}
