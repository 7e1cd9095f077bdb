//! Response handling for the FortiOS REST API
//!
//! Every CMDB call answers with the same envelope:
//! `{"http_method":"GET","results":[...],"vdom":"root","status":"success",
//! "http_status":200,"version":"v7.2.0","build":1157}`.
//! Writes add `mkey`, failures add `error` and sometimes `cli_error`.

use super::ApiError;
use fortimap::{RemoteRecord, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CmdbEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
    /// A list for table objects, a bare object for singletons
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub mkey: Option<Value>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub cli_error: Option<String>,
}

impl CmdbEnvelope {
    /// The single object a read by mkey returns
    pub fn first_result(&self) -> Result<Option<RemoteRecord>, ApiError> {
        match &self.results {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Record(record)) => Ok(Some(record.clone())),
            Some(Value::List(items)) => match items.first() {
                None => Ok(None),
                Some(Value::Record(record)) => Ok(Some(record.clone())),
                Some(other) => Err(ApiError::ParseError(format!(
                    "expected object in results, got {}",
                    other.type_name()
                ))),
            },
            Some(other) => Err(ApiError::ParseError(format!(
                "expected list or object in results, got {}",
                other.type_name()
            ))),
        }
    }

    /// Identifier the device assigned, as a string
    pub fn mkey_string(&self) -> Option<String> {
        match self.mkey.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            _ => None,
        }
    }
}

pub struct FortiosResponseHandler;

impl FortiosResponseHandler {
    pub async fn extract_envelope(response: reqwest::Response) -> Result<CmdbEnvelope, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        if status.is_success() {
            let envelope: CmdbEnvelope = serde_json::from_str(&text).map_err(|e| {
                tracing::error!("Failed to parse response: {}, body: {}", e, text);
                ApiError::ParseError(format!("Failed to parse response: {}", e))
            })?;

            // Some firmware reports failures with HTTP 200 and status "error"
            if envelope.status.as_deref() == Some("error") {
                return Err(Self::error_from(
                    envelope.http_status.unwrap_or(status.as_u16()),
                    &text,
                    Some(envelope),
                ));
            }
            Ok(envelope)
        } else {
            let envelope = serde_json::from_str::<CmdbEnvelope>(&text).ok();
            Err(Self::error_from(status.as_u16(), &text, envelope))
        }
    }

    fn error_from(status: u16, text: &str, envelope: Option<CmdbEnvelope>) -> ApiError {
        if status == 401 || status == 403 {
            return ApiError::AuthError;
        }

        let (code, cli_error) = match envelope {
            Some(env) => (env.error, env.cli_error),
            None => (None, None),
        };

        if status == 404 {
            return ApiError::NotFound(cli_error.unwrap_or_else(|| text.to_string()));
        }

        let message = match (cli_error, code) {
            (Some(cli), _) => cli,
            (None, Some(code)) => describe_error_code(code).to_string(),
            (None, None) => text.to_string(),
        };

        tracing::error!("API error response (HTTP {}): {}", status, message);
        ApiError::ApiError {
            status,
            message,
            code,
        }
    }
}

/// Human readable text for the common FortiOS CLI error codes
pub fn describe_error_code(code: i64) -> &'static str {
    match code {
        -1 => "Invalid length of value",
        -2 => "Index out of range",
        -3 => "Entry not found",
        -4 => "Maximum number of entries has been reached",
        -5 => "A duplicate entry already exists",
        -6 => "Failed memory allocation",
        -7 => "Value conflicts with system settings",
        -8 => "Invalid IP Address",
        -9 => "Invalid IP Netmask",
        -10 => "Invalid gateway address",
        -15 => "Entry is used",
        -23 => "Entry is used by other entries",
        -651 => "Invalid value",
        _ => "Unknown error",
    }
}
