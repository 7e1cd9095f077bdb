//! `firewall profile-protocol-options`

use super::{cached, enable_disable, int_range, max_len, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_firewall_profileprotocoloptions";

/// Settings shared by every scanned protocol
fn protocol_fields() -> Vec<FieldBuilder> {
    vec![
        FieldBuilder::int_list("ports"),
        enable_disable("status"),
        enable_disable("inspect_all"),
        FieldBuilder::string("options"),
        int_range("oversize_limit", 1, 4095),
        int_range("uncompressed_oversize_limit", 0, 4095),
        int_range("uncompressed_nest_limit", 2, 100),
        enable_disable("scan_bzip2"),
        enable_disable("ssl_offloaded"),
    ]
}

fn http() -> FieldBuilder {
    let mut fields = protocol_fields();
    fields.extend([
        enable_disable("proxy_after_tcp_handshake"),
        int_range("comfort_interval", 1, 900),
        int_range("comfort_amount", 1, 65535),
        int_range("stream_based_uncompressed_limit", 0, 2147483647),
        int_range("block_page_status_code", 100, 599),
        int_range("retry_count", 0, 100),
        enable_disable("tunnel_non_http"),
        one_of("unknown_http_version", &["reject", "tunnel", "best-effort"]),
        one_of("http_policy", &["disable", "enable"]),
        enable_disable("range_block"),
        enable_disable("strip_x_forwarded_for"),
    ]);
    FieldBuilder::record("http", fields)
}

fn ftp() -> FieldBuilder {
    let mut fields = protocol_fields();
    fields.extend([
        int_range("comfort_interval", 1, 900),
        int_range("comfort_amount", 1, 65535),
        int_range("stream_based_uncompressed_limit", 0, 2147483647),
        enable_disable("explicit_ftp_tls"),
    ]);
    FieldBuilder::record("ftp", fields)
}

fn smtp() -> FieldBuilder {
    let mut fields = protocol_fields();
    fields.extend([
        enable_disable("server_busy"),
        enable_disable("proxy_after_tcp_handshake"),
    ]);
    FieldBuilder::record("smtp", fields)
}

fn dns() -> FieldBuilder {
    FieldBuilder::record(
        "dns",
        vec![FieldBuilder::int_list("ports"), enable_disable("status")],
    )
}

pub fn schema() -> Result<ObjectSchema, MapError> {
    SchemaBuilder::new("firewall.profile-protocol-options")
        .description("Configure protocol options.")
        .mkey("name")
        .field(
            FieldBuilder::string("name")
                .required()
                .validator(max_len(47)),
        )
        .field(FieldBuilder::string("comment").validator(max_len(1023)))
        .field(FieldBuilder::string("replacemsg_group").validator(max_len(35)))
        .field(enable_disable("oversize_log"))
        .field(enable_disable("switching_protocols_log"))
        .field(enable_disable("rpc_over_http"))
        .field(http())
        .field(ftp())
        .field(smtp())
        .field(dns())
        .build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use fortimap::{flatten, validate, MergeMode, Record, Value};
    use serde_json::json;

    #[test]
    fn protocol_ports_decode_as_int_lists() {
        let schema = schema().unwrap();
        let remote = Record::try_from(json!({
            "name": "default",
            "http": {"ports": [80, 8080], "status": "enable", "oversize-limit": 10},
            "dns": {"ports": [53], "status": "enable"}
        }))
        .unwrap();

        let local = flatten(&remote, &schema, MergeMode::ImportAll, None).unwrap();
        let http = local.get("http").and_then(Value::as_record).unwrap();
        assert_eq!(
            http.get("ports"),
            Some(&Value::List(vec![Value::Int(80), Value::Int(8080)]))
        );
        assert_eq!(http.get("oversize_limit"), Some(&Value::Int(10)));
    }

    #[test]
    fn nested_validators_report_full_path() {
        let schema = schema().unwrap();
        let local = Record::new()
            .with("name", "strict")
            .with("ftp", Record::new().with("oversize_limit", 9000));

        let err = validate(&local, &schema).unwrap_err();
        assert_eq!(err.path(), Some("ftp.oversize_limit"));
    }
}
