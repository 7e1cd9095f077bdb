//! `ztna web-proxy`, only present on newer firmware

use super::{cached, enable_disable, int_range, max_len, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder, Version, VersionRange};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_ztna_webproxy";

const SINCE: Version = Version::new(7, 2, 0);

fn quic() -> FieldBuilder {
    FieldBuilder::record(
        "quic",
        vec![
            int_range("max_idle_timeout", 1, 60000),
            int_range("max_udp_payload_size", 1200, 1500),
            int_range("active_connection_id_limit", 1, 8),
            int_range("ack_delay_exponent", 1, 20),
            int_range("max_ack_delay", 1, 16383),
            int_range("max_datagram_frame_size", 1, 1500),
            enable_disable("active_migration"),
            enable_disable("grease_quic_bit"),
        ],
    )
}

fn realservers() -> FieldBuilder {
    FieldBuilder::table(
        "realservers",
        vec![
            int_range("id", 0, 4294967295),
            one_of("addr_type", &["ip", "fqdn"]),
            FieldBuilder::string("address").validator(max_len(79)),
            FieldBuilder::string("ip"),
            int_range("port", 1, 65535),
            one_of("status", &["active", "standby", "disable"]),
            int_range("weight", 1, 255),
            FieldBuilder::string("http_host").validator(max_len(63)),
            enable_disable("health_check"),
            one_of("health_check_proto", &["ping", "http", "tcp-connect"]),
            int_range("holddown_interval", 0, 65535),
            enable_disable("translate_host"),
            enable_disable("verify_cert"),
        ],
    )
    .sort_key("id")
}

fn ssl_cipher_suites() -> FieldBuilder {
    FieldBuilder::table(
        "ssl_cipher_suites",
        vec![
            int_range("priority", 0, 4294967295),
            FieldBuilder::string("cipher"),
            FieldBuilder::string("versions"),
        ],
    )
    .sort_key("priority")
}

/// Routing rules; the IPv4 and IPv6 tables share one layout
fn api_gateway(local_name: &str) -> FieldBuilder {
    FieldBuilder::table(
        local_name,
        vec![
            int_range("id", 0, 4294967295),
            FieldBuilder::string("url_map").validator(max_len(511)),
            one_of("service", &["http", "https"]),
            one_of(
                "ldb_method",
                &["static", "round-robin", "weighted", "first-alive", "http-host"],
            ),
            one_of("url_map_type", &["sub-string", "wildcard", "regex"]),
            enable_disable("h2_support"),
            enable_disable("h3_support"),
            quic(),
            realservers(),
            one_of("persistence", &["none", "http-cookie"]),
            enable_disable("http_cookie_domain_from_host"),
            FieldBuilder::string("http_cookie_domain").validator(max_len(35)),
            FieldBuilder::string("http_cookie_path").validator(max_len(35)),
            int_range("http_cookie_generation", 0, 4294967295),
            int_range("http_cookie_age", 0, 525600),
            one_of("http_cookie_share", &["disable", "same-ip"]),
            enable_disable("https_cookie_secure"),
            one_of(
                "ssl_dh_bits",
                &["768", "1024", "1536", "2048", "3072", "4096"],
            ),
            one_of("ssl_algorithm", &["high", "medium", "low"]),
            ssl_cipher_suites(),
            one_of("ssl_min_version", &["tls-1.0", "tls-1.1", "tls-1.2", "tls-1.3"]),
            one_of("ssl_max_version", &["tls-1.0", "tls-1.1", "tls-1.2", "tls-1.3"]),
            enable_disable("ssl_renegotiation"),
        ],
    )
    .sort_key("id")
}

pub fn schema() -> Result<ObjectSchema, MapError> {
    let gated = |field: FieldBuilder| field.available(VersionRange::since(SINCE));

    SchemaBuilder::new("ztna.web-proxy")
        .description("Configure ZTNA web-proxy.")
        .mkey("name")
        .field(FieldBuilder::string("name").required().validator(max_len(79)))
        .field(gated(FieldBuilder::string("vip").validator(max_len(79))))
        .field(gated(FieldBuilder::string("host").validator(max_len(79))))
        .field(gated(
            FieldBuilder::string("decrypted_traffic_mirror").validator(max_len(35)),
        ))
        .field(gated(enable_disable("log_blocked_traffic")))
        .field(gated(enable_disable("auth_portal")))
        .field(gated(
            FieldBuilder::string("auth_virtual_host").validator(max_len(79)),
        ))
        .field(gated(FieldBuilder::string("vip6").validator(max_len(79))))
        .field(gated(enable_disable("svr_pool_multiplex")))
        .field(gated(int_range("svr_pool_ttl", 0, 2147483647)))
        .field(gated(int_range("svr_pool_server_max_request", 0, 2147483647)))
        .field(gated(int_range(
            "svr_pool_server_max_concurrent_request",
            0,
            2147483647,
        )))
        .field(gated(api_gateway("api_gateway")))
        .field(gated(api_gateway("api_gateway6")))
        .build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}
