//! `router multicast`, a singleton with per-interface PIM and IGMP settings

use super::{cached, enable_disable, int_range, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_router_multicast";

fn igmp() -> FieldBuilder {
    FieldBuilder::record(
        "igmp",
        vec![
            FieldBuilder::string("access_group"),
            one_of("version", &["3", "2", "1"]),
            int_range("query_interval", 1, 65535),
            int_range("query_max_response_time", 1, 25),
            int_range("last_member_query_interval", 1, 65535),
            int_range("last_member_query_count", 2, 7),
            enable_disable("router_alert_check"),
            FieldBuilder::string("immediate_leave_group"),
        ],
    )
}

fn interface() -> FieldBuilder {
    FieldBuilder::table(
        "interface",
        vec![
            FieldBuilder::string("name"),
            int_range("ttl_threshold", 1, 255),
            one_of("pim_mode", &["sparse-mode", "dense-mode"]),
            enable_disable("passive"),
            enable_disable("bfd"),
            FieldBuilder::string("neighbour_filter"),
            int_range("hello_interval", 1, 65535),
            int_range("hello_holdtime", 1, 65535),
            int_range("dr_priority", 1, 4294967295),
            enable_disable("rp_candidate"),
            FieldBuilder::string("rp_candidate_group"),
            FieldBuilder::table(
                "join_group",
                vec![FieldBuilder::string("address")],
            )
            .sort_key("address"),
            igmp(),
        ],
    )
    .sort_key("name")
}

fn pim_sm_global() -> FieldBuilder {
    FieldBuilder::record(
        "pim_sm_global",
        vec![
            int_range("message_interval", 1, 65535),
            int_range("join_prune_holdtime", 1, 65535),
            FieldBuilder::string("accept_register_list"),
            enable_disable("accept_source_list"),
            enable_disable("bsr_candidate"),
            FieldBuilder::string("bsr_interface"),
            int_range("bsr_priority", 0, 255),
            int_range("bsr_hash", 0, 32),
            enable_disable("bsr_allow_quick_refresh"),
            enable_disable("spt_threshold"),
            FieldBuilder::string("spt_threshold_group"),
            int_range("register_rate_limit", 0, 65535),
            FieldBuilder::string("register_source"),
            FieldBuilder::table(
                "rp_address",
                vec![
                    FieldBuilder::int("id"),
                    FieldBuilder::string("ip_address"),
                    FieldBuilder::string("group"),
                ],
            )
            .sort_key("id"),
        ],
    )
}

pub fn schema() -> Result<ObjectSchema, MapError> {
    SchemaBuilder::new("router.multicast")
        .description("Configure router multicast.")
        .singleton("RouterMulticast")
        .field(int_range("route_threshold", 1, 2147483647))
        .field(int_range("route_limit", 1, 2147483647))
        .field(enable_disable("multicast_routing"))
        .field(pim_sm_global())
        .field(interface())
        .build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}
