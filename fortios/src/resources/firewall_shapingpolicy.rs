//! `firewall shaping-policy`

use super::{cached, enable_disable, id_table, int_range, max_len, name_table, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_firewall_shapingpolicy";

pub fn schema() -> Result<ObjectSchema, MapError> {
    SchemaBuilder::new("firewall.shaping-policy")
        .description("Configure shaping policies.")
        .mkey("fosid")
        .field(
            int_range("fosid", 0, 4294967294)
                .wire_name("id")
                .required()
                .description("Shaping policy ID."),
        )
        .field(FieldBuilder::string("uuid").computed())
        .field(FieldBuilder::string("name").validator(max_len(35)))
        .field(FieldBuilder::string("comment").validator(max_len(1023)))
        .field(enable_disable("status").default("enable"))
        .field(one_of("ip_version", &["4", "6"]).default("4"))
        .field(FieldBuilder::string("traffic_type"))
        .field(name_table("srcintf"))
        .field(name_table("dstintf"))
        .field(name_table("srcaddr"))
        .field(name_table("dstaddr"))
        .field(name_table("srcaddr6"))
        .field(name_table("dstaddr6"))
        .field(enable_disable("internet_service"))
        .field(id_table("internet_service_id"))
        .field(name_table("internet_service_name"))
        .field(name_table("service"))
        .field(FieldBuilder::string("schedule").validator(max_len(35)))
        .field(name_table("users"))
        .field(name_table("groups"))
        .field(id_table("application"))
        .field(id_table("app_category"))
        .field(id_table("url_category"))
        .field(FieldBuilder::string("traffic_shaper").validator(max_len(35)))
        .field(FieldBuilder::string("traffic_shaper_reverse").validator(max_len(35)))
        .field(FieldBuilder::string("per_ip_shaper").validator(max_len(35)))
        .field(int_range("class_id", 0, 4294967295))
        .field(enable_disable("diffserv_forward"))
        .field(enable_disable("diffserv_reverse"))
        .field(FieldBuilder::string("diffservcode_forward"))
        .field(FieldBuilder::string("diffservcode_rev"))
        .field(FieldBuilder::string("tos"))
        .field(FieldBuilder::string("tos_mask"))
        .field(enable_disable("tos_negate"))
        .build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}
