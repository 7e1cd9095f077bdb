//! `system ike`, a singleton holding global IKE settings

use super::{cached, enable_disable, int_range, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder, Version, VersionRange};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_system_ike";

/// Diffie-Hellman groups with per-group offload settings
const DH_GROUPS: [u32; 17] = [1, 2, 5, 14, 15, 16, 17, 18, 19, 20, 21, 27, 28, 29, 30, 31, 32];

fn dh_group(group: u32) -> FieldBuilder {
    FieldBuilder::record(
        &format!("dh_group_{}", group),
        vec![
            one_of("mode", &["software", "hardware", "global"]),
            one_of("keypair_cache", &["global", "custom"]),
            int_range("keypair_count", 0, 50000),
        ],
    )
    .available(VersionRange::since(Version::new(7, 0, 0)))
}

pub fn schema() -> Result<ObjectSchema, MapError> {
    let mut builder = SchemaBuilder::new("system.ike")
        .description("Configure IKE global attributes.")
        .singleton("SystemIke")
        .field(int_range("embryonic_limit", 50, 20000))
        .field(
            enable_disable("dh_multiprocess")
                .available(VersionRange::since(Version::new(7, 0, 0))),
        )
        .field(
            int_range("dh_worker_count", 1, 2)
                .available(VersionRange::since(Version::new(7, 0, 0))),
        )
        .field(
            one_of("dh_mode", &["software", "hardware"])
                .available(VersionRange::since(Version::new(7, 0, 0))),
        )
        .field(
            enable_disable("dh_keypair_cache")
                .available(VersionRange::since(Version::new(7, 0, 0))),
        )
        .field(
            int_range("dh_keypair_count", 0, 50000)
                .available(VersionRange::since(Version::new(7, 0, 0))),
        )
        .field(
            int_range("dh_keypair_throttle", 0, 1)
                .available(VersionRange::since(Version::new(7, 0, 0))),
        );

    for group in DH_GROUPS {
        builder = builder.field(dh_group(group));
    }
    builder.build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use fortimap::{flatten, MergeMode, Record, Value};
    use serde_json::json;

    #[test]
    fn dh_groups_are_nested_records() {
        let schema = schema().unwrap();
        let remote = Record::try_from(json!({
            "embryonic-limit": 1000,
            "dh-group-14": {"mode": "hardware", "keypair-cache": "global", "keypair-count": 0}
        }))
        .unwrap();

        let local = flatten(&remote, &schema, MergeMode::ImportAll, None).unwrap();
        assert_eq!(local.get("embryonic_limit"), Some(&Value::Int(1000)));
        assert_eq!(
            local.get("dh_group_14"),
            Some(&Value::from(
                Record::new()
                    .with("mode", "hardware")
                    .with("keypair_cache", "global")
                    .with("keypair_count", 0)
            ))
        );
    }
}
