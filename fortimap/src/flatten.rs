//! TreeFlattener: wire record to local record
//!
//! Walks the schema, not the payload. Wire fields the schema does not declare
//! are ignored, since the API grows fields between firmware releases. Fields
//! the payload lacks (or carries as null) are left out of the result instead
//! of being defaulted, so "unset" stays distinguishable from "empty".

use crate::codec::FieldCodec;
use crate::error::{child_path, index_path, MapError, Result};
use crate::merge::{MergeMode, TableMergePolicy};
use crate::schema::{Block, FieldShape, FieldSpec, ObjectSchema};
use crate::sort::{sort_rows, SortMode};
use crate::types::{LocalRecord, Record, RemoteRecord, Value};
use crate::version::{field_available, AvailabilityGate, VersionRangeGate};

static DEFAULT_GATE: VersionRangeGate = VersionRangeGate;

pub struct Flattener<'a> {
    schema: &'a ObjectSchema,
    merge: TableMergePolicy<'a>,
    sort: SortMode,
    codec: FieldCodec,
    version: Option<&'a str>,
    gate: &'a dyn AvailabilityGate,
}

impl<'a> Flattener<'a> {
    /// Starts in ImportAll mode with sorting off and no version gating
    pub fn new(schema: &'a ObjectSchema) -> Self {
        Self {
            schema,
            merge: TableMergePolicy::import_all(),
            sort: SortMode::Off,
            codec: FieldCodec::default(),
            version: None,
            gate: &DEFAULT_GATE,
        }
    }

    /// Merge mode plus the local record known before this read
    pub fn merge(mut self, mode: MergeMode, prior: Option<&'a LocalRecord>) -> Self {
        self.merge = TableMergePolicy::new(mode, prior);
        self
    }

    pub fn sort(mut self, mode: SortMode) -> Self {
        self.sort = mode;
        self
    }

    pub fn codec(mut self, codec: FieldCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    pub fn gate(mut self, gate: &'a dyn AvailabilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn flatten(&self, remote: &RemoteRecord) -> Result<LocalRecord> {
        self.flatten_block(remote, &self.schema.block, "", self.merge.prior, true)
    }

    /// `prior` is the part of the prior local record at the same position,
    /// used to carry over sensitive values the device masks
    fn flatten_block(
        &self,
        remote: &RemoteRecord,
        block: &Block,
        parent: &str,
        prior: Option<&Record>,
        top_level: bool,
    ) -> Result<LocalRecord> {
        let mut local = Record::new();

        for field in &block.fields {
            if !field_available(self.gate, field, self.version)? {
                continue;
            }

            let path = child_path(parent, &field.local_name);

            if field.sensitive {
                // The device masks secrets; keep whatever the caller had
                if let Some(value) = prior.and_then(|p| p.get(&field.local_name)) {
                    local.insert(field.local_name.clone(), value.clone());
                }
                continue;
            }

            let wire = match remote.get(&field.wire_name) {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };

            if top_level && field.shape.is_compound() && !self.merge.should_flatten(&field.local_name)
            {
                continue;
            }

            let prior_value = prior.and_then(|p| p.get(&field.local_name));
            let value = self.flatten_value(wire, field, &path, prior_value)?;
            local.insert(field.local_name.clone(), value);
        }

        Ok(local)
    }

    fn flatten_value(
        &self,
        wire: &Value,
        field: &FieldSpec,
        path: &str,
        prior: Option<&Value>,
    ) -> Result<Value> {
        match &field.shape {
            FieldShape::Scalar(kind) => self.codec.decode(wire, *kind, path),
            FieldShape::ScalarList(kind) => {
                let items = expect_list(wire, path)?;
                let decoded = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.codec.decode(item, *kind, &index_path(path, idx)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(decoded))
            }
            FieldShape::Record(nested) => {
                let record = expect_record(wire, path)?;
                let prior = prior.and_then(Value::as_record);
                Ok(Value::Record(self.flatten_block(record, nested, path, prior, false)?))
            }
            FieldShape::Table(nested) => {
                let items = expect_list(wire, path)?;
                let prior_rows = prior.and_then(Value::as_list).unwrap_or_default();
                let mut rows = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let row_path = index_path(path, idx);
                    let record = expect_record(item, &row_path)?;
                    let prior_row = self.prior_row(record, nested, field, idx, prior_rows, &row_path);
                    rows.push(Value::Record(
                        self.flatten_block(record, nested, &row_path, prior_row, false)?,
                    ));
                }
                if let Some(key) = &field.sort_key {
                    if self.sort != SortMode::Off {
                        tracing::trace!("Sorting table {} by {}", path, key);
                        sort_rows(&mut rows, key, self.sort);
                    }
                }
                Ok(Value::List(rows))
            }
        }
    }

    /// The prior row a wire row corresponds to
    ///
    /// Rows are matched on the sort key when the table has one, since the
    /// device may return them in another order. Otherwise by position.
    fn prior_row<'p>(
        &self,
        row: &RemoteRecord,
        nested: &Block,
        field: &FieldSpec,
        idx: usize,
        prior_rows: &'p [Value],
        row_path: &str,
    ) -> Option<&'p Record> {
        let Some(key) = &field.sort_key else {
            return prior_rows.get(idx).and_then(Value::as_record);
        };
        let key_field = nested.field(key)?;
        let FieldShape::Scalar(kind) = &key_field.shape else {
            return None;
        };
        let wire_key = row.get(&key_field.wire_name)?;
        let local_key = self
            .codec
            .decode(wire_key, *kind, &child_path(row_path, key))
            .ok()?;
        prior_rows
            .iter()
            .filter_map(Value::as_record)
            .find(|prior| prior.get(key) == Some(&local_key))
    }
}

fn expect_list<'v>(wire: &'v Value, path: &str) -> Result<&'v [Value]> {
    wire.as_list()
        .ok_or_else(|| MapError::shape_mismatch(path, "list", wire.type_name()))
}

fn expect_record<'v>(wire: &'v Value, path: &str) -> Result<&'v Record> {
    wire.as_record()
        .ok_or_else(|| MapError::shape_mismatch(path, "record", wire.type_name()))
}

/// One-shot flatten with default codec, no sorting and no version gating
pub fn flatten(
    remote: &RemoteRecord,
    schema: &ObjectSchema,
    mode: MergeMode,
    prior: Option<&LocalRecord>,
) -> Result<LocalRecord> {
    Flattener::new(schema).merge(mode, prior).flatten(remote)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::codec::NumericPolicy;
    use crate::schema::{FieldBuilder, SchemaBuilder};
    use crate::version::{Version, VersionRange};
    use serde_json::json;

    fn ike_schema() -> ObjectSchema {
        SchemaBuilder::new("system.ike")
            .singleton("SystemIke")
            .field(FieldBuilder::int("embryonic_limit"))
            .field(FieldBuilder::record(
                "dh_group_1",
                vec![
                    FieldBuilder::string("mode"),
                    FieldBuilder::int("keypair_cache"),
                    FieldBuilder::int("keypair_count"),
                ],
            ))
            .build()
            .unwrap()
    }

    fn remote(value: serde_json::Value) -> RemoteRecord {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn absent_fields_are_omitted_not_defaulted() {
        let schema = SchemaBuilder::new("firewall.shaping-policy")
            .mkey("name")
            .field(FieldBuilder::string("name"))
            .field(FieldBuilder::string("status"))
            .build()
            .unwrap();

        let local = flatten(&remote(json!({"name": "p1"})), &schema, MergeMode::ImportAll, None)
            .unwrap();

        assert_eq!(local, Record::new().with("name", "p1"));
        assert!(!local.contains_key("status"));
    }

    #[test]
    fn nested_records_use_local_names() {
        let wire = remote(json!({
            "embryonic-limit": 1000.0,
            "dh-group-1": {"mode": "software", "keypair-cache": "global", "keypair-count": 0},
            "q_origin_key": "ignored"
        }));

        let err = flatten(&wire, &ike_schema(), MergeMode::ImportAll, None).unwrap_err();
        assert_eq!(err.path(), Some("dh_group_1.keypair_cache"));

        let wire = remote(json!({
            "embryonic-limit": 1000.0,
            "dh-group-1": {"mode": "software", "keypair-cache": 0, "keypair-count": 2.0}
        }));
        let local = flatten(&wire, &ike_schema(), MergeMode::ImportAll, None).unwrap();

        assert_eq!(local.get("embryonic_limit"), Some(&Value::Int(1000)));
        let group = local.get("dh_group_1").and_then(Value::as_record).unwrap();
        assert_eq!(group.get("mode"), Some(&Value::from("software")));
        assert_eq!(group.get("keypair_count"), Some(&Value::Int(2)));
    }

    #[test]
    fn scalar_lists_keep_empty_and_drop_null() {
        let schema = SchemaBuilder::new("x")
            .singleton("X")
            .field(FieldBuilder::string_list("members"))
            .field(FieldBuilder::string_list("groups"))
            .build()
            .unwrap();

        let local = flatten(
            &remote(json!({"members": [], "groups": null})),
            &schema,
            MergeMode::ImportAll,
            None,
        )
        .unwrap();

        assert_eq!(local.get("members"), Some(&Value::List(vec![])));
        assert!(!local.contains_key("groups"));
    }

    #[test]
    fn table_given_as_object_is_a_shape_mismatch() {
        let schema = SchemaBuilder::new("firewall.shaping-policy")
            .mkey("name")
            .field(FieldBuilder::string("name"))
            .field(FieldBuilder::table("srcintf", vec![FieldBuilder::string("name")]))
            .build()
            .unwrap();

        let err = flatten(
            &remote(json!({"srcintf": {"name": "port1"}})),
            &schema,
            MergeMode::ImportAll,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MapError::ShapeMismatch {
                path: "srcintf".to_string(),
                expected: "list".to_string(),
                actual: "record".to_string(),
            }
        );

        let err = flatten(
            &remote(json!({"srcintf": ["port1"]})),
            &schema,
            MergeMode::ImportAll,
            None,
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("srcintf[0]"));
    }

    #[test]
    fn selective_refresh_skips_unmanaged_compound_fields() {
        let wire = remote(json!({
            "embryonic-limit": 500,
            "dh-group-1": {"mode": "software"}
        }));
        let prior = Record::new().with("embryonic_limit", 1000);

        let local = flatten(&wire, &ike_schema(), MergeMode::SelectiveRefresh, Some(&prior))
            .unwrap();

        // scalars are always refreshed
        assert_eq!(local.get("embryonic_limit"), Some(&Value::Int(500)));
        assert!(!local.contains_key("dh_group_1"));

        let prior = prior.with("dh_group_1", Record::new().with("mode", "hardware"));
        let local = flatten(&wire, &ike_schema(), MergeMode::SelectiveRefresh, Some(&prior))
            .unwrap();
        assert!(local.contains_key("dh_group_1"));
    }

    #[test]
    fn sensitive_fields_keep_prior_value() {
        let schema = SchemaBuilder::new("vpn.ipsec.phase1-interface")
            .mkey("name")
            .field(FieldBuilder::string("name"))
            .field(FieldBuilder::string("psksecret").sensitive())
            .build()
            .unwrap();
        let wire = remote(json!({"name": "vpn1", "psksecret": "ENC XXXX"}));

        let without_prior = flatten(&wire, &schema, MergeMode::ImportAll, None).unwrap();
        assert!(!without_prior.contains_key("psksecret"));

        let prior = Record::new().with("psksecret", "s3cret");
        let with_prior = flatten(&wire, &schema, MergeMode::ImportAll, Some(&prior)).unwrap();
        assert_eq!(with_prior.get("psksecret"), Some(&Value::from("s3cret")));
    }

    #[test]
    fn nested_sensitive_fields_keep_prior_value() {
        let schema = SchemaBuilder::new("user.radius")
            .mkey("name")
            .field(FieldBuilder::string("name"))
            .field(FieldBuilder::record(
                "auth",
                vec![
                    FieldBuilder::string("user"),
                    FieldBuilder::string("password").sensitive(),
                ],
            ))
            .field(
                FieldBuilder::table(
                    "server",
                    vec![
                        FieldBuilder::string("name"),
                        FieldBuilder::string("secret").sensitive(),
                    ],
                )
                .sort_key("name"),
            )
            .field(FieldBuilder::table(
                "peer",
                vec![
                    FieldBuilder::int("id"),
                    FieldBuilder::string("key").sensitive(),
                ],
            ))
            .build()
            .unwrap();
        let wire = remote(json!({
            "name": "r1",
            "auth": {"user": "u", "password": "ENC XXX"},
            "server": [
                {"name": "srv2", "secret": "ENC XXX"},
                {"name": "srv1", "secret": "ENC XXX"},
                {"name": "srv3", "secret": "ENC XXX"}
            ],
            "peer": [{"id": 1, "key": "ENC XXX"}]
        }));
        let prior = Record::new()
            .with("name", "r1")
            .with("auth", Record::new().with("user", "u").with("password", "s3cret"))
            .with(
                "server",
                Value::List(vec![
                    Value::from(Record::new().with("name", "srv1").with("secret", "one")),
                    Value::from(Record::new().with("name", "srv2").with("secret", "two")),
                ]),
            )
            .with(
                "peer",
                Value::List(vec![Value::from(
                    Record::new().with("id", 1).with("key", "k1"),
                )]),
            );

        let local = flatten(&wire, &schema, MergeMode::SelectiveRefresh, Some(&prior)).unwrap();

        let auth = local.get("auth").and_then(Value::as_record).unwrap();
        assert_eq!(auth.get("user"), Some(&Value::from("u")));
        assert_eq!(auth.get("password"), Some(&Value::from("s3cret")));

        // rows come back reordered; the secret follows the row's key
        let servers = local.get("server").and_then(Value::as_list).unwrap();
        let secret = |idx: usize| servers[idx].as_record().unwrap().get("secret").cloned();
        assert_eq!(secret(0), Some(Value::from("two")));
        assert_eq!(secret(1), Some(Value::from("one")));
        assert_eq!(secret(2), None);

        let peers = local.get("peer").and_then(Value::as_list).unwrap();
        assert_eq!(
            peers[0].as_record().unwrap().get("key"),
            Some(&Value::from("k1"))
        );
    }

    #[test]
    fn nested_tables_sort_when_enabled() {
        let schema = SchemaBuilder::new("router.multicast")
            .singleton("RouterMulticast")
            .field(
                FieldBuilder::table(
                    "interface",
                    vec![
                        FieldBuilder::string("name"),
                        FieldBuilder::table("join_group", vec![FieldBuilder::string("address")])
                            .sort_key("address"),
                    ],
                )
                .sort_key("name"),
            )
            .build()
            .unwrap();
        let wire = remote(json!({"interface": [
            {"name": "port10", "join-group": [{"address": "239.1.1.2"}, {"address": "239.1.1.1"}]},
            {"name": "port9"}
        ]}));

        let local = Flattener::new(&schema)
            .sort(SortMode::Natural)
            .flatten(&wire)
            .unwrap();

        let rows = local.get("interface").and_then(Value::as_list).unwrap();
        let first = rows[0].as_record().unwrap();
        assert_eq!(first.get("name"), Some(&Value::from("port9")));
        let second = rows[1].as_record().unwrap();
        let groups = second.get("join_group").and_then(Value::as_list).unwrap();
        assert_eq!(
            groups[0].as_record().unwrap().get("address"),
            Some(&Value::from("239.1.1.1"))
        );
    }

    #[test]
    fn unavailable_fields_are_skipped_for_version() {
        let schema = SchemaBuilder::new("x")
            .singleton("X")
            .field(FieldBuilder::string("status"))
            .field(
                FieldBuilder::string("sslvpn_mode")
                    .available(VersionRange::since(Version::new(7, 2, 0))),
            )
            .build()
            .unwrap();
        let wire = remote(json!({"status": "enable", "sslvpn-mode": "web"}));

        let old = Flattener::new(&schema).version("v7.0.5").flatten(&wire).unwrap();
        assert!(!old.contains_key("sslvpn_mode"));

        let new = Flattener::new(&schema).version("v7.2.0").flatten(&wire).unwrap();
        assert!(new.contains_key("sslvpn_mode"));
    }

    #[test]
    fn codec_policy_is_configurable() {
        let wire = remote(json!({"embryonic-limit": "1000"}));
        assert!(flatten(&wire, &ike_schema(), MergeMode::ImportAll, None).is_err());

        let local = Flattener::new(&ike_schema())
            .codec(FieldCodec::new(NumericPolicy::ParseStrings))
            .flatten(&wire)
            .unwrap();
        assert_eq!(local.get("embryonic_limit"), Some(&Value::Int(1000)));
    }
}
