//! End-to-end behaviour of flatten and expand over a realistic object schema

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use fortimap::sort::normalize;
use fortimap::{
    expand, flatten, Expander, FieldBuilder, FieldCodec, Flattener, MapError, MergeMode,
    ObjectSchema, Record, SchemaBuilder, ScalarKind, SortMode, Value,
};
use serde_json::json;

fn shaping_policy() -> ObjectSchema {
    SchemaBuilder::new("firewall.shaping-policy")
        .mkey("fosid")
        .field(FieldBuilder::int("fosid").wire_name("id").required())
        .field(FieldBuilder::string("name"))
        .field(FieldBuilder::string("status").default("enable"))
        .field(FieldBuilder::table("srcintf", vec![FieldBuilder::string("name")]).sort_key("name"))
        .field(FieldBuilder::table("dstintf", vec![FieldBuilder::string("name")]).sort_key("name"))
        .field(FieldBuilder::string_list("url_category"))
        .field(FieldBuilder::record(
            "schedule_detail",
            vec![
                FieldBuilder::string("start"),
                FieldBuilder::int("repeat"),
                FieldBuilder::bool("all_day"),
            ],
        ))
        .build()
        .unwrap()
}

fn interfaces(names: &[&str]) -> Value {
    Value::List(
        names
            .iter()
            .map(|n| Value::from(Record::new().with("name", *n)))
            .collect(),
    )
}

fn wire(json: serde_json::Value) -> Record {
    Record::try_from(json).unwrap()
}

#[test]
fn expand_then_flatten_round_trips() {
    let schema = shaping_policy();
    let local = Record::new()
        .with("fosid", 7)
        .with("name", "voip")
        .with("srcintf", interfaces(&["port2", "port1"]))
        .with("url_category", vec![Value::from("1"), Value::from("22")])
        .with(
            "schedule_detail",
            Record::new()
                .with("start", "08:00")
                .with("repeat", 3)
                .with("all_day", false),
        );

    let remote = expand(&local, &schema, false).unwrap();
    let back = flatten(&remote, &schema, MergeMode::ImportAll, None).unwrap();

    assert_eq!(back, local);
}

#[test]
fn round_trip_with_dynamic_sort_compares_normalized_records() {
    let schema = shaping_policy();
    let local = Record::new()
        .with("fosid", 1)
        .with("srcintf", interfaces(&["port10", "port9"]))
        .with("dstintf", interfaces(&["wan"]));

    let remote = expand(&local, &schema, false).unwrap();
    let back = Flattener::new(&schema)
        .sort(SortMode::Natural)
        .flatten(&remote)
        .unwrap();

    assert_ne!(back, local);
    assert_eq!(back, normalize(&local, &schema, SortMode::Natural));
}

#[test]
fn round_trip_survives_json_transport() {
    let schema = shaping_policy();
    let local = Record::new()
        .with("fosid", 2)
        .with("srcintf", interfaces(&["port1"]));

    let text = serde_json::to_string(&expand(&local, &schema, false).unwrap()).unwrap();
    // the API answers with floats for numbers that were sent as ints
    let text = text.replace("\"id\":2", "\"id\":2.0");
    let remote: Record = serde_json::from_str(&text).unwrap();

    let back = flatten(&remote, &schema, MergeMode::ImportAll, None).unwrap();
    assert_eq!(back, local);
}

#[test]
fn fields_missing_remotely_stay_missing_locally() {
    let schema = shaping_policy();
    let local = flatten(
        &wire(json!({"id": 1, "name": "p1"})),
        &schema,
        MergeMode::ImportAll,
        None,
    )
    .unwrap();

    assert_eq!(local.len(), 2);
    assert!(!local.contains_key("status"));
    assert!(!local.contains_key("srcintf"));
}

#[test]
fn clear_mode_maps_present_fields_to_null() {
    let schema = shaping_policy();
    let local = Record::new()
        .with("name", "p1")
        .with("srcintf", interfaces(&["port1"]));

    let remote = expand(&local, &schema, true).unwrap();

    assert_eq!(
        remote,
        wire(json!({"name": null, "srcintf": null}))
    );
}

#[test]
fn selective_refresh_does_not_import_unmanaged_tables() {
    let schema = shaping_policy();
    let remote = wire(json!({
        "id": 1,
        "srcintf": [{"name": "port1"}],
        "dstintf": [{"name": "wan1"}, {"name": "wan2"}]
    }));
    let prior = Record::new()
        .with("fosid", 1)
        .with("srcintf", interfaces(&["port3"]));

    let local = flatten(&remote, &schema, MergeMode::SelectiveRefresh, Some(&prior)).unwrap();

    assert_eq!(local.get("srcintf"), Some(&interfaces(&["port1"])));
    assert!(!local.contains_key("dstintf"));

    let imported = flatten(&remote, &schema, MergeMode::ImportAll, Some(&prior)).unwrap();
    assert_eq!(imported.get("dstintf"), Some(&interfaces(&["wan1", "wan2"])));
}

#[test]
fn integral_floats_decode_and_fractions_fail() {
    let codec = FieldCodec::default();
    assert_eq!(
        codec.decode(&Value::Float(2.0), ScalarKind::Int, "repeat").unwrap(),
        Value::Int(2)
    );

    let err = flatten(
        &wire(json!({"id": 2.5})),
        &shaping_policy(),
        MergeMode::ImportAll,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, MapError::TypeMismatch { ref path, .. } if path == "fosid"));
}

#[test]
fn table_order_is_preserved_both_ways() {
    let schema = shaping_policy();
    let remote = wire(json!({"srcintf": [{"name": "port2"}, {"name": "port1"}]}));

    let local = flatten(&remote, &schema, MergeMode::ImportAll, None).unwrap();
    assert_eq!(local.get("srcintf"), Some(&interfaces(&["port2", "port1"])));

    let again = Expander::new(&schema).expand(&local).unwrap();
    assert_eq!(again, remote);
}

#[test]
fn errors_leave_no_partial_result() {
    let schema = shaping_policy();
    let remote = wire(json!({
        "id": 1,
        "name": "p1",
        "schedule_detail": "not-a-record",
        "schedule-detail": {"repeat": "daily"}
    }));

    let result = flatten(&remote, &schema, MergeMode::ImportAll, None);
    assert!(matches!(result, Err(MapError::TypeMismatch { ref path, .. }) if path == "schedule_detail.repeat"));
}
