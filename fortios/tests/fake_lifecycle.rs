#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use fortimap::{Record, Value};
use fortios::testing::FakeCmdb;
use fortios::{FortiosProvider, ProviderConfig};
use std::sync::Arc;

fn provider(fake: Arc<FakeCmdb>, config: ProviderConfig) -> FortiosProvider {
    FortiosProvider::with_client(config, fake)
}

#[test]
fn create_read_update_cycle_keeps_state_stable() {
    let fake = Arc::new(FakeCmdb::new().with_version("v7.2.0"));
    let provider = provider(fake.clone(), ProviderConfig::new("fw.local", "t"));
    let resource = provider
        .resource("fortios_firewall_profileprotocoloptions")
        .unwrap();

    let local = Record::new()
        .with("name", "strict")
        .with("oversize_log", "enable")
        .with(
            "http",
            Record::new()
                .with("ports", vec![Value::Int(80)])
                .with("status", "enable"),
        );

    tokio_test::block_on(async {
        let mkey = resource.create(&local).await.unwrap();
        assert_eq!(mkey, "strict");

        let state = resource.read(&mkey, &local).await.unwrap().unwrap();
        assert_eq!(state, local);

        let changed = local.clone().with("comment", "tightened");
        resource.update(&mkey, &changed).await.unwrap();
        let state = resource.read(&mkey, &changed).await.unwrap().unwrap();
        assert_eq!(state.get("comment"), Some(&Value::from("tightened")));
    });
}

#[test]
fn import_pulls_nested_tables_when_enabled() {
    let fake = Arc::new(FakeCmdb::new().with_version("v7.4.0"));
    fake.put(
        "ztna/web-proxy",
        Some("portal"),
        serde_json::json!({
            "name": "portal",
            "vip": "vip-portal",
            "api-gateway": [{
                "id": 1,
                "service": "https",
                "realservers": [{"id": 1, "address": "app1", "port": "8443"}]
            }]
        }),
    );

    let imported = tokio_test::block_on(
        provider(fake.clone(), ProviderConfig::new("fw.local", "t"))
            .resource("fortios_ztna_webproxy")
            .unwrap()
            .import("portal"),
    )
    .unwrap();

    let gateways = imported.get("api_gateway").and_then(Value::as_list).unwrap();
    let servers = gateways[0]
        .as_record()
        .and_then(|g| g.get("realservers"))
        .and_then(Value::as_list)
        .unwrap();
    assert_eq!(
        servers[0].as_record().unwrap().get("port"),
        Some(&Value::Int(8443))
    );

    let scalars_only = tokio_test::block_on(
        provider(
            fake,
            ProviderConfig::new("fw.local", "t").import_table(false),
        )
        .resource("fortios_ztna_webproxy")
        .unwrap()
        .import("portal"),
    )
    .unwrap();
    assert_eq!(
        scalars_only,
        Record::new().with("name", "portal").with("vip", "vip-portal")
    );
}

#[test]
fn create_then_delete_removes_object() {
    let fake = Arc::new(FakeCmdb::new());
    let provider = provider(fake.clone(), ProviderConfig::new("fw.local", "t"));
    let resource = provider.resource("fortios_report_layout").unwrap();

    let local = Record::new()
        .with("name", "weekly")
        .with("style_theme", "default-report");

    tokio_test::block_on(async {
        let mkey = resource.create(&local).await.unwrap();
        assert!(fake.get("report/layout", Some(mkey.as_str())).is_some());

        resource.delete(&mkey, &local).await.unwrap();
        assert!(fake.get("report/layout", Some(mkey.as_str())).is_none());
        assert!(resource.read(&mkey, &local).await.unwrap().is_none());
    });
}
