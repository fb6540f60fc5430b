//! Importing accounts from YAML configuration

mod common;

use common::{Account, Harness};
use ha_config_entries::ConfigEntrySource;
use ha_data_entry_flow::FlowResultType;
use ha_mosoblgaz::{async_setup, SetupError, DOMAIN};
use serde_json::json;
use tokio_test::assert_ok;

fn yaml(content: &str) -> serde_yaml::Value {
    serde_yaml::from_str(content).unwrap()
}

#[tokio::test]
async fn test_accounts_imported_once() {
    let harness = Harness::new(Account::Contracts(vec!["C1"]));
    let config = yaml(
        r#"
mosoblgaz:
  - username: alice
    password: one
  - username: bob
    password: two
  - username: alice
    password: again
"#,
    );

    let results = async_setup(&config, &harness.flows).await.unwrap();
    let kinds: Vec<_> = results.iter().map(|r| r.result_type).collect();
    assert_eq!(
        kinds,
        vec![
            FlowResultType::CreateEntry,
            FlowResultType::CreateEntry,
            FlowResultType::Abort
        ]
    );
    assert_eq!(results[2].reason.as_deref(), Some("already_exists"));

    let entries = harness.entries.get_by_domain(DOMAIN);
    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|e| e.source == ConfigEntrySource::Import && !e.data.contains_key("password")));
    assert_eq!(harness.clients_built(), 0);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let harness = Harness::new(Account::Contracts(vec!["C1"]));
    let config = yaml("mosoblgaz:\n  username: alice\n  password: one\n");

    assert_ok!(async_setup(&config, &harness.flows).await);
    let results = async_setup(&config, &harness.flows).await.unwrap();

    assert_eq!(results[0].reason.as_deref(), Some("already_exists"));
    assert_eq!(harness.entries.len(), 1);
    assert_eq!(
        harness.entries.get_by_domain(DOMAIN)[0].data["username"],
        json!("alice")
    );
}

#[tokio::test]
async fn test_no_section_is_noop() {
    let harness = Harness::new(Account::Contracts(vec![]));
    let results = async_setup(&yaml("sensor: []"), &harness.flows)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_invalid_section() {
    let harness = Harness::new(Account::Contracts(vec![]));
    let result = async_setup(&yaml("mosoblgaz: 42"), &harness.flows).await;
    assert!(matches!(result, Err(SetupError::InvalidConfig(_))));
    assert!(harness.entries.is_empty());
}
