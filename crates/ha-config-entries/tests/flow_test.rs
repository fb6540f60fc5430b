//! Config/options flow management against a small test integration

use async_trait::async_trait;
use ha_config_entries::{
    ConfigEntries, ConfigEntriesError, ConfigEntriesFlowManager, ConfigEntry, ConfigEntrySource,
    ConfigFlowError, ConfigFlowFactory, ConfigFlowRegistry, OptionsFlowManager, Storage,
    ABORT_ALREADY_EXISTS,
};
use ha_data_entry_flow::{
    DataSchema, FieldType, FlowError, FlowHandler, FlowInput, FlowResult, FlowResultType,
    FlowStepResult,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::assert_ok;

const DOMAIN: &str = "notes";

struct NotesFlow;

#[async_trait]
impl FlowHandler for NotesFlow {
    fn handler(&self) -> &str {
        DOMAIN
    }

    async fn async_step(&mut self, step_id: &str, user_input: Option<FlowInput>) -> FlowStepResult {
        match (step_id, user_input) {
            ("user", None) => Ok(FlowResult::show_form(
                "user",
                DataSchema::new().required("name", FieldType::String),
            )),
            ("user" | "import", Some(input)) => {
                let name = input["name"].as_str().unwrap_or_default().to_string();
                Ok(FlowResult::create_entry(name.clone(), input).with_unique_id(name))
            }
            ("import", None) => Ok(FlowResult::abort("unknown_error")),
            (other, _) => Err(FlowError::UnknownStep {
                handler: DOMAIN.to_string(),
                step_id: other.to_string(),
            }),
        }
    }
}

struct NotesOptionsFlow;

#[async_trait]
impl FlowHandler for NotesOptionsFlow {
    fn handler(&self) -> &str {
        DOMAIN
    }

    async fn async_step(&mut self, _step_id: &str, user_input: Option<FlowInput>) -> FlowStepResult {
        match user_input {
            None => Ok(FlowResult::show_form(
                "init",
                DataSchema::new().optional_with_default("color", FieldType::String, "blue"),
            )),
            Some(input) => Ok(FlowResult::create_entry("", input)),
        }
    }
}

struct NotesIntegration;

impl ConfigFlowFactory for NotesIntegration {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn version(&self) -> u32 {
        2
    }

    fn create_flow(&self, _entries: Arc<ConfigEntries>) -> Box<dyn FlowHandler> {
        Box::new(NotesFlow)
    }

    fn create_options_flow(&self, _entry: ConfigEntry) -> Option<Box<dyn FlowHandler>> {
        Some(Box::new(NotesOptionsFlow))
    }
}

fn input(value: Value) -> FlowInput {
    match value {
        Value::Object(map) => map,
        _ => panic!("Expected object"),
    }
}

fn setup() -> (TempDir, Arc<ConfigEntries>, Arc<ConfigFlowRegistry>) {
    let temp_dir = TempDir::new().unwrap();
    let entries = Arc::new(ConfigEntries::new(Arc::new(Storage::new(temp_dir.path()))));
    let registry = Arc::new(ConfigFlowRegistry::new());
    registry.register(Arc::new(NotesIntegration));
    (temp_dir, entries, registry)
}

#[tokio::test]
async fn test_user_flow_creates_entry() {
    let (_dir, entries, registry) = setup();
    let manager = ConfigEntriesFlowManager::new(entries.clone(), registry);

    let form = manager
        .async_init(DOMAIN, ConfigEntrySource::User, None)
        .await
        .unwrap();
    assert_eq!(form.result_type, FlowResultType::Form);
    assert_eq!(manager.flows().len(), 1);

    let result = manager
        .async_configure(&form.flow_id, input(json!({"name": "groceries"})))
        .await
        .unwrap();
    assert_eq!(result.result_type, FlowResultType::CreateEntry);
    assert_eq!(result.version, Some(2));

    let entry_id = result.result.unwrap()["entry_id"]
        .as_str()
        .unwrap()
        .to_string();
    let entry = entries.get(&entry_id).unwrap();
    assert_eq!(entry.title, "groceries");
    assert_eq!(entry.source, ConfigEntrySource::User);
    assert_eq!(entry.version, 2);
    assert_eq!(entry.data["name"], json!("groceries"));
    assert!(manager.flows().is_empty());
}

#[tokio::test]
async fn test_overlapping_flows_create_one_entry() {
    let (_dir, entries, registry) = setup();
    let manager = ConfigEntriesFlowManager::new(entries.clone(), registry);

    let first = manager
        .async_init(DOMAIN, ConfigEntrySource::User, None)
        .await
        .unwrap();
    let second = manager
        .async_init(DOMAIN, ConfigEntrySource::User, None)
        .await
        .unwrap();

    let created = manager
        .async_configure(&first.flow_id, input(json!({"name": "groceries"})))
        .await
        .unwrap();
    assert_eq!(created.result_type, FlowResultType::CreateEntry);

    let duplicate = manager
        .async_configure(&second.flow_id, input(json!({"name": "groceries"})))
        .await
        .unwrap();
    assert_eq!(duplicate.result_type, FlowResultType::Abort);
    assert_eq!(duplicate.reason.as_deref(), Some(ABORT_ALREADY_EXISTS));
    assert_eq!(duplicate.flow_id, second.flow_id);

    assert_eq!(entries.len(), 1);
    assert!(entries.get_by_unique_id(DOMAIN, "groceries").is_some());
    assert!(manager.flows().is_empty());
}

#[tokio::test]
async fn test_import_finishes_immediately() {
    let (_dir, entries, registry) = setup();
    let manager = ConfigEntriesFlowManager::new(entries.clone(), registry);

    let result = manager
        .async_init(
            DOMAIN,
            ConfigEntrySource::Import,
            Some(input(json!({"name": "legacy"}))),
        )
        .await
        .unwrap();

    assert_eq!(result.result_type, FlowResultType::CreateEntry);
    let entry = &entries.get_by_domain(DOMAIN)[0];
    assert_eq!(entry.source, ConfigEntrySource::Import);

    let aborted = manager
        .async_init(DOMAIN, ConfigEntrySource::Import, None)
        .await
        .unwrap();
    assert_eq!(aborted.reason.as_deref(), Some("unknown_error"));
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_unknown_domain() {
    let (_dir, entries, registry) = setup();
    let manager = ConfigEntriesFlowManager::new(entries, registry);

    let err = manager
        .async_init("hue", ConfigEntrySource::User, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigFlowError::Flow(FlowError::UnknownHandler(_))
    ));
}

#[tokio::test]
async fn test_aborted_flow_cannot_continue() {
    let (_dir, entries, registry) = setup();
    let manager = ConfigEntriesFlowManager::new(entries.clone(), registry);

    let form = manager
        .async_init(DOMAIN, ConfigEntrySource::User, None)
        .await
        .unwrap();
    assert_ok!(manager.async_abort(&form.flow_id));

    let err = manager
        .async_configure(&form.flow_id, input(json!({"name": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigFlowError::Flow(FlowError::UnknownFlow(_))));
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_options_flow_replaces_options() {
    let (_dir, entries, registry) = setup();
    let entry = entries
        .add(ConfigEntry::new(DOMAIN, "groceries"))
        .await
        .unwrap();
    let manager = OptionsFlowManager::new(entries.clone(), registry);

    let form = manager.async_init(&entry.entry_id).await.unwrap();
    assert_eq!(form.step_id.as_deref(), Some("init"));

    let result = manager
        .async_configure(&form.flow_id, FlowInput::new())
        .await
        .unwrap();
    assert_eq!(result.result_type, FlowResultType::CreateEntry);
    assert_eq!(result.title.as_deref(), Some(""));

    let updated = entries.get(&entry.entry_id).unwrap();
    assert_eq!(updated.options["color"], json!("blue"));
    assert_eq!(updated.title, "groceries");
}

#[tokio::test]
async fn test_options_flow_missing_entry() {
    let (_dir, entries, registry) = setup();
    let manager = OptionsFlowManager::new(entries, registry);

    let err = manager.async_init("missing").await.unwrap_err();
    assert!(matches!(
        err,
        ConfigFlowError::Entries(ConfigEntriesError::NotFound(_))
    ));
}
