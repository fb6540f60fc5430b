//! Shared fixtures: a scripted account API and a config entries harness

#![allow(dead_code)]

use async_trait::async_trait;
use ha_config_entries::{
    ConfigEntries, ConfigEntriesFlowManager, ConfigEntry, ConfigFlowRegistry, OptionsFlowManager,
    Storage,
};
use ha_data_entry_flow::FlowInput;
use ha_mosoblgaz::{
    ApiFactory, Contract, Contracts, MosoblgazApi, MosoblgazError, MosoblgazIntegration,
    MosoblgazResult,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// How the scripted account responds
#[derive(Debug, Clone)]
pub enum Account {
    Contracts(Vec<&'static str>),
    BadCredentials,
    PartialOffline,
    Broken,
}

struct ScriptedApi {
    account: Account,
}

#[async_trait]
impl MosoblgazApi for ScriptedApi {
    async fn authenticate(&mut self) -> MosoblgazResult<()> {
        match self.account {
            Account::BadCredentials => Err(MosoblgazError::AuthenticationFailed(
                "wrong password".to_string(),
            )),
            Account::PartialOffline => Err(MosoblgazError::PartialOffline(
                "invoices service down".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn fetch_contracts(&mut self, with_data: bool) -> MosoblgazResult<Contracts> {
        assert!(!with_data, "flows only need shallow contracts");
        match &self.account {
            Account::Contracts(ids) => Ok(ids
                .iter()
                .map(|id| (id.to_string(), Contract::new(*id)))
                .collect()),
            _ => Err(MosoblgazError::Api("unexpected response".to_string())),
        }
    }
}

/// Factory for `account`, counting how many clients were built
pub fn scripted_factory(account: Account) -> (ApiFactory, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let factory: ApiFactory = Arc::new(move |_username: &str, _password: &str| {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedApi {
            account: account.clone(),
        }) as Box<dyn MosoblgazApi>
    });
    (factory, built)
}

pub struct Harness {
    _dir: TempDir,
    pub entries: Arc<ConfigEntries>,
    pub flows: ConfigEntriesFlowManager,
    pub options: OptionsFlowManager,
    pub factory: ApiFactory,
    pub clients_built: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(account: Account) -> Self {
        let dir = TempDir::new().unwrap();
        let entries = Arc::new(ConfigEntries::new(Arc::new(Storage::new(dir.path()))));
        let (factory, clients_built) = scripted_factory(account);

        let registry = Arc::new(ConfigFlowRegistry::new());
        registry.register(Arc::new(MosoblgazIntegration::new(factory.clone())));

        Self {
            _dir: dir,
            flows: ConfigEntriesFlowManager::new(entries.clone(), registry.clone()),
            options: OptionsFlowManager::new(entries.clone(), registry),
            entries,
            factory,
            clients_built,
        }
    }

    pub fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::SeqCst)
    }

    /// Add an existing entry directly to the store
    pub async fn add_entry(&self, entry: ConfigEntry) -> ConfigEntry {
        self.entries.add(entry).await.unwrap()
    }
}

pub fn input(value: Value) -> FlowInput {
    match value {
        Value::Object(map) => map,
        _ => panic!("Expected object"),
    }
}

pub fn map(value: Value) -> HashMap<String, Value> {
    serde_json::from_value(value).unwrap()
}
