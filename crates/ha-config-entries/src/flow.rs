//! Config and options flow management
//!
//! Binds data entry flows to config entries: a finished config flow becomes a
//! new entry, a finished options flow replaces an entry's options.

use dashmap::DashMap;
use ha_data_entry_flow::{FlowError, FlowHandler, FlowInput, FlowManager, FlowResult, FlowResultType};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::entry::{ConfigEntry, ConfigEntrySource, ConfigEntryUpdate};
use crate::manager::{ConfigEntries, ConfigEntriesError};

/// Step every options flow starts at
pub const OPTIONS_FLOW_INIT_STEP: &str = "init";

/// Abort reason when a finished flow duplicates an entry's unique_id
pub const ABORT_ALREADY_EXISTS: &str = "already_exists";

/// Errors from config/options flow management
#[derive(Debug, Error)]
pub enum ConfigFlowError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Entries(#[from] ConfigEntriesError),
}

pub type ConfigFlowResult = Result<FlowResult, ConfigFlowError>;

/// Builds flows for one integration
pub trait ConfigFlowFactory: Send + Sync {
    /// Integration domain
    fn domain(&self) -> &str;

    /// Version stamped on entries created by the config flow
    fn version(&self) -> u32;

    fn minor_version(&self) -> u32 {
        1
    }

    /// Create a config flow; `entries` gives access to the current entries
    fn create_flow(&self, entries: Arc<ConfigEntries>) -> Box<dyn FlowHandler>;

    /// Create an options flow bound to `entry`, if the integration has one
    fn create_options_flow(&self, _entry: ConfigEntry) -> Option<Box<dyn FlowHandler>> {
        None
    }
}

/// Integrations that provide config flows, by domain
#[derive(Default)]
pub struct ConfigFlowRegistry {
    factories: DashMap<String, Arc<dyn ConfigFlowFactory>>,
}

impl ConfigFlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: Arc<dyn ConfigFlowFactory>) {
        debug!("Registered config flow for domain: {}", factory.domain());
        self.factories.insert(factory.domain().to_string(), factory);
    }

    pub fn get(&self, domain: &str) -> Option<Arc<dyn ConfigFlowFactory>> {
        self.factories.get(domain).map(|r| r.value().clone())
    }

    fn require(&self, domain: &str) -> Result<Arc<dyn ConfigFlowFactory>, FlowError> {
        self.get(domain)
            .ok_or_else(|| FlowError::UnknownHandler(domain.to_string()))
    }
}

fn into_entry_map(data: Option<FlowInput>) -> HashMap<String, serde_json::Value> {
    data.unwrap_or_default().into_iter().collect()
}

/// Runs config flows and creates entries from their results
pub struct ConfigEntriesFlowManager {
    flows: FlowManager,
    entries: Arc<ConfigEntries>,
    registry: Arc<ConfigFlowRegistry>,
    /// flow_id -> source the flow was started from
    sources: DashMap<String, ConfigEntrySource>,
}

impl ConfigEntriesFlowManager {
    pub fn new(entries: Arc<ConfigEntries>, registry: Arc<ConfigFlowRegistry>) -> Self {
        Self {
            flows: FlowManager::new(),
            entries,
            registry,
            sources: DashMap::new(),
        }
    }

    /// Start a config flow for `domain`
    ///
    /// The flow begins at the step named after `source`; `data` is handed to
    /// that step as its input (used by imports).
    pub async fn async_init(
        &self,
        domain: &str,
        source: ConfigEntrySource,
        data: Option<FlowInput>,
    ) -> ConfigFlowResult {
        let factory = self.registry.require(domain)?;
        let handler = factory.create_flow(self.entries.clone());

        let result = self
            .flows
            .async_init(handler, source.step_id(), data)
            .await?;
        self.handle_result(factory.as_ref(), source, result).await
    }

    /// Submit user input to a config flow
    pub async fn async_configure(&self, flow_id: &str, user_input: FlowInput) -> ConfigFlowResult {
        let source = self
            .sources
            .get(flow_id)
            .map(|r| *r.value())
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.to_string()))?;

        let result = match self.flows.async_configure(flow_id, user_input).await {
            Ok(result) => result,
            Err(e) => {
                if !self.flows.contains(flow_id) {
                    self.sources.remove(flow_id);
                }
                return Err(e.into());
            }
        };

        let factory = self.registry.require(&result.handler)?;
        self.handle_result(factory.as_ref(), source, result).await
    }

    /// Abort a config flow
    pub fn async_abort(&self, flow_id: &str) -> Result<(), ConfigFlowError> {
        self.sources.remove(flow_id);
        self.flows.async_abort(flow_id)?;
        Ok(())
    }

    /// Flows waiting for input
    pub fn flows(&self) -> &FlowManager {
        &self.flows
    }

    async fn handle_result(
        &self,
        factory: &dyn ConfigFlowFactory,
        source: ConfigEntrySource,
        mut result: FlowResult,
    ) -> ConfigFlowResult {
        if !result.is_finished() {
            self.sources.insert(result.flow_id.clone(), source);
            return Ok(result);
        }
        self.sources.remove(&result.flow_id);

        if result.result_type != FlowResultType::CreateEntry {
            debug!(
                "Config flow {} for {} aborted: {:?}",
                result.flow_id, result.handler, result.reason
            );
            return Ok(result);
        }

        let mut entry = ConfigEntry::new(
            result.handler.clone(),
            result.title.clone().unwrap_or_default(),
        )
        .with_data(into_entry_map(result.data.clone()))
        .with_source(source)
        .with_version(factory.version(), factory.minor_version());
        if let Some(ref unique_id) = result.unique_id {
            entry = entry.with_unique_id(unique_id.clone());
        }

        let entry = match self.entries.add(entry).await {
            Ok(entry) => entry,
            Err(ConfigEntriesError::AlreadyExists { domain, unique_id }) => {
                warn!(
                    "Config flow {} for {} finished for existing unique_id {}",
                    result.flow_id, domain, unique_id
                );
                let mut aborted = FlowResult::abort(ABORT_ALREADY_EXISTS);
                aborted.flow_id = result.flow_id;
                aborted.handler = result.handler;
                return Ok(aborted);
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            "Config flow {} created entry {} for {}",
            result.flow_id, entry.entry_id, entry.domain
        );

        result.version = Some(entry.version);
        result.minor_version = Some(entry.minor_version);
        result.result = Some(json!({ "entry_id": entry.entry_id }));
        Ok(result)
    }
}

/// Runs options flows and stores their results as entry options
pub struct OptionsFlowManager {
    flows: FlowManager,
    entries: Arc<ConfigEntries>,
    registry: Arc<ConfigFlowRegistry>,
    /// flow_id -> entry_id the flow is bound to
    bound_entries: DashMap<String, String>,
}

impl OptionsFlowManager {
    pub fn new(entries: Arc<ConfigEntries>, registry: Arc<ConfigFlowRegistry>) -> Self {
        Self {
            flows: FlowManager::new(),
            entries,
            registry,
            bound_entries: DashMap::new(),
        }
    }

    /// Start an options flow for an existing entry
    pub async fn async_init(&self, entry_id: &str) -> ConfigFlowResult {
        let entry = self
            .entries
            .get(entry_id)
            .ok_or_else(|| ConfigEntriesError::NotFound(entry_id.to_string()))?;

        let domain = entry.domain.clone();
        let factory = self.registry.require(&domain)?;
        let handler = factory
            .create_options_flow(entry)
            .ok_or(FlowError::UnknownHandler(domain))?;

        let result = self
            .flows
            .async_init(handler, OPTIONS_FLOW_INIT_STEP, None)
            .await?;
        self.handle_result(entry_id, result).await
    }

    /// Submit user input to an options flow
    pub async fn async_configure(&self, flow_id: &str, user_input: FlowInput) -> ConfigFlowResult {
        let entry_id = self
            .bound_entries
            .get(flow_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.to_string()))?;

        let result = match self.flows.async_configure(flow_id, user_input).await {
            Ok(result) => result,
            Err(e) => {
                if !self.flows.contains(flow_id) {
                    self.bound_entries.remove(flow_id);
                }
                return Err(e.into());
            }
        };

        self.handle_result(&entry_id, result).await
    }

    /// Abort an options flow
    pub fn async_abort(&self, flow_id: &str) -> Result<(), ConfigFlowError> {
        self.bound_entries.remove(flow_id);
        self.flows.async_abort(flow_id)?;
        Ok(())
    }

    async fn handle_result(&self, entry_id: &str, mut result: FlowResult) -> ConfigFlowResult {
        if !result.is_finished() {
            self.bound_entries
                .insert(result.flow_id.clone(), entry_id.to_string());
            return Ok(result);
        }
        self.bound_entries.remove(&result.flow_id);

        if result.result_type == FlowResultType::CreateEntry {
            let options = into_entry_map(result.data.clone());
            self.entries
                .update(entry_id, ConfigEntryUpdate::new().options(options))
                .await?;
            info!("Options flow {} updated entry {}", result.flow_id, entry_id);
            result.result = Some(json!({ "entry_id": entry_id }));
        }

        Ok(result)
    }
}
