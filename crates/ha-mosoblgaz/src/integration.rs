//! Registration of the Mosoblgaz flows with the config entries system

use ha_config_entries::{ConfigEntries, ConfigEntry, ConfigFlowFactory};
use ha_data_entry_flow::FlowHandler;
use std::sync::Arc;

use crate::api::ApiFactory;
use crate::config_flow::MosoblgazFlowHandler;
use crate::constants::{CONFIG_FLOW_VERSION, DOMAIN};
use crate::options_flow::MosoblgazOptionsFlowHandler;

/// The Mosoblgaz integration as seen by the flow managers
pub struct MosoblgazIntegration {
    api_factory: ApiFactory,
}

impl MosoblgazIntegration {
    pub fn new(api_factory: ApiFactory) -> Self {
        Self { api_factory }
    }
}

impl ConfigFlowFactory for MosoblgazIntegration {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn version(&self) -> u32 {
        CONFIG_FLOW_VERSION
    }

    fn create_flow(&self, entries: Arc<ConfigEntries>) -> Box<dyn FlowHandler> {
        Box::new(MosoblgazFlowHandler::new(entries, self.api_factory.clone()))
    }

    fn create_options_flow(&self, entry: ConfigEntry) -> Option<Box<dyn FlowHandler>> {
        Some(Box::new(MosoblgazOptionsFlowHandler::new(entry)))
    }
}
