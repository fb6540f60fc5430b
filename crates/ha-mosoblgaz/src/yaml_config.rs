//! Legacy YAML configuration
//!
//! Accounts listed under `mosoblgaz:` in `configuration.yaml` are moved into
//! config entries through the config flow's `import` step:
//!
//! ```yaml
//! mosoblgaz:
//!   - username: alice
//!     password: hunter2
//!     scan_interval: 600
//!     contracts:
//!       "1234567890": true
//!       "0987654321":
//!         invoices: false
//! ```

use ha_config_entries::{ConfigEntriesFlowManager, ConfigEntrySource, ConfigFlowError};
use ha_data_entry_flow::{FlowInput, FlowResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config_flow::ContractFilter;
use crate::constants::{CONF_USERNAME, DOMAIN};

/// Errors while setting up from YAML
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid mosoblgaz configuration: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),

    #[error(transparent)]
    Flow(#[from] ConfigFlowError),
}

/// Contract selection in YAML: a plain toggle or a filter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContractSetting {
    Toggle(bool),
    Filter(ContractFilter),
}

/// One account from YAML
///
/// Only `username` is imported into the config entry. The remaining fields
/// are parsed so the legacy section is validated as a whole; credentials and
/// options are re-entered through the config and options flows.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub invert_invoices: Option<bool>,
    /// Seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Seconds
    #[serde(default)]
    pub scan_interval: Option<u64>,
    #[serde(default)]
    pub contracts: HashMap<String, ContractSetting>,
}

/// Extract the accounts of the `mosoblgaz:` section
///
/// A single mapping is accepted in place of a list.
pub fn parse_config(root: &serde_yaml::Value) -> Result<Vec<AccountConfig>, SetupError> {
    let section = match root.get(DOMAIN) {
        None | Some(serde_yaml::Value::Null) => return Ok(Vec::new()),
        Some(section) => section.clone(),
    };

    let accounts: Vec<AccountConfig> = match section {
        serde_yaml::Value::Mapping(_) => vec![serde_yaml::from_value(section)?],
        other => serde_yaml::from_value(other)?,
    };
    Ok(accounts)
}

/// Start an import flow for every account configured in YAML
///
/// Each flow receives only the account's username.
pub async fn async_setup(
    root: &serde_yaml::Value,
    flows: &ConfigEntriesFlowManager,
) -> Result<Vec<FlowResult>, SetupError> {
    let accounts = parse_config(root)?;
    if accounts.is_empty() {
        debug!("No {} accounts in YAML configuration", DOMAIN);
        return Ok(Vec::new());
    }

    info!("Importing {} {} accounts from YAML", accounts.len(), DOMAIN);

    let mut results = Vec::with_capacity(accounts.len());
    for account in accounts {
        let mut data = FlowInput::new();
        data.insert(CONF_USERNAME.to_string(), Value::String(account.username));

        let result = flows
            .async_init(DOMAIN, ConfigEntrySource::Import, Some(data))
            .await?;
        results.push(result);
    }

    Ok(results)
}
