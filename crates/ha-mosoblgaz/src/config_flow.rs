//! Mosoblgaz config flow
//!
//! ```text
//! user ──(add all contracts)──────────────────────────→ entry
//!   └──→ contract ─→ contract ─→ … (one per contract) ─→ entry | nothing_enabled
//! import ─────────────────────────────────────────────→ entry (username only)
//! ```

use async_trait::async_trait;
use ha_config_entries::ConfigEntries;
use ha_data_entry_flow::{FlowError, FlowHandler, FlowInput, FlowResult, FlowStepResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ApiFactory, Contracts, MosoblgazApi, MosoblgazError, MosoblgazResult};
use crate::constants::*;
use crate::schema::{authentication_schema, contract_schema};

fn default_true() -> bool {
    true
}

/// Data tracked for an enabled contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFilter {
    #[serde(default = "default_true")]
    pub meters: bool,
    #[serde(default = "default_true")]
    pub invoices: bool,
}

impl Default for ContractFilter {
    fn default() -> Self {
        Self {
            meters: true,
            invoices: true,
        }
    }
}

/// What the user decided for one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractDecision {
    Disabled,
    Enabled(ContractFilter),
}

impl ContractDecision {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ContractDecision::Enabled(_))
    }

    /// `false`, or `{"meters": .., "invoices": ..}`
    pub fn to_value(&self) -> Value {
        match self {
            ContractDecision::Disabled => Value::Bool(false),
            ContractDecision::Enabled(filter) => json!({
                CONF_METERS: filter.meters,
                CONF_INVOICES: filter.invoices,
            }),
        }
    }

    fn from_input(input: &FlowInput) -> Self {
        let flag = |key: &str, default: bool| input.get(key).and_then(Value::as_bool).unwrap_or(default);

        if !flag(CONF_ENABLE_CONTRACT, false) {
            return ContractDecision::Disabled;
        }
        ContractDecision::Enabled(ContractFilter {
            meters: flag(CONF_METERS, true),
            invoices: flag(CONF_INVOICES, true),
        })
    }
}

/// Registration state between the credentials step and the last contract
#[derive(Debug)]
struct PendingRegistration {
    username: String,
    /// Validated credentials form
    user_input: FlowInput,
    decisions: IndexMap<String, ContractDecision>,
    /// Contracts not presented yet
    remaining: VecDeque<String>,
    /// Contract currently presented
    current: Option<String>,
}

impl PendingRegistration {
    fn new(username: String, user_input: FlowInput, contracts: &Contracts) -> Self {
        Self {
            username,
            user_input,
            decisions: IndexMap::new(),
            remaining: contracts.keys().cloned().collect(),
            current: None,
        }
    }

    /// Contract being presented, advancing to the next one if needed
    fn current_or_next(&mut self) -> Option<&str> {
        if self.current.is_none() {
            self.current = self.remaining.pop_front();
        }
        self.current.as_deref()
    }

    fn decide(&mut self, decision: ContractDecision) {
        if let Some(contract_id) = self.current.take() {
            self.decisions.insert(contract_id, decision);
        }
    }

    fn any_enabled(&self) -> bool {
        self.decisions.values().any(ContractDecision::is_enabled)
    }

    fn into_data(self) -> FlowInput {
        let contracts: serde_json::Map<String, Value> = self
            .decisions
            .iter()
            .map(|(id, decision)| (id.clone(), decision.to_value()))
            .collect();

        let mut data = self.user_input;
        data.insert(CONF_CONTRACTS.to_string(), Value::Object(contracts));
        data
    }
}

fn required_str(input: &FlowInput, key: &str) -> Result<String, FlowError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FlowError::Handler(format!("missing '{}' in input", key)))
}

fn abort(reason: AbortReason) -> FlowStepResult {
    Ok(FlowResult::abort(reason.as_str()))
}

fn contract_form(contract_id: &str) -> FlowResult {
    FlowResult::show_form(STEP_CONTRACT, contract_schema())
        .with_description_placeholders([(PLACEHOLDER_CODE, contract_id)])
}

async fn login(api: &mut dyn MosoblgazApi) -> MosoblgazResult<Contracts> {
    api.authenticate().await?;
    api.fetch_contracts(false).await
}

/// Config flow for Mosoblgaz accounts
pub struct MosoblgazFlowHandler {
    entries: Arc<ConfigEntries>,
    api_factory: ApiFactory,
    pending: Option<PendingRegistration>,
}

impl MosoblgazFlowHandler {
    pub fn new(entries: Arc<ConfigEntries>, api_factory: ApiFactory) -> Self {
        Self {
            entries,
            api_factory,
            pending: None,
        }
    }

    /// Whether an entry for `username` is already registered
    fn entry_exists(&self, username: &str) -> bool {
        self.entries.get_by_domain(DOMAIN).iter().any(|entry| {
            entry.data.get(CONF_USERNAME).and_then(Value::as_str) == Some(username)
        })
    }

    /// Finish with an entry for `username`, unless another flow registered it meanwhile
    fn finish(&self, username: &str, data: FlowInput) -> FlowStepResult {
        if self.entry_exists(username) {
            return abort(AbortReason::AlreadyExists);
        }
        Ok(FlowResult::create_entry(entry_title(username), data).with_unique_id(username))
    }

    async fn async_step_user(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        let Some(user_input) = user_input else {
            return Ok(FlowResult::show_form(STEP_USER, authentication_schema()));
        };

        let username = required_str(&user_input, CONF_USERNAME)?;
        if self.entry_exists(&username) {
            return abort(AbortReason::AlreadyExists);
        }

        let password = required_str(&user_input, CONF_PASSWORD)?;
        let mut api = (self.api_factory)(&username, &password);

        let contracts = match login(api.as_mut()).await {
            Ok(contracts) => contracts,
            Err(MosoblgazError::AuthenticationFailed(reason)) => {
                warn!("Authentication failed for {}: {}", username, reason);
                return Ok(FlowResult::show_form(STEP_USER, authentication_schema())
                    .with_errors([("base", ERROR_INVALID_CREDENTIALS)]));
            }
            Err(MosoblgazError::PartialOffline(reason)) => {
                warn!("Mosoblgaz is partially offline: {}", reason);
                return abort(AbortReason::PartialOffline);
            }
            Err(e) => {
                warn!("Mosoblgaz API error for {}: {}", username, e);
                return abort(AbortReason::ApiError);
            }
        };

        if contracts.is_empty() {
            return abort(AbortReason::ContractsMissing);
        }

        let add_all = user_input
            .get(CONF_ADD_ALL_CONTRACTS)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if add_all {
            info!(
                "Adding {} with all {} contracts",
                username,
                contracts.len()
            );
            return self.finish(&username, user_input);
        }

        debug!("Selecting among {} contracts for {}", contracts.len(), username);
        self.pending = Some(PendingRegistration::new(username, user_input, &contracts));
        self.async_step_contract(None).await
    }

    async fn async_step_contract(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| FlowError::Handler("no registration in progress".to_string()))?;

        let contract_id = pending
            .current_or_next()
            .map(str::to_string)
            .ok_or_else(|| FlowError::Handler("no contract left to present".to_string()))?;

        let Some(user_input) = user_input else {
            return Ok(contract_form(&contract_id));
        };

        let decision = ContractDecision::from_input(&user_input);
        debug!("Contract {}: {:?}", contract_id, decision);
        pending.decide(decision);

        if let Some(next) = pending.current_or_next() {
            return Ok(contract_form(next));
        }

        let Some(pending) = self.pending.take() else {
            return Err(FlowError::Handler("no registration in progress".to_string()));
        };

        if !pending.any_enabled() {
            return abort(AbortReason::NothingEnabled);
        }

        let username = pending.username.clone();
        self.finish(&username, pending.into_data())
    }

    async fn async_step_import(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        let Some(user_input) = user_input else {
            return abort(AbortReason::UnknownError);
        };

        let username = required_str(&user_input, CONF_USERNAME)?;

        let mut data = FlowInput::new();
        data.insert(CONF_USERNAME.to_string(), Value::String(username.clone()));
        self.finish(&username, data)
    }
}

#[async_trait]
impl FlowHandler for MosoblgazFlowHandler {
    fn handler(&self) -> &str {
        DOMAIN
    }

    async fn async_step(&mut self, step_id: &str, user_input: Option<FlowInput>) -> FlowStepResult {
        match step_id {
            STEP_USER => self.async_step_user(user_input).await,
            STEP_CONTRACT => self.async_step_contract(user_input).await,
            STEP_IMPORT => self.async_step_import(user_input).await,
            other => Err(FlowError::UnknownStep {
                handler: DOMAIN.to_string(),
                step_id: other.to_string(),
            }),
        }
    }
}
