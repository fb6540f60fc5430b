//! Mosoblgaz options flow
//!
//! Imported entries get an inert placeholder form; entries created through
//! the UI can tune invoice sign, request timeout and polling interval.

use async_trait::async_trait;
use ha_config_entries::{ConfigEntry, ConfigEntrySource};
use ha_data_entry_flow::{FlowError, FlowHandler, FlowInput, FlowResult, FlowStepResult};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::*;
use crate::schema::{import_options_schema, options_schema};

/// Values prefilled into the options form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDefaults {
    pub invert_invoices: bool,
    /// Seconds
    pub timeout: u64,
    /// Seconds
    pub scan_interval: u64,
}

impl Default for OptionDefaults {
    fn default() -> Self {
        Self {
            invert_invoices: DEFAULT_INVERT_INVOICES,
            timeout: DEFAULT_TIMEOUT.as_secs(),
            scan_interval: DEFAULT_SCAN_INTERVAL.as_secs(),
        }
    }
}

fn as_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl OptionDefaults {
    /// Resolve the defaults for `entry`
    ///
    /// Version 1 entries kept their settings in `data`; those act as
    /// fallbacks underneath the options.
    pub fn resolve(entry: &ConfigEntry) -> Self {
        let mut merged: HashMap<&str, &Value> = HashMap::new();

        if entry.version == LEGACY_ENTRY_VERSION {
            debug!(
                "Version 1 config entry detected, merging initial data for {}",
                entry.entry_id
            );
            merged.extend(entry.data.iter().map(|(k, v)| (k.as_str(), v)));
        }
        merged.extend(entry.options.iter().map(|(k, v)| (k.as_str(), v)));

        let fallback = Self::default();
        Self {
            invert_invoices: merged
                .get(CONF_INVERT_INVOICES)
                .and_then(|v| v.as_bool())
                .unwrap_or(fallback.invert_invoices),
            timeout: merged
                .get(CONF_TIMEOUT)
                .and_then(|v| as_seconds(v))
                .unwrap_or(fallback.timeout),
            scan_interval: merged
                .get(CONF_SCAN_INTERVAL)
                .and_then(|v| as_seconds(v))
                .unwrap_or(fallback.scan_interval),
        }
    }
}

/// Options flow bound to one Mosoblgaz entry
pub struct MosoblgazOptionsFlowHandler {
    entry: ConfigEntry,
}

impl MosoblgazOptionsFlowHandler {
    pub fn new(entry: ConfigEntry) -> Self {
        Self { entry }
    }

    async fn async_step_init(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        if self.entry.source == ConfigEntrySource::Import {
            return self.async_step_import(user_input).await;
        }
        self.async_step_user(user_input).await
    }

    async fn async_step_import(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        if user_input.is_some() {
            return Ok(FlowResult::create_entry("", FlowInput::new()));
        }
        Ok(FlowResult::show_form(STEP_IMPORT, import_options_schema()))
    }

    async fn async_step_user(&mut self, user_input: Option<FlowInput>) -> FlowStepResult {
        if let Some(user_input) = user_input {
            return Ok(FlowResult::create_entry("", user_input));
        }

        let defaults = OptionDefaults::resolve(&self.entry);
        Ok(FlowResult::show_form(STEP_USER, options_schema(&defaults)))
    }
}

#[async_trait]
impl FlowHandler for MosoblgazOptionsFlowHandler {
    fn handler(&self) -> &str {
        DOMAIN
    }

    async fn async_step(&mut self, step_id: &str, user_input: Option<FlowInput>) -> FlowStepResult {
        match step_id {
            STEP_INIT => self.async_step_init(user_input).await,
            STEP_IMPORT => self.async_step_import(user_input).await,
            STEP_USER => self.async_step_user(user_input).await,
            other => Err(FlowError::UnknownStep {
                handler: DOMAIN.to_string(),
                step_id: other.to_string(),
            }),
        }
    }
}
