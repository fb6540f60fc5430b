//! Flow results
//!
//! Every step of a flow returns one of three declarative results: show a
//! form, create an entry, or abort.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::schema::DataSchema;

/// Input mapping submitted to a flow step
pub type FlowInput = serde_json::Map<String, serde_json::Value>;

/// Kind of flow result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowResultType {
    /// Present a form and wait for input
    Form,
    /// Flow finished successfully
    CreateEntry,
    /// Flow finished without creating anything
    Abort,
}

/// Result of a flow step
#[derive(Debug, Clone, Serialize)]
pub struct FlowResult {
    /// Flow ID (filled in by the flow manager)
    pub flow_id: String,
    /// Handler (integration domain)
    pub handler: String,
    /// Result type: form, create_entry, abort
    #[serde(rename = "type")]
    pub result_type: FlowResultType,
    /// Current step ID (for form type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Data schema for the form (for form type)
    /// Always present, empty array if no schema
    pub data_schema: DataSchema,
    /// Errors from the previous submission (always present, null if none)
    pub errors: Option<HashMap<String, String>>,
    /// Description placeholders for the form (always present, null if none)
    pub description_placeholders: Option<HashMap<String, String>>,
    /// Title (for create_entry type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Abort reason (for abort type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Version (for create_entry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Minor version (for create_entry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<u32>,
    /// Entry data (for create_entry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FlowInput>,
    /// Unique ID for the created entry (for create_entry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// What the host did with a finished flow (e.g. the created entry ID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Whether this is the last step (controls submit vs next button in frontend)
    pub last_step: Option<bool>,
}

impl FlowResult {
    fn empty(result_type: FlowResultType) -> Self {
        Self {
            flow_id: String::new(),
            handler: String::new(),
            result_type,
            step_id: None,
            data_schema: DataSchema::default(),
            errors: None,
            description_placeholders: None,
            title: None,
            reason: None,
            version: None,
            minor_version: None,
            data: None,
            unique_id: None,
            result: None,
            last_step: None,
        }
    }

    /// Show a form for `step_id`
    pub fn show_form(step_id: impl Into<String>, data_schema: DataSchema) -> Self {
        Self {
            step_id: Some(step_id.into()),
            data_schema,
            ..Self::empty(FlowResultType::Form)
        }
    }

    /// Finish the flow with an entry
    pub fn create_entry(title: impl Into<String>, data: FlowInput) -> Self {
        Self {
            title: Some(title.into()),
            data: Some(data),
            ..Self::empty(FlowResultType::CreateEntry)
        }
    }

    /// Finish the flow without an entry
    pub fn abort(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::empty(FlowResultType::Abort)
        }
    }

    /// Attach form errors (field name or "base" -> error key)
    pub fn with_errors<I, K, V>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.errors = Some(
            errors
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Attach description placeholders
    pub fn with_description_placeholders<I, K, V>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.description_placeholders = Some(
            placeholders
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Ask the host to register the entry under `unique_id`
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Whether the flow is over after this result
    pub fn is_finished(&self) -> bool {
        self.result_type != FlowResultType::Form
    }
}
