//! Form schemas
//!
//! A [`DataSchema`] describes the fields a form step accepts. The flow manager
//! validates submitted input against the schema of the form that was shown
//! before handing it to the step, the way Home Assistant runs user input
//! through the step's voluptuous schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::result::FlowInput;

/// Schema validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("required key not provided: {0}")]
    Required(String),

    #[error("extra keys not allowed: {0}")]
    ExtraKey(String),

    #[error("expected {expected} for '{field}'")]
    Invalid {
        field: String,
        expected: &'static str,
    },
}

/// Value type accepted by a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    /// Integer `>= 0`
    PositiveInt,
}

impl FieldType {
    /// Coerce a submitted value into this type
    fn coerce(self, field: &str, value: &Value) -> Result<Value, SchemaError> {
        let invalid = |expected| SchemaError::Invalid {
            field: field.to_string(),
            expected,
        };

        match self {
            FieldType::String => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                _ => Err(invalid("a string")),
            },
            FieldType::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) => Ok(Value::Bool(n.as_f64().map_or(false, |f| f != 0.0))),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" | "enable" => Ok(Value::Bool(true)),
                    "0" | "false" | "no" | "off" | "disable" => Ok(Value::Bool(false)),
                    _ => Err(invalid("a boolean")),
                },
                _ => Err(invalid("a boolean")),
            },
            FieldType::PositiveInt => {
                let number = match value {
                    Value::Number(n) => n
                        .as_i64()
                        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                match number {
                    Some(n) if n >= 0 => Ok(Value::from(n)),
                    _ => Err(invalid("a positive integer")),
                }
            }
        }
    }
}

/// Form field schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FormField {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Ordered list of form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSchema {
    fields: Vec<FormField>,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn required(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            field_type,
            required: Some(true),
            default: None,
        });
        self
    }

    /// Add an optional field without a default
    pub fn optional(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            field_type,
            required: Some(false),
            default: None,
        });
        self
    }

    /// Add an optional field that falls back to `default` when not submitted
    pub fn optional_with_default(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            field_type,
            required: Some(false),
            default: Some(default.into()),
        });
        self
    }

    /// Append the fields of another schema
    pub fn extend(mut self, other: DataSchema) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate submitted input, coercing values and filling defaults
    pub fn validate(&self, input: &FlowInput) -> Result<FlowInput, SchemaError> {
        if let Some(key) = input.keys().find(|k| self.field(k).is_none()) {
            return Err(SchemaError::ExtraKey(key.clone()));
        }

        let mut validated = FlowInput::new();
        for field in &self.fields {
            match input.get(&field.name) {
                Some(value) => {
                    let value = field.field_type.coerce(&field.name, value)?;
                    validated.insert(field.name.clone(), value);
                }
                None if field.is_required() => {
                    return Err(SchemaError::Required(field.name.clone()));
                }
                None => {
                    if let Some(default) = &field.default {
                        validated.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(validated)
    }
}
