//! Flow errors

use thiserror::Error;

use crate::result::FlowResult;
use crate::schema::SchemaError;

/// Errors surfaced to the host while running a flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Flow not found: {0}")]
    UnknownFlow(String),

    #[error("No flow handler registered for {0}")]
    UnknownHandler(String),

    #[error("Handler {handler} has no step {step_id}")]
    UnknownStep { handler: String, step_id: String },

    #[error("Invalid input for step {step_id}: {source}")]
    InvalidInput {
        step_id: String,
        #[source]
        source: SchemaError,
    },

    /// Unexpected failure inside a step
    #[error("Flow handler error: {0}")]
    Handler(String),
}

/// Result of running a single flow step
pub type FlowStepResult = Result<FlowResult, FlowError>;
