//! Data Entry Flows
//!
//! This crate provides the step-based flow machinery that config flows and
//! options flows are built on.
//!
//! # Key Types
//!
//! - [`FlowHandler`] - A flow implementation, one async step per interaction
//! - [`FlowResult`] - Declarative result of a step (form, create entry, abort)
//! - [`DataSchema`] - Fields of a form, with input validation
//! - [`FlowManager`] - Keeps in-progress flows and dispatches submissions

pub mod error;
pub mod handler;
pub mod manager;
pub mod result;
pub mod schema;

pub use error::{FlowError, FlowStepResult};
pub use handler::FlowHandler;
pub use manager::{FlowManager, FlowProgress};
pub use result::{FlowInput, FlowResult, FlowResultType};
pub use schema::{DataSchema, FieldType, FormField, SchemaError};
