//! Flow Manager
//!
//! Keeps in-progress flows alive between user interactions and dispatches
//! each submission to the step whose form was shown last.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{FlowError, FlowStepResult};
use crate::handler::FlowHandler;
use crate::result::{FlowInput, FlowResult};
use crate::schema::DataSchema;

/// State of a flow waiting for input
struct ActiveFlow {
    /// Flow handler instance
    handler: Box<dyn FlowHandler>,
    /// Step whose form is currently shown
    step_id: String,
    /// Schema of the form currently shown
    data_schema: DataSchema,
}

struct FlowSlot {
    /// Integration domain
    handler: String,
    /// Serializes steps of one flow
    state: Arc<Mutex<ActiveFlow>>,
}

/// Summary of an in-progress flow
#[derive(Debug, Clone, Serialize)]
pub struct FlowProgress {
    pub flow_id: String,
    pub handler: String,
    /// `None` while a step is running
    pub step_id: Option<String>,
}

/// Manages in-progress flows
///
/// Different flows progress independently; within one flow at most one step
/// runs at a time.
#[derive(Default)]
pub struct FlowManager {
    flows: DashMap<String, FlowSlot>,
}

impl FlowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a flow at `step_id`
    ///
    /// `data` is passed to the first step as its input (e.g. import data);
    /// it is not schema-validated.
    pub async fn async_init(
        &self,
        mut handler: Box<dyn FlowHandler>,
        step_id: &str,
        data: Option<FlowInput>,
    ) -> FlowStepResult {
        let flow_id = Ulid::new().to_string();
        let domain = handler.handler().to_string();
        debug!("Starting flow {} for {} at step {}", flow_id, domain, step_id);

        let mut result = handler.async_step(step_id, data).await?;
        result.flow_id = flow_id.clone();
        result.handler = domain.clone();

        if !result.is_finished() {
            let active = ActiveFlow {
                handler,
                step_id: result
                    .step_id
                    .clone()
                    .unwrap_or_else(|| step_id.to_string()),
                data_schema: result.data_schema.clone(),
            };
            self.flows.insert(
                flow_id,
                FlowSlot {
                    handler: domain,
                    state: Arc::new(Mutex::new(active)),
                },
            );
        }

        Ok(result)
    }

    /// Submit user input to a flow
    pub async fn async_configure(&self, flow_id: &str, user_input: FlowInput) -> FlowStepResult {
        let state = self
            .flows
            .get(flow_id)
            .map(|slot| slot.state.clone())
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.to_string()))?;

        let mut flow = state.lock().await;

        // Finished or aborted while we waited for the lock
        if !self.flows.contains_key(flow_id) {
            return Err(FlowError::UnknownFlow(flow_id.to_string()));
        }

        let step_id = flow.step_id.clone();
        let validated = flow
            .data_schema
            .validate(&user_input)
            .map_err(|source| FlowError::InvalidInput {
                step_id: step_id.clone(),
                source,
            })?;

        debug!("Flow {} running step {}", flow_id, step_id);
        let mut result = match flow.handler.async_step(&step_id, Some(validated)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Flow {} failed in step {}: {}", flow_id, step_id, e);
                self.flows.remove(flow_id);
                return Err(e);
            }
        };

        result.flow_id = flow_id.to_string();
        result.handler = flow.handler.handler().to_string();

        if result.is_finished() {
            self.flows.remove(flow_id);
            debug!("Flow {} finished: {:?}", flow_id, result.result_type);
        } else {
            if let Some(ref next) = result.step_id {
                flow.step_id = next.clone();
            }
            flow.data_schema = result.data_schema.clone();
        }

        Ok(result)
    }

    /// Discard a flow and its pending state
    pub fn async_abort(&self, flow_id: &str) -> Result<(), FlowError> {
        if self.flows.remove(flow_id).is_none() {
            return Err(FlowError::UnknownFlow(flow_id.to_string()));
        }
        debug!("Aborted flow {}", flow_id);
        Ok(())
    }

    /// List flows waiting for input
    pub fn async_progress(&self) -> Vec<FlowProgress> {
        self.flows
            .iter()
            .map(|r| FlowProgress {
                flow_id: r.key().clone(),
                handler: r.value().handler.clone(),
                step_id: r
                    .value()
                    .state
                    .try_lock()
                    .ok()
                    .map(|flow| flow.step_id.clone()),
            })
            .collect()
    }

    /// Check whether a flow is still in progress
    pub fn contains(&self, flow_id: &str) -> bool {
        self.flows.contains_key(flow_id)
    }

    /// Number of flows in progress
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
