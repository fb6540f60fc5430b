//! Flow handler trait

use async_trait::async_trait;

use crate::error::FlowStepResult;
use crate::result::FlowInput;

/// A step-based flow
///
/// The flow manager owns the handler for the lifetime of one flow and calls
/// [`FlowHandler::async_step`] once per user interaction. Anything the flow
/// needs to remember between steps lives on the handler itself.
#[async_trait]
pub trait FlowHandler: Send {
    /// Integration domain this flow belongs to
    fn handler(&self) -> &str;

    /// Run `step_id` with the (already validated) user input
    ///
    /// `user_input` is `None` when the step is entered for the first time.
    async fn async_step(&mut self, step_id: &str, user_input: Option<FlowInput>)
        -> FlowStepResult;
}
