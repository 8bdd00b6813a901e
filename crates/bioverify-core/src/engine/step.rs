//! Step and state contracts executed by [`super::WorkflowEngine`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::WorkflowResult;
use super::interrupt::Interrupt;
use crate::error::BioVerifyError;

/// What a step asks the engine to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step's effect succeeded; checkpoint and move on.
    Continue,
    /// Required input is missing; checkpoint and suspend on this step.
    Interrupt(Interrupt),
}

/// One unit of work in a workflow.
///
/// A step mutates the state in place. Its mutations are only persisted when
/// it returns `Ok`, so a failing step leaves the last checkpoint untouched.
#[async_trait]
pub trait Step<S>: Send + Sync {
    /// Stable name recorded on checkpoints.
    fn name(&self) -> &'static str;

    async fn execute(&self, state: &mut S) -> Result<StepOutcome, BioVerifyError>;
}

/// State carried through a workflow and serialized into checkpoints.
pub trait WorkflowState: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Input accepted when resuming an interrupted run.
    type Resume: Clone + Send + Sync;

    /// Merge resume input into the state.
    ///
    /// Must either apply all of `input` or return an error without changing
    /// `self`.
    fn apply_resume(&mut self, interrupt: &Interrupt, input: Self::Resume) -> WorkflowResult<()>;
}
