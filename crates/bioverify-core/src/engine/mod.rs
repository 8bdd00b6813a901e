//! Durable workflow engine.
//!
//! Runs a named sequence of [`Step`]s against a serializable state,
//! appending a checkpoint to a [`bioverify_state::CheckpointStore`] after
//! every completed step:
//!
//! - **Idempotent re-entry**: `run` on a thread that already has
//!   checkpoints continues from the newest one instead of starting over.
//! - **Suspend/resume**: a step may raise an [`Interrupt`]; the run returns
//!   immediately holding nothing, and `resume` later merges new input and
//!   re-executes the suspended step.
//! - **Failure isolation**: a failing step aborts the run and leaves the
//!   previous checkpoint as the retry point.

pub mod error;
pub mod interrupt;
pub mod runner;
pub mod step;

pub use error::{WorkflowError, WorkflowResult};
pub use interrupt::{Interrupt, InterruptKind};
pub use runner::{RunOutcome, WorkflowEngine};
pub use step::{Step, StepOutcome, WorkflowState};
