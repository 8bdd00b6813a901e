//! Checkpointed step runner with suspend/resume.

use std::sync::Arc;

use bioverify_state::{Checkpoint, CheckpointStatus, CheckpointStore};
use tracing::{debug, info};

use super::error::{WorkflowError, WorkflowResult};
use super::interrupt::Interrupt;
use super::step::{Step, StepOutcome, WorkflowState};
use crate::domain::ThreadKey;
use crate::metrics::METRICS;
use crate::obs::{
    emit_run_completed, emit_run_failed, emit_run_interrupted, emit_run_started,
    emit_step_checkpointed, RunSpan,
};

/// Result of a `run` or `resume` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<S> {
    /// Every step completed.
    Completed(S),
    /// A step suspended the run.
    Interrupted { state: S, interrupt: Interrupt },
}

impl<S> RunOutcome<S> {
    pub fn state(&self) -> &S {
        match self {
            Self::Completed(state) | Self::Interrupted { state, .. } => state,
        }
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        match self {
            Self::Completed(_) => None,
            Self::Interrupted { interrupt, .. } => Some(interrupt),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A named, ordered list of steps bound to a checkpoint store.
///
/// Each completed step is checkpointed before the next one starts, keyed by
/// `(name, thread_key)`. Running a thread again continues from its newest
/// checkpoint, so a step whose checkpoint exists is never executed twice.
pub struct WorkflowEngine<S: WorkflowState> {
    name: &'static str,
    steps: Vec<Arc<dyn Step<S>>>,
    store: Arc<dyn CheckpointStore>,
}

impl<S: WorkflowState> WorkflowEngine<S> {
    pub fn new(name: &'static str, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            name,
            steps: Vec::new(),
            store,
        }
    }

    /// Append a step to the pipeline.
    pub fn with_step(mut self, step: impl Step<S> + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Start a fresh run, or continue the existing one for `thread_key`.
    ///
    /// An interrupted thread returns its stored interrupt without executing
    /// anything, and a completed thread returns its final state.
    pub async fn run(&self, initial: S, thread_key: &ThreadKey) -> WorkflowResult<RunOutcome<S>> {
        let _span = RunSpan::enter(self.name, thread_key.as_str());

        let Some(latest) = self.store.latest(self.name, thread_key.as_str()).await? else {
            emit_run_started(self.name, thread_key.as_str());
            return self.drive(initial, 0, 0, thread_key).await;
        };

        match latest.status {
            CheckpointStatus::Completed => {
                debug!(seq = latest.seq, "thread already completed, nothing to run");
                Ok(RunOutcome::Completed(serde_json::from_value(latest.state)?))
            }
            CheckpointStatus::Interrupted => {
                let interrupt = stored_interrupt(&latest)?;
                debug!(kind = %interrupt.kind, "thread is suspended, waiting for resume");
                Ok(RunOutcome::Interrupted {
                    state: serde_json::from_value(latest.state)?,
                    interrupt,
                })
            }
            CheckpointStatus::InProgress => {
                info!(
                    next_step = latest.next_step,
                    seq = latest.seq,
                    "continuing run from checkpoint"
                );
                let state = serde_json::from_value(latest.state)?;
                self.drive(state, latest.next_step as usize, latest.seq + 1, thread_key)
                    .await
            }
        }
    }

    /// Merge `input` into an interrupted thread and continue from the step
    /// that suspended. Resuming a completed thread is a no-op.
    pub async fn resume(&self, thread_key: &ThreadKey, input: S::Resume) -> WorkflowResult<RunOutcome<S>> {
        let _span = RunSpan::enter(self.name, thread_key.as_str());
        let latest = self.load(thread_key).await?;

        match latest.status {
            CheckpointStatus::Completed => {
                debug!(seq = latest.seq, "thread already completed, resume is a no-op");
                Ok(RunOutcome::Completed(serde_json::from_value(latest.state)?))
            }
            CheckpointStatus::InProgress => Err(self.not_interrupted(thread_key, latest.status)),
            CheckpointStatus::Interrupted => {
                let interrupt = stored_interrupt(&latest)?;
                let mut state: S = serde_json::from_value(latest.state)?;
                state.apply_resume(&interrupt, input)?;
                info!(kind = %interrupt.kind, next_step = latest.next_step, "resuming run");
                self.drive(state, latest.next_step as usize, latest.seq + 1, thread_key)
                    .await
            }
        }
    }

    /// Check that `input` would be accepted by [`Self::resume`] without
    /// writing anything.
    pub async fn check_resume(&self, thread_key: &ThreadKey, input: S::Resume) -> WorkflowResult<()> {
        let latest = self.load(thread_key).await?;
        if latest.status != CheckpointStatus::Interrupted {
            return Err(self.not_interrupted(thread_key, latest.status));
        }
        let interrupt = stored_interrupt(&latest)?;
        let mut state: S = serde_json::from_value(latest.state)?;
        state.apply_resume(&interrupt, input)
    }

    /// Continue a thread whose last run failed part-way.
    ///
    /// Only an in-progress thread can be retried. The failed step runs again
    /// on the state of the newest checkpoint; steps before it are not repeated.
    pub async fn retry(&self, thread_key: &ThreadKey) -> WorkflowResult<RunOutcome<S>> {
        let _span = RunSpan::enter(self.name, thread_key.as_str());
        let latest = self.load_retryable(thread_key).await?;
        info!(
            next_step = latest.next_step,
            seq = latest.seq,
            "retrying run from checkpoint"
        );
        let state = serde_json::from_value(latest.state)?;
        self.drive(state, latest.next_step as usize, latest.seq + 1, thread_key)
            .await
    }

    /// Check that [`Self::retry`] would pick the thread up, without running
    /// anything.
    pub async fn check_retry(&self, thread_key: &ThreadKey) -> WorkflowResult<()> {
        self.load_retryable(thread_key).await.map(|_| ())
    }

    /// Newest checkpoint of a thread.
    pub async fn latest(&self, thread_key: &ThreadKey) -> WorkflowResult<Option<Checkpoint>> {
        Ok(self.store.latest(self.name, thread_key.as_str()).await?)
    }

    /// Full checkpoint trail of a thread, oldest first.
    pub async fn history(&self, thread_key: &ThreadKey) -> WorkflowResult<Vec<Checkpoint>> {
        Ok(self.store.history(self.name, thread_key.as_str()).await?)
    }

    async fn load(&self, thread_key: &ThreadKey) -> WorkflowResult<Checkpoint> {
        self.store
            .latest(self.name, thread_key.as_str())
            .await?
            .ok_or_else(|| WorkflowError::ThreadNotFound {
                workflow: self.name.to_string(),
                thread_key: thread_key.to_string(),
            })
    }

    async fn load_retryable(&self, thread_key: &ThreadKey) -> WorkflowResult<Checkpoint> {
        let latest = self.load(thread_key).await?;
        if latest.status != CheckpointStatus::InProgress {
            return Err(WorkflowError::NotRetryable {
                workflow: self.name.to_string(),
                thread_key: thread_key.to_string(),
                status: latest.status,
            });
        }
        Ok(latest)
    }

    fn not_interrupted(&self, thread_key: &ThreadKey, status: CheckpointStatus) -> WorkflowError {
        WorkflowError::NotInterrupted {
            workflow: self.name.to_string(),
            thread_key: thread_key.to_string(),
            status,
        }
    }

    async fn drive(
        &self,
        mut state: S,
        start: usize,
        mut seq: u64,
        thread_key: &ThreadKey,
    ) -> WorkflowResult<RunOutcome<S>> {
        let mut executed = 0u64;

        for (index, step) in self.steps.iter().enumerate().skip(start) {
            let outcome = match step.execute(&mut state).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    emit_run_failed(self.name, thread_key.as_str(), step.name(), &source);
                    return Err(WorkflowError::Step {
                        step: step.name(),
                        source,
                    });
                }
            };
            executed += 1;

            match outcome {
                StepOutcome::Continue => {
                    let next_step = index + 1;
                    let status = if next_step == self.steps.len() {
                        CheckpointStatus::Completed
                    } else {
                        CheckpointStatus::InProgress
                    };
                    self.checkpoint(thread_key, seq, next_step, step.name(), status, &state, None)
                        .await?;
                    seq += 1;
                }
                StepOutcome::Interrupt(interrupt) => {
                    self.checkpoint(
                        thread_key,
                        seq,
                        index,
                        step.name(),
                        CheckpointStatus::Interrupted,
                        &state,
                        Some(&interrupt),
                    )
                    .await?;
                    METRICS.inc_interrupts();
                    emit_run_interrupted(self.name, thread_key.as_str(), interrupt.kind.as_str());
                    return Ok(RunOutcome::Interrupted { state, interrupt });
                }
            }
        }

        emit_run_completed(self.name, thread_key.as_str(), executed);
        Ok(RunOutcome::Completed(state))
    }

    #[allow(clippy::too_many_arguments)]
    async fn checkpoint(
        &self,
        thread_key: &ThreadKey,
        seq: u64,
        next_step: usize,
        step_name: &str,
        status: CheckpointStatus,
        state: &S,
        interrupt: Option<&Interrupt>,
    ) -> WorkflowResult<()> {
        let interrupt = interrupt.map(serde_json::to_value).transpose()?;
        let checkpoint = Checkpoint::new(
            self.name,
            thread_key.as_str(),
            seq,
            next_step as u32,
            step_name,
            status,
            serde_json::to_value(state)?,
            interrupt,
        )?;
        self.store.append(checkpoint).await?;
        METRICS.inc_steps_checkpointed();
        emit_step_checkpointed(self.name, thread_key.as_str(), step_name, seq);
        Ok(())
    }
}

fn stored_interrupt(checkpoint: &Checkpoint) -> WorkflowResult<Interrupt> {
    let raw = checkpoint.interrupt.clone().ok_or_else(|| {
        WorkflowError::InvalidResume(format!(
            "checkpoint {} is interrupted but carries no interrupt",
            checkpoint.seq
        ))
    })?;
    Ok(serde_json::from_value(raw)?)
}
