//! Steps of the review workflow.

use std::sync::Arc;

use async_trait::async_trait;
use bioverify_state::CheckpointStore;
use tracing::info;

use super::consensus::{classify, resolve, Resolution};
use super::ReviewState;
use crate::domain::Verdict;
use crate::engine::{Step, StepOutcome, WorkflowEngine};
use crate::error::{BioVerifyError, Result};
use crate::forensics;
use crate::ports::{Capabilities, ContentStore, EvidenceSearch, StructuredVerdict};
use crate::settlement::SettlementActions;

/// Checkpoint namespace of this workflow.
pub const REVIEW_WORKFLOW: &str = "review";

/// Build the review workflow:
/// `collect → llm_cross_check → escalate → finalize → settle`.
pub fn review_workflow(capabilities: &Capabilities, store: Arc<dyn CheckpointStore>) -> WorkflowEngine<ReviewState> {
    WorkflowEngine::new(REVIEW_WORKFLOW, store)
        .with_step(CollectVotes)
        .with_step(LlmCrossCheck {
            content: capabilities.content.clone(),
            search: capabilities.search.clone(),
            verdict: capabilities.verdict.clone(),
        })
        .with_step(Escalate)
        .with_step(Finalize)
        .with_step(SettleReview {
            settlement: capabilities.settlement.clone(),
        })
}

/// Suspends until quorum is met.
struct CollectVotes;

#[async_trait]
impl Step<ReviewState> for CollectVotes {
    fn name(&self) -> &'static str {
        "collect"
    }

    async fn execute(&self, state: &mut ReviewState) -> Result<StepOutcome> {
        if state.quorum_met() {
            info!(
                resolved = state.resolved_votes(),
                quorum = state.min_valid_reviews_count,
                "review quorum met"
            );
            return Ok(StepOutcome::Continue);
        }
        Ok(StepOutcome::Interrupt(state.review_interrupt()))
    }
}

/// Independent model verdict over the same evidence as the submission check.
struct LlmCrossCheck {
    content: Arc<dyn ContentStore>,
    search: Arc<dyn EvidenceSearch>,
    verdict: Arc<dyn StructuredVerdict>,
}

#[async_trait]
impl Step<ReviewState> for LlmCrossCheck {
    fn name(&self) -> &'static str {
        "llm_cross_check"
    }

    async fn execute(&self, state: &mut ReviewState) -> Result<StepOutcome> {
        let abstract_text = forensics::fetch_abstract(self.content.as_ref(), &state.root_cid).await?;
        let evidence = forensics::gather_evidence(self.search.as_ref(), &abstract_text).await?;
        let assessment = forensics::assess(self.verdict.as_ref(), &abstract_text, &evidence).await?;
        info!(decision = %assessment.decision, "model cross-check complete");
        state.llm_verdict = assessment.into();
        Ok(StepOutcome::Continue)
    }
}

/// Suspends for the senior reviewer on a tie or human/model disagreement.
struct Escalate;

#[async_trait]
impl Step<ReviewState> for Escalate {
    fn name(&self) -> &'static str {
        "escalate"
    }

    async fn execute(&self, state: &mut ReviewState) -> Result<StepOutcome> {
        let llm = state
            .llm_verdict
            .assessment()
            .ok_or_else(|| BioVerifyError::InvalidInput("model verdict missing before escalation".into()))?;

        match resolve(&state.human_reviews, &llm, state.senior_review.vote.as_ref()) {
            Resolution::AwaitSenior => {
                info!(senior = %state.senior_review.address, "escalating to senior reviewer");
                Ok(StepOutcome::Interrupt(state.senior_interrupt(&llm.reason)))
            }
            Resolution::Agreed(_) | Resolution::Senior(_) => Ok(StepOutcome::Continue),
        }
    }
}

/// Fixes the final verdict and classifies participants.
struct Finalize;

#[async_trait]
impl Step<ReviewState> for Finalize {
    fn name(&self) -> &'static str {
        "finalize"
    }

    async fn execute(&self, state: &mut ReviewState) -> Result<StepOutcome> {
        let llm = state
            .llm_verdict
            .assessment()
            .ok_or_else(|| BioVerifyError::InvalidInput("model verdict missing at finalization".into()))?;

        let final_assessment = match resolve(&state.human_reviews, &llm, state.senior_review.vote.as_ref()) {
            Resolution::Agreed(a) | Resolution::Senior(a) => a,
            Resolution::AwaitSenior => {
                return Err(BioVerifyError::InvalidInput(
                    "cannot finalize before the senior reviewer votes".into(),
                ))
            }
        };

        let classification = classify(
            &state.human_reviews,
            &state.senior_review,
            final_assessment.decision,
        );
        info!(
            decision = %final_assessment.decision,
            honest = classification.honest.len(),
            negligent = classification.negligent.len(),
            "review finalized"
        );
        state.final_verdict = final_assessment.into();
        state.classification = Some(classification);
        Ok(StepOutcome::Continue)
    }
}

/// Publish on pass, slash on fail.
struct SettleReview {
    settlement: Arc<dyn SettlementActions>,
}

#[async_trait]
impl Step<ReviewState> for SettleReview {
    fn name(&self) -> &'static str {
        "settle"
    }

    async fn execute(&self, state: &mut ReviewState) -> Result<StepOutcome> {
        let publication = state.publication();
        let classification = state
            .classification
            .as_ref()
            .ok_or_else(|| BioVerifyError::InvalidInput("participants not classified".into()))?;

        let tx = match &state.final_verdict {
            Verdict::Pass { reason } => {
                self.settlement
                    .publish(state.network, &publication, reason, classification)
                    .await?
            }
            Verdict::Fail { reason } => {
                self.settlement
                    .slash_publication(state.network, &publication, reason, classification)
                    .await?
            }
            Verdict::Pending => {
                return Err(BioVerifyError::InvalidInput(
                    "cannot settle a review without a final verdict".into(),
                ))
            }
        };
        state.settlement_tx = Some(tx);
        Ok(StepOutcome::Continue)
    }
}
