//! Submission Verification workflow.
//!
//! Linear and fully automated: fetch the abstract, search for prior
//! publications of it, ask the model for a verdict, then either slash the
//! publisher (fail) or advance the publication to peer review (pass).

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use bioverify_state::CheckpointStore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{EvidenceSource, Network, PublicationId, PublicationRef, ThreadKey, Verdict};
use crate::engine::{Interrupt, Step, StepOutcome, WorkflowEngine, WorkflowResult, WorkflowState};
use crate::error::{BioVerifyError, Result};
use crate::forensics;
use crate::ports::{Capabilities, ContentStore, EvidenceSearch, StructuredVerdict};
use crate::settlement::SettlementActions;

/// Checkpoint namespace of this workflow.
pub const SUBMISSION_WORKFLOW: &str = "submission";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionState {
    pub network: Network,
    pub publication_id: PublicationId,
    pub root_cid: String,
    #[serde(default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub evidence_sources: Vec<EvidenceSource>,
    #[serde(default)]
    pub verdict: Verdict,
    /// Hash of the settlement transaction, once submitted.
    #[serde(default)]
    pub settlement_tx: Option<String>,
}

impl SubmissionState {
    pub fn new(network: Network, publication: PublicationRef) -> Self {
        Self {
            network,
            publication_id: publication.publication_id,
            root_cid: publication.root_cid,
            abstract_text: None,
            evidence_sources: Vec::new(),
            verdict: Verdict::Pending,
            settlement_tx: None,
        }
    }

    pub fn publication(&self) -> PublicationRef {
        PublicationRef::new(self.publication_id, self.root_cid.clone())
    }

    pub fn thread_key(&self) -> ThreadKey {
        self.publication().thread_key()
    }

    /// Terminal once a decision has been reached.
    pub fn is_decided(&self) -> bool {
        !self.verdict.is_pending()
    }
}

impl WorkflowState for SubmissionState {
    type Resume = Infallible;

    fn apply_resume(&mut self, _interrupt: &Interrupt, input: Infallible) -> WorkflowResult<()> {
        match input {}
    }
}

/// Build the submission workflow: `fetch → search → verdict → settle`.
pub fn submission_workflow(
    capabilities: &Capabilities,
    store: Arc<dyn CheckpointStore>,
) -> WorkflowEngine<SubmissionState> {
    WorkflowEngine::new(SUBMISSION_WORKFLOW, store)
        .with_step(FetchAbstract {
            content: capabilities.content.clone(),
        })
        .with_step(SearchEvidence {
            search: capabilities.search.clone(),
        })
        .with_step(RequestVerdict {
            verdict: capabilities.verdict.clone(),
        })
        .with_step(SettleSubmission {
            settlement: capabilities.settlement.clone(),
        })
}

struct FetchAbstract {
    content: Arc<dyn ContentStore>,
}

#[async_trait]
impl Step<SubmissionState> for FetchAbstract {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn execute(&self, state: &mut SubmissionState) -> Result<StepOutcome> {
        let text = forensics::fetch_abstract(self.content.as_ref(), &state.root_cid).await?;
        state.abstract_text = Some(text);
        Ok(StepOutcome::Continue)
    }
}

struct SearchEvidence {
    search: Arc<dyn EvidenceSearch>,
}

#[async_trait]
impl Step<SubmissionState> for SearchEvidence {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn execute(&self, state: &mut SubmissionState) -> Result<StepOutcome> {
        let abstract_text = state.abstract_text.as_deref().unwrap_or_default();
        state.evidence_sources = forensics::gather_evidence(self.search.as_ref(), abstract_text).await?;
        Ok(StepOutcome::Continue)
    }
}

struct RequestVerdict {
    verdict: Arc<dyn StructuredVerdict>,
}

#[async_trait]
impl Step<SubmissionState> for RequestVerdict {
    fn name(&self) -> &'static str {
        "verdict"
    }

    async fn execute(&self, state: &mut SubmissionState) -> Result<StepOutcome> {
        let abstract_text = state.abstract_text.as_deref().unwrap_or_default();
        let assessment =
            forensics::assess(self.verdict.as_ref(), abstract_text, &state.evidence_sources).await?;
        info!(decision = %assessment.decision, "submission verdict reached");
        state.verdict = assessment.into();
        Ok(StepOutcome::Continue)
    }
}

struct SettleSubmission {
    settlement: Arc<dyn SettlementActions>,
}

#[async_trait]
impl Step<SubmissionState> for SettleSubmission {
    fn name(&self) -> &'static str {
        "settle"
    }

    async fn execute(&self, state: &mut SubmissionState) -> Result<StepOutcome> {
        let publication = state.publication();
        let tx = match &state.verdict {
            Verdict::Fail { reason } => {
                self.settlement
                    .slash_publisher(state.network, &publication, reason)
                    .await?
            }
            Verdict::Pass { .. } => {
                self.settlement
                    .advance_to_review(state.network, &publication)
                    .await?
            }
            Verdict::Pending => {
                return Err(BioVerifyError::InvalidInput(
                    "cannot settle a submission without a verdict".into(),
                ))
            }
        };
        state.settlement_tx = Some(tx);
        Ok(StepOutcome::Continue)
    }
}
