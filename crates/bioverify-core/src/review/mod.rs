//! Review Consensus & Settlement workflow.
//!
//! Collects human reviewer votes until quorum, cross-checks them against an
//! independent model verdict, escalates ties and disagreements to the senior
//! reviewer, classifies participants as honest or negligent, and settles
//! on-chain.
//!
//! Both suspension points are [`crate::engine::Interrupt`]s; votes arrive
//! later as [`ReviewResume`] input through `WorkflowEngine::resume`.

pub mod consensus;
pub mod steps;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

pub use consensus::{classify, human_majority, needs_escalation, resolve, Classification, Majority, Resolution};
pub use steps::{review_workflow, REVIEW_WORKFLOW};

use crate::domain::{
    Address, Assessment, Network, PublicationId, PublicationRef, ThreadKey, Verdict, MIN_REASON_CHARS,
};
use crate::engine::{Interrupt, InterruptKind, WorkflowError, WorkflowResult, WorkflowState};
use crate::error::BioVerifyError;

/// A selected participant and their vote, absent until they respond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerVote {
    pub address: Address,
    #[serde(default)]
    pub vote: Option<Assessment>,
}

impl ReviewerVote {
    pub fn pending(address: Address) -> Self {
        Self {
            address,
            vote: None,
        }
    }

    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }
}

/// Parameters of a review run, as emitted by the reviewer-selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub network: Network,
    pub publication: PublicationRef,
    pub reviewers: Vec<Address>,
    pub senior_reviewer: Address,
    pub min_valid_reviews_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub network: Network,
    pub publication_id: PublicationId,
    pub root_cid: String,
    pub min_valid_reviews_count: u32,
    pub human_reviews: Vec<ReviewerVote>,
    #[serde(default)]
    pub llm_verdict: Verdict,
    pub senior_review: ReviewerVote,
    #[serde(default)]
    pub final_verdict: Verdict,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub settlement_tx: Option<String>,
}

impl ReviewState {
    /// Validate the input and build the initial state.
    ///
    /// Reviewers are deduplicated keeping first occurrence; the quorum must
    /// lie in `1..=reviewers`.
    pub fn new(input: ReviewInput) -> Result<Self, BioVerifyError> {
        let mut seen = HashSet::new();
        let reviewers: Vec<Address> = input
            .reviewers
            .into_iter()
            .filter(|a| seen.insert(a.clone()))
            .collect();

        if reviewers.is_empty() {
            return Err(BioVerifyError::InvalidInput(
                "a review needs at least one reviewer".into(),
            ));
        }
        let quorum = input.min_valid_reviews_count;
        if quorum == 0 || quorum > reviewers.len() as u64 {
            return Err(BioVerifyError::InvalidInput(format!(
                "quorum {quorum} must be between 1 and {} reviewers",
                reviewers.len()
            )));
        }

        Ok(Self {
            network: input.network,
            publication_id: input.publication.publication_id,
            root_cid: input.publication.root_cid,
            // bounded by reviewers.len() above
            min_valid_reviews_count: quorum as u32,
            human_reviews: reviewers.into_iter().map(ReviewerVote::pending).collect(),
            llm_verdict: Verdict::Pending,
            senior_review: ReviewerVote::pending(input.senior_reviewer),
            final_verdict: Verdict::Pending,
            classification: None,
            settlement_tx: None,
        })
    }

    pub fn publication(&self) -> PublicationRef {
        PublicationRef::new(self.publication_id, self.root_cid.clone())
    }

    pub fn thread_key(&self) -> ThreadKey {
        self.publication().thread_key()
    }

    pub fn resolved_votes(&self) -> usize {
        self.human_reviews.iter().filter(|r| r.has_voted()).count()
    }

    pub fn quorum_met(&self) -> bool {
        self.resolved_votes() >= self.min_valid_reviews_count as usize
    }

    /// Reviewers who have not voted yet.
    pub fn pending_reviewers(&self) -> Vec<Address> {
        self.human_reviews
            .iter()
            .filter(|r| !r.has_voted())
            .map(|r| r.address.clone())
            .collect()
    }

    pub(crate) fn review_interrupt(&self) -> Interrupt {
        Interrupt::new(
            InterruptKind::ReviewPublication,
            json!({
                "threadKey": self.thread_key(),
                "publicationId": self.publication_id,
                "rootCid": self.root_cid,
                "pendingReviewers": self.pending_reviewers(),
                "resolvedVotes": self.resolved_votes(),
                "minValidReviewsCount": self.min_valid_reviews_count,
            }),
        )
    }

    pub(crate) fn senior_interrupt(&self, llm_reason: &str) -> Interrupt {
        Interrupt::new(
            InterruptKind::SeniorReviewPublication,
            json!({
                "threadKey": self.thread_key(),
                "publicationId": self.publication_id,
                "rootCid": self.root_cid,
                "seniorReviewer": self.senior_review.address,
                "llmVerdictReason": llm_reason,
            }),
        )
    }

    fn apply_votes(&mut self, votes: Vec<CastVote>) -> WorkflowResult<()> {
        if votes.is_empty() {
            return Err(WorkflowError::InvalidResume("no votes supplied".into()));
        }

        // validate the whole batch before touching state
        let mut batch = HashSet::new();
        for cast in &votes {
            let review = self
                .human_reviews
                .iter()
                .find(|r| r.address == cast.address)
                .ok_or_else(|| {
                    WorkflowError::InvalidResume(format!(
                        "{} is not a selected reviewer",
                        cast.address
                    ))
                })?;
            if review.has_voted() || !batch.insert(cast.address.clone()) {
                return Err(WorkflowError::InvalidResume(format!(
                    "duplicate vote from {}",
                    cast.address
                )));
            }
            cast.check_reason()?;
        }

        for cast in votes {
            if let Some(review) = self
                .human_reviews
                .iter_mut()
                .find(|r| r.address == cast.address)
            {
                review.vote = Some(cast.assessment);
            }
        }
        Ok(())
    }

    fn apply_senior_vote(&mut self, cast: CastVote) -> WorkflowResult<()> {
        if cast.address != self.senior_review.address {
            return Err(WorkflowError::InvalidResume(format!(
                "{} is not the senior reviewer",
                cast.address
            )));
        }
        if self.senior_review.has_voted() {
            return Err(WorkflowError::InvalidResume(format!(
                "duplicate vote from {}",
                cast.address
            )));
        }
        cast.check_reason()?;
        self.senior_review.vote = Some(cast.assessment);
        Ok(())
    }
}

/// A vote delivered out-of-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub address: Address,
    #[serde(flatten)]
    pub assessment: Assessment,
}

impl CastVote {
    pub fn new(address: Address, assessment: Assessment) -> Self {
        Self {
            address,
            assessment,
        }
    }

    /// Human reasons are held to the same length floor as model verdicts.
    fn check_reason(&self) -> WorkflowResult<()> {
        let len = self.assessment.reason.trim().chars().count();
        if len < MIN_REASON_CHARS {
            return Err(WorkflowError::InvalidResume(format!(
                "reason from {} must be at least {MIN_REASON_CHARS} characters, got {len}",
                self.address
            )));
        }
        Ok(())
    }
}

/// Input that resumes a suspended review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewResume {
    /// Human votes for a run waiting on `REVIEW_PUBLICATION`.
    Votes(Vec<CastVote>),
    /// The senior vote for a run waiting on `SENIOR_REVIEW_PUBLICATION`.
    SeniorVote(CastVote),
}

impl ReviewResume {
    pub fn expected_interrupt(&self) -> InterruptKind {
        match self {
            Self::Votes(_) => InterruptKind::ReviewPublication,
            Self::SeniorVote(_) => InterruptKind::SeniorReviewPublication,
        }
    }
}

impl WorkflowState for ReviewState {
    type Resume = ReviewResume;

    fn apply_resume(&mut self, interrupt: &Interrupt, input: ReviewResume) -> WorkflowResult<()> {
        let expected = input.expected_interrupt();
        if interrupt.kind != expected {
            return Err(WorkflowError::WrongInterrupt {
                expected,
                found: interrupt.kind,
            });
        }
        match input {
            ReviewResume::Votes(votes) => self.apply_votes(votes),
            ReviewResume::SeniorVote(cast) => self.apply_senior_vote(cast),
        }
    }
}
