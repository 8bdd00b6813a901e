//! Consensus rules: human majority, escalation and participant classification.

use serde::{Deserialize, Serialize};

use super::ReviewerVote;
use crate::domain::{Address, Assessment, Decision};

/// Outcome of counting resolved human votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Majority {
    Decided(Decision),
    Tie,
}

/// Strict majority of the resolved votes; equal counts (including zero) tie.
pub fn human_majority(votes: &[ReviewerVote]) -> Majority {
    let (pass, fail) = votes
        .iter()
        .filter_map(|v| v.vote.as_ref())
        .fold((0usize, 0usize), |(p, f), a| match a.decision {
            Decision::Pass => (p + 1, f),
            Decision::Fail => (p, f + 1),
        });

    match pass.cmp(&fail) {
        std::cmp::Ordering::Greater => Majority::Decided(Decision::Pass),
        std::cmp::Ordering::Less => Majority::Decided(Decision::Fail),
        std::cmp::Ordering::Equal => Majority::Tie,
    }
}

/// Whether the senior reviewer must break the tie or disagreement.
pub fn needs_escalation(majority: Majority, llm: Decision) -> bool {
    match majority {
        Majority::Tie => true,
        Majority::Decided(human) => human != llm,
    }
}

/// How the final verdict is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Humans and model agree; adopt the shared decision.
    Agreed(Assessment),
    /// The senior reviewer decided.
    Senior(Assessment),
    /// Disagreement or tie with no senior vote yet.
    AwaitSenior,
}

/// Resolve the final decision from the human votes, the model verdict and an
/// optional senior vote.
pub fn resolve(votes: &[ReviewerVote], llm: &Assessment, senior: Option<&Assessment>) -> Resolution {
    if !needs_escalation(human_majority(votes), llm.decision) {
        return Resolution::Agreed(llm.clone());
    }
    match senior {
        Some(senior) => Resolution::Senior(senior.clone()),
        None => Resolution::AwaitSenior,
    }
}

/// Participants split by agreement with the final decision.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub honest: Vec<Address>,
    pub negligent: Vec<Address>,
}

impl Classification {
    /// Every classified address, honest first.
    pub fn participants(&self) -> impl Iterator<Item = &Address> {
        self.honest.iter().chain(self.negligent.iter())
    }
}

/// Classify every participant with a resolved vote.
///
/// The participant set is the human reviewers who voted plus the senior
/// reviewer if they voted. An address is honest when every vote it cast
/// matches `final_decision`, otherwise negligent; each address appears once,
/// in first-vote order. Reviewers who never voted are in neither set.
pub fn classify(
    human_reviews: &[ReviewerVote],
    senior_review: &ReviewerVote,
    final_decision: Decision,
) -> Classification {
    let mut order: Vec<&Address> = Vec::new();
    let mut dissent: Vec<&Address> = Vec::new();

    for review in human_reviews.iter().chain(std::iter::once(senior_review)) {
        let Some(vote) = &review.vote else { continue };
        if !order.contains(&&review.address) {
            order.push(&review.address);
        }
        if vote.decision != final_decision && !dissent.contains(&&review.address) {
            dissent.push(&review.address);
        }
    }

    let (negligent, honest): (Vec<&Address>, Vec<&Address>) =
        order.into_iter().partition(|a| dissent.contains(a));

    Classification {
        honest: honest.into_iter().cloned().collect(),
        negligent: negligent.into_iter().cloned().collect(),
    }
}
