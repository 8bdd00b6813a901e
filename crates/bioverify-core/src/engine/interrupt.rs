//! Typed suspension markers.

use serde::{Deserialize, Serialize};

/// Why a workflow suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterruptKind {
    /// Waiting for human reviewers to reach quorum.
    ReviewPublication,
    /// Waiting for the senior reviewer to break a disagreement.
    SeniorReviewPublication,
}

impl InterruptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReviewPublication => "REVIEW_PUBLICATION",
            Self::SeniorReviewPublication => "SENIOR_REVIEW_PUBLICATION",
        }
    }
}

impl std::fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suspension raised by a step, persisted with the checkpoint.
///
/// The run holds no resources while interrupted; it continues only through
/// [`crate::engine::WorkflowEngine::resume`] with the same thread key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    pub kind: InterruptKind,
    pub payload: serde_json::Value,
}

impl Interrupt {
    pub fn new(kind: InterruptKind, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let i = Interrupt::new(InterruptKind::SeniorReviewPublication, json!({"x": 1}));
        let v = serde_json::to_value(&i).unwrap();
        assert_eq!(v["kind"], "SENIOR_REVIEW_PUBLICATION");
        let back: Interrupt = serde_json::from_value(v).unwrap();
        assert_eq!(back, i);
    }
}
