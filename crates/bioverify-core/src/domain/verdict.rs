//! Decisions, verdicts and the evidence they are based on.

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Minimum length, in characters, of any verdict reason.
pub const MIN_REASON_CHARS: usize = 15;

/// A resolved pass/fail decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pass,
    Fail,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            other => Err(format!("decision must be pass or fail, got {other:?}")),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision with its justification, from a reviewer or the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub decision: Decision,
    pub reason: String,
}

impl Assessment {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }

    /// Validate raw structured output against the verdict contract:
    /// `decision` is `"pass"` or `"fail"` and `reason` has at least
    /// [`MIN_REASON_CHARS`] characters.
    pub fn from_model_output(raw: &serde_json::Value) -> Result<Self, AdapterError> {
        let decision = raw
            .get("decision")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AdapterError::ContractViolation("verdict has no decision".into()))?;
        let decision = match decision {
            "pass" => Decision::Pass,
            "fail" => Decision::Fail,
            other => {
                return Err(AdapterError::ContractViolation(format!(
                    "decision must be \"pass\" or \"fail\", got {other:?}"
                )))
            }
        };

        let reason = raw
            .get("reason")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AdapterError::ContractViolation("verdict has no reason".into()))?;
        if reason.chars().count() < MIN_REASON_CHARS {
            return Err(AdapterError::ContractViolation(format!(
                "reason must be at least {MIN_REASON_CHARS} characters, got {}",
                reason.chars().count()
            )));
        }

        Ok(Self::new(decision, reason))
    }
}

/// Verdict field of a workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Pending,
    Pass {
        reason: String,
    },
    Fail {
        reason: String,
    },
}

impl Verdict {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::Pending => None,
            Self::Pass { .. } => Some(Decision::Pass),
            Self::Fail { .. } => Some(Decision::Fail),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Pass { reason } | Self::Fail { reason } => Some(reason),
        }
    }

    /// The resolved assessment, if any.
    pub fn assessment(&self) -> Option<Assessment> {
        match self {
            Self::Pending => None,
            Self::Pass { reason } => Some(Assessment::new(Decision::Pass, reason.clone())),
            Self::Fail { reason } => Some(Assessment::new(Decision::Fail, reason.clone())),
        }
    }
}

impl From<Assessment> for Verdict {
    fn from(value: Assessment) -> Self {
        match value.decision {
            Decision::Pass => Verdict::Pass {
                reason: value.reason,
            },
            Decision::Fail => Verdict::Fail {
                reason: value.reason,
            },
        }
    }
}

/// One forensic-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
