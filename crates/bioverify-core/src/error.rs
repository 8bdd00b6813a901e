//! Error taxonomy for BioVerify orchestration.
//!
//! [`BioVerifyError`] is the error every workflow step, webhook check and
//! settlement call returns. Notification failures have their own type
//! ([`crate::ports::NotificationError`]) which deliberately has no
//! conversion into [`BioVerifyError`]: it is caught and logged where it occurs.

use crate::settlement::{SettlementAction, SettlementPhase};

/// Failure of an external capability (gateway, search, model, chain).
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{target} responded with HTTP {status}")]
    Http { target: String, status: u16 },

    #[error("request to {target} failed: {message}")]
    Transport { target: String, message: String },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("could not decode response from {target}: {message}")]
    Decode { target: String, message: String },

    /// The adapter answered, but outside its declared contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

/// BioVerify domain errors.
#[derive(Debug, thiserror::Error)]
pub enum BioVerifyError {
    /// Missing or unusable configuration (secret, key, endpoint).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request could not be authenticated.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A chain event or payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("settlement action {action} failed during {phase}: {source}")]
    Settlement {
        action: SettlementAction,
        phase: SettlementPhase,
        #[source]
        source: AdapterError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BioVerifyError {
    /// Whether the failure came from a downstream adapter (including contract
    /// violations and settlement calls).
    pub fn is_adapter_failure(&self) -> bool {
        matches!(self, Self::Adapter(_) | Self::Settlement { .. })
    }
}

/// Result type for BioVerify domain operations.
pub type Result<T> = std::result::Result<T, BioVerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_error_names_action_and_phase() {
        let err = BioVerifyError::Settlement {
            action: SettlementAction::SlashPublisher,
            phase: SettlementPhase::Simulate,
            source: AdapterError::Rpc {
                code: 3,
                message: "execution reverted".into(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("slash_publisher"));
        assert!(text.contains("simulate"));
        assert!(text.contains("execution reverted"));
        assert!(err.is_adapter_failure());
    }

    #[test]
    fn test_contract_violation_is_adapter_error() {
        let err: BioVerifyError =
            AdapterError::ContractViolation("decision must be pass or fail".into()).into();
        assert!(matches!(
            err,
            BioVerifyError::Adapter(AdapterError::ContractViolation(_))
        ));
        assert!(err.is_adapter_failure());
    }

    #[test]
    fn test_configuration_error_is_not_adapter_failure() {
        let err = BioVerifyError::Configuration("no webhook secrets".into());
        assert!(!err.is_adapter_failure());
        assert!(err.to_string().contains("configuration error"));
    }
}
