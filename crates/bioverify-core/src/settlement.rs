//! Chain settlement actions.
//!
//! Every action selects the network's chain client and contract, simulates
//! the call, submits it, then sends a best-effort notification. Simulation
//! or submission failures surface as [`BioVerifyError::Settlement`] naming
//! the action; notification failures are logged and counted only.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abi::{self, Token};
use crate::config::{ContractConfig, NetworkRegistry, SettlementFunctions};
use crate::domain::{Address, Network, PublicationRef};
use crate::error::{BioVerifyError, Result};
use crate::metrics::METRICS;
use crate::obs::{emit_notification_failed, emit_settlement_submitted};
use crate::ports::{ChainClient, ContractCall, Notifier};
use crate::review::Classification;

/// Reason length kept in a submission-slash notification.
pub const SLASH_REASON_CHARS: usize = 1000;
/// Reason length kept in a review-settlement notification.
pub const REVIEW_REASON_CHARS: usize = 500;

/// On-chain settlement actions the workflows invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementAction {
    /// Submission failed the originality check.
    SlashPublisher,
    /// Submission passed; start reviewer selection.
    AdvanceToReview,
    /// Review concluded pass.
    Publish,
    /// Review concluded fail.
    SlashPublication,
}

impl SettlementAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SlashPublisher => "slash_publisher",
            Self::AdvanceToReview => "advance_to_review",
            Self::Publish => "publish",
            Self::SlashPublication => "slash_publication",
        }
    }

    /// Canonical function signature under the configured names.
    pub fn signature(self, functions: &SettlementFunctions) -> String {
        match self {
            Self::SlashPublisher => format!("{}(uint256)", functions.slash_publisher),
            Self::AdvanceToReview => format!("{}(uint256)", functions.pick_reviewers),
            Self::Publish => format!("{}(uint256,address[],address[])", functions.publish),
            Self::SlashPublication => {
                format!("{}(uint256,address[],address[])", functions.slash_publication)
            }
        }
    }
}

impl std::fmt::Display for SettlementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of a settlement call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPhase {
    Simulate,
    Submit,
}

impl std::fmt::Display for SettlementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Simulate => "simulate",
            Self::Submit => "submit",
        })
    }
}

/// Settlement calls made by the workflows. Each returns the transaction hash.
#[async_trait]
pub trait SettlementActions: Send + Sync {
    async fn slash_publisher(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
    ) -> Result<String>;

    async fn advance_to_review(&self, network: Network, publication: &PublicationRef) -> Result<String>;

    async fn publish(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> Result<String>;

    async fn slash_publication(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> Result<String>;
}

/// A network's contract settings bound to its chain client.
#[derive(Clone)]
pub struct NetworkChain {
    pub contract: ContractConfig,
    pub client: Arc<dyn ChainClient>,
}

/// [`SettlementActions`] over real chain clients.
pub struct ChainSettlement {
    chains: NetworkRegistry<NetworkChain>,
    notifier: Arc<dyn Notifier>,
    gateway_base: String,
}

impl ChainSettlement {
    /// `gateway_base` prefixes the manifest link in notifications.
    pub fn new(
        chains: NetworkRegistry<NetworkChain>,
        notifier: Arc<dyn Notifier>,
        gateway_base: impl Into<String>,
    ) -> Self {
        Self {
            chains,
            notifier,
            gateway_base: gateway_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn execute(
        &self,
        network: Network,
        action: SettlementAction,
        publication: &PublicationRef,
        args: Vec<Token>,
        message: String,
    ) -> Result<String> {
        let chain = self.chains.get(network).ok_or_else(|| {
            BioVerifyError::Configuration(format!("network {network} is not configured for settlement"))
        })?;

        let signature = action.signature(&chain.contract.functions);
        let call = ContractCall {
            from: chain.contract.agent.clone(),
            to: chain.contract.address.clone(),
            data: abi::encode_call(&signature, &args),
        };
        debug!(%network, %action, %signature, "simulating settlement call");

        chain
            .client
            .simulate(&call)
            .await
            .map_err(|source| BioVerifyError::Settlement {
                action,
                phase: SettlementPhase::Simulate,
                source,
            })?;

        let tx_hash = chain
            .client
            .submit(&call)
            .await
            .map_err(|source| BioVerifyError::Settlement {
                action,
                phase: SettlementPhase::Submit,
                source,
            })?;

        METRICS.inc_settlements();
        emit_settlement_submitted(
            network.as_str(),
            action.as_str(),
            publication.publication_id.0,
            &tx_hash,
        );

        if let Err(e) = self.notifier.notify(&message).await {
            METRICS.inc_notification_failures();
            emit_notification_failed(action.as_str(), &e);
        }

        Ok(tx_hash)
    }

    fn manifest_link(&self, publication: &PublicationRef) -> String {
        format!("{}/{}", self.gateway_base, publication.root_cid)
    }
}

#[async_trait]
impl SettlementActions for ChainSettlement {
    async fn slash_publisher(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
    ) -> Result<String> {
        let message = format!(
            "🚨 *BioVerify Alert: Slash Executed*\n\n\
             Publication: #{}\n\
             Verdict: Plagiarism Detected\n\
             Evidence: {}\n\
             IPFS Manifest Link: {}",
            publication.publication_id,
            truncate_chars(reason, SLASH_REASON_CHARS),
            self.manifest_link(publication),
        );
        self.execute(
            network,
            SettlementAction::SlashPublisher,
            publication,
            vec![Token::uint(publication.publication_id.0)],
            message,
        )
        .await
    }

    async fn advance_to_review(&self, network: Network, publication: &PublicationRef) -> Result<String> {
        let message = format!(
            "✅ *BioVerify Alert: Review Phase Started*\n\n\
             Publication: #{} passed AI validation.\n\
             Status: selecting reviewers.\n\
             IPFS Manifest Link: {}",
            publication.publication_id,
            self.manifest_link(publication),
        );
        self.execute(
            network,
            SettlementAction::AdvanceToReview,
            publication,
            vec![Token::uint(publication.publication_id.0)],
            message,
        )
        .await
    }

    async fn publish(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> Result<String> {
        let message = review_message(
            "✅ *BioVerify Alert: Publication Passed Review*",
            publication,
            reason,
            classification,
            &self.manifest_link(publication),
        );
        self.execute(
            network,
            SettlementAction::Publish,
            publication,
            settlement_args(publication, classification),
            message,
        )
        .await
    }

    async fn slash_publication(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> Result<String> {
        let message = review_message(
            "🚨 *BioVerify Alert: Publication Review Failed*",
            publication,
            reason,
            classification,
            &self.manifest_link(publication),
        );
        self.execute(
            network,
            SettlementAction::SlashPublication,
            publication,
            settlement_args(publication, classification),
            message,
        )
        .await
    }
}

fn settlement_args(publication: &PublicationRef, classification: &Classification) -> Vec<Token> {
    vec![
        Token::uint(publication.publication_id.0),
        Token::AddressArray(classification.honest.clone()),
        Token::AddressArray(classification.negligent.clone()),
    ]
}

fn review_message(
    headline: &str,
    publication: &PublicationRef,
    reason: &str,
    classification: &Classification,
    link: &str,
) -> String {
    format!(
        "{headline}\n\n\
         Publication: #{}\n\
         Honest (Reward): {}\n\
         Negligent (Slash): {}\n\
         Evidence:\n\n\
         > {}\n\
         IPFS Manifest Link: {link}",
        publication.publication_id,
        join_addresses(&classification.honest),
        join_addresses(&classification.negligent),
        truncate_chars(reason, REVIEW_REASON_CHARS),
    )
}

fn join_addresses(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "none".into();
    }
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keep at most `max` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
