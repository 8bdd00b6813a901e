//! Webhook ingestion: authenticate, then decode one contract event.
//!
//! Order matters: the signature is checked (and missing secrets fail
//! closed) before the body is parsed at all.

pub mod events;
pub mod signature;

pub use events::{first_log, PickedReviewers, RawLog, SubmittedPublication};
pub use signature::{sign, verify_signature, SIGNATURE_HEADER};

use crate::config::NetworkRegistry;
use crate::domain::Network;
use crate::error::BioVerifyError;

/// A contract event that can be decoded from a webhook log entry.
pub trait ChainEvent: Sized {
    fn decode(log: &RawLog) -> Result<Self, BioVerifyError>;
}

impl ChainEvent for SubmittedPublication {
    fn decode(log: &RawLog) -> Result<Self, BioVerifyError> {
        SubmittedPublication::decode(log)
    }
}

impl ChainEvent for PickedReviewers {
    fn decode(log: &RawLog) -> Result<Self, BioVerifyError> {
        PickedReviewers::decode(log)
    }
}

/// Result of a successfully authenticated delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest<E> {
    /// No log entry in the body; acknowledge and do nothing.
    Ignored,
    /// A decoded event, on the network whose secret signed it.
    Event { network: Network, event: E },
}

/// Authenticate `body` and decode its first log as `E`.
pub fn ingest<E: ChainEvent>(
    secrets: &NetworkRegistry<String>,
    body: &[u8],
    signature: Option<&str>,
) -> Result<Ingest<E>, BioVerifyError> {
    let network = verify_signature(secrets, body, signature)?;
    let Some(log) = first_log(body)? else {
        return Ok(Ingest::Ignored);
    };
    let event = E::decode(&log)?;
    Ok(Ingest::Event { network, event })
}
