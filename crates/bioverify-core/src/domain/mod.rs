//! BioVerify domain model.

pub mod manifest;
pub mod network;
pub mod publication;
pub mod verdict;

pub use manifest::Manifest;
pub use network::Network;
pub use publication::{Address, PublicationId, PublicationRef, ThreadKey};
pub use verdict::{Assessment, Decision, EvidenceSource, Verdict, MIN_REASON_CHARS};
