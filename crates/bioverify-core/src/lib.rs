//! BioVerify Core Library
//!
//! Off-chain orchestration for the BioVerify publication-verification
//! protocol: a durable workflow engine, the Submission Verification and
//! Review Consensus & Settlement workflows built on it, chain settlement,
//! and webhook authentication/decoding.

pub mod abi;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod forensics;
pub mod metrics;
pub mod obs;
pub mod ports;
pub mod review;
pub mod settlement;
pub mod submission;
pub mod telemetry;
pub mod webhook;

pub use config::{load_networks, ContractConfig, NetworkConfig, NetworkRegistry, SettlementFunctions, WebhookSecrets};
pub use domain::{
    Address, Assessment, Decision, EvidenceSource, Manifest, Network, PublicationId, PublicationRef,
    ThreadKey, Verdict,
};
pub use engine::{
    Interrupt, InterruptKind, RunOutcome, Step, StepOutcome, WorkflowEngine, WorkflowError,
    WorkflowResult, WorkflowState,
};
pub use error::{AdapterError, BioVerifyError, Result};
pub use ports::{
    Capabilities, ChainClient, ContentStore, ContractCall, EvidenceSearch, NoopNotifier,
    NotificationError, Notifier, SearchDepth, SearchQuery, StructuredVerdict, VerdictRequest,
};
pub use review::{
    review_workflow, CastVote, Classification, ReviewInput, ReviewResume, ReviewState, ReviewerVote,
    REVIEW_WORKFLOW,
};
pub use settlement::{ChainSettlement, NetworkChain, SettlementAction, SettlementActions, SettlementPhase};
pub use submission::{submission_workflow, SubmissionState, SUBMISSION_WORKFLOW};
pub use telemetry::init_tracing;

pub use bioverify_state::{Checkpoint, CheckpointStatus, CheckpointStore};
