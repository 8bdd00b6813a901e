//! Recording doubles shared by the workflow integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bioverify_core::review::Classification;
use bioverify_core::{
    AdapterError, Address, BioVerifyError, Capabilities, ContentStore, EvidenceSearch, EvidenceSource,
    Network, PublicationId, PublicationRef, SearchQuery, SettlementAction, SettlementActions,
    SettlementPhase, StructuredVerdict, VerdictRequest,
};
use bioverify_state::fakes::MemoryCheckpointStore;
use bioverify_state::CheckpointStore;
use serde_json::{json, Value};

pub const ROOT_CID: &str = "bafyroot";
pub const ABSTRACT_CID: &str = "bafyabstract";

pub fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

pub fn publication(id: u64) -> PublicationRef {
    PublicationRef::new(PublicationId(id), ROOT_CID)
}

// ── Content ──

#[derive(Default)]
pub struct FakeContent {
    objects: HashMap<String, Vec<u8>>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakeContent {
    /// A manifest at [`ROOT_CID`] pointing at `abstract_text`.
    pub fn with_abstract(abstract_text: &str) -> Self {
        let manifest = json!({
            "metadata": {"authors": [{"name": "A. Researcher", "role": "lead"}], "license": "CC-BY-4.0"},
            "payload": {"abstractCid": ABSTRACT_CID, "manuscriptCid": "bafymanuscript"}
        });
        let mut objects = HashMap::new();
        objects.insert(ROOT_CID.to_string(), manifest.to_string().into_bytes());
        objects.insert(ABSTRACT_CID.to_string(), abstract_text.as_bytes().to_vec());
        Self {
            objects,
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for FakeContent {
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, AdapterError> {
        self.fetches.lock().unwrap().push(cid.to_string());
        self.objects.get(cid).cloned().ok_or_else(|| AdapterError::Http {
            target: format!("gateway/{cid}"),
            status: 404,
        })
    }
}

// ── Search ──

#[derive(Default)]
pub struct FakeSearch {
    pub results: Vec<EvidenceSource>,
    pub queries: Mutex<Vec<SearchQuery>>,
}

impl FakeSearch {
    pub fn with_results(results: Vec<EvidenceSource>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl EvidenceSearch for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<EvidenceSource>, AdapterError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.results.clone())
    }
}

// ── Verdict model ──

/// Returns a fixed raw output, recording every request.
pub struct FakeVerdict {
    output: Value,
    pub requests: Mutex<Vec<VerdictRequest>>,
}

impl FakeVerdict {
    pub fn returning(output: Value) -> Self {
        Self {
            output,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl StructuredVerdict for FakeVerdict {
    async fn judge(&self, request: &VerdictRequest) -> Result<Value, AdapterError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.output.clone())
    }
}

// ── Settlement ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementCall {
    SlashPublisher { network: Network, id: u64, reason: String },
    AdvanceToReview { network: Network, id: u64 },
    Publish { network: Network, id: u64, reason: String, classification: Classification },
    SlashPublication { network: Network, id: u64, reason: String, classification: Classification },
}

impl SettlementCall {
    fn action(&self) -> SettlementAction {
        match self {
            Self::SlashPublisher { .. } => SettlementAction::SlashPublisher,
            Self::AdvanceToReview { .. } => SettlementAction::AdvanceToReview,
            Self::Publish { .. } => SettlementAction::Publish,
            Self::SlashPublication { .. } => SettlementAction::SlashPublication,
        }
    }
}

#[derive(Default)]
pub struct RecordingSettlement {
    pub calls: Mutex<Vec<SettlementCall>>,
    revert_next: AtomicBool,
}

impl RecordingSettlement {
    pub fn calls(&self) -> Vec<SettlementCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next action revert during simulation without recording it.
    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: SettlementCall) -> bioverify_core::Result<String> {
        if self.revert_next.swap(false, Ordering::SeqCst) {
            return Err(BioVerifyError::Settlement {
                action: call.action(),
                phase: SettlementPhase::Simulate,
                source: AdapterError::Rpc {
                    code: 3,
                    message: "execution reverted".into(),
                },
            });
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        Ok(format!("0x{:064x}", calls.len()))
    }
}

#[async_trait]
impl SettlementActions for RecordingSettlement {
    async fn slash_publisher(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
    ) -> bioverify_core::Result<String> {
        self.record(SettlementCall::SlashPublisher {
            network,
            id: publication.publication_id.0,
            reason: reason.to_string(),
        })
    }

    async fn advance_to_review(
        &self,
        network: Network,
        publication: &PublicationRef,
    ) -> bioverify_core::Result<String> {
        self.record(SettlementCall::AdvanceToReview {
            network,
            id: publication.publication_id.0,
        })
    }

    async fn publish(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> bioverify_core::Result<String> {
        self.record(SettlementCall::Publish {
            network,
            id: publication.publication_id.0,
            reason: reason.to_string(),
            classification: classification.clone(),
        })
    }

    async fn slash_publication(
        &self,
        network: Network,
        publication: &PublicationRef,
        reason: &str,
        classification: &Classification,
    ) -> bioverify_core::Result<String> {
        self.record(SettlementCall::SlashPublication {
            network,
            id: publication.publication_id.0,
            reason: reason.to_string(),
            classification: classification.clone(),
        })
    }
}

// ── Harness ──

pub struct Harness {
    pub content: Arc<FakeContent>,
    pub search: Arc<FakeSearch>,
    pub verdict: Arc<FakeVerdict>,
    pub settlement: Arc<RecordingSettlement>,
    pub store: Arc<MemoryCheckpointStore>,
}

impl Harness {
    pub fn new(abstract_text: &str, evidence: Vec<EvidenceSource>, model_output: Value) -> Self {
        Self {
            content: Arc::new(FakeContent::with_abstract(abstract_text)),
            search: Arc::new(FakeSearch::with_results(evidence)),
            verdict: Arc::new(FakeVerdict::returning(model_output)),
            settlement: Arc::new(RecordingSettlement::default()),
            store: Arc::new(MemoryCheckpointStore::new()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            content: self.content.clone(),
            search: self.search.clone(),
            verdict: self.verdict.clone(),
            settlement: self.settlement.clone(),
        }
    }

    pub fn store(&self) -> Arc<dyn CheckpointStore> {
        self.store.clone()
    }
}
