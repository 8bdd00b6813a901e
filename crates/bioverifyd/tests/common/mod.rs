//! Fakes and request helpers shared by the route tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bioverify_core::abi::{self, Token};
use bioverify_core::review::Classification;
use bioverify_core::webhook::events::{PICKED_REVIEWERS_EVENT, SUBMITTED_PUBLICATION_EVENT};
use bioverify_core::{
    AdapterError, Address, BioVerifyError, Capabilities, Checkpoint, CheckpointStatus, ContentStore,
    EvidenceSearch, EvidenceSource, Network, NetworkRegistry, PublicationRef, SearchQuery,
    SettlementAction, SettlementActions, SettlementPhase, StructuredVerdict, ThreadKey,
    VerdictRequest, WebhookSecrets,
};
use bioverify_state::fakes::MemoryCheckpointStore;
use bioverifyd::{create_router, AppState, Engines};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ROOT_CID: &str = "bafyroot";
pub const SEPOLIA_SECRET: &str = "whsec_sepolia";
pub const OPERATOR_TOKEN: &str = "op-token";

pub fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

// ── Capabilities ──

struct FakeContent(HashMap<String, Vec<u8>>);

#[async_trait]
impl ContentStore for FakeContent {
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, AdapterError> {
        self.0.get(cid).cloned().ok_or_else(|| AdapterError::Http {
            target: format!("gateway/{cid}"),
            status: 404,
        })
    }
}

struct NoEvidence;

#[async_trait]
impl EvidenceSearch for NoEvidence {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<EvidenceSource>, AdapterError> {
        Ok(Vec::new())
    }
}

struct FixedVerdict(Value);

#[async_trait]
impl StructuredVerdict for FixedVerdict {
    async fn judge(&self, _request: &VerdictRequest) -> Result<Value, AdapterError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    SlashPublisher(u64),
    AdvanceToReview(u64),
    Publish(u64, Classification),
    SlashPublication(u64, Classification),
}

impl Settled {
    fn action(&self) -> SettlementAction {
        match self {
            Self::SlashPublisher(_) => SettlementAction::SlashPublisher,
            Self::AdvanceToReview(_) => SettlementAction::AdvanceToReview,
            Self::Publish(..) => SettlementAction::Publish,
            Self::SlashPublication(..) => SettlementAction::SlashPublication,
        }
    }
}

#[derive(Default)]
pub struct RecordingSettlement {
    calls: Mutex<Vec<(Network, Settled)>>,
    revert_next: AtomicBool,
}

impl RecordingSettlement {
    pub fn calls(&self) -> Vec<(Network, Settled)> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next action revert during simulation without recording it.
    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, network: Network, call: Settled) -> bioverify_core::Result<String> {
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
        calls.push((network, call));
        Ok(format!("0x{:064x}", calls.len()))
    }
}

#[async_trait]
impl SettlementActions for RecordingSettlement {
    async fn slash_publisher(
        &self,
        network: Network,
        publication: &PublicationRef,
        _reason: &str,
    ) -> bioverify_core::Result<String> {
        self.record(network, Settled::SlashPublisher(publication.publication_id.0))
    }

    async fn advance_to_review(
        &self,
        network: Network,
        publication: &PublicationRef,
    ) -> bioverify_core::Result<String> {
        self.record(network, Settled::AdvanceToReview(publication.publication_id.0))
    }

    async fn publish(
        &self,
        network: Network,
        publication: &PublicationRef,
        _reason: &str,
        classification: &Classification,
    ) -> bioverify_core::Result<String> {
        self.record(
            network,
            Settled::Publish(publication.publication_id.0, classification.clone()),
        )
    }

    async fn slash_publication(
        &self,
        network: Network,
        publication: &PublicationRef,
        _reason: &str,
        classification: &Classification,
    ) -> bioverify_core::Result<String> {
        self.record(
            network,
            Settled::SlashPublication(publication.publication_id.0, classification.clone()),
        )
    }
}

// ── App ──

pub struct TestApp {
    pub state: AppState,
    pub settlement: Arc<RecordingSettlement>,
}

impl TestApp {
    /// A daemon with Sepolia secrets for both routes, the operator token set
    /// and a model that always passes.
    pub fn new() -> Self {
        let secrets = WebhookSecrets {
            submission: NetworkRegistry::new().with(Network::Sepolia, SEPOLIA_SECRET.to_string()),
            picked_reviewers: NetworkRegistry::new().with(Network::Sepolia, SEPOLIA_SECRET.to_string()),
        };
        Self::build(secrets, Some(OPERATOR_TOKEN.to_string()))
    }

    pub fn build(secrets: WebhookSecrets, operator_token: Option<String>) -> Self {
        let manifest = json!({"metadata": {"authors": []}, "payload": {"abstractCid": "bafyabstract"}});
        let mut objects = HashMap::new();
        objects.insert(ROOT_CID.to_string(), manifest.to_string().into_bytes());
        objects.insert(
            "bafyabstract".to_string(),
            b"Single-cell atlas of axolotl limb regeneration at day 7.".to_vec(),
        );

        let settlement = Arc::new(RecordingSettlement::default());
        let capabilities = Capabilities {
            content: Arc::new(FakeContent(objects)),
            search: Arc::new(NoEvidence),
            verdict: Arc::new(FixedVerdict(
                json!({"decision": "pass", "reason": "Presents new regeneration data."}),
            )),
            settlement: settlement.clone(),
        };
        let engines = Engines::new(&capabilities, Arc::new(MemoryCheckpointStore::new()));
        Self {
            state: AppState::new(engines, secrets, operator_token),
            settlement,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        read_json(response).await
    }

    /// Poll until the thread's newest checkpoint has `status` and no task
    /// holds the key.
    pub async fn wait_for(&self, workflow: &'static str, key: &ThreadKey, status: CheckpointStatus) -> Checkpoint {
        for _ in 0..500 {
            let latest = match workflow {
                "submission" => self.state.engines.submission.latest(key).await.unwrap(),
                _ => self.state.engines.review.latest(key).await.unwrap(),
            };
            if let Some(cp) = latest {
                if cp.status == status && !self.state.inflight.contains(workflow, key) {
                    return cp;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{workflow}/{key} never reached {status}");
    }
}

pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ── Requests ──

pub fn webhook(route: &str, body: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::post(route).header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("x-alchemy-signature", sig);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn operator_post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn operator_get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

// ── Webhook bodies ──

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn delivery(data: Vec<u8>, topics: Vec<[u8; 32]>) -> Vec<u8> {
    let topics: Vec<String> = topics.iter().map(|t| hex0x(t)).collect();
    json!({
        "webhookId": "wh_test",
        "type": "GRAPHQL",
        "event": {"data": {"block": {"number": 100, "logs": [
            {"data": hex0x(&data), "topics": topics}
        ]}}}
    })
    .to_string()
    .into_bytes()
}

pub fn submitted_body(id: u64) -> Vec<u8> {
    delivery(
        abi::encode(&[
            Token::Address(addr(0x77)),
            Token::uint(id),
            Token::String(ROOT_CID.into()),
        ]),
        vec![abi::event_topic(SUBMITTED_PUBLICATION_EVENT)],
    )
}

pub fn picked_body(id: u64, reviewers: Vec<u8>, senior: u8, quorum: u64) -> Vec<u8> {
    let mut id_topic = [0u8; 32];
    id_topic[24..].copy_from_slice(&id.to_be_bytes());
    delivery(
        abi::encode(&[
            Token::String(ROOT_CID.into()),
            Token::AddressArray(reviewers.into_iter().map(addr).collect()),
            Token::Address(addr(senior)),
            Token::uint(quorum),
        ]),
        vec![abi::event_topic(PICKED_REVIEWERS_EVENT), id_topic],
    )
}

pub fn thread_key(id: u64) -> ThreadKey {
    ThreadKey::parse(&format!("{id}-{ROOT_CID}")).unwrap()
}

pub fn vote(n: u8, decision: &str) -> Value {
    json!({
        "address": addr(n).as_str(),
        "decision": decision,
        "reason": format!("Reviewer {n} checked the methods and data."),
    })
}
