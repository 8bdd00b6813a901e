//! Signed webhook deliveries driving the workflows through to contract
//! calls on a fake chain.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bioverify_core::abi::{self, Token};
use bioverify_core::webhook::{self, Ingest, PickedReviewers, SubmittedPublication};
use bioverify_core::{
    review_workflow, submission_workflow, AdapterError, Assessment, BioVerifyError, Capabilities,
    CastVote, ChainClient, ChainSettlement, ContractCall, ContractConfig, Decision, Network,
    NetworkChain, NetworkRegistry, NoopNotifier, ReviewResume, ReviewState, SettlementAction,
    SettlementFunctions, SettlementPhase, SubmissionState, WorkflowError,
};
use bioverify_state::fakes::MemoryCheckpointStore;
use common::{addr, FakeContent, FakeSearch, FakeVerdict, ROOT_CID};
use serde_json::json;

const SEPOLIA_SECRET: &str = "whsec_sepolia";
const SEI_SECRET: &str = "whsec_sei";

#[derive(Default)]
struct FakeChain {
    revert_on_simulate: bool,
    simulated: Mutex<Vec<ContractCall>>,
    submitted: Mutex<Vec<ContractCall>>,
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn simulate(&self, call: &ContractCall) -> Result<Vec<u8>, AdapterError> {
        self.simulated.lock().unwrap().push(call.clone());
        if self.revert_on_simulate {
            return Err(AdapterError::Rpc {
                code: 3,
                message: "execution reverted: not agent".into(),
            });
        }
        Ok(Vec::new())
    }

    async fn submit(&self, call: &ContractCall) -> Result<String, AdapterError> {
        self.submitted.lock().unwrap().push(call.clone());
        Ok("0xabc123".into())
    }
}

fn contract() -> ContractConfig {
    ContractConfig {
        address: addr(0xc0),
        agent: addr(0xa9),
        functions: SettlementFunctions::default(),
    }
}

fn capabilities(chain: Arc<FakeChain>, model: serde_json::Value, network: Network) -> Capabilities {
    let settlement = ChainSettlement::new(
        NetworkRegistry::new().with(
            network,
            NetworkChain {
                contract: contract(),
                client: chain,
            },
        ),
        Arc::new(NoopNotifier),
        "https://gateway.example.org/ipfs/",
    );
    Capabilities {
        content: Arc::new(FakeContent::with_abstract(
            "Single-cell atlas of axolotl limb regeneration at day 7.",
        )),
        search: Arc::new(FakeSearch::default()),
        verdict: Arc::new(FakeVerdict::returning(model)),
        settlement: Arc::new(settlement),
    }
}

fn secrets() -> NetworkRegistry<String> {
    NetworkRegistry::new()
        .with(Network::Sepolia, SEPOLIA_SECRET.to_string())
        .with(Network::SeiTestnet, SEI_SECRET.to_string())
}

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn delivery(data: Vec<u8>, topics: Vec<[u8; 32]>) -> Vec<u8> {
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

fn submitted_body(id: u64) -> Vec<u8> {
    delivery(
        abi::encode(&[
            Token::Address(addr(0x77)),
            Token::uint(id),
            Token::String(ROOT_CID.into()),
        ]),
        vec![abi::event_topic(webhook::events::SUBMITTED_PUBLICATION_EVENT)],
    )
}

fn picked_body(id: u64, reviewers: Vec<u8>, quorum: u64) -> Vec<u8> {
    let mut id_topic = [0u8; 32];
    id_topic[24..].copy_from_slice(&id.to_be_bytes());
    delivery(
        abi::encode(&[
            Token::String(ROOT_CID.into()),
            Token::AddressArray(reviewers.into_iter().map(addr).collect()),
            Token::Address(addr(9)),
            Token::uint(quorum),
        ]),
        vec![abi::event_topic(webhook::events::PICKED_REVIEWERS_EVENT), id_topic],
    )
}

fn selector_of(call: &ContractCall) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&call.data[..4]);
    sel
}

// ── Submission ──

#[tokio::test]
async fn signed_submission_on_sei_settles_on_sei() {
    let body = submitted_body(15);
    let sig = webhook::sign(SEI_SECRET, &body).unwrap();

    let Ingest::Event { network, event } =
        webhook::ingest::<SubmittedPublication>(&secrets(), &body, Some(&sig)).unwrap()
    else {
        panic!("expected a decoded event");
    };
    assert_eq!(network, Network::SeiTestnet);
    assert_eq!(event.publisher, addr(0x77));

    let chain = Arc::new(FakeChain::default());
    let caps = capabilities(
        chain.clone(),
        json!({"decision": "pass", "reason": "Novel dataset with new methodology."}),
        Network::SeiTestnet,
    );
    let engine = submission_workflow(&caps, Arc::new(MemoryCheckpointStore::new()));
    let state = SubmissionState::new(network, event.publication);
    let key = state.thread_key();
    let outcome = engine.run(state, &key).await.unwrap();

    assert_eq!(outcome.state().settlement_tx.as_deref(), Some("0xabc123"));
    let submitted = chain.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(selector_of(&submitted[0]), abi::selector("pickReviewers(uint256)"));
    assert_eq!(submitted[0].to, addr(0xc0));
    assert_eq!(submitted[0].from, addr(0xa9));
    assert_eq!(&submitted[0].data[4..], abi::encode(&[Token::uint(15)]).as_slice());
}

#[tokio::test]
async fn reverted_simulation_never_submits_and_keeps_retry_point() {
    let chain = Arc::new(FakeChain {
        revert_on_simulate: true,
        ..Default::default()
    });
    let caps = capabilities(
        chain.clone(),
        json!({"decision": "fail", "reason": "Abstract copied from a 2019 review article."}),
        Network::Sepolia,
    );
    let engine = submission_workflow(&caps, Arc::new(MemoryCheckpointStore::new()));
    let state = SubmissionState::new(Network::Sepolia, common::publication(16));
    let key = state.thread_key();

    let err = engine.run(state, &key).await.unwrap_err();

    let WorkflowError::Step { step, source } = err else {
        panic!("expected a step failure");
    };
    assert_eq!(step, "settle");
    assert!(matches!(
        source,
        BioVerifyError::Settlement {
            action: SettlementAction::SlashPublisher,
            phase: SettlementPhase::Simulate,
            ..
        }
    ));
    assert_eq!(chain.simulated.lock().unwrap().len(), 1);
    assert!(chain.submitted.lock().unwrap().is_empty());
    assert_eq!(engine.latest(&key).await.unwrap().unwrap().step_name, "verdict");
}

#[tokio::test]
async fn unconfigured_network_is_a_settlement_configuration_error() {
    let chain = Arc::new(FakeChain::default());
    let caps = capabilities(
        chain.clone(),
        json!({"decision": "pass", "reason": "Novel dataset with new methodology."}),
        Network::Sepolia,
    );
    let engine = submission_workflow(&caps, Arc::new(MemoryCheckpointStore::new()));
    let state = SubmissionState::new(Network::SeiTestnet, common::publication(17));
    let key = state.thread_key();

    let err = engine.run(state, &key).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Step {
            source: BioVerifyError::Configuration(_),
            ..
        }
    ));
    assert!(chain.simulated.lock().unwrap().is_empty());
}

// ── Review ──

#[tokio::test]
async fn picked_reviewers_event_drives_review_to_publish_call() {
    let body = picked_body(21, vec![1, 2, 3], 2);
    let sig = webhook::sign(SEPOLIA_SECRET, &body).unwrap();
    let Ingest::Event { network, event } =
        webhook::ingest::<PickedReviewers>(&secrets(), &body, Some(&sig)).unwrap()
    else {
        panic!("expected a decoded event");
    };

    let chain = Arc::new(FakeChain::default());
    let caps = capabilities(
        chain.clone(),
        json!({"decision": "pass", "reason": "Regeneration atlas is original work."}),
        network,
    );
    let engine = review_workflow(&caps, Arc::new(MemoryCheckpointStore::new()));
    let state = ReviewState::new(event.into_review_input(network)).unwrap();
    let key = state.thread_key();
    assert_eq!(key.as_str(), format!("21-{ROOT_CID}"));

    engine.run(state, &key).await.unwrap();
    let reason = "Figures match the deposited raw data.";
    let outcome = engine
        .resume(
            &key,
            ReviewResume::Votes(vec![
                CastVote::new(addr(1), Assessment::new(Decision::Pass, reason)),
                CastVote::new(addr(2), Assessment::new(Decision::Fail, reason)),
                CastVote::new(addr(3), Assessment::new(Decision::Pass, reason)),
            ]),
        )
        .await
        .unwrap();
    assert!(outcome.is_completed());

    let submitted = chain.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        selector_of(&submitted[0]),
        abi::selector("settleReviewPass(uint256,address[],address[])")
    );
    let expected = abi::encode(&[
        Token::uint(21),
        Token::AddressArray(vec![addr(1), addr(3)]),
        Token::AddressArray(vec![addr(2)]),
    ]);
    assert_eq!(&submitted[0].data[4..], expected.as_slice());
}

#[tokio::test]
async fn picked_reviewers_with_impossible_quorum_is_invalid_input() {
    let body = picked_body(22, vec![1], 3);
    let sig = webhook::sign(SEPOLIA_SECRET, &body).unwrap();
    let Ingest::Event { network, event } =
        webhook::ingest::<PickedReviewers>(&secrets(), &body, Some(&sig)).unwrap()
    else {
        panic!("expected a decoded event");
    };
    assert!(matches!(
        ReviewState::new(event.into_review_input(network)),
        Err(BioVerifyError::InvalidInput(_))
    ));
}

// ── Authentication ──

#[tokio::test]
async fn delivery_signed_for_unconfigured_network_is_rejected() {
    let body = submitted_body(30);
    let sig = webhook::sign("whsec_other", &body).unwrap();
    let err = webhook::ingest::<SubmittedPublication>(&secrets(), &body, Some(&sig)).unwrap_err();
    assert!(matches!(err, BioVerifyError::Authentication(_)));
}

#[tokio::test]
async fn no_configured_secrets_fails_closed() {
    let body = submitted_body(31);
    let sig = webhook::sign(SEPOLIA_SECRET, &body).unwrap();
    let err = webhook::ingest::<SubmittedPublication>(&NetworkRegistry::new(), &body, Some(&sig))
        .unwrap_err();
    assert!(matches!(err, BioVerifyError::Configuration(_)));
}

#[tokio::test]
async fn event_of_the_wrong_kind_is_a_decode_error() {
    let body = submitted_body(32);
    let sig = webhook::sign(SEPOLIA_SECRET, &body).unwrap();
    let err = webhook::ingest::<PickedReviewers>(&secrets(), &body, Some(&sig)).unwrap_err();
    assert!(matches!(err, BioVerifyError::Decode(_)));
}
