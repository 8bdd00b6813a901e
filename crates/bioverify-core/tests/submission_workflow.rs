//! End-to-end runs of the submission verification workflow against
//! recording doubles and the in-memory checkpoint store.

mod common;

use bioverify_core::{
    submission_workflow, CheckpointStatus, EvidenceSource, Network, SearchDepth, SubmissionState,
    Verdict, WorkflowError,
};
use common::{publication, Harness, SettlementCall};
use serde_json::json;

const PLAGIARIZED: &str = "Gut microbiota modulate host circadian rhythm through short-chain fatty acids.";
const ORIGINAL: &str = "We report a novel CRISPR screen across 40 soil isolates identifying nitrogenase regulators.";

fn prior_publication() -> EvidenceSource {
    EvidenceSource {
        title: "Gut microbiota modulate host circadian rhythm".into(),
        url: "https://journals.example.org/gut-circadian".into(),
        snippet: PLAGIARIZED.into(),
    }
}

#[tokio::test]
async fn verbatim_match_slashes_publisher_with_model_reason() {
    let reason = "Identical abstract found at https://journals.example.org/gut-circadian";
    let h = Harness::new(
        PLAGIARIZED,
        vec![prior_publication()],
        json!({"decision": "fail", "reason": reason}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(7));
    let key = state.thread_key();

    let outcome = engine.run(state, &key).await.unwrap();

    assert!(outcome.is_completed());
    assert_eq!(
        outcome.state().verdict,
        Verdict::Fail {
            reason: reason.into()
        }
    );
    assert_eq!(
        h.settlement.calls(),
        vec![SettlementCall::SlashPublisher {
            network: Network::Sepolia,
            id: 7,
            reason: reason.into(),
        }]
    );
    assert!(outcome.state().settlement_tx.is_some());
}

#[tokio::test]
async fn original_work_advances_to_review() {
    let h = Harness::new(
        ORIGINAL,
        vec![],
        json!({"decision": "pass", "reason": "Presents new primary data and methodology."}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::SeiTestnet, publication(8));
    let key = state.thread_key();

    let outcome = engine.run(state, &key).await.unwrap();

    assert!(outcome.is_completed());
    assert_eq!(
        h.settlement.calls(),
        vec![SettlementCall::AdvanceToReview {
            network: Network::SeiTestnet,
            id: 8
        }]
    );
}

#[tokio::test]
async fn search_uses_quoted_abstract_prefix_and_model_sees_evidence() {
    let h = Harness::new(
        PLAGIARIZED,
        vec![prior_publication()],
        json!({"decision": "fail", "reason": "Identical abstract published in 2021."}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(1));
    let key = state.thread_key();
    engine.run(state, &key).await.unwrap();

    let queries = h.search.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].query, format!("\"{PLAGIARIZED}\""));
    assert_eq!(queries[0].depth, SearchDepth::Advanced);
    assert_eq!(queries[0].max_results, 5);

    let requests = h.verdict.requests.lock().unwrap().clone();
    assert_eq!(requests[0].abstract_text, PLAGIARIZED);
    assert!(requests[0].evidence_json.contains("journals.example.org"));
}

#[tokio::test]
async fn blank_abstract_skips_search() {
    let h = Harness::new(
        "   ",
        vec![prior_publication()],
        json!({"decision": "pass", "reason": "No prior sources could be located."}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(2));
    let key = state.thread_key();

    let outcome = engine.run(state, &key).await.unwrap();

    assert_eq!(h.search.call_count(), 0);
    assert!(outcome.state().evidence_sources.is_empty());
}

#[tokio::test]
async fn each_step_is_checkpointed_in_order() {
    let h = Harness::new(
        ORIGINAL,
        vec![],
        json!({"decision": "pass", "reason": "Presents new primary data and methodology."}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(3));
    let key = state.thread_key();
    engine.run(state, &key).await.unwrap();

    let history = engine.history(&key).await.unwrap();
    let steps: Vec<_> = history.iter().map(|c| c.step_name.as_str()).collect();
    assert_eq!(steps, vec!["fetch", "search", "verdict", "settle"]);
    assert_eq!(history.last().unwrap().status, CheckpointStatus::Completed);
    assert!(history.iter().all(|c| c.verify_digest()));
    assert_eq!(key.as_str(), "3-bafyroot");
}

#[tokio::test]
async fn rerunning_completed_thread_makes_no_external_calls() {
    let h = Harness::new(
        ORIGINAL,
        vec![],
        json!({"decision": "pass", "reason": "Presents new primary data and methodology."}),
    );
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(4));
    let key = state.thread_key();

    engine.run(state.clone(), &key).await.unwrap();
    let fetches = h.content.fetch_count();
    let second = engine.run(state, &key).await.unwrap();

    assert!(second.is_completed());
    assert_eq!(h.settlement.calls().len(), 1);
    assert_eq!(h.content.fetch_count(), fetches);
    assert_eq!(h.verdict.call_count(), 1);
    assert_eq!(engine.history(&key).await.unwrap().len(), 4);
}

#[tokio::test]
async fn invalid_model_output_aborts_before_settlement() {
    let h = Harness::new(ORIGINAL, vec![], json!({"decision": "maybe", "reason": "x"}));
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(5));
    let key = state.thread_key();

    let err = engine.run(state, &key).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Step { step: "verdict", .. }));
    assert!(h.settlement.calls().is_empty());
    let latest = engine.latest(&key).await.unwrap().unwrap();
    assert_eq!(latest.step_name, "search");
    assert_eq!(latest.status, CheckpointStatus::InProgress);
}

#[tokio::test]
async fn short_model_reason_is_rejected() {
    let h = Harness::new(ORIGINAL, vec![], json!({"decision": "pass", "reason": "looks fine"}));
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(Network::Sepolia, publication(6));
    let key = state.thread_key();

    assert!(engine.run(state, &key).await.is_err());
    assert!(h.settlement.calls().is_empty());
}

#[tokio::test]
async fn missing_manifest_fails_at_fetch_without_checkpoint() {
    let h = Harness::new(ORIGINAL, vec![], json!({}));
    let engine = submission_workflow(&h.capabilities(), h.store());
    let state = SubmissionState::new(
        Network::Sepolia,
        bioverify_core::PublicationRef::new(bioverify_core::PublicationId(9), "bafyunknown"),
    );
    let key = state.thread_key();

    let err = engine.run(state, &key).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Step { step: "fetch", .. }));
    assert!(engine.latest(&key).await.unwrap().is_none());
}
