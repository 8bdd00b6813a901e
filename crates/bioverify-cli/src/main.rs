//! BioVerify operator CLI
//!
//! The `bioverify` command drives the same workflow engines as the daemon,
//! directly against the configured checkpoint store.
//!
//! ## Commands
//!
//! - `status`: Show the newest checkpoint of a thread
//! - `history`: Show a thread's full checkpoint trail
//! - `retry-submission`: Start or continue a submission run
//! - `retry-review`: Re-run the failed step of a review
//! - `vote`: Deliver one reviewer vote to a suspended review
//! - `senior-vote`: Deliver the senior reviewer's tie-break

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bioverify_adapters::{build_capabilities, AdapterConfig};
use bioverify_core::{
    load_networks, review_workflow, submission_workflow, Address, Assessment, CastVote, Checkpoint,
    CheckpointStore, Decision, Network, PublicationId, PublicationRef, ReviewResume, ReviewState,
    RunOutcome, SubmissionState, ThreadKey, WorkflowEngine, REVIEW_WORKFLOW, SUBMISSION_WORKFLOW,
};
use bioverify_state::SurrealCheckpointStore;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "bioverify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and drive BioVerify workflows", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the newest checkpoint of a thread
    Status {
        /// Workflow name: submission or review
        workflow: String,
        /// Thread key, `{publicationId}-{rootCid}`
        thread_key: ThreadKey,
    },

    /// Show the full checkpoint trail of a thread
    History {
        /// Workflow name: submission or review
        workflow: String,
        /// Thread key, `{publicationId}-{rootCid}`
        thread_key: ThreadKey,
    },

    /// Start or continue a submission verification run
    RetrySubmission {
        /// Network the publication lives on (sepolia, sei_testnet)
        #[arg(long)]
        network: Network,

        #[arg(long)]
        publication_id: PublicationId,

        /// Manifest CID
        #[arg(long)]
        root_cid: String,
    },

    /// Re-run the failed step of a review left in progress
    RetryReview {
        /// Thread key, `{publicationId}-{rootCid}`
        thread_key: ThreadKey,
    },

    /// Deliver a reviewer vote to a review waiting for votes
    Vote {
        thread_key: ThreadKey,
        #[command(flatten)]
        vote: VoteArgs,
    },

    /// Deliver the senior reviewer's vote to an escalated review
    SeniorVote {
        thread_key: ThreadKey,
        #[command(flatten)]
        vote: VoteArgs,
    },
}

#[derive(Args)]
struct VoteArgs {
    /// Reviewer address
    #[arg(long)]
    address: Address,

    /// pass or fail
    #[arg(long)]
    decision: Decision,

    #[arg(long)]
    reason: String,
}

impl VoteArgs {
    fn into_cast(self) -> CastVote {
        CastVote::new(self.address, Assessment::new(self.decision, self.reason))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    bioverify_core::init_tracing(cli.json, level);

    let store: Arc<dyn CheckpointStore> = Arc::new(
        SurrealCheckpointStore::from_env()
            .await
            .context("Failed to connect to checkpoint store")?,
    );

    match cli.command {
        Commands::Status {
            workflow,
            thread_key,
        } => cmd_status(store.as_ref(), &workflow, &thread_key).await,
        Commands::History {
            workflow,
            thread_key,
        } => cmd_history(store.as_ref(), &workflow, &thread_key).await,
        Commands::RetrySubmission {
            network,
            publication_id,
            root_cid,
        } => cmd_retry_submission(store, network, PublicationRef::new(publication_id, root_cid)).await,
        Commands::RetryReview { thread_key } => cmd_retry_review(store, &thread_key).await,
        Commands::Vote { thread_key, vote } => {
            cmd_resume(store, &thread_key, ReviewResume::Votes(vec![vote.into_cast()])).await
        }
        Commands::SeniorVote { thread_key, vote } => {
            cmd_resume(store, &thread_key, ReviewResume::SeniorVote(vote.into_cast())).await
        }
    }
}

fn check_workflow(workflow: &str) -> Result<()> {
    if workflow != SUBMISSION_WORKFLOW && workflow != REVIEW_WORKFLOW {
        bail!(
            "Unknown workflow '{}' (expected {} or {})",
            workflow,
            SUBMISSION_WORKFLOW,
            REVIEW_WORKFLOW
        );
    }
    Ok(())
}

/// Show the newest checkpoint
async fn cmd_status(store: &dyn CheckpointStore, workflow: &str, key: &ThreadKey) -> Result<()> {
    check_workflow(workflow)?;
    let Some(cp) = store
        .latest(workflow, key.as_str())
        .await
        .context("Failed to read checkpoint")?
    else {
        println!("No checkpoints for {}/{}", workflow, key);
        return Ok(());
    };

    println!("{}", render_checkpoint(&cp));
    if let Some(interrupt) = &cp.interrupt {
        println!("Waiting:   {}", serde_json::to_string_pretty(interrupt)?);
    }
    println!("State:     {}", serde_json::to_string_pretty(&cp.state)?);
    Ok(())
}

/// Show the checkpoint trail
async fn cmd_history(store: &dyn CheckpointStore, workflow: &str, key: &ThreadKey) -> Result<()> {
    check_workflow(workflow)?;
    let trail = store
        .history(workflow, key.as_str())
        .await
        .context("Failed to read checkpoint history")?;

    if trail.is_empty() {
        println!("No checkpoints for {}/{}", workflow, key);
        return Ok(());
    }
    for cp in trail {
        println!("{}", render_checkpoint(&cp));
        println!();
    }
    Ok(())
}

/// Start or continue a submission run
async fn cmd_retry_submission(
    store: Arc<dyn CheckpointStore>,
    network: Network,
    publication: PublicationRef,
) -> Result<()> {
    let networks = load_networks().context("Failed to load network configuration")?;
    let config = AdapterConfig::from_env().context("Failed to load adapter configuration")?;
    let capabilities = build_capabilities(&config, &networks).context("Failed to build adapters")?;

    let engine = submission_workflow(&capabilities, store);
    let key = publication.thread_key();
    info!(thread_key = %key, network = network.as_str(), "retrying submission");

    let outcome = engine
        .run(SubmissionState::new(network, publication), &key)
        .await
        .context(format!("Submission run failed for {}", key))?;
    let state = outcome.state();

    println!("Submission {} on {}", key, network);
    println!("Verdict:   {}", serde_json::to_string(&state.verdict)?);
    if let Some(tx) = &state.settlement_tx {
        println!("Tx:        {}", tx);
    }
    Ok(())
}

/// Re-run a review that failed part-way
async fn cmd_retry_review(store: Arc<dyn CheckpointStore>, key: &ThreadKey) -> Result<()> {
    let engine = review_engine(store)?;
    info!(thread_key = %key, "retrying review");
    let outcome = engine
        .retry(key)
        .await
        .context(format!("Failed to retry review {}", key))?;
    print_review_outcome(key, outcome)
}

/// Resume a suspended review
async fn cmd_resume(store: Arc<dyn CheckpointStore>, key: &ThreadKey, input: ReviewResume) -> Result<()> {
    let engine = review_engine(store)?;
    let outcome = engine
        .resume(key, input)
        .await
        .context(format!("Failed to resume review {}", key))?;
    print_review_outcome(key, outcome)
}

fn review_engine(store: Arc<dyn CheckpointStore>) -> Result<WorkflowEngine<ReviewState>> {
    let networks = load_networks().context("Failed to load network configuration")?;
    let config = AdapterConfig::from_env().context("Failed to load adapter configuration")?;
    let capabilities = build_capabilities(&config, &networks).context("Failed to build adapters")?;
    Ok(review_workflow(&capabilities, store))
}

fn print_review_outcome(key: &ThreadKey, outcome: RunOutcome<ReviewState>) -> Result<()> {
    match outcome {
        RunOutcome::Completed(state) => {
            println!("Review {} settled", key);
            println!("Verdict:   {}", serde_json::to_string(&state.final_verdict)?);
            if let Some(tx) = &state.settlement_tx {
                println!("Tx:        {}", tx);
            }
        }
        RunOutcome::Interrupted { interrupt, .. } => {
            println!("Review {} waiting for {}", key, interrupt.kind);
            println!("{}", serde_json::to_string_pretty(&interrupt.payload)?);
        }
    }
    Ok(())
}

fn render_checkpoint(cp: &Checkpoint) -> String {
    let integrity = if cp.verify_digest() { "ok" } else { "MISMATCH" };
    format!(
        "checkpoint {}/{} #{}\nStep:      {} ({})\nDate:      {}\nDigest:    {} [{}]",
        cp.workflow,
        cp.thread_key,
        cp.seq,
        cp.step_name,
        cp.status,
        cp.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        cp.digest.short(),
        integrity,
    )
}
