//! BioVerify daemon
//!
//! HTTP surface of the orchestration layer:
//! - signed contract-event webhooks that trigger workflow runs
//! - vote delivery that resumes suspended reviews
//! - checkpoint inspection and health routes
//!
//! Runs execute in background tasks guarded by an in-process single-flight
//! set; the HTTP response never waits on a model or chain call.

pub mod config;
pub mod error;
pub mod handlers;
pub mod inflight;
pub mod router;
pub mod runs;
pub mod server;
pub mod state;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, DaemonResult};
pub use router::create_router;
pub use server::Server;
pub use state::{AppState, Engines};
