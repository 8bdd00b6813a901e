//! Tracing setup shared by `bioverifyd` and the `bioverify` CLI.
//!
//! Workspace crates log at the requested level; the database, HTTP and
//! runtime dependencies are held at `warn` unless `RUST_LOG` says otherwise.
//! In JSON mode every line carries the enclosing `bioverify.run` span, so
//! `workflow` and `thread_key` appear on each event of a run.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const WORKSPACE_TARGETS: &[&str] = &[
    "bioverify_core",
    "bioverify_state",
    "bioverify_adapters",
    "bioverifyd",
    "bioverify",
];

const QUIET_TARGETS: &[&str] = &["surrealdb", "surrealkv", "hyper", "reqwest", "rustls"];

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(WORKSPACE_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.push(format!("tower_http={level}"));
    directives.extend(QUIET_TARGETS.iter().map(|t| format!("{t}=warn")));
    directives.join(",")
}

/// Install the global subscriber. Only the first call in a process takes
/// effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()
            .ok();
    }
}
