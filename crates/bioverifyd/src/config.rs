//! Daemon configuration

use std::net::SocketAddr;

use bioverify_core::config::env_var;

use crate::error::{DaemonError, DaemonResult};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen_addr: SocketAddr,
    /// Bearer token for operator routes. Unset means those routes fail closed.
    pub operator_token: Option<String>,
}

impl DaemonConfig {
    /// Read `BIOVERIFY_LISTEN_ADDR` and `BIOVERIFY_OPERATOR_TOKEN`.
    pub fn from_env() -> DaemonResult<Self> {
        let raw = env_var("BIOVERIFY_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        Ok(Self {
            listen_addr: parse_listen_addr(&raw)?,
            operator_token: env_var("BIOVERIFY_OPERATOR_TOKEN"),
        })
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }
}

pub fn parse_listen_addr(raw: &str) -> DaemonResult<SocketAddr> {
    raw.parse()
        .map_err(|e| DaemonError::Config(format!("invalid listen address {raw:?}: {e}")))
}
