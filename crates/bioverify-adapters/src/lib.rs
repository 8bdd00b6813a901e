//! BioVerify Adapters: HTTP implementations of the workflow capabilities
//!
//! - `IpfsGateway`: content-addressed fetch (`ContentStore`)
//! - `TavilySearch`: literal-match web search (`EvidenceSearch`)
//! - `GeminiVerdict`: schema-constrained verdict model (`StructuredVerdict`)
//! - `JsonRpcChain`: `eth_call` simulation and signer submission (`ChainClient`)
//! - `TelegramNotifier`: best-effort chat notifications (`Notifier`)
//!
//! Every adapter shares one `reqwest::Client` carrying the request timeout.

pub mod config;
pub mod gateway;
pub mod gemini;
mod http;
pub mod rpc;
pub mod tavily;
pub mod telegram;

use std::sync::Arc;

use bioverify_core::{
    BioVerifyError, Capabilities, ChainSettlement, NetworkChain, NetworkConfig, NetworkRegistry,
};

pub use config::AdapterConfig;
pub use gateway::IpfsGateway;
pub use gemini::GeminiVerdict;
pub use http::build_client;
pub use rpc::JsonRpcChain;
pub use tavily::TavilySearch;
pub use telegram::{TelegramCredentials, TelegramNotifier};

/// Bind each configured network to a JSON-RPC client.
pub fn chain_registry(
    networks: &NetworkRegistry<NetworkConfig>,
    client: &reqwest::Client,
) -> NetworkRegistry<NetworkChain> {
    networks.map(|_, cfg| NetworkChain {
        contract: cfg.contract.clone(),
        client: Arc::new(JsonRpcChain::new(
            cfg.rpc_url.clone(),
            cfg.signer_url.clone(),
            client.clone(),
        )),
    })
}

/// Wire the production capabilities for both workflows.
pub fn build_capabilities(
    config: &AdapterConfig,
    networks: &NetworkRegistry<NetworkConfig>,
) -> Result<Capabilities, BioVerifyError> {
    let client = build_client(config.http_timeout)?;

    let notifier = TelegramNotifier::new(
        config.telegram_api_base.clone(),
        config.telegram.clone(),
        client.clone(),
    );
    let settlement = ChainSettlement::new(
        chain_registry(networks, &client),
        Arc::new(notifier),
        config.gateway_url.clone(),
    );

    Ok(Capabilities {
        content: Arc::new(IpfsGateway::new(config.gateway_url.clone(), client.clone())),
        search: Arc::new(TavilySearch::new(
            config.search_url.clone(),
            config.search_api_key.clone(),
            client.clone(),
        )),
        verdict: Arc::new(GeminiVerdict::new(
            config.model_base_url.clone(),
            config.model.clone(),
            config.model_api_key.clone(),
            client,
        )),
        settlement: Arc::new(settlement),
    })
}
