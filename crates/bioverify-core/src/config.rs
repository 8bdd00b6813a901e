//! Runtime configuration: per-network registry, contract settings and
//! webhook secrets, read from the environment once at startup.

use crate::domain::{Address, Network};
use crate::error::BioVerifyError;

/// A value per configured network, looked up by exhaustive match.
#[derive(Debug, Clone)]
pub struct NetworkRegistry<T> {
    sepolia: Option<T>,
    sei_testnet: Option<T>,
}

impl<T> Default for NetworkRegistry<T> {
    fn default() -> Self {
        Self {
            sepolia: None,
            sei_testnet: None,
        }
    }
}

impl<T> NetworkRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, network: Network, value: T) -> Self {
        self.insert(network, value);
        self
    }

    pub fn insert(&mut self, network: Network, value: T) {
        *self.slot_mut(network) = Some(value);
    }

    pub fn get(&self, network: Network) -> Option<&T> {
        match network {
            Network::Sepolia => self.sepolia.as_ref(),
            Network::SeiTestnet => self.sei_testnet.as_ref(),
        }
    }

    /// Configured entries in [`Network::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Network, &T)> {
        Network::ALL
            .into_iter()
            .filter_map(move |n| self.get(n).map(|v| (n, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Map every entry, keeping the network keys.
    pub fn map<U>(&self, mut f: impl FnMut(Network, &T) -> U) -> NetworkRegistry<U> {
        let mut out = NetworkRegistry::new();
        for (network, value) in self.iter() {
            out.insert(network, f(network, value));
        }
        out
    }

    fn slot_mut(&mut self, network: Network) -> &mut Option<T> {
        match network {
            Network::Sepolia => &mut self.sepolia,
            Network::SeiTestnet => &mut self.sei_testnet,
        }
    }
}

/// Contract function names used for settlement.
///
/// Deployed contract versions name these differently, so each can be
/// overridden per network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementFunctions {
    pub slash_publisher: String,
    pub pick_reviewers: String,
    pub publish: String,
    pub slash_publication: String,
}

impl Default for SettlementFunctions {
    fn default() -> Self {
        Self {
            slash_publisher: "slashPublisher".into(),
            pick_reviewers: "pickReviewers".into(),
            publish: "settleReviewPass".into(),
            slash_publication: "settleReviewFail".into(),
        }
    }
}

impl SettlementFunctions {
    /// Defaults overridden by `BIOVERIFY_<NET>_FN_*` variables.
    pub fn from_env(network: Network) -> Self {
        let defaults = Self::default();
        let prefix = network.env_prefix();
        let pick = |suffix: &str, default: String| {
            env_var(&format!("BIOVERIFY_{prefix}_FN_{suffix}")).unwrap_or(default)
        };
        Self {
            slash_publisher: pick("SLASH_PUBLISHER", defaults.slash_publisher),
            pick_reviewers: pick("PICK_REVIEWERS", defaults.pick_reviewers),
            publish: pick("PUBLISH", defaults.publish),
            slash_publication: pick("SLASH_PUBLICATION", defaults.slash_publication),
        }
    }
}

/// Deployed contract and the agent account acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    pub address: Address,
    pub agent: Address,
    pub functions: SettlementFunctions,
}

/// Chain endpoints plus contract settings for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Endpoint exposing the agent's signing capability
    /// (`eth_sendTransaction`). Defaults to `rpc_url`.
    pub signer_url: String,
    pub contract: ContractConfig,
}

impl NetworkConfig {
    /// Read one network's settings.
    ///
    /// Returns `Ok(None)` when `BIOVERIFY_<NET>_RPC_URL` is unset (the network
    /// is not served); a partially configured network is an error.
    pub fn from_env(network: Network) -> Result<Option<Self>, BioVerifyError> {
        let prefix = network.env_prefix();
        let Some(rpc_url) = env_var(&format!("BIOVERIFY_{prefix}_RPC_URL")) else {
            return Ok(None);
        };
        let signer_url =
            env_var(&format!("BIOVERIFY_{prefix}_SIGNER_URL")).unwrap_or_else(|| rpc_url.clone());
        let address = required_address(&format!("BIOVERIFY_{prefix}_CONTRACT_ADDRESS"))?;
        let agent = required_address("AGENT_ADDRESS")?;

        Ok(Some(Self {
            rpc_url,
            signer_url,
            contract: ContractConfig {
                address,
                agent,
                functions: SettlementFunctions::from_env(network),
            },
        }))
    }
}

/// Every network with an RPC URL configured.
pub fn load_networks() -> Result<NetworkRegistry<NetworkConfig>, BioVerifyError> {
    let mut registry = NetworkRegistry::new();
    for network in Network::ALL {
        if let Some(cfg) = NetworkConfig::from_env(network)? {
            registry.insert(network, cfg);
        }
    }
    Ok(registry)
}

/// Webhook shared secrets, one set per event kind.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecrets {
    pub submission: NetworkRegistry<String>,
    pub picked_reviewers: NetworkRegistry<String>,
}

impl WebhookSecrets {
    /// Read `ALCHEMY_<NET>_SubmittedPublication_WEBHOOK_SK` and
    /// `ALCHEMY_<NET>_Agent_PickedReviewers_WEBHOOK_SK`. Missing secrets are
    /// left out; an empty set fails closed at request time.
    pub fn from_env() -> Self {
        let mut secrets = Self::default();
        for network in Network::ALL {
            let label = network.webhook_label();
            if let Some(sk) = env_var(&format!("ALCHEMY_{label}_SubmittedPublication_WEBHOOK_SK")) {
                secrets.submission.insert(network, sk);
            }
            if let Some(sk) = env_var(&format!("ALCHEMY_{label}_Agent_PickedReviewers_WEBHOOK_SK")) {
                secrets.picked_reviewers.insert(network, sk);
            }
        }
        secrets
    }
}

/// A non-empty, trimmed environment variable.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_address(name: &str) -> Result<Address, BioVerifyError> {
    let raw = env_var(name)
        .ok_or_else(|| BioVerifyError::Configuration(format!("{name} is not set")))?;
    Address::parse(&raw).map_err(|e| BioVerifyError::Configuration(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_is_per_network() {
        let reg = NetworkRegistry::new().with(Network::SeiTestnet, "sei");
        assert_eq!(reg.get(Network::SeiTestnet), Some(&"sei"));
        assert_eq!(reg.get(Network::Sepolia), None);
        assert_eq!(reg.len(), 1);
        assert!(!reg.is_empty());
        assert!(NetworkRegistry::<u8>::new().is_empty());
    }

    #[test]
    fn test_registry_iterates_in_network_order() {
        let reg = NetworkRegistry::new()
            .with(Network::SeiTestnet, 2)
            .with(Network::Sepolia, 1);
        let order: Vec<_> = reg.iter().map(|(n, v)| (n, *v)).collect();
        assert_eq!(order, vec![(Network::Sepolia, 1), (Network::SeiTestnet, 2)]);

        let doubled = reg.map(|_, v| v * 2);
        assert_eq!(doubled.get(Network::SeiTestnet), Some(&4));
    }

    #[test]
    fn test_default_settlement_functions() {
        let f = SettlementFunctions::default();
        assert_eq!(f.slash_publisher, "slashPublisher");
        assert_eq!(f.pick_reviewers, "pickReviewers");
        assert_eq!(f.publish, "settleReviewPass");
        assert_eq!(f.slash_publication, "settleReviewFail");
    }
}
