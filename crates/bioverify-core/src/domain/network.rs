//! Supported chain networks.

use serde::{Deserialize, Serialize};

use crate::error::BioVerifyError;

/// A network the protocol contract is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Sepolia,
    SeiTestnet,
}

impl Network {
    /// Every supported network, in secret-matching order.
    pub const ALL: [Network; 2] = [Network::Sepolia, Network::SeiTestnet];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sepolia => "sepolia",
            Self::SeiTestnet => "sei_testnet",
        }
    }

    /// Prefix of the `BIOVERIFY_<NET>_*` configuration variables.
    pub fn env_prefix(self) -> &'static str {
        match self {
            Self::Sepolia => "SEPOLIA",
            Self::SeiTestnet => "SEI_TESTNET",
        }
    }

    /// Network label used in the webhook provider's secret variable names.
    pub fn webhook_label(self) -> &'static str {
        match self {
            Self::Sepolia => "ETH_SEPOLIA",
            Self::SeiTestnet => "SEI_TESTNET",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = BioVerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sepolia" | "eth_sepolia" => Ok(Self::Sepolia),
            "sei_testnet" => Ok(Self::SeiTestnet),
            other => Err(BioVerifyError::InvalidInput(format!(
                "unknown network: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("sepolia".parse::<Network>().unwrap(), Network::Sepolia);
        assert_eq!("SEI-TESTNET".parse::<Network>().unwrap(), Network::SeiTestnet);
        assert!("mainnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_as_str_round_trips() {
        for net in Network::ALL {
            assert_eq!(net.as_str().parse::<Network>().unwrap(), net);
        }
    }
}
