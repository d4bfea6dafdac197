// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::Wei;
use alloy::transports::http::reqwest;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::sync::LazyLock;

#[macro_use]
extern crate tracing;

pub mod artifacts;
pub mod common;
pub mod constructor;
pub mod factory;
pub mod testnet;
pub mod transaction_config;
pub mod utils;
pub mod wallet;

pub use artifacts::{Artifact, ArtifactRegistry};
pub use factory::{get_contract_factory, ContractFactory, DeployedContract, PendingDeployment};
pub use transaction_config::{GasFees, MaxFeePerGas, TransactionConfig};

static LOCALHOST_HTTP_RPC_URL: LazyLock<reqwest::Url> = LazyLock::new(|| {
    "http://localhost:8545"
        .parse()
        .expect("Invalid RPC URL")
});

static PUBLIC_ARBITRUM_ONE_HTTP_RPC_URL: LazyLock<reqwest::Url> = LazyLock::new(|| {
    "https://arb1.arbitrum.io/rpc"
        .parse()
        .expect("Invalid RPC URL")
});

static PUBLIC_ARBITRUM_SEPOLIA_HTTP_RPC_URL: LazyLock<reqwest::Url> = LazyLock::new(|| {
    "https://sepolia-rollup.arbitrum.io/rpc"
        .parse()
        .expect("Invalid RPC URL")
});

const AVERAGE_GAS_FEE_ARBITRUM_ONE: Wei = 15_000_000;
const AVERAGE_GAS_FEE_ARBITRUM_SEPOLIA: Wei = 100_000_000;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomNetwork {
    #[serde_as(as = "DisplayFromStr")]
    pub rpc_url_http: reqwest::Url,
}

impl CustomNetwork {
    pub fn new(rpc_url: &str) -> Result<Self, utils::Error> {
        let rpc_url_http = reqwest::Url::parse(rpc_url)
            .map_err(|err| utils::Error::InvalidRpcUrl(rpc_url.to_string(), err.to_string()))?;
        Ok(Self { rpc_url_http })
    }
}

/// The network a contract gets deployed to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Network {
    /// A development node listening on `http://localhost:8545`, e.g. `anvil` or `hardhat node`.
    #[default]
    Localhost,
    ArbitrumOne,
    ArbitrumSepolia,
    Custom(CustomNetwork),
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Localhost => write!(f, "localhost"),
            Network::ArbitrumOne => write!(f, "arbitrum-one"),
            Network::ArbitrumSepolia => write!(f, "arbitrum-sepolia"),
            Network::Custom(custom) => write!(f, "{}", custom.rpc_url_http),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = utils::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "localhost" => Ok(Network::Localhost),
            "arbitrum-one" => Ok(Network::ArbitrumOne),
            "arbitrum-sepolia" => Ok(Network::ArbitrumSepolia),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Network::Custom(CustomNetwork::new(url)?))
            }
            other => Err(utils::Error::UnknownNetwork(other.to_string())),
        }
    }
}

impl Network {
    pub fn rpc_url(&self) -> &reqwest::Url {
        match self {
            Network::Localhost => &LOCALHOST_HTTP_RPC_URL,
            Network::ArbitrumOne => &PUBLIC_ARBITRUM_ONE_HTTP_RPC_URL,
            Network::ArbitrumSepolia => &PUBLIC_ARBITRUM_SEPOLIA_HTTP_RPC_URL,
            Network::Custom(custom) => &custom.rpc_url_http,
        }
    }

    /// Development networks accept the well-known, publicly funded dev accounts.
    pub fn is_development(&self) -> bool {
        match self {
            Network::Localhost => true,
            Network::ArbitrumOne | Network::ArbitrumSepolia => false,
            Network::Custom(custom) => matches!(
                custom.rpc_url_http.host_str(),
                Some("localhost") | Some("127.0.0.1") | Some("0.0.0.0")
            ),
        }
    }

    /// Typical fee per gas on the network, used as the baseline for capped fee policies.
    pub fn average_gas_fee(&self) -> Option<Wei> {
        match self {
            Network::ArbitrumOne => Some(AVERAGE_GAS_FEE_ARBITRUM_ONE),
            Network::ArbitrumSepolia => Some(AVERAGE_GAS_FEE_ARBITRUM_SEPOLIA),
            Network::Localhost | Network::Custom(_) => None,
        }
    }
}
