// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{CustomNetwork, Network};
use alloy::network::{Ethereum, EthereumWallet};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest;
use std::env;
use std::str::FromStr;

/// environment variable to select one of the known networks by name
pub const EVM_NETWORK: &str = "EVM_NETWORK";
/// environment variable to connect to a custom EVM network
pub const RPC_URL: &str = "RPC_URL";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown EVM network {0:?}, expected one of: localhost, arbitrum-one, arbitrum-sepolia or an http(s) RPC URL")]
    UnknownNetwork(String),
    #[error("Invalid RPC URL {0:?}: {1}")]
    InvalidRpcUrl(String, String),
}

/// Select the network to deploy to.
///
/// An explicitly requested network always wins. Otherwise the `EVM_NETWORK` environment variable
/// is consulted, then `RPC_URL` for a custom network. With none of those set we fall back to the
/// local development node, which is what a deployment script run without flags expects.
pub fn get_evm_network(requested: Option<&str>) -> Result<Network, Error> {
    if let Some(name) = requested {
        debug!("Using EVM network {name:?} as requested");
        return Network::from_str(name);
    }

    if let Ok(name) = env::var(EVM_NETWORK) {
        info!("Using EVM network {name:?} as {EVM_NETWORK} is set");
        return Network::from_str(&name);
    }

    if let Ok(rpc_url) = env::var(RPC_URL) {
        info!("Using custom EVM network from {RPC_URL}");
        return Ok(Network::Custom(CustomNetwork::new(&rpc_url)?));
    }

    info!("No EVM network configured, defaulting to {}", Network::Localhost);
    Ok(Network::Localhost)
}

/// An HTTP provider with the recommended fillers that signs with the given key.
pub fn http_provider_with_wallet(
    rpc_url: reqwest::Url,
    signer: PrivateKeySigner,
) -> DynProvider<Ethereum> {
    let wallet = EthereumWallet::from(signer);

    ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(rpc_url)
        .erased()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_network_takes_precedence() {
        let network = get_evm_network(Some("arbitrum-sepolia")).expect("known network");
        assert_eq!(network, Network::ArbitrumSepolia);
    }

    #[test]
    fn explicit_invalid_rpc_url_is_reported() {
        let err = get_evm_network(Some("http://")).expect_err("invalid url");
        assert!(matches!(err, Error::InvalidRpcUrl(..)));
    }
}
