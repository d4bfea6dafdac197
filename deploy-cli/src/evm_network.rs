// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::eyre::{Context, Result};
use deploy_evm::common::PrivateKeySigner;
use deploy_evm::testnet::Testnet;
use deploy_evm::utils::{get_evm_network, EVM_NETWORK};
use deploy_evm::wallet::load_signer;
use deploy_evm::Network;

/// Network name that spawns a throwaway Anvil node for a single deployment.
pub const EPHEMERAL_NETWORK: &str = "ephemeral";

/// Where a deployment goes. An ephemeral node lives as long as this value.
pub enum DeployTarget {
    Network(Network),
    Ephemeral(Testnet),
}

impl DeployTarget {
    pub fn network(&self) -> Network {
        match self {
            DeployTarget::Network(network) => network.clone(),
            DeployTarget::Ephemeral(testnet) => testnet.to_network(),
        }
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        match self {
            DeployTarget::Network(network) => {
                load_signer(network).wrap_err("Failed to load the deployer key")
            }
            DeployTarget::Ephemeral(testnet) => Ok(testnet.default_signer()),
        }
    }
}

/// Resolves the `--network` flag, falling back to the environment.
pub fn get_deploy_target(requested: Option<&str>) -> Result<DeployTarget> {
    let from_env = std::env::var(EVM_NETWORK).ok();
    let wants_ephemeral = match requested {
        Some(name) => name == EPHEMERAL_NETWORK,
        None => from_env.as_deref() == Some(EPHEMERAL_NETWORK),
    };

    if wants_ephemeral {
        let testnet = Testnet::new().wrap_err("Failed to start the ephemeral network")?;
        return Ok(DeployTarget::Ephemeral(testnet));
    }

    let network = get_evm_network(requested).wrap_err("Failed to select the EVM network")?;
    Ok(DeployTarget::Network(network))
}
