// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::Network;
use alloy::signers::local::PrivateKeySigner;
use std::env;

/// environment variable holding the hex encoded private key of the deployer
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";

/// Private key of the first account every Anvil and Hardhat development node funds at genesis.
pub const DEVELOPMENT_ACCOUNT_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Private key is invalid")]
    PrivateKeyInvalid,
    #[error("No deployer key configured for {0}, set the {PRIVATE_KEY} environment variable")]
    MissingPrivateKey(Network),
}

/// Load the signer that pays for the deployment.
///
/// Only development networks fall back to the well-known dev account.
pub fn load_signer(network: &Network) -> Result<PrivateKeySigner, Error> {
    match env::var(PRIVATE_KEY) {
        Ok(key) => {
            debug!("Using deployer key from {PRIVATE_KEY}");
            parse_private_key(&key)
        }
        Err(_) if network.is_development() => {
            info!("{PRIVATE_KEY} is not set, using the default development account on {network}");
            parse_private_key(DEVELOPMENT_ACCOUNT_PRIVATE_KEY)
        }
        Err(_) => {
            error!("{PRIVATE_KEY} is not set and {network} is not a development network");
            Err(Error::MissingPrivateKey(network.clone()))
        }
    }
}

/// Parse a hex encoded private key, with or without the `0x` prefix.
pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner, Error> {
    key.trim().parse::<PrivateKeySigner>().map_err(|err| {
        error!("Error parsing private key: {err}");
        Error::PrivateKeyInvalid
    })
}
