// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::artifacts::{self, Artifact, ArtifactRegistry};
use crate::common::{Address, TxHash};
use crate::constructor::{self, encode_deploy_code};
use crate::transaction_config::TransactionConfig;
use alloy::dyn_abi::DynSolValue;
use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::providers::{PendingTransactionBuilder, PendingTransactionError, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportErrorKind};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Artifact(#[from] artifacts::Error),
    #[error(transparent)]
    Constructor(#[from] constructor::Error),
    #[error(transparent)]
    RpcError(#[from] RpcError<TransportErrorKind>),
    #[error(transparent)]
    PendingTransactionError(#[from] PendingTransactionError),
    #[error("Deployment transaction {0} reverted")]
    Reverted(TxHash),
    #[error("Receipt of deployment transaction {0} has no contract address")]
    MissingContractAddress(TxHash),
    #[error("No code found at {0} after deployment")]
    MissingCode(Address),
}

/// Knows how to deploy one compiled contract through a provider.
pub struct ContractFactory<P: Provider> {
    artifact: Artifact,
    provider: P,
}

/// Resolve `name` in the registry and build a factory for it.
pub fn get_contract_factory<P: Provider>(
    registry: &ArtifactRegistry,
    name: &str,
    provider: P,
) -> Result<ContractFactory<P>, Error> {
    let artifact = registry.get_artifact(name)?;
    Ok(ContractFactory::new(artifact, provider))
}

impl<P: Provider> ContractFactory<P> {
    pub fn new(artifact: Artifact, provider: P) -> Self {
        Self { artifact, provider }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Build the creation transaction without sending it.
    pub fn deploy_transaction(&self, args: &[DynSolValue]) -> Result<TransactionRequest, Error> {
        let deploy_code = encode_deploy_code(&self.artifact, args)?;
        Ok(TransactionRequest::default().with_deploy_code(deploy_code))
    }

    /// Send exactly one creation transaction for the contract.
    ///
    /// The transaction is not retried: a failed send surfaces immediately, and running the
    /// deployment again always creates a new instance.
    pub async fn deploy(
        &self,
        args: &[DynSolValue],
        transaction_config: &TransactionConfig,
    ) -> Result<PendingDeployment, Error> {
        let mut transaction_request = self.deploy_transaction(args)?;

        if let Some(fees) = transaction_config
            .max_fee_per_gas
            .resolve(&self.provider)
            .await?
        {
            debug!(
                "Using max fee per gas of {} wei with a priority fee of {} wei",
                fees.max_fee_per_gas, fees.max_priority_fee_per_gas
            );
            transaction_request.set_max_fee_per_gas(fees.max_fee_per_gas);
            transaction_request.set_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        }

        let pending_tx_builder = self
            .provider
            .send_transaction(transaction_request)
            .await
            .inspect_err(|err| {
                error!(
                    "Error to send_transaction while deploying {}: {err:?}",
                    self.artifact.contract_name
                )
            })?;

        info!(
            "{} deployment is pending with tx hash: {}",
            self.artifact.contract_name,
            pending_tx_builder.tx_hash()
        );

        Ok(PendingDeployment {
            contract_name: self.artifact.contract_name.clone(),
            pending_tx_builder,
            confirmation_timeout: transaction_config.confirmation_timeout,
        })
    }
}

/// A submitted creation transaction that has not been confirmed yet.
pub struct PendingDeployment {
    contract_name: String,
    pending_tx_builder: PendingTransactionBuilder<Ethereum>,
    confirmation_timeout: Option<Duration>,
}

impl PendingDeployment {
    pub fn tx_hash(&self) -> TxHash {
        *self.pending_tx_builder.tx_hash()
    }

    /// Wait until the network has included the transaction and the contract code is live.
    pub async fn wait_for_deployment(self) -> Result<DeployedContract, Error> {
        let tx_hash = self.tx_hash();
        let provider = self.pending_tx_builder.provider().clone();

        let receipt = self
            .pending_tx_builder
            .with_timeout(self.confirmation_timeout)
            .get_receipt()
            .await
            .inspect_err(|err| {
                error!("Error waiting for deployment of {}: {err:?}", self.contract_name)
            })?;

        if !receipt.status() {
            error!("Deployment of {} reverted in tx {tx_hash}", self.contract_name);
            return Err(Error::Reverted(tx_hash));
        }

        let address = receipt
            .contract_address
            .ok_or(Error::MissingContractAddress(tx_hash))?;

        let code = provider.get_code_at(address).await?;
        if code.is_empty() {
            error!("No code at {address} after deploying {}", self.contract_name);
            return Err(Error::MissingCode(address));
        }

        let deployed = DeployedContract {
            address,
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        };
        info!(
            "{} deployed to {address} in block {:?}, gas used: {}",
            self.contract_name, deployed.block_number, deployed.gas_used
        );

        Ok(deployed)
    }
}

/// A confirmed contract instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    address: Address,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl DeployedContract {
    pub fn address(&self) -> Address {
        self.address
    }
}
