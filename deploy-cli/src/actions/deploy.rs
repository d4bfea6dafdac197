// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::args::max_fee_per_gas::get_max_fee_per_gas_from_opt_param;
use crate::evm_network::get_deploy_target;
use crate::opt::Opt;
use color_eyre::eyre::{Context, Result};
use deploy_evm::common::Address;
use deploy_evm::constructor::parse_constructor_args;
use deploy_evm::utils::http_provider_with_wallet;
use deploy_evm::{get_contract_factory, ArtifactRegistry, TransactionConfig};

/// Deploys `opt.contract` once and prints its address.
pub async fn deploy_contract(opt: &Opt) -> Result<Address> {
    // Keeps an ephemeral node alive until the deployment is confirmed.
    let target = get_deploy_target(opt.network.as_deref())?;
    let network = target.network();
    let signer = target.signer()?;
    info!("Deploying from {} on {network}", signer.address());

    let transaction_config = TransactionConfig {
        max_fee_per_gas: get_max_fee_per_gas_from_opt_param(opt.max_fee_per_gas, &network)?,
        confirmation_timeout: opt.confirmation_timeout,
    };
    debug!("Using {transaction_config:?}");

    let provider = http_provider_with_wallet(network.rpc_url().clone(), signer);
    let registry = ArtifactRegistry::new(&opt.artifacts);

    let factory = get_contract_factory(&registry, &opt.contract, provider)
        .wrap_err_with(|| format!("Failed to get the contract factory for {}", opt.contract))?;
    let args = parse_constructor_args(&factory.artifact().abi, &opt.args)
        .wrap_err("Invalid constructor arguments")?;

    println!("Deploying contract...");
    let pending = factory
        .deploy(&args, &transaction_config)
        .await
        .wrap_err("Failed to send the deployment transaction")?;
    let deployed = pending
        .wait_for_deployment()
        .await
        .wrap_err("Deployment was not confirmed")?;

    info!(
        "{} deployed at {} in tx {} (block {:?}, gas used {})",
        opt.contract,
        deployed.address(),
        deployed.tx_hash,
        deployed.block_number,
        deployed.gas_used
    );
    println!("Contract deployed to: {}", deployed.address());

    Ok(deployed.address())
}
