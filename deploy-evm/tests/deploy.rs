#![allow(clippy::unwrap_used)]

use alloy::consensus::Transaction as _;
use alloy::dyn_abi::DynSolValue;
use alloy::network::Ethereum;
use alloy::node_bindings::Anvil;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use deploy_evm::artifacts;
use deploy_evm::constructor::parse_constructor_args;
use deploy_evm::factory::Error;
use deploy_evm::testnet::Testnet;
use deploy_evm::utils::http_provider_with_wallet;
use deploy_evm::{get_contract_factory, ArtifactRegistry, MaxFeePerGas, TransactionConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn fixture_registry() -> ArtifactRegistry {
    ArtifactRegistry::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("artifacts"),
    )
}

fn setup() -> (Testnet, DynProvider<Ethereum>, Address) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let testnet = Testnet::new().expect("Could not spawn Anvil node, run `foundryup` first");
    let signer = testnet.default_signer();
    let deployer = signer.address();
    let provider = http_provider_with_wallet(testnet.rpc_url().clone(), signer);
    (testnet, provider, deployer)
}

#[tokio::test]
async fn test_deploy() {
    let (_testnet, provider, _) = setup();
    let factory =
        get_contract_factory(&fixture_registry(), "PaywithBTCWithEncryption", provider.clone())
            .unwrap();

    let deployed = factory
        .deploy(&[], &TransactionConfig::default())
        .await
        .unwrap()
        .wait_for_deployment()
        .await
        .unwrap();

    assert_ne!(deployed.address(), Address::ZERO);
    assert!(!provider.get_code_at(deployed.address()).await.unwrap().is_empty());
    assert!(deployed.block_number.is_some());
    assert!(deployed.gas_used > 0);
}

#[tokio::test]
async fn test_deploy_with_constructor_arguments() {
    let (_testnet, provider, _) = setup();
    let factory = get_contract_factory(&fixture_registry(), "Greeter", provider).unwrap();

    let args = parse_constructor_args(
        &factory.artifact().abi,
        &["hello world".to_string(), "2".to_string()],
    )
    .unwrap();
    assert_eq!(args[1], DynSolValue::Uint(U256::from(2), 256));

    let deployed = factory
        .deploy(&args, &TransactionConfig::default())
        .await
        .unwrap()
        .wait_for_deployment()
        .await
        .unwrap();

    assert_ne!(deployed.address(), Address::ZERO);
}

#[tokio::test]
async fn test_each_run_sends_one_transaction_and_creates_a_new_instance() {
    let (_testnet, provider, deployer) = setup();
    let registry = fixture_registry();
    let config = TransactionConfig::default();

    let mut addresses = Vec::new();
    for expected_nonce in 1..=2u64 {
        let factory =
            get_contract_factory(&registry, "PaywithBTCWithEncryption", provider.clone()).unwrap();
        let deployed = factory
            .deploy(&[], &config)
            .await
            .unwrap()
            .wait_for_deployment()
            .await
            .unwrap();
        addresses.push(deployed.address());

        let nonce = provider.get_transaction_count(deployer).await.unwrap();
        assert_eq!(nonce, expected_nonce);
    }

    assert_ne!(addresses[0], addresses[1]);
    assert_eq!(addresses[0], deployer.create(0));
    assert_eq!(addresses[1], deployer.create(1));
}

#[tokio::test]
async fn test_reverting_constructor_fails_the_deployment() {
    let (_testnet, provider, _) = setup();
    let factory = get_contract_factory(&fixture_registry(), "Reverter", provider).unwrap();

    let result = match factory.deploy(&[], &TransactionConfig::default()).await {
        Ok(pending) => pending.wait_for_deployment().await,
        Err(err) => Err(err),
    };

    // Gas estimation usually catches the revert before anything is sent.
    assert!(matches!(
        result,
        Err(Error::RpcError(_)) | Err(Error::Reverted(_))
    ));
}

#[tokio::test]
async fn test_unknown_contract_is_not_deployed() {
    let (_testnet, provider, deployer) = setup();

    let result = get_contract_factory(&fixture_registry(), "DoesNotExist", provider.clone());
    assert!(matches!(
        result,
        Err(Error::Artifact(artifacts::Error::NotFound { .. }))
    ));
    assert_eq!(provider.get_transaction_count(deployer).await.unwrap(), 0);
}

#[tokio::test]
async fn test_abstract_contract_is_not_deployed() {
    let (_testnet, provider, deployer) = setup();
    let factory = get_contract_factory(&fixture_registry(), "IGreeter", provider.clone()).unwrap();

    let result = factory.deploy(&[], &TransactionConfig::default()).await;
    assert!(matches!(result, Err(Error::Constructor(_))));
    assert_eq!(provider.get_transaction_count(deployer).await.unwrap(), 0);
}

#[tokio::test]
async fn test_rpc_failure_surfaces_as_an_error() {
    // Nothing listens on the discard port.
    let signer = deploy_evm::wallet::parse_private_key(
        deploy_evm::wallet::DEVELOPMENT_ACCOUNT_PRIVATE_KEY,
    )
    .unwrap();
    let provider = http_provider_with_wallet("http://127.0.0.1:9".parse().unwrap(), signer);
    let factory =
        get_contract_factory(&fixture_registry(), "PaywithBTCWithEncryption", provider).unwrap();

    let result = factory.deploy(&[], &TransactionConfig::default()).await;
    assert!(matches!(result, Err(Error::RpcError(_))));
}

#[tokio::test]
async fn test_custom_max_fee_is_sent_with_the_transaction() {
    let (_testnet, provider, _) = setup();
    let factory =
        get_contract_factory(&fixture_registry(), "PaywithBTCWithEncryption", provider.clone())
            .unwrap();
    let max_fee_per_gas = 5_000_000_000;
    let config = TransactionConfig {
        max_fee_per_gas: MaxFeePerGas::Custom(max_fee_per_gas),
        confirmation_timeout: None,
    };

    let pending = factory.deploy(&[], &config).await.unwrap();
    let tx_hash = pending.tx_hash();
    pending.wait_for_deployment().await.unwrap();

    let tx = provider
        .get_transaction_by_hash(tx_hash)
        .await
        .unwrap()
        .expect("transaction is known");
    assert_eq!(tx.max_fee_per_gas(), max_fee_per_gas);
    assert!(tx.max_priority_fee_per_gas().unwrap() <= max_fee_per_gas);
}

#[tokio::test]
async fn test_limited_auto_fee_never_exceeds_the_limit() {
    let (_testnet, provider, _) = setup();
    let factory =
        get_contract_factory(&fixture_registry(), "PaywithBTCWithEncryption", provider.clone())
            .unwrap();
    let limit = 50_000_000_000;
    let config = TransactionConfig {
        max_fee_per_gas: MaxFeePerGas::LimitedAuto(limit),
        confirmation_timeout: None,
    };

    let pending = factory.deploy(&[], &config).await.unwrap();
    let tx_hash = pending.tx_hash();
    pending.wait_for_deployment().await.unwrap();

    let tx = provider
        .get_transaction_by_hash(tx_hash)
        .await
        .unwrap()
        .expect("transaction is known");
    assert!(tx.max_fee_per_gas() <= limit);
    assert!(tx.max_priority_fee_per_gas().is_some());
}

#[tokio::test]
async fn test_unconfirmed_deployment_times_out() {
    // Transactions stay in the mempool of a node that never mines.
    let anvil = Anvil::new().arg("--no-mining").try_spawn().unwrap();
    let provider = http_provider_with_wallet(anvil.endpoint_url(), anvil.keys()[0].clone().into());
    let factory =
        get_contract_factory(&fixture_registry(), "PaywithBTCWithEncryption", provider).unwrap();
    let config = TransactionConfig {
        max_fee_per_gas: MaxFeePerGas::Auto,
        confirmation_timeout: Some(Duration::from_secs(1)),
    };

    let pending = factory.deploy(&[], &config).await.unwrap();
    let result = pending.wait_for_deployment().await;

    assert!(matches!(result, Err(Error::PendingTransactionError(_))));
}
