//! ERC-8001 swap demo
//!
//! Proposes and accepts an atomic swap between two local keys entirely
//! offline, then prints the signed objects and the calldata that would be
//! submitted to the verifier. No transaction is sent.

use anyhow::{Context, Result};
use erc8001_coordinator::config::{Deployment, Settings};
use erc8001_coordinator::contract;
use erc8001_coordinator::signer::EthersTypedDataSigner;
use erc8001_coordinator::{
    format_token_amount, parse_token_amount, status_name, AtomicSwapClient, ProposeSwapParams,
    TypedDataSigner,
};

use alloy_primitives::Bytes;
use ethers::signers::LocalWallet;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const USDC_DECIMALS: u8 = 6;
const WETH_DECIMALS: u8 = 18;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting ERC-8001 swap demo v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    let deployment = settings.default_deployment()?;
    info!(
        "Using network {} (chain {})",
        settings.client.network, deployment.chain_id
    );

    let proposer = load_signer(&settings.signer.proposer_key_env)?;
    let counterparty = load_signer(&settings.signer.counterparty_key_env)?;

    let mut alice = AtomicSwapClient::from_settings(proposer, &settings)?;
    let mut bob = AtomicSwapClient::from_settings(counterparty, &settings)?;
    let bob_address = bob.address().await?;

    let params = swap_params(&deployment, bob_address)?;
    info!(
        "Offering {} USDC for {} WETH",
        format_token_amount(params.offer_amount, USDC_DECIMALS)?,
        format_token_amount(params.want_amount, WETH_DECIMALS)?
    );

    // Alice signs the proposal
    let proposal = alice
        .create_swap_proposal(&params)
        .await
        .context("Failed to create swap proposal")?;

    // Bob receives it out-of-band and accepts
    bob.store_proposal(proposal.clone());
    let acceptance = bob
        .create_acceptance(proposal.intent_hash, None)
        .await
        .context("Failed to sign acceptance")?;

    info!(
        "Local status on Bob's side: {}",
        status_name(bob.local_status(&proposal.intent_hash).code())
    );

    let output = json!({
        "proposal": proposal,
        "acceptance": acceptance,
        "calldata": {
            "approveOffer": contract::approve_calldata(alice.domain().verifying_contract(), params.offer_amount),
            "approveWant": contract::approve_calldata(bob.domain().verifying_contract(), params.want_amount),
            "proposeCoordination": contract::propose_calldata(
                &proposal.intent,
                &proposal.payload,
                &proposal.signature,
            ),
            "acceptCoordination": contract::accept_calldata(
                &acceptance.attestation,
                &acceptance.signature,
            ),
            "executeCoordination": contract::execute_calldata(
                proposal.intent_hash,
                &proposal.payload,
                &Bytes::new(),
            ),
            "getCoordinationStatus": contract::status_query_calldata(proposal.intent_hash),
        },
    });

    println!("{}", serde_json::to_string_pretty(&output)?);

    info!("Swap demo finished");
    Ok(())
}

fn swap_params(
    deployment: &Deployment,
    counterparty: alloy_primitives::Address,
) -> Result<ProposeSwapParams> {
    Ok(ProposeSwapParams {
        offer_token: deployment.mock_usdc,
        offer_amount: parse_token_amount("100", USDC_DECIMALS)?,
        want_token: deployment.mock_weth,
        want_amount: parse_token_amount("0.1", WETH_DECIMALS)?,
        counterparty,
        ttl_secs: None,
    })
}

/// Load a wallet from the private key held in `env_var`
fn load_signer(env_var: &str) -> Result<Arc<dyn TypedDataSigner>> {
    let key = std::env::var(env_var)
        .with_context(|| format!("No private key configured. Set {}", env_var))?;

    let wallet = key
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .with_context(|| format!("Invalid private key in {}", env_var))?;

    Ok(Arc::new(EthersTypedDataSigner::new(wallet)))
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,erc8001_coordinator=debug"));

    // stdout carries the JSON result, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
