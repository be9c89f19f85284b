//! Atomic swap coordination client

use crate::codec::decode_swap_terms;
use crate::config::{Deployment, Settings};
use crate::eip712::{hash_intent, hash_payload, Domain};
use crate::error::{CoordinationError, CoordinationResult};
use crate::intent::{IntentDraft, DEFAULT_TTL_SECS, SWAP_TYPE};
use crate::metrics;
use crate::signer::{CoordinationSigner, SignedAcceptance, TypedDataSigner};
use crate::types::{AgentIntent, CoordinationPayload, CoordinationStatus, SwapTerms};

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ATOMIC_SWAP_DOMAIN_NAME: &str = "AtomicSwap";
pub const ATOMIC_SWAP_DOMAIN_VERSION: &str = "1";

/// Nonce stamped on every proposal.
///
/// Not read from the verifier's per-agent counter, so two live proposals
/// from one agent collide on-chain.
// TODO: read getAgentNonce through the caller's transport before signing
pub const PROPOSAL_NONCE: u64 = 1;

/// Arguments of [`AtomicSwapClient::create_swap_proposal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposeSwapParams {
    /// Token offered, in base units of `offer_amount`
    pub offer_token: Address,
    pub offer_amount: U256,
    /// Token wanted in exchange
    pub want_token: Address,
    pub want_amount: U256,
    pub counterparty: Address,
    /// Client default when unset
    pub ttl_secs: Option<u64>,
}

/// A signed proposal, as cached locally and handed to the counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapProposal {
    pub intent_hash: B256,
    pub intent: AgentIntent,
    pub payload: CoordinationPayload,
    pub signature: Bytes,
    pub terms: SwapTerms,
}

impl SwapProposal {
    /// Check that hashes, terms and payload agree with each other
    pub fn verify(&self) -> CoordinationResult<()> {
        if hash_payload(&self.payload) != self.intent.payload_hash {
            return Err(CoordinationError::InconsistentProposal(
                "payload hash does not match payload".to_string(),
            ));
        }
        if hash_intent(&self.intent) != self.intent_hash {
            return Err(CoordinationError::InconsistentProposal(
                "intent hash does not match intent".to_string(),
            ));
        }
        if self.intent.participants != self.payload.participants
            || self.intent.coordination_type != self.payload.coordination_type
        {
            return Err(CoordinationError::InconsistentProposal(
                "intent and payload disagree on participants or type".to_string(),
            ));
        }
        if decode_swap_terms(&self.payload.coordination_data)? != self.terms {
            return Err(CoordinationError::InconsistentProposal(
                "terms do not match coordination data".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds and signs swap proposals and acceptances, and keeps the
/// proposals it has seen keyed by intent hash.
///
/// The cache is plain owned state; callers sharing a client across tasks
/// wrap it in their own lock.
pub struct AtomicSwapClient {
    signer: CoordinationSigner,
    deployment: Deployment,
    default_ttl_secs: u64,
    proposals: HashMap<B256, SwapProposal>,
}

impl AtomicSwapClient {
    /// Client for `deployment`, optionally against a different verifier
    pub fn new(
        signer: Arc<dyn TypedDataSigner>,
        deployment: Deployment,
        contract_override: Option<Address>,
    ) -> Self {
        let domain = Domain::new(
            ATOMIC_SWAP_DOMAIN_NAME,
            ATOMIC_SWAP_DOMAIN_VERSION,
            deployment.chain_id,
            contract_override.unwrap_or(deployment.atomic_swap),
        );
        Self::with_domain(signer, deployment, domain)
    }

    /// Client for a built-in network
    pub fn for_network(
        signer: Arc<dyn TypedDataSigner>,
        network: &str,
        contract_override: Option<Address>,
    ) -> CoordinationResult<Self> {
        let deployment = Deployment::builtin(network)?;
        Ok(Self::new(signer, deployment, contract_override))
    }

    /// Client for the configured default network and domain
    pub fn from_settings(
        signer: Arc<dyn TypedDataSigner>,
        settings: &Settings,
    ) -> CoordinationResult<Self> {
        let deployment = settings.default_deployment()?;
        let domain = Domain::new(
            settings.client.domain_name.clone(),
            settings.client.domain_version.clone(),
            deployment.chain_id,
            deployment.atomic_swap,
        );
        Ok(Self::with_domain(signer, deployment, domain)
            .with_default_ttl(settings.client.default_ttl_secs))
    }

    fn with_domain(signer: Arc<dyn TypedDataSigner>, deployment: Deployment, domain: Domain) -> Self {
        debug!(
            "Swap client for chain {} verifier {}",
            deployment.chain_id,
            domain.verifying_contract()
        );
        Self {
            signer: CoordinationSigner::new(signer, domain),
            deployment,
            default_ttl_secs: DEFAULT_TTL_SECS,
            proposals: HashMap::new(),
        }
    }

    pub fn with_default_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl_secs = ttl_secs;
        self
    }

    pub async fn address(&self) -> CoordinationResult<Address> {
        self.signer.address().await
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn domain(&self) -> &Domain {
        self.signer.domain()
    }

    /// Sign a proposal to swap `offer` for `want` with `counterparty`
    pub async fn create_swap_proposal(
        &mut self,
        params: &ProposeSwapParams,
    ) -> CoordinationResult<SwapProposal> {
        let proposer = self.signer.address().await?;

        let terms = SwapTerms {
            token_a: params.offer_token,
            amount_a: params.offer_amount,
            token_b: params.want_token,
            amount_b: params.want_amount,
        };

        let draft = IntentDraft::new(
            *SWAP_TYPE,
            vec![proposer, params.counterparty],
            terms.encode(),
            PROPOSAL_NONCE,
        )
        .with_ttl(params.ttl_secs.unwrap_or(self.default_ttl_secs));

        let signed = self.signer.sign_intent(&draft).await?;
        let intent_hash = hash_intent(&signed.intent);

        let proposal = SwapProposal {
            intent_hash,
            intent: signed.intent,
            payload: signed.payload,
            signature: signed.signature,
            terms,
        };

        let replaced = self.proposals.insert(intent_hash, proposal.clone());
        metrics::record_proposal_created(replaced.is_none());

        info!(
            "Proposed swap 0x{}: {} of {} for {} of {} with {}",
            hex::encode(intent_hash),
            params.offer_amount,
            params.offer_token,
            params.want_amount,
            params.want_token,
            params.counterparty
        );

        Ok(proposal)
    }

    /// Sign an acceptance of `intent_hash`. The proposal need not be cached.
    pub async fn create_acceptance(
        &self,
        intent_hash: B256,
        ttl_secs: Option<u64>,
    ) -> CoordinationResult<SignedAcceptance> {
        if !self.proposals.contains_key(&intent_hash) {
            debug!(
                "Accepting 0x{} without a cached proposal",
                hex::encode(intent_hash)
            );
        }

        let signed = self
            .signer
            .sign_acceptance(intent_hash, Some(ttl_secs.unwrap_or(self.default_ttl_secs)))
            .await?;

        info!("Accepted swap 0x{}", hex::encode(intent_hash));
        Ok(signed)
    }

    /// Copy of a cached proposal
    pub fn get_proposal(&self, intent_hash: &B256) -> Option<SwapProposal> {
        self.proposals.get(intent_hash).cloned()
    }

    /// Cache a proposal received from another party
    ///
    /// Inconsistent proposals are still stored, under their claimed hash.
    pub fn store_proposal(&mut self, proposal: SwapProposal) {
        let verified = match proposal.verify() {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Storing unverified proposal 0x{}: {}",
                    hex::encode(proposal.intent_hash),
                    e
                );
                false
            }
        };

        let replaced = self.proposals.insert(proposal.intent_hash, proposal);
        metrics::record_proposal_stored(verified, replaced.is_none());
    }

    /// What this client knows locally. Anything past `Proposed` has to be
    /// read from the verifier.
    pub fn local_status(&self, intent_hash: &B256) -> CoordinationStatus {
        if self.proposals.contains_key(intent_hash) {
            CoordinationStatus::Proposed
        } else {
            CoordinationStatus::None
        }
    }

    pub fn cached_proposals(&self) -> usize {
        self.proposals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_swap_terms;
    use crate::eip712::hash_attestation;
    use crate::signer::{EthersTypedDataSigner, MockTypedDataSigner};
    use alloy_primitives::address;
    use ethers::signers::LocalWallet;
    use ethers::types::{Signature, H256};

    const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn wallet_signer(key: &str) -> Arc<dyn TypedDataSigner> {
        let wallet: LocalWallet = key.parse().unwrap();
        Arc::new(EthersTypedDataSigner::new(wallet))
    }

    fn client(key: &str) -> AtomicSwapClient {
        AtomicSwapClient::for_network(wallet_signer(key), "base-sepolia", None).unwrap()
    }

    fn recover(signature: &Bytes, digest: B256) -> Address {
        let signature = Signature::try_from(signature.as_ref()).unwrap();
        Address::from(signature.recover(H256::from(digest.0)).unwrap().0)
    }

    fn swap_params(client: &AtomicSwapClient) -> ProposeSwapParams {
        ProposeSwapParams {
            offer_token: client.deployment().mock_usdc,
            offer_amount: U256::from(100_000_000u64),
            want_token: client.deployment().mock_weth,
            want_amount: U256::from(100_000_000_000_000_000u64),
            counterparty: BOB,
            ttl_secs: None,
        }
    }

    #[tokio::test]
    async fn test_create_swap_proposal() {
        let mut alice = client(ALICE_KEY);
        let params = swap_params(&alice);
        let proposal = alice.create_swap_proposal(&params).await.unwrap();

        assert_eq!(
            proposal.terms,
            SwapTerms {
                token_a: params.offer_token,
                amount_a: U256::from(100_000_000u64),
                token_b: params.want_token,
                amount_b: U256::from(100_000_000_000_000_000u64),
            }
        );
        assert_eq!(
            proposal.payload.coordination_data,
            encode_swap_terms(
                &params.offer_token,
                &params.offer_amount,
                &params.want_token,
                &params.want_amount
            )
        );
        assert_eq!(proposal.intent.participants, vec![ALICE, BOB]);
        assert_eq!(proposal.intent.nonce, PROPOSAL_NONCE);
        assert_eq!(proposal.intent.coordination_type, *SWAP_TYPE);
        assert_eq!(proposal.intent.coordination_value, U256::ZERO);
        assert_eq!(proposal.intent_hash, hash_intent(&proposal.intent));
        proposal.verify().unwrap();

        let digest = alice.domain().signing_hash(proposal.intent_hash);
        assert_eq!(recover(&proposal.signature, digest), ALICE);

        assert_eq!(alice.get_proposal(&proposal.intent_hash), Some(proposal.clone()));
        assert_eq!(
            alice.local_status(&proposal.intent_hash),
            CoordinationStatus::Proposed
        );
    }

    #[tokio::test]
    async fn test_proposal_ttl() {
        let mut alice = client(ALICE_KEY).with_default_ttl(600);
        let before = crate::intent::unix_now();
        let params = swap_params(&alice);

        let default = alice.create_swap_proposal(&params).await.unwrap();
        assert!(default.intent.expiry >= before + 600);
        assert!(default.intent.expiry < before + 3600);

        let explicit = alice
            .create_swap_proposal(&ProposeSwapParams {
                ttl_secs: Some(7200),
                ..params
            })
            .await
            .unwrap();
        assert!(explicit.intent.expiry >= before + 7200);
        assert_ne!(explicit.intent_hash, default.intent_hash);
        assert_eq!(alice.cached_proposals(), 2);
    }

    #[tokio::test]
    async fn test_acceptances_with_different_ttls_differ() {
        let bob = client(BOB_KEY);
        let intent_hash = B256::repeat_byte(0x5a);

        let short = bob.create_acceptance(intent_hash, Some(60)).await.unwrap();
        let long = bob.create_acceptance(intent_hash, Some(120)).await.unwrap();

        assert_ne!(short.attestation.expiry, long.attestation.expiry);
        assert_ne!(short.signature, long.signature);
        assert_eq!(short.attestation.agent_id, BOB);

        let digest = bob.domain().signing_hash(hash_attestation(&long.attestation));
        assert_eq!(recover(&long.signature, digest), BOB);
    }

    #[tokio::test]
    async fn test_counterparty_flow() {
        let mut alice = client(ALICE_KEY);
        let mut bob = client(BOB_KEY);

        let proposal = alice.create_swap_proposal(&swap_params(&alice)).await.unwrap();

        // the proposal travels to Bob out-of-band, e.g. as JSON
        let wire = serde_json::to_string(&proposal).unwrap();
        let received: SwapProposal = serde_json::from_str(&wire).unwrap();
        assert_eq!(bob.local_status(&received.intent_hash), CoordinationStatus::None);

        bob.store_proposal(received.clone());
        assert_eq!(bob.get_proposal(&proposal.intent_hash), Some(received));

        let acceptance = bob
            .create_acceptance(proposal.intent_hash, None)
            .await
            .unwrap();
        assert_eq!(acceptance.attestation.intent_hash, proposal.intent_hash);
    }

    #[tokio::test]
    async fn test_cache_gauge_spans_clients() {
        let mut alice = client(ALICE_KEY);
        let mut bob = client(BOB_KEY);
        let before = metrics::CACHED_PROPOSALS.get();

        let proposal = alice.create_swap_proposal(&swap_params(&alice)).await.unwrap();
        bob.store_proposal(proposal.clone());
        assert!(metrics::CACHED_PROPOSALS.get() >= before + 2.0);

        // re-storing the same hash replaces the entry
        let after_first = bob.cached_proposals();
        bob.store_proposal(proposal);
        assert_eq!(bob.cached_proposals(), after_first);
    }

    #[tokio::test]
    async fn test_signing_failure_caches_nothing() {
        let mut mock = MockTypedDataSigner::new();
        mock.expect_address().returning(|| Ok(ALICE));
        mock.expect_sign_typed_data()
            .returning(|_| Err(CoordinationError::signing("sign_typed_data", "rejected")));

        let mut alice =
            AtomicSwapClient::for_network(Arc::new(mock), "base-sepolia", None).unwrap();
        let params = swap_params(&alice);

        let err = alice.create_swap_proposal(&params).await.unwrap_err();
        assert!(matches!(err, CoordinationError::SigningFailure { .. }));
        assert_eq!(alice.cached_proposals(), 0);
    }

    #[test]
    fn test_unknown_network() {
        let mock = MockTypedDataSigner::new();
        let err = AtomicSwapClient::for_network(Arc::new(mock), "mainnet", None)
            .err()
            .unwrap();
        assert_eq!(err, CoordinationError::UnknownNetwork("mainnet".to_string()));
    }

    #[test]
    fn test_contract_override() {
        let other = Address::repeat_byte(0x77);
        let alice =
            AtomicSwapClient::for_network(Arc::new(MockTypedDataSigner::new()), "base-sepolia", Some(other))
                .unwrap();
        assert_eq!(alice.domain().verifying_contract(), other);
        assert_eq!(alice.domain().chain_id(), U256::from(84532u64));
        assert_eq!(alice.domain().name(), ATOMIC_SWAP_DOMAIN_NAME);
    }

    #[test]
    fn test_from_settings_uses_configured_domain() {
        let settings = Settings::from_toml(
            "[client]\ndomain_name = \"AtomicSwapTest\"\ndefault_ttl_secs = 42\n",
        )
        .unwrap();
        let client =
            AtomicSwapClient::from_settings(Arc::new(MockTypedDataSigner::new()), &settings)
                .unwrap();
        assert_eq!(client.domain().name(), "AtomicSwapTest");
        assert_eq!(client.default_ttl_secs, 42);
    }

    #[tokio::test]
    async fn test_store_inconsistent_proposal() {
        let mut alice = client(ALICE_KEY);
        let mut proposal = alice.create_swap_proposal(&swap_params(&alice)).await.unwrap();
        proposal.terms.amount_b = U256::from(1u64);

        assert!(matches!(
            proposal.verify(),
            Err(CoordinationError::InconsistentProposal(_))
        ));

        let mut bob = client(BOB_KEY);
        bob.store_proposal(proposal.clone());
        assert_eq!(bob.get_proposal(&proposal.intent_hash), Some(proposal));
    }

    #[tokio::test]
    async fn test_verify_detects_tampered_payload() {
        let mut alice = client(ALICE_KEY);
        let mut proposal = alice.create_swap_proposal(&swap_params(&alice)).await.unwrap();
        proposal.payload.participants.reverse();
        assert!(proposal.verify().is_err());
    }
}
