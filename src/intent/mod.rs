//! Intent and attestation factory
//!
//! Assembles the paired objects every coordination needs. Nonces are taken
//! from the caller; allocating them against the on-chain counter is not
//! this module's job.

use crate::eip712::{hash_bounded_payload, hash_payload, keccak256};
use crate::types::{
    AcceptanceAttestation, AgentIntent, BoundedIntent, BoundedPayload, CoordinationPayload,
};

use alloy_primitives::{Address, Bytes, B256, U256};
use lazy_static::lazy_static;

/// Lifetime given to intents and attestations when the caller names none
pub const DEFAULT_TTL_SECS: u64 = 3600;

lazy_static! {
    /// Coordination type tag of the atomic swap application
    pub static ref SWAP_TYPE: B256 = keccak256(b"ATOMIC_SWAP_V1");

    /// Default payload version tag
    pub static ref VERSION_HASH: B256 = keccak256(b"V1");
}

/// Current wall-clock time in seconds since the epoch
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

fn expiry_at(now: u64, ttl_secs: Option<u64>) -> u64 {
    now.saturating_add(ttl_secs.unwrap_or(DEFAULT_TTL_SECS))
}

/// Application fields of a coordination intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDraft {
    pub coordination_type: B256,
    pub participants: Vec<Address>,
    pub coordination_data: Bytes,
    pub nonce: u64,
    /// Seconds from now; [`DEFAULT_TTL_SECS`] when unset
    pub ttl_secs: Option<u64>,
    /// Zero when unset
    pub coordination_value: Option<U256>,
    /// [`VERSION_HASH`] when unset
    pub version: Option<B256>,
}

impl IntentDraft {
    pub fn new(
        coordination_type: B256,
        participants: Vec<Address>,
        coordination_data: Bytes,
        nonce: u64,
    ) -> Self {
        Self {
            coordination_type,
            participants,
            coordination_data,
            nonce,
            ttl_secs: None,
            coordination_value: None,
            version: None,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = Some(ttl_secs);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.coordination_value = Some(value);
        self
    }

    pub fn with_version(mut self, version: B256) -> Self {
        self.version = Some(version);
        self
    }
}

/// Fields of a policy-bounded execution intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedDraft {
    pub policy_root: B256,
    pub target: Address,
    pub asset: Address,
    pub amount: U256,
    /// All-zero word when the execution carries no calldata
    pub calldata_hash: Option<B256>,
    pub nonce: u64,
    pub policy_epoch: U256,
    pub ttl_secs: Option<u64>,
}

/// Build an intent and its payload, expiring `ttl` seconds from now
pub fn create_intent(agent_id: Address, draft: &IntentDraft) -> (AgentIntent, CoordinationPayload) {
    create_intent_at(agent_id, draft, unix_now())
}

/// [`create_intent`] against an explicit clock reading
pub fn create_intent_at(
    agent_id: Address,
    draft: &IntentDraft,
    now: u64,
) -> (AgentIntent, CoordinationPayload) {
    let payload = CoordinationPayload {
        version: draft.version.unwrap_or(*VERSION_HASH),
        coordination_type: draft.coordination_type,
        participants: draft.participants.clone(),
        coordination_data: draft.coordination_data.clone(),
    };

    let intent = AgentIntent {
        payload_hash: hash_payload(&payload),
        expiry: expiry_at(now, draft.ttl_secs),
        nonce: draft.nonce,
        agent_id,
        coordination_type: draft.coordination_type,
        coordination_value: draft.coordination_value.unwrap_or(U256::ZERO),
        participants: draft.participants.clone(),
    };

    (intent, payload)
}

pub fn create_bounded_intent(agent_id: Address, draft: &BoundedDraft) -> (BoundedIntent, BoundedPayload) {
    create_bounded_intent_at(agent_id, draft, unix_now())
}

pub fn create_bounded_intent_at(
    agent_id: Address,
    draft: &BoundedDraft,
    now: u64,
) -> (BoundedIntent, BoundedPayload) {
    let payload = BoundedPayload {
        policy_root: draft.policy_root,
        target: draft.target,
        asset: draft.asset,
        amount: draft.amount,
        calldata_hash: draft.calldata_hash.unwrap_or(B256::ZERO),
    };

    let intent = BoundedIntent {
        payload_hash: hash_bounded_payload(&payload),
        expiry: expiry_at(now, draft.ttl_secs),
        nonce: draft.nonce,
        agent_id,
        policy_epoch: draft.policy_epoch,
    };

    (intent, payload)
}

/// Attestation accepting `intent_hash` on behalf of `agent_id`
pub fn create_acceptance(
    intent_hash: B256,
    agent_id: Address,
    ttl_secs: Option<u64>,
) -> AcceptanceAttestation {
    create_acceptance_at(intent_hash, agent_id, ttl_secs, unix_now())
}

pub fn create_acceptance_at(
    intent_hash: B256,
    agent_id: Address,
    ttl_secs: Option<u64>,
    now: u64,
) -> AcceptanceAttestation {
    AcceptanceAttestation {
        intent_hash,
        expiry: expiry_at(now, ttl_secs),
        agent_id,
    }
}
