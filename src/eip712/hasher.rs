//! Struct hashing
//!
//! Every digest here is keccak-256 over a run of 32-byte ABI words:
//! - scalars are left-zero-padded big-endian integers
//! - addresses occupy the low 20 bytes of their word
//! - dynamic fields (`bytes`, `address[]`) are hashed first and the digest
//!   fills the word
//!
//! Intents and attestations are prefixed with their type hash. The two
//! payload digests and the policy leaf are plain word hashes, exactly as the
//! verifier computes them.

use super::registry::{
    ACCEPTANCE_TYPEHASH, AGENT_INTENT_TYPEHASH, BOUNDED_INTENT_TYPEHASH, POLICY_LEAF_DOMAIN,
};
use crate::types::{
    AcceptanceAttestation, AgentIntent, BoundedIntent, BoundedPayload, CoordinationPayload,
};

use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

/// keccak-256 of an arbitrary byte string
pub fn keccak256(bytes: impl AsRef<[u8]>) -> B256 {
    let out: [u8; 32] = Keccak256::digest(bytes.as_ref()).into();
    B256::from(out)
}

/// Streams 32-byte words into a keccak-256 state
pub struct WordHasher {
    state: Keccak256,
}

impl WordHasher {
    pub fn new() -> Self {
        Self {
            state: Keccak256::new(),
        }
    }

    pub fn word(mut self, word: &[u8; 32]) -> Self {
        self.state.update(word);
        self
    }

    pub fn bytes32(self, value: &B256) -> Self {
        self.word(&value.0)
    }

    pub fn address(self, value: &Address) -> Self {
        self.word(&address_word(value))
    }

    pub fn uint64(self, value: u64) -> Self {
        self.uint256(&U256::from(value))
    }

    pub fn uint256(self, value: &U256) -> Self {
        self.word(&value.to_be_bytes::<32>())
    }

    pub fn finish(self) -> B256 {
        let out: [u8; 32] = self.state.finalize().into();
        B256::from(out)
    }
}

impl Default for WordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Address left-padded to a full ABI word
pub fn address_word(value: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(value.as_slice());
    word
}

/// keccak-256 of a packed `address[]`; each element is padded to a word
pub fn hash_address_array(addresses: &[Address]) -> B256 {
    addresses
        .iter()
        .fold(WordHasher::new(), |h, a| h.address(a))
        .finish()
}

pub fn hash_payload(payload: &CoordinationPayload) -> B256 {
    WordHasher::new()
        .bytes32(&payload.version)
        .bytes32(&payload.coordination_type)
        .bytes32(&hash_address_array(&payload.participants))
        .bytes32(&keccak256(&payload.coordination_data))
        .finish()
}

pub fn hash_bounded_payload(payload: &BoundedPayload) -> B256 {
    WordHasher::new()
        .bytes32(&payload.policy_root)
        .address(&payload.target)
        .address(&payload.asset)
        .uint256(&payload.amount)
        .bytes32(&payload.calldata_hash)
        .finish()
}

/// EIP-712 struct hash of an `AgentIntent`
pub fn hash_intent(intent: &AgentIntent) -> B256 {
    WordHasher::new()
        .bytes32(&AGENT_INTENT_TYPEHASH)
        .bytes32(&intent.payload_hash)
        .uint64(intent.expiry)
        .uint64(intent.nonce)
        .address(&intent.agent_id)
        .bytes32(&intent.coordination_type)
        .uint256(&intent.coordination_value)
        .bytes32(&hash_address_array(&intent.participants))
        .finish()
}

/// EIP-712 struct hash of an `AcceptanceAttestation`
pub fn hash_attestation(attestation: &AcceptanceAttestation) -> B256 {
    WordHasher::new()
        .bytes32(&ACCEPTANCE_TYPEHASH)
        .bytes32(&attestation.intent_hash)
        .uint64(attestation.expiry)
        .address(&attestation.agent_id)
        .finish()
}

/// EIP-712 struct hash of a `BoundedIntent`
pub fn hash_bounded_intent(intent: &BoundedIntent) -> B256 {
    WordHasher::new()
        .bytes32(&BOUNDED_INTENT_TYPEHASH)
        .bytes32(&intent.payload_hash)
        .uint64(intent.expiry)
        .uint64(intent.nonce)
        .address(&intent.agent_id)
        .uint256(&intent.policy_epoch)
        .finish()
}

/// Leaf of a bounded-execution spending policy Merkle tree
pub fn hash_policy_leaf(target: &Address, asset: &Address, amount: &U256) -> B256 {
    WordHasher::new()
        .bytes32(&POLICY_LEAF_DOMAIN)
        .address(target)
        .address(asset)
        .uint256(amount)
        .finish()
}
