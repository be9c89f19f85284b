//! EIP-712 structured-data hashing for ERC-8001
//!
//! This module provides:
//! - Domain construction and domain separators
//! - The fixed type registry of signable structs
//! - Struct hashers that reproduce the verifier's digests bit for bit

pub mod domain;
pub mod hasher;
pub mod registry;

pub use domain::{Domain, IntoChainId};
pub use hasher::{
    hash_address_array, hash_attestation, hash_bounded_intent, hash_bounded_payload,
    hash_intent, hash_payload, hash_policy_leaf, keccak256, WordHasher,
};
pub use registry::{FieldDescriptor, TypeDescriptor};

use crate::types::{AcceptanceAttestation, AgentIntent, BoundedIntent};

use alloy_primitives::{Address, B256, U256};
use serde_json::{Map, Value};

/// A struct that can be signed as EIP-712 typed data
pub trait TypedStruct {
    /// Registry entry describing this struct
    fn descriptor() -> &'static TypeDescriptor;

    fn struct_hash(&self) -> B256;

    /// Message object of an eth_signTypedData_v4 document
    fn message(&self) -> Map<String, Value>;
}

impl TypedStruct for AgentIntent {
    fn descriptor() -> &'static TypeDescriptor {
        &registry::AGENT_INTENT
    }

    fn struct_hash(&self) -> B256 {
        hash_intent(self)
    }

    fn message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("payloadHash".into(), bytes32_value(&self.payload_hash));
        message.insert("expiry".into(), uint_value(&U256::from(self.expiry)));
        message.insert("nonce".into(), uint_value(&U256::from(self.nonce)));
        message.insert("agentId".into(), address_value(&self.agent_id));
        message.insert(
            "coordinationType".into(),
            bytes32_value(&self.coordination_type),
        );
        message.insert(
            "coordinationValue".into(),
            uint_value(&self.coordination_value),
        );
        message.insert(
            "participants".into(),
            Value::Array(self.participants.iter().map(address_value).collect()),
        );
        message
    }
}

impl TypedStruct for AcceptanceAttestation {
    fn descriptor() -> &'static TypeDescriptor {
        &registry::ACCEPTANCE_ATTESTATION
    }

    fn struct_hash(&self) -> B256 {
        hash_attestation(self)
    }

    fn message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("intentHash".into(), bytes32_value(&self.intent_hash));
        message.insert("expiry".into(), uint_value(&U256::from(self.expiry)));
        message.insert("agentId".into(), address_value(&self.agent_id));
        message
    }
}

impl TypedStruct for BoundedIntent {
    fn descriptor() -> &'static TypeDescriptor {
        &registry::BOUNDED_INTENT
    }

    fn struct_hash(&self) -> B256 {
        hash_bounded_intent(self)
    }

    fn message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("payloadHash".into(), bytes32_value(&self.payload_hash));
        message.insert("expiry".into(), uint_value(&U256::from(self.expiry)));
        message.insert("nonce".into(), uint_value(&U256::from(self.nonce)));
        message.insert("agentId".into(), address_value(&self.agent_id));
        message.insert("policyEpoch".into(), uint_value(&self.policy_epoch));
        message
    }
}

// Integers travel as decimal strings so 256-bit values survive JSON.
fn uint_value(value: &U256) -> Value {
    Value::String(value.to_string())
}

fn bytes32_value(value: &B256) -> Value {
    Value::String(format!("0x{}", hex::encode(value)))
}

fn address_value(value: &Address) -> Value {
    Value::String(format!("0x{}", hex::encode(value)))
}
