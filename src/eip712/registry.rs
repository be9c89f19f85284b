//! Type registry for the signable ERC-8001 structs
//!
//! The canonical signature strings built here must match the type strings
//! the verifying contract embeds character for character.

use super::hasher::keccak256;

use alloy_primitives::B256;
use lazy_static::lazy_static;
use serde_json::{json, Value};

/// One `(type, name)` member of a struct definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: &'static str,
}

/// Ordered field list of a signable struct
#[derive(Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    /// Canonical signature string, e.g. `Foo(uint64 a,address b)`
    pub fn encode_type(&self) -> String {
        let members: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.ty, f.name))
            .collect();
        format!("{}({})", self.name, members.join(","))
    }

    pub fn type_hash(&self) -> B256 {
        keccak256(self.encode_type().as_bytes())
    }

    /// Field list in the `[{name, type}, ...]` form typed-data signers expect
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.fields
                .iter()
                .map(|f| json!({ "name": f.name, "type": f.ty }))
                .collect(),
        )
    }
}

const fn field(name: &'static str, ty: &'static str) -> FieldDescriptor {
    FieldDescriptor { name, ty }
}

pub static EIP712_DOMAIN: TypeDescriptor = TypeDescriptor {
    name: "EIP712Domain",
    fields: &[
        field("name", "string"),
        field("version", "string"),
        field("chainId", "uint256"),
        field("verifyingContract", "address"),
    ],
};

pub static AGENT_INTENT: TypeDescriptor = TypeDescriptor {
    name: "AgentIntent",
    fields: &[
        field("payloadHash", "bytes32"),
        field("expiry", "uint64"),
        field("nonce", "uint64"),
        field("agentId", "address"),
        field("coordinationType", "bytes32"),
        field("coordinationValue", "uint256"),
        field("participants", "address[]"),
    ],
};

pub static ACCEPTANCE_ATTESTATION: TypeDescriptor = TypeDescriptor {
    name: "AcceptanceAttestation",
    fields: &[
        field("intentHash", "bytes32"),
        field("expiry", "uint64"),
        field("agentId", "address"),
    ],
};

pub static BOUNDED_INTENT: TypeDescriptor = TypeDescriptor {
    name: "BoundedIntent",
    fields: &[
        field("payloadHash", "bytes32"),
        field("expiry", "uint64"),
        field("nonce", "uint64"),
        field("agentId", "address"),
        field("policyEpoch", "uint256"),
    ],
};

lazy_static! {
    pub static ref EIP712_DOMAIN_TYPEHASH: B256 = EIP712_DOMAIN.type_hash();
    pub static ref AGENT_INTENT_TYPEHASH: B256 = AGENT_INTENT.type_hash();
    pub static ref ACCEPTANCE_TYPEHASH: B256 = ACCEPTANCE_ATTESTATION.type_hash();
    pub static ref BOUNDED_INTENT_TYPEHASH: B256 = BOUNDED_INTENT.type_hash();

    /// Separates policy leaves from every other keccak domain
    pub static ref POLICY_LEAF_DOMAIN: B256 = keccak256(b"POLICY_LEAF_V1");
}

/// Look up a registered struct by name
pub fn descriptor(name: &str) -> Option<&'static TypeDescriptor> {
    [&AGENT_INTENT, &ACCEPTANCE_ATTESTATION, &BOUNDED_INTENT, &EIP712_DOMAIN]
        .into_iter()
        .find(|d| d.name == name)
}
