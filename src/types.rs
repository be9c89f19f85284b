//! ERC-8001 data model
//!
//! Mirrors the struct definitions the verifying contract declares. Field
//! order matters: every hash in [`crate::eip712`] walks the fields in the
//! order given here.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Application-defined body of a coordination. Hashed, never signed directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationPayload {
    pub version: B256,
    pub coordination_type: B256,
    pub participants: Vec<Address>,
    pub coordination_data: Bytes,
}

/// The object the proposer signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIntent {
    pub payload_hash: B256,
    pub expiry: u64,
    pub nonce: u64,
    pub agent_id: Address,
    pub coordination_type: B256,
    pub coordination_value: U256,
    pub participants: Vec<Address>,
}

/// A participant's signed acceptance of an intent, referenced by digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceAttestation {
    pub intent_hash: B256,
    pub expiry: u64,
    pub agent_id: Address,
}

/// Intent for policy-bounded single-agent execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundedIntent {
    pub payload_hash: B256,
    pub expiry: u64,
    pub nonce: u64,
    pub agent_id: Address,
    pub policy_epoch: U256,
}

/// Payload for bounded operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundedPayload {
    pub policy_root: B256,
    pub target: Address,
    pub asset: Address,
    pub amount: U256,
    pub calldata_hash: B256,
}

/// Per-agent spending record kept by the bounded executor contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBudget {
    pub daily_limit: U256,
    pub spent_today: U256,
    pub period_start: u64,
}

/// Terms of an atomic swap, carried as `coordinationData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTerms {
    pub token_a: Address,
    pub amount_a: U256,
    pub token_b: Address,
    pub amount_b: U256,
}

/// Coordination lifecycle as reported by the verifying contract.
///
/// `None -> Proposed -> Ready -> {Executed | Cancelled}`. Only `Proposed` is
/// ever entered locally; the rest are projections of on-chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CoordinationStatus {
    None = 0,
    Proposed = 1,
    Ready = 2,
    Executed = 3,
    Cancelled = 4,
}

/// Name returned by [`status_name`] for codes outside the enum.
pub const UNKNOWN_STATUS: &str = "Unknown";

impl CoordinationStatus {
    /// Map an on-chain `uint8` status code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CoordinationStatus::None),
            1 => Some(CoordinationStatus::Proposed),
            2 => Some(CoordinationStatus::Ready),
            3 => Some(CoordinationStatus::Executed),
            4 => Some(CoordinationStatus::Cancelled),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CoordinationStatus::None => "None",
            CoordinationStatus::Proposed => "Proposed",
            CoordinationStatus::Ready => "Ready",
            CoordinationStatus::Executed => "Executed",
            CoordinationStatus::Cancelled => "Cancelled",
        }
    }

    /// Executed and Cancelled coordinations never change again
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CoordinationStatus::Executed | CoordinationStatus::Cancelled
        )
    }
}

/// Display name for a status code; out-of-range codes map to `"Unknown"`.
pub fn status_name(code: u8) -> &'static str {
    CoordinationStatus::from_code(code)
        .map(CoordinationStatus::name)
        .unwrap_or(UNKNOWN_STATUS)
}

/// Status projection assembled from values read off the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStatus {
    pub status: Option<CoordinationStatus>,
    pub status_name: String,
    pub acceptance_count: u64,
    pub can_execute: bool,
}

impl SwapStatus {
    pub fn project(status_code: u8, acceptance_count: u64) -> Self {
        let status = CoordinationStatus::from_code(status_code);
        Self {
            status,
            status_name: status_name(status_code).to_string(),
            acceptance_count,
            can_execute: status == Some(CoordinationStatus::Ready),
        }
    }
}
