//! Remote contract surface
//!
//! ABI definitions of the AtomicSwap verifier and the ERC-20 calls a swap
//! needs. This module only encodes arguments and decodes return data;
//! submitting transactions is the caller's business.

use crate::error::{CoordinationError, CoordinationResult};
use crate::types::{AcceptanceAttestation, AgentIntent, CoordinationPayload, CoordinationStatus};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use lazy_static::lazy_static;

pub mod abi {
    alloy_sol_types::sol! {
        struct AgentIntent {
            bytes32 payloadHash;
            uint64 expiry;
            uint64 nonce;
            address agentId;
            bytes32 coordinationType;
            uint256 coordinationValue;
            address[] participants;
        }

        struct CoordinationPayload {
            bytes32 version;
            bytes32 coordinationType;
            address[] participants;
            bytes coordinationData;
        }

        struct AcceptanceAttestation {
            bytes32 intentHash;
            uint64 expiry;
            address agentId;
        }

        interface IAtomicSwap {
            function getCoordinationStatus(bytes32 intentHash) external view returns (uint8);
            function getAgentNonce(address agentId) external view returns (uint64);
            function getAcceptanceCount(bytes32 intentHash) external view returns (uint256);
            function hasAccepted(bytes32 intentHash, address agentId) external view returns (bool);
            function DOMAIN_SEPARATOR() external view returns (bytes32);
            function SWAP_TYPE() external view returns (bytes32);

            function proposeCoordination(AgentIntent intent, CoordinationPayload payload, bytes signature) external returns (bytes32);
            function acceptCoordination(bytes32 intentHash, AcceptanceAttestation attestation, bytes signature) external;
            function executeCoordination(bytes32 intentHash, CoordinationPayload payload, bytes executionData) external;
            function cancelCoordination(bytes32 intentHash) external;

            function encodeSwapTerms(address tokenA, uint256 amountA, address tokenB, uint256 amountB) external pure returns (bytes);

            event CoordinationProposed(bytes32 indexed intentHash, address indexed proposer, bytes32 indexed coordinationType, address[] participants, uint64 expiry);
            event CoordinationAccepted(bytes32 indexed intentHash, address indexed acceptor);
            event CoordinationExecuted(bytes32 indexed intentHash, address indexed executor);
            event CoordinationCancelled(bytes32 indexed intentHash);
            event SwapExecuted(bytes32 indexed intentHash, address partyA, address partyB, address tokenA, uint256 amountA, address tokenB, uint256 amountB);
        }

        interface IERC20 {
            function balanceOf(address owner) external view returns (uint256);
            function allowance(address owner, address spender) external view returns (uint256);
            function approve(address spender, uint256 amount) external returns (bool);
        }
    }
}

use abi::{IAtomicSwap, IERC20};

impl From<&AgentIntent> for abi::AgentIntent {
    fn from(intent: &AgentIntent) -> Self {
        Self {
            payloadHash: intent.payload_hash,
            expiry: intent.expiry,
            nonce: intent.nonce,
            agentId: intent.agent_id,
            coordinationType: intent.coordination_type,
            coordinationValue: intent.coordination_value,
            participants: intent.participants.clone(),
        }
    }
}

impl From<&CoordinationPayload> for abi::CoordinationPayload {
    fn from(payload: &CoordinationPayload) -> Self {
        Self {
            version: payload.version,
            coordinationType: payload.coordination_type,
            participants: payload.participants.clone(),
            coordinationData: payload.coordination_data.clone(),
        }
    }
}

impl From<&AcceptanceAttestation> for abi::AcceptanceAttestation {
    fn from(attestation: &AcceptanceAttestation) -> Self {
        Self {
            intentHash: attestation.intent_hash,
            expiry: attestation.expiry,
            agentId: attestation.agent_id,
        }
    }
}

fn decode_error(call: &str, e: alloy_sol_types::Error) -> CoordinationError {
    CoordinationError::Decode(format!("{} return data: {}", call, e))
}

/// `proposeCoordination(intent, payload, signature)`
pub fn propose_calldata(
    intent: &AgentIntent,
    payload: &CoordinationPayload,
    signature: &Bytes,
) -> Bytes {
    IAtomicSwap::proposeCoordinationCall {
        intent: intent.into(),
        payload: payload.into(),
        signature: signature.clone(),
    }
    .abi_encode()
    .into()
}

/// `acceptCoordination(intentHash, attestation, signature)`
pub fn accept_calldata(attestation: &AcceptanceAttestation, signature: &Bytes) -> Bytes {
    IAtomicSwap::acceptCoordinationCall {
        intentHash: attestation.intent_hash,
        attestation: attestation.into(),
        signature: signature.clone(),
    }
    .abi_encode()
    .into()
}

/// `executeCoordination(intentHash, payload, executionData)`
pub fn execute_calldata(
    intent_hash: B256,
    payload: &CoordinationPayload,
    execution_data: &Bytes,
) -> Bytes {
    IAtomicSwap::executeCoordinationCall {
        intentHash: intent_hash,
        payload: payload.into(),
        executionData: execution_data.clone(),
    }
    .abi_encode()
    .into()
}

pub fn cancel_calldata(intent_hash: B256) -> Bytes {
    IAtomicSwap::cancelCoordinationCall {
        intentHash: intent_hash,
    }
    .abi_encode()
    .into()
}

/// Calldata for the verifier's own `encodeSwapTerms` helper
pub fn encode_swap_terms_calldata(
    token_a: Address,
    amount_a: U256,
    token_b: Address,
    amount_b: U256,
) -> Bytes {
    IAtomicSwap::encodeSwapTermsCall {
        tokenA: token_a,
        amountA: amount_a,
        tokenB: token_b,
        amountB: amount_b,
    }
    .abi_encode()
    .into()
}

pub fn decode_encode_swap_terms_return(data: &[u8]) -> CoordinationResult<Bytes> {
    IAtomicSwap::encodeSwapTermsCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("encodeSwapTerms", e))
}

pub fn status_query_calldata(intent_hash: B256) -> Bytes {
    IAtomicSwap::getCoordinationStatusCall {
        intentHash: intent_hash,
    }
    .abi_encode()
    .into()
}

/// Raw status code; pair with [`crate::types::status_name`] for display
pub fn decode_status_return(data: &[u8]) -> CoordinationResult<u8> {
    IAtomicSwap::getCoordinationStatusCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("getCoordinationStatus", e))
}

pub fn agent_nonce_calldata(agent_id: Address) -> Bytes {
    IAtomicSwap::getAgentNonceCall { agentId: agent_id }
        .abi_encode()
        .into()
}

pub fn decode_agent_nonce_return(data: &[u8]) -> CoordinationResult<u64> {
    IAtomicSwap::getAgentNonceCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("getAgentNonce", e))
}

pub fn acceptance_count_calldata(intent_hash: B256) -> Bytes {
    IAtomicSwap::getAcceptanceCountCall {
        intentHash: intent_hash,
    }
    .abi_encode()
    .into()
}

pub fn decode_acceptance_count_return(data: &[u8]) -> CoordinationResult<U256> {
    IAtomicSwap::getAcceptanceCountCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("getAcceptanceCount", e))
}

pub fn has_accepted_calldata(intent_hash: B256, agent_id: Address) -> Bytes {
    IAtomicSwap::hasAcceptedCall {
        intentHash: intent_hash,
        agentId: agent_id,
    }
    .abi_encode()
    .into()
}

pub fn decode_has_accepted_return(data: &[u8]) -> CoordinationResult<bool> {
    IAtomicSwap::hasAcceptedCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("hasAccepted", e))
}

pub fn domain_separator_calldata() -> Bytes {
    IAtomicSwap::DOMAIN_SEPARATORCall {}.abi_encode().into()
}

pub fn decode_domain_separator_return(data: &[u8]) -> CoordinationResult<B256> {
    IAtomicSwap::DOMAIN_SEPARATORCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("DOMAIN_SEPARATOR", e))
}

/// ERC-20 `approve(spender, amount)`, needed before the verifier can settle
pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

/// Decode a `uint256` return from `allowance` or `balanceOf`
pub fn decode_token_amount_return(data: &[u8]) -> CoordinationResult<U256> {
    IERC20::balanceOfCall::abi_decode_returns(data, true)
        .map(|r| r._0)
        .map_err(|e| decode_error("ERC20", e))
}

lazy_static! {
    static ref EVENT_TOPICS: [(B256, &'static str); 5] = [
        (IAtomicSwap::CoordinationProposed::SIGNATURE_HASH, "CoordinationProposed"),
        (IAtomicSwap::CoordinationAccepted::SIGNATURE_HASH, "CoordinationAccepted"),
        (IAtomicSwap::CoordinationExecuted::SIGNATURE_HASH, "CoordinationExecuted"),
        (IAtomicSwap::CoordinationCancelled::SIGNATURE_HASH, "CoordinationCancelled"),
        (IAtomicSwap::SwapExecuted::SIGNATURE_HASH, "SwapExecuted"),
    ];
}

/// Event name for a log's first topic
pub fn event_name(topic0: &B256) -> Option<&'static str> {
    EVENT_TOPICS
        .iter()
        .find(|(topic, _)| topic == topic0)
        .map(|(_, name)| *name)
}

/// Status an event moves a coordination into, if any
pub fn event_status(topic0: &B256) -> Option<CoordinationStatus> {
    match event_name(topic0)? {
        "CoordinationProposed" => Some(CoordinationStatus::Proposed),
        "CoordinationExecuted" | "SwapExecuted" => Some(CoordinationStatus::Executed),
        "CoordinationCancelled" => Some(CoordinationStatus::Cancelled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_swap_terms;
    use crate::eip712::keccak256;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;

    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const USDC: Address = address!("17abd6d0355cB2B933C014133B14245412ca00B6");
    const WETH: Address = address!("ddFaC73904FE867B5526510E695826f4968A2357");

    fn selector(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    fn sample_payload() -> CoordinationPayload {
        CoordinationPayload {
            version: keccak256(b"V1"),
            coordination_type: keccak256(b"ATOMIC_SWAP_V1"),
            participants: vec![ALICE, BOB],
            coordination_data: encode_swap_terms(
                &USDC,
                &U256::from(1u64),
                &WETH,
                &U256::from(2u64),
            ),
        }
    }

    #[test]
    fn test_selectors() {
        assert_eq!(
            &propose_calldata(
                &AgentIntent {
                    payload_hash: B256::ZERO,
                    expiry: 0,
                    nonce: 0,
                    agent_id: ALICE,
                    coordination_type: B256::ZERO,
                    coordination_value: U256::ZERO,
                    participants: vec![],
                },
                &sample_payload(),
                &Bytes::new(),
            )[..4],
            &selector(
                "proposeCoordination((bytes32,uint64,uint64,address,bytes32,uint256,address[]),(bytes32,bytes32,address[],bytes),bytes)"
            )
        );
        assert_eq!(
            &cancel_calldata(B256::ZERO)[..4],
            &selector("cancelCoordination(bytes32)")
        );
        assert_eq!(
            &status_query_calldata(B256::ZERO)[..4],
            &selector("getCoordinationStatus(bytes32)")
        );
        assert_eq!(
            &approve_calldata(ALICE, U256::MAX)[..4],
            &[0x09, 0x5e, 0xa7, 0xb3]
        );
    }

    #[test]
    fn test_cancel_calldata_layout() {
        let hash = B256::repeat_byte(0xaa);
        let data = cancel_calldata(hash);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[4..], hash.as_slice());
    }

    #[test]
    fn test_execute_calldata_carries_payload() {
        let payload = sample_payload();
        let data = execute_calldata(B256::repeat_byte(1), &payload, &Bytes::new());
        let call = IAtomicSwap::executeCoordinationCall::abi_decode(&data, true).unwrap();
        assert_eq!(call.intentHash, B256::repeat_byte(1));
        assert_eq!(call.payload.participants, payload.participants);
        assert_eq!(call.payload.coordinationData, payload.coordination_data);
    }

    #[test]
    fn test_accept_calldata_round_trip() {
        let attestation = AcceptanceAttestation {
            intent_hash: B256::repeat_byte(0x33),
            expiry: 77,
            agent_id: BOB,
        };
        let signature = Bytes::from(vec![1u8; 65]);
        let data = accept_calldata(&attestation, &signature);
        let call = IAtomicSwap::acceptCoordinationCall::abi_decode(&data, true).unwrap();
        assert_eq!(call.intentHash, attestation.intent_hash);
        assert_eq!(call.attestation.expiry, 77);
        assert_eq!(call.attestation.agentId, BOB);
        assert_eq!(call.signature, signature);
    }

    #[test]
    fn test_decode_returns() {
        let status = U256::from(2u64).abi_encode();
        assert_eq!(decode_status_return(&status).unwrap(), 2);

        let nonce = U256::from(5u64).abi_encode();
        assert_eq!(decode_agent_nonce_return(&nonce).unwrap(), 5);

        let count = U256::from(2u64).abi_encode();
        assert_eq!(decode_acceptance_count_return(&count).unwrap(), U256::from(2u64));

        let accepted = true.abi_encode();
        assert!(decode_has_accepted_return(&accepted).unwrap());

        let separator = B256::repeat_byte(0x44).abi_encode();
        assert_eq!(
            decode_domain_separator_return(&separator).unwrap(),
            B256::repeat_byte(0x44)
        );
    }

    #[test]
    fn test_decode_returns_reject_short_data() {
        assert!(matches!(
            decode_status_return(&[0u8; 3]),
            Err(CoordinationError::Decode(_))
        ));
    }

    #[test]
    fn test_encode_swap_terms_return_matches_local_codec() {
        let terms = encode_swap_terms(&USDC, &U256::from(100u64), &WETH, &U256::from(1u64));
        let returned = (terms.clone(),).abi_encode_params();
        assert_eq!(decode_encode_swap_terms_return(&returned).unwrap(), terms);
    }

    #[test]
    fn test_event_names() {
        let proposed = keccak256(
            b"CoordinationProposed(bytes32,address,bytes32,address[],uint64)".as_slice(),
        );
        assert_eq!(event_name(&proposed), Some("CoordinationProposed"));
        assert_eq!(event_status(&proposed), Some(CoordinationStatus::Proposed));

        let swap = keccak256(
            b"SwapExecuted(bytes32,address,address,address,uint256,address,uint256)".as_slice(),
        );
        assert_eq!(event_name(&swap), Some("SwapExecuted"));
        assert_eq!(event_status(&swap), Some(CoordinationStatus::Executed));

        let accepted = keccak256(b"CoordinationAccepted(bytes32,address)".as_slice());
        assert_eq!(event_status(&accepted), None);

        assert_eq!(event_name(&B256::ZERO), None);
    }
}
