//! EIP-712 domain: scopes every signature to one deployed verifier

use super::hasher::{keccak256, WordHasher};
use super::registry::EIP712_DOMAIN_TYPEHASH;
use crate::codec::parse_address;
use crate::error::CoordinationResult;

use alloy_primitives::{Address, B256, U256};
use serde_json::{json, Value};

pub const BOUNDED_EXECUTOR_NAME: &str = "BoundedAgentExecutor";
pub const BOUNDED_EXECUTOR_VERSION: &str = "1";

/// Chain identifiers accepted by [`Domain`]: native integers or full 256-bit words
pub trait IntoChainId {
    fn into_chain_id(self) -> U256;
}

impl IntoChainId for u64 {
    fn into_chain_id(self) -> U256 {
        U256::from(self)
    }
}

impl IntoChainId for U256 {
    fn into_chain_id(self) -> U256 {
        self
    }
}

/// Typed-data domain. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    version: String,
    chain_id: U256,
    verifying_contract: Address,
}

impl Domain {
    /// Build a domain; the chain identifier is widened to 256 bits
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: impl IntoChainId,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id: chain_id.into_chain_id(),
            verifying_contract,
        }
    }

    /// Build a domain from a hex contract address
    pub fn build(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: impl IntoChainId,
        verifying_contract: &str,
    ) -> CoordinationResult<Self> {
        let verifying_contract = parse_address(verifying_contract)?;
        Ok(Self::new(name, version, chain_id, verifying_contract))
    }

    /// Domain of the bounded agent executor contract
    pub fn bounded_executor(chain_id: impl IntoChainId, verifying_contract: Address) -> Self {
        Self::new(
            BOUNDED_EXECUTOR_NAME,
            BOUNDED_EXECUTOR_VERSION,
            chain_id,
            verifying_contract,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// EIP-712 domain separator
    pub fn separator(&self) -> B256 {
        WordHasher::new()
            .bytes32(&EIP712_DOMAIN_TYPEHASH)
            .bytes32(&keccak256(self.name.as_bytes()))
            .bytes32(&keccak256(self.version.as_bytes()))
            .uint256(&self.chain_id)
            .address(&self.verifying_contract)
            .finish()
    }

    /// Digest a signer actually signs: `keccak(0x1901 ‖ separator ‖ structHash)`
    pub fn signing_hash(&self, struct_hash: B256) -> B256 {
        let mut buf = Vec::with_capacity(2 + 32 + 32);
        buf.extend_from_slice(b"\x19\x01");
        buf.extend_from_slice(self.separator().as_slice());
        buf.extend_from_slice(struct_hash.as_slice());
        keccak256(&buf)
    }

    /// Domain object of an eth_signTypedData_v4 document
    pub fn to_json(&self) -> Value {
        let chain_id = match u64::try_from(self.chain_id) {
            Ok(id) => json!(id),
            Err(_) => json!(self.chain_id.to_string()),
        };
        json!({
            "name": self.name,
            "version": self.version,
            "chainId": chain_id,
            "verifyingContract": format!("0x{}", hex::encode(self.verifying_contract)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoordinationError;
    use alloy_primitives::{address, b256};

    const VERIFIER: Address = address!("D25FaF692736b74A674c8052F904b5C77f9cb2Ed");

    fn atomic_swap_domain() -> Domain {
        Domain::new("AtomicSwap", "1", 84532u64, VERIFIER)
    }

    #[test]
    fn test_separator() {
        assert_eq!(
            atomic_swap_domain().separator(),
            b256!("b1eccc075882f109d2f03c02750d248f2b2aac6d66c0e9cebdd9c2b2889c776e")
        );
    }

    #[test]
    fn test_signing_hash() {
        let intent_hash =
            b256!("49e3aec3407aa2dd954aa2d7560c8d9eecef9fc1929112823c6028fb646ca19f");
        assert_eq!(
            atomic_swap_domain().signing_hash(intent_hash),
            b256!("ab195c48a33ef368ee2ad7b57fd5d2fe5a7f3774ba10b355a2d0f39933fba4ee")
        );
    }

    #[test]
    fn test_separator_matches_sol_types() {
        let domain = alloy_sol_types::eip712_domain! {
            name: "AtomicSwap",
            version: "1",
            chain_id: 84532,
            verifying_contract: VERIFIER,
        };
        assert_eq!(atomic_swap_domain().separator(), domain.separator());
    }

    #[test]
    fn test_chain_id_accepts_native_and_wide_integers() {
        let native = Domain::new("AtomicSwap", "1", 84532u64, VERIFIER);
        let wide = Domain::new("AtomicSwap", "1", U256::from(84532u64), VERIFIER);
        assert_eq!(native, wide);
        assert_eq!(native.chain_id(), U256::from(84532u64));

        let huge = U256::MAX - U256::from(1u64);
        let domain = Domain::new("AtomicSwap", "1", huge, VERIFIER);
        assert_eq!(domain.chain_id(), huge);
        assert_eq!(domain.to_json()["chainId"], huge.to_string());
    }

    #[test]
    fn test_build_from_hex() {
        let domain = Domain::build(
            "AtomicSwap",
            "1",
            84532u64,
            "0xD25FaF692736b74A674c8052F904b5C77f9cb2Ed",
        )
        .unwrap();
        assert_eq!(domain, atomic_swap_domain());
    }

    #[test]
    fn test_build_rejects_short_address() {
        let err = Domain::build("AtomicSwap", "1", 1u64, "0xd25faf69").unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidAddress { .. }));
    }

    #[test]
    fn test_build_rejects_non_hex() {
        let err = Domain::build("AtomicSwap", "1", 1u64, "0xnothex").unwrap_err();
        assert!(matches!(err, CoordinationError::Decode(_)));
    }

    #[test]
    fn test_bounded_executor_domain() {
        let domain = Domain::bounded_executor(84532u64, VERIFIER);
        assert_eq!(domain.name(), "BoundedAgentExecutor");
        assert_eq!(domain.version(), "1");
    }

    #[test]
    fn test_domain_json() {
        let json = atomic_swap_domain().to_json();
        assert_eq!(json["chainId"], 84532);
        assert_eq!(
            json["verifyingContract"],
            "0xd25faf692736b74a674c8052f904b5c77f9cb2ed"
        );
    }
}
