//! ERC-8001 coordination engine
//!
//! Off-chain counterpart of the ERC-8001 multi-party coordination protocol.
//! Reproduces the verifier's EIP-712 digests and swap-terms encoding, signs
//! intents and acceptances through a pluggable signer, and tracks proposals
//! locally.

pub mod codec;
pub mod config;
pub mod contract;
pub mod coordination;
pub mod eip712;
pub mod error;
pub mod intent;
pub mod metrics;
pub mod signer;
pub mod types;

pub use codec::{
    decode_swap_terms, decode_swap_terms_hex, encode_swap_terms, format_token_amount,
    parse_token_amount,
};
pub use coordination::{AtomicSwapClient, ProposeSwapParams, SwapProposal};
pub use eip712::Domain;
pub use error::{CoordinationError, CoordinationResult};
pub use signer::{
    BoundedExecutorSigner, CoordinationSigner, EthersTypedDataSigner, TypedDataSigner,
    WalletClientSigner,
};
pub use types::status_name;
