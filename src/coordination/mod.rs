//! Coordination client
//!
//! The client:
//! 1. Builds and signs atomic swap proposals
//! 2. Signs acceptances of proposals, cached or not
//! 3. Caches proposals keyed by intent hash
//! 4. Mirrors the locally knowable part of the coordination lifecycle

pub mod client;

pub use client::{
    AtomicSwapClient, ProposeSwapParams, SwapProposal, ATOMIC_SWAP_DOMAIN_NAME,
    ATOMIC_SWAP_DOMAIN_VERSION, PROPOSAL_NONCE,
};
