//! Signing facade
//!
//! The engine only needs two capabilities from whatever holds the keys:
//! resolve an address and sign an EIP-712 document. [`TypedDataSigner`]
//! captures exactly that; the adapters below plug concrete key stores in.

pub mod ethers_signer;
pub mod wallet;

pub use ethers_signer::EthersTypedDataSigner;
pub use wallet::{JsonRpcWallet, WalletClient, WalletClientSigner};

use crate::eip712::registry::EIP712_DOMAIN;
use crate::eip712::{hash_intent, Domain, TypeDescriptor, TypedStruct};
use crate::error::CoordinationResult;
use crate::intent::{create_acceptance, create_bounded_intent, create_intent, BoundedDraft, IntentDraft};
use crate::metrics;
use crate::types::{
    AcceptanceAttestation, AgentIntent, BoundedIntent, BoundedPayload, CoordinationPayload,
};

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Anything that can name its address and sign typed data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn address(&self) -> CoordinationResult<Address>;

    /// Produce a 65-byte `(r, s, v)` signature over the request's digest
    async fn sign_typed_data(&self, request: &TypedDataRequest) -> CoordinationResult<Bytes>;
}

/// One typed-data document: domain, primary type and message
#[derive(Debug, Clone)]
pub struct TypedDataRequest {
    domain: Domain,
    descriptor: &'static TypeDescriptor,
    message: Map<String, Value>,
    struct_hash: B256,
}

impl TypedDataRequest {
    pub fn new<T: TypedStruct>(domain: Domain, value: &T) -> Self {
        Self {
            domain,
            descriptor: T::descriptor(),
            message: value.message(),
            struct_hash: value.struct_hash(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn primary_type(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    pub fn message(&self) -> &Map<String, Value> {
        &self.message
    }

    pub fn struct_hash(&self) -> B256 {
        self.struct_hash
    }

    /// Digest the resulting signature must recover against
    pub fn signing_hash(&self) -> B256 {
        self.domain.signing_hash(self.struct_hash)
    }

    /// eth_signTypedData_v4 document
    pub fn to_json(&self) -> Value {
        let mut types = Map::new();
        types.insert(EIP712_DOMAIN.name.to_string(), EIP712_DOMAIN.to_json());
        types.insert(self.descriptor.name.to_string(), self.descriptor.to_json());

        json!({
            "types": types,
            "primaryType": self.descriptor.name,
            "domain": self.domain.to_json(),
            "message": Value::Object(self.message.clone()),
        })
    }
}

async fn sign_request(
    signer: &dyn TypedDataSigner,
    request: &TypedDataRequest,
) -> CoordinationResult<Bytes> {
    let primary_type = request.primary_type();
    match signer.sign_typed_data(request).await {
        Ok(signature) => {
            metrics::record_signature(primary_type);
            Ok(signature)
        }
        Err(e) => {
            warn!("Signing {} failed: {}", primary_type, e);
            metrics::record_signing_failure(primary_type);
            Err(e)
        }
    }
}

/// A signed intent together with the payload it commits to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIntent {
    pub intent: AgentIntent,
    pub payload: CoordinationPayload,
    pub signature: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAcceptance {
    pub attestation: AcceptanceAttestation,
    pub signature: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBoundedIntent {
    pub intent: BoundedIntent,
    pub payload: BoundedPayload,
    pub signature: Bytes,
}

/// Signs coordination intents and acceptances for one domain
#[derive(Clone)]
pub struct CoordinationSigner {
    signer: Arc<dyn TypedDataSigner>,
    domain: Domain,
}

impl CoordinationSigner {
    pub fn new(signer: Arc<dyn TypedDataSigner>, domain: Domain) -> Self {
        Self { signer, domain }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub async fn address(&self) -> CoordinationResult<Address> {
        self.signer.address().await
    }

    /// Build an intent for the signer's own address and sign it
    pub async fn sign_intent(&self, draft: &IntentDraft) -> CoordinationResult<SignedIntent> {
        let agent_id = self.signer.address().await?;
        let (intent, payload) = create_intent(agent_id, draft);

        let request = TypedDataRequest::new(self.domain.clone(), &intent);
        let signature = sign_request(self.signer.as_ref(), &request).await?;

        debug!(
            "Signed intent 0x{} for agent {} (nonce {}, expiry {})",
            hex::encode(hash_intent(&intent)),
            agent_id,
            intent.nonce,
            intent.expiry
        );

        Ok(SignedIntent {
            intent,
            payload,
            signature,
        })
    }

    /// Sign an acceptance of `intent_hash`. No local proposal is required.
    pub async fn sign_acceptance(
        &self,
        intent_hash: B256,
        ttl_secs: Option<u64>,
    ) -> CoordinationResult<SignedAcceptance> {
        let agent_id = self.signer.address().await?;
        let attestation = create_acceptance(intent_hash, agent_id, ttl_secs);

        let request = TypedDataRequest::new(self.domain.clone(), &attestation);
        let signature = sign_request(self.signer.as_ref(), &request).await?;

        debug!(
            "Signed acceptance of 0x{} by {} (expiry {})",
            hex::encode(intent_hash),
            agent_id,
            attestation.expiry
        );

        Ok(SignedAcceptance {
            attestation,
            signature,
        })
    }
}

/// Signs bounded-execution intents for the executor domain
#[derive(Clone)]
pub struct BoundedExecutorSigner {
    signer: Arc<dyn TypedDataSigner>,
    domain: Domain,
}

impl BoundedExecutorSigner {
    pub fn new(signer: Arc<dyn TypedDataSigner>, domain: Domain) -> Self {
        Self { signer, domain }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub async fn sign_intent(&self, draft: &BoundedDraft) -> CoordinationResult<SignedBoundedIntent> {
        let agent_id = self.signer.address().await?;
        let (intent, payload) = create_bounded_intent(agent_id, draft);

        let request = TypedDataRequest::new(self.domain.clone(), &intent);
        let signature = sign_request(self.signer.as_ref(), &request).await?;

        debug!(
            "Signed bounded intent for agent {} (epoch {}, nonce {})",
            agent_id, intent.policy_epoch, intent.nonce
        );

        Ok(SignedBoundedIntent {
            intent,
            payload,
            signature,
        })
    }
}
