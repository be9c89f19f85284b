//! Adapter for ethers transaction signers (`LocalWallet`, hardware wallets, ...)

use super::{TypedDataRequest, TypedDataSigner};
use crate::error::{CoordinationError, CoordinationResult};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use ethers::signers::Signer;
use ethers::types::transaction::eip712::TypedData;

/// Signs through any [`ethers::signers::Signer`]
#[derive(Debug, Clone)]
pub struct EthersTypedDataSigner<S> {
    signer: S,
}

impl<S: Signer> EthersTypedDataSigner<S> {
    pub fn new(signer: S) -> Self {
        Self { signer }
    }

    pub fn inner(&self) -> &S {
        &self.signer
    }
}

#[async_trait]
impl<S> TypedDataSigner for EthersTypedDataSigner<S>
where
    S: Signer + 'static,
{
    async fn address(&self) -> CoordinationResult<Address> {
        Ok(Address::from(self.signer.address().0))
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> CoordinationResult<Bytes> {
        let typed_data: TypedData = serde_json::from_value(request.to_json())
            .map_err(|e| CoordinationError::signing("sign_typed_data", e))?;

        let signature = self
            .signer
            .sign_typed_data(&typed_data)
            .await
            .map_err(|e| CoordinationError::signing("sign_typed_data", e))?;

        Ok(Bytes::from(signature.to_vec()))
    }
}
