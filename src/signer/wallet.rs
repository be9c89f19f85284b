//! Wallet-client adapter
//!
//! A wallet client is an account-holding RPC endpoint (browser wallet, a
//! node with unlocked accounts, a remote signer) that answers
//! `eth_signTypedData_v4`.

use super::{TypedDataRequest, TypedDataSigner};
use crate::error::{CoordinationError, CoordinationResult};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::H160;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Capabilities a wallet client may or may not expose
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Account the client signs for, if one is connected
    fn account(&self) -> Option<Address>;

    fn can_sign_typed_data(&self) -> bool {
        true
    }

    /// Sign an eth_signTypedData_v4 document with `account`
    async fn sign_typed_data_v4(&self, account: Address, typed_data: Value)
        -> CoordinationResult<Bytes>;
}

/// Facade over a [`WalletClient`] with a connected account
#[derive(Debug)]
pub struct WalletClientSigner<W> {
    client: W,
    account: Address,
}

impl<W: WalletClient> WalletClientSigner<W> {
    /// Wrap `client`; fails if it has no account or cannot sign typed data
    pub fn new(client: W) -> CoordinationResult<Self> {
        let account = client.account().ok_or_else(|| {
            CoordinationError::MissingCapability("wallet client has no account".to_string())
        })?;

        if !client.can_sign_typed_data() {
            return Err(CoordinationError::MissingCapability(
                "wallet client cannot sign typed data".to_string(),
            ));
        }

        Ok(Self { client, account })
    }

    pub fn client(&self) -> &W {
        &self.client
    }
}

#[async_trait]
impl<W> TypedDataSigner for WalletClientSigner<W>
where
    W: WalletClient + 'static,
{
    async fn address(&self) -> CoordinationResult<Address> {
        Ok(self.account)
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> CoordinationResult<Bytes> {
        self.client
            .sign_typed_data_v4(self.account, request.to_json())
            .await
    }
}

/// [`WalletClient`] backed by a JSON-RPC node
#[derive(Debug, Clone)]
pub struct JsonRpcWallet<P> {
    provider: Provider<P>,
    account: Option<Address>,
}

impl JsonRpcWallet<Http> {
    /// Connect over HTTP(S)
    pub fn connect(url: &str, account: Option<Address>) -> CoordinationResult<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| CoordinationError::Config(format!("Invalid RPC URL {}: {}", url, e)))?
            .interval(Duration::from_millis(100));

        debug!("Wallet RPC endpoint: {}", url);
        Ok(Self::new(provider, account))
    }
}

impl<P: JsonRpcClient> JsonRpcWallet<P> {
    pub fn new(provider: Provider<P>, account: Option<Address>) -> Self {
        Self { provider, account }
    }

    /// Adopt the node's first unlocked account when none was given
    pub async fn with_node_account(mut self) -> CoordinationResult<Self> {
        if self.account.is_none() {
            let accounts = self
                .provider
                .get_accounts()
                .await
                .map_err(|e| CoordinationError::signing("eth_accounts", e))?;

            self.account = accounts.first().map(|a| Address::from(a.0));
            if let Some(account) = self.account {
                info!("Using node account {}", account);
            }
        }
        Ok(self)
    }
}

#[async_trait]
impl<P> WalletClient for JsonRpcWallet<P>
where
    P: JsonRpcClient + 'static,
{
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn sign_typed_data_v4(
        &self,
        account: Address,
        typed_data: Value,
    ) -> CoordinationResult<Bytes> {
        // Wallets expect the document as a JSON string, not an object.
        let document = serde_json::to_string(&typed_data)
            .map_err(|e| CoordinationError::signing("eth_signTypedData_v4", e))?;

        let signature: ethers::types::Bytes = self
            .provider
            .request(
                "eth_signTypedData_v4",
                (H160::from_slice(account.as_slice()), document),
            )
            .await
            .map_err(|e| CoordinationError::signing("eth_signTypedData_v4", e))?;

        Ok(Bytes::from(signature.to_vec()))
    }
}
