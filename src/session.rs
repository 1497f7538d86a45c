use std::time::Duration;

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use tokio::time::{interval, timeout};

use crate::error::{Result, TokenError};

/// Where the node lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub rpc_url: String,
	/// Handshake fails with `ChainMismatch` if the node reports anything else.
	pub expected_chain_id: Option<u64>,
	pub poll_interval: Duration,
	pub confirmation_timeout: Duration,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			rpc_url: "http://localhost:8545".into(),
			expected_chain_id: None,
			poll_interval: Duration::from_millis(500),
			confirmation_timeout: Duration::from_secs(30),
		}
	}
}

/// An open handle to a node's JSON-RPC endpoint.
///
/// Every query is a single round-trip; nothing is cached, so two calls to
/// `pending_nonce` may legitimately return different values.
#[derive(Clone)]
pub struct Session {
	provider: DynProvider,
	config: SessionConfig,
}

impl Session {
	/// Build a session without touching the network.
	pub fn new(config: &SessionConfig) -> Result<Self> {
		let url: url::Url = config.rpc_url.parse().map_err(|e: url::ParseError| {
			TokenError::Connection {
				url: config.rpc_url.clone(),
				reason: e.to_string(),
			}
		})?;
		let provider = ProviderBuilder::new().connect_http(url).erased();
		Ok(Self {
			provider,
			config: config.clone(),
		})
	}

	/// Build a session and prove the endpoint answers by asking for its chain ID.
	pub async fn connect(config: &SessionConfig) -> Result<Self> {
		let session = Self::new(config)?;
		let actual = session
			.provider
			.get_chain_id()
			.await
			.map_err(|e| TokenError::Connection {
				url: config.rpc_url.clone(),
				reason: e.to_string(),
			})?;

		if let Some(expected) = config.expected_chain_id {
			if expected != actual {
				return Err(TokenError::ChainMismatch { expected, actual });
			}
		}

		tracing::info!(rpc_url = %config.rpc_url, chain_id = actual, "connected to node");
		Ok(session)
	}

	pub fn provider(&self) -> &DynProvider {
		&self.provider
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	// -- Chain parameters --

	pub async fn chain_id(&self) -> Result<u64> {
		let id = self.provider.get_chain_id().await?;
		tracing::debug!(chain_id = id, "eth_chainId");
		Ok(id)
	}

	/// Suggested legacy gas price in wei.
	pub async fn gas_price(&self) -> Result<u128> {
		let price = self.provider.get_gas_price().await?;
		tracing::debug!(gas_price = price, "eth_gasPrice");
		Ok(price)
	}

	/// Transaction count for `address` at the `pending` block tag.
	pub async fn pending_nonce(&self, address: Address) -> Result<u64> {
		let nonce = self.provider.get_transaction_count(address).pending().await?;
		tracing::debug!(%address, nonce, "eth_getTransactionCount");
		Ok(nonce)
	}

	pub async fn block_number(&self) -> Result<u64> {
		Ok(self.provider.get_block_number().await?)
	}

	// -- Transactions --

	/// Broadcast a signed transaction and return its hash.
	pub async fn send(&self, envelope: TxEnvelope) -> Result<TxHash> {
		let pending = self.provider.send_tx_envelope(envelope).await?;
		let tx_hash = *pending.tx_hash();
		tracing::info!(%tx_hash, "transaction submitted");
		Ok(tx_hash)
	}

	pub async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>> {
		Ok(self.provider.get_transaction_receipt(tx_hash).await?)
	}

	/// Poll for the receipt of `tx_hash` until it appears or the configured
	/// confirmation timeout runs out.  A reverted receipt is an error.
	pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
		let limit = self.config.confirmation_timeout;

		let polled = timeout(limit, async {
			let mut ticker = interval(self.config.poll_interval);
			loop {
				ticker.tick().await;
				match self.receipt(tx_hash).await? {
					Some(receipt) => return Ok::<_, TokenError>(receipt),
					None => tracing::debug!(%tx_hash, "transaction pending"),
				}
			}
		})
		.await;

		let receipt = match polled {
			Ok(receipt) => receipt?,
			Err(_) => {
				return Err(TokenError::ConfirmationTimeout {
					tx_hash,
					waited_secs: limit.as_secs(),
				})
			}
		};

		if !receipt.status() {
			tracing::warn!(%tx_hash, "transaction reverted");
			return Err(TokenError::ContractCall(format!("transaction {tx_hash} reverted")));
		}

		tracing::debug!(%tx_hash, block = ?receipt.block_number, "transaction included");
		Ok(receipt)
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("rpc_url", &self.config.rpc_url)
			.field("expected_chain_id", &self.config.expected_chain_id)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unreachable() -> SessionConfig {
		SessionConfig {
			// Port 1 is reserved and never has a JSON-RPC node behind it.
			rpc_url: "http://127.0.0.1:1".into(),
			confirmation_timeout: Duration::from_secs(1),
			..SessionConfig::default()
		}
	}

	#[test]
	fn new_rejects_bad_url() {
		let config = SessionConfig {
			rpc_url: "not a url".into(),
			..SessionConfig::default()
		};
		assert!(matches!(
			Session::new(&config),
			Err(TokenError::Connection { .. })
		));
	}

	#[test]
	fn new_does_not_dial() {
		assert!(Session::new(&unreachable()).is_ok());
	}

	#[tokio::test]
	async fn connect_to_dead_endpoint_fails() {
		let err = Session::connect(&unreachable()).await.unwrap_err();
		assert!(matches!(err, TokenError::Connection { .. }), "got {err:?}");
	}

	#[tokio::test]
	async fn queries_surface_rpc_errors() {
		let session = Session::new(&unreachable()).unwrap();
		assert!(matches!(session.gas_price().await, Err(TokenError::Rpc(_))));
		assert!(matches!(
			session.pending_nonce(Address::repeat_byte(1)).await,
			Err(TokenError::Rpc(_))
		));
	}
}
