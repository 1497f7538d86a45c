use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;

use crate::credential::SigningCredential;
use crate::error::{Result, TokenError};
use crate::session::Session;

/// Gas parameters that stay fixed across transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
	pub gas_limit: u64,
}

impl GasSettings {
	pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000;
}

impl Default for GasSettings {
	fn default() -> Self {
		Self {
			gas_limit: Self::DEFAULT_GAS_LIMIT,
		}
	}
}

/// Everything needed to sign exactly one state-changing transaction.
///
/// The nonce is the sender's pending nonce at construction time, so the
/// value is consumed by `authorize`/`sign` and is intentionally not `Clone`.
/// Build a fresh one for every send.
pub struct TransactionAuthorization {
	wallet: EthereumWallet,
	from: Address,
	nonce: u64,
	gas_limit: u64,
	gas_price: u128,
	chain_id: u64,
}

impl TransactionAuthorization {
	/// Query nonce, gas price and chain ID (in that order) for `address` and
	/// bind them to `credential`.  The zero address is refused before any
	/// RPC traffic.
	pub async fn new(
		session: &Session,
		credential: &SigningCredential,
		address: Address,
		gas: &GasSettings,
	) -> Result<Self> {
		if address.is_zero() {
			return Err(TokenError::InvalidAddress(
				"cannot authorize transactions for the zero address".into(),
			));
		}

		let nonce = session.pending_nonce(address).await?;
		let gas_price = session.gas_price().await?;
		let chain_id = session.chain_id().await?;

		Ok(Self {
			wallet: credential.wallet(),
			from: credential.address(),
			nonce,
			gas_limit: gas.gas_limit,
			gas_price,
			chain_id,
		})
	}

	/// Shorthand for authorizing a credential's own account.
	pub async fn for_credential(
		session: &Session,
		credential: &SigningCredential,
		gas: &GasSettings,
	) -> Result<Self> {
		Self::new(session, credential, credential.address(), gas).await
	}

	pub fn sender(&self) -> Address {
		self.from
	}

	pub fn nonce(&self) -> u64 {
		self.nonce
	}

	pub fn gas_limit(&self) -> u64 {
		self.gas_limit
	}

	pub fn gas_price(&self) -> u128 {
		self.gas_price
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Native value attached to every authorized transaction.
	pub fn value(&self) -> U256 {
		U256::ZERO
	}

	/// Stamp sender, nonce, gas and chain ID onto `request`.
	pub fn authorize(self, request: TransactionRequest) -> TransactionRequest {
		self.stamp(request)
	}

	/// Stamp the authorization onto `request` and sign it as a legacy
	/// EIP-155 transaction.
	pub async fn sign(self, request: TransactionRequest) -> Result<TxEnvelope> {
		self.stamp(request)
			.build(&self.wallet)
			.await
			.map_err(|e| TokenError::Signing(e.to_string()))
	}

	fn stamp(&self, request: TransactionRequest) -> TransactionRequest {
		request
			.with_from(self.from)
			.with_nonce(self.nonce)
			.with_gas_limit(self.gas_limit)
			.with_gas_price(self.gas_price)
			.with_chain_id(self.chain_id)
			.with_value(self.value())
	}
}

impl std::fmt::Debug for TransactionAuthorization {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransactionAuthorization")
			.field("from", &self.from)
			.field("nonce", &self.nonce)
			.field("gas_limit", &self.gas_limit)
			.field("gas_price", &self.gas_price)
			.field("chain_id", &self.chain_id)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use alloy::consensus::Transaction;
	use alloy::primitives::TxKind;

	use super::*;
	use crate::session::SessionConfig;

	const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn offline_auth(nonce: u64) -> TransactionAuthorization {
		let cred = SigningCredential::from_hex(DEV_KEY).unwrap();
		TransactionAuthorization {
			wallet: cred.wallet(),
			from: cred.address(),
			nonce,
			gas_limit: 300_000,
			gas_price: 7,
			chain_id: 9000,
		}
	}

	#[tokio::test]
	async fn zero_address_is_refused_without_rpc() {
		let session = Session::new(&SessionConfig {
			rpc_url: "http://127.0.0.1:1".into(),
			confirmation_timeout: Duration::from_secs(1),
			..SessionConfig::default()
		})
		.unwrap();
		let cred = SigningCredential::from_hex(DEV_KEY).unwrap();

		let err = TransactionAuthorization::new(&session, &cred, Address::ZERO, &GasSettings::default())
			.await
			.unwrap_err();
		assert!(matches!(err, TokenError::InvalidAddress(_)), "got {err:?}");
	}

	#[test]
	fn authorize_stamps_every_field() {
		let auth = offline_auth(4);
		let from = auth.sender();
		let req = auth.authorize(TransactionRequest::default().with_to(Address::repeat_byte(9)));

		assert_eq!(req.from, Some(from));
		assert_eq!(req.nonce, Some(4));
		assert_eq!(req.gas, Some(300_000));
		assert_eq!(req.gas_price, Some(7));
		assert_eq!(req.chain_id, Some(9000));
		assert_eq!(req.value, Some(U256::ZERO));
		assert_eq!(req.to, Some(TxKind::Call(Address::repeat_byte(9))));
	}

	#[tokio::test]
	async fn sign_produces_legacy_transaction() {
		let auth = offline_auth(11);
		let env = auth
			.sign(TransactionRequest::default().with_to(Address::repeat_byte(9)))
			.await
			.unwrap();

		assert!(matches!(env, TxEnvelope::Legacy(_)));
		assert_eq!(env.nonce(), 11);
		assert_eq!(env.gas_limit(), 300_000);
		assert_eq!(env.chain_id(), Some(9000));
		assert!(env.value().is_zero());
	}

	#[test]
	fn default_gas_limit() {
		assert_eq!(GasSettings::default().gas_limit, 3_000_000);
	}
}
