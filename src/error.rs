use alloy::primitives::TxHash;
use thiserror::Error;

/// Everything that can go wrong between parsing a key and reading a
/// receipt.  Every variant is fatal to the command that hit it.
#[derive(Debug, Error)]
pub enum TokenError {
	/// The private key is not 32 bytes of hex or not a valid secp256k1 scalar.
	#[error("invalid private key: {0}")]
	InvalidKeyFormat(String),

	/// Unparsable address, or the zero address where a real account is needed.
	#[error("invalid address: {0}")]
	InvalidAddress(String),

	/// The node endpoint could not be reached or rejected the handshake.
	#[error("cannot connect to {url}: {reason}")]
	Connection { url: String, reason: String },

	/// A JSON-RPC round-trip failed on an established session.
	#[error("RPC error: {0}")]
	Rpc(String),

	/// The node reports a different chain ID from the configured one.
	#[error("chain ID mismatch: expected {expected}, node reports {actual}")]
	ChainMismatch { expected: u64, actual: u64 },

	/// The wallet could not build or sign the transaction envelope.
	#[error("failed to sign transaction: {0}")]
	Signing(String),

	/// The contract rejected a call or a transaction reverted.
	#[error("contract call failed: {0}")]
	ContractCall(String),

	/// No receipt appeared within the confirmation timeout.
	#[error("transaction {tx_hash} not included after {waited_secs}s")]
	ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl From<alloy::transports::TransportError> for TokenError {
	fn from(e: alloy::transports::TransportError) -> Self {
		Self::Rpc(e.to_string())
	}
}

impl From<alloy::contract::Error> for TokenError {
	fn from(e: alloy::contract::Error) -> Self {
		match e {
			alloy::contract::Error::TransportError(t) => Self::Rpc(t.to_string()),
			other => Self::ContractCall(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_messages() {
		let err = TokenError::InvalidKeyFormat("odd number of digits".into());
		assert_eq!(err.to_string(), "invalid private key: odd number of digits");

		let err = TokenError::ChainMismatch {
			expected: 9000,
			actual: 31337,
		};
		assert!(err.to_string().contains("9000"));
		assert!(err.to_string().contains("31337"));
	}

	#[test]
	fn signing_failure_keeps_the_cause() {
		let err = TokenError::Signing("missing gas price".into());
		assert_eq!(err.to_string(), "failed to sign transaction: missing gas price");
	}

	#[test]
	fn timeout_names_the_transaction() {
		let err = TokenError::ConfirmationTimeout {
			tx_hash: TxHash::repeat_byte(0xab),
			waited_secs: 30,
		};
		let msg = err.to_string();
		assert!(msg.contains("0xabab"));
		assert!(msg.contains("30s"));
	}
}
