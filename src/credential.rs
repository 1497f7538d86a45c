use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{Result, TokenError};

/// A private key together with the account address it controls.
///
/// Derived once per process from a hex string and never written anywhere.
#[derive(Clone)]
pub struct SigningCredential {
	signer: PrivateKeySigner,
}

impl SigningCredential {
	/// Parse a 32-byte hex private key (optional `0x` prefix) and derive its
	/// address: the last 20 bytes of keccak256 over the uncompressed public key.
	pub fn from_hex(hex_key: &str) -> Result<Self> {
		let clean = strip_0x(hex_key.trim());
		let bytes = hex::decode(clean).map_err(|e| TokenError::InvalidKeyFormat(e.to_string()))?;
		if bytes.len() != 32 {
			return Err(TokenError::InvalidKeyFormat(format!(
				"expected 32 bytes, got {}",
				bytes.len()
			)));
		}
		let signer = PrivateKeySigner::from_slice(&bytes)
			.map_err(|e| TokenError::InvalidKeyFormat(e.to_string()))?;
		Ok(Self { signer })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Wallet used to sign transaction envelopes for this account.
	pub fn wallet(&self) -> EthereumWallet {
		EthereumWallet::from(self.signer.clone())
	}
}

impl std::fmt::Debug for SigningCredential {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SigningCredential")
			.field("address", &self.address())
			.finish_non_exhaustive()
	}
}

/// Parse a strict 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address> {
	s.trim()
		.parse::<Address>()
		.map_err(|e| TokenError::InvalidAddress(format!("{s}: {e}")))
}

/// Accept either an account address or a private key and return the address.
/// A 40-hex-digit input is an address; a 64-hex-digit input is a key.
pub fn resolve_account(s: &str) -> Result<Address> {
	match strip_0x(s.trim()).len() {
		40 => parse_address(s),
		64 => Ok(SigningCredential::from_hex(s)?.address()),
		n => Err(TokenError::InvalidAddress(format!(
			"{s}: expected a 40-digit address or 64-digit private key, got {n} digits"
		))),
	}
}

/// Like [`resolve_account`], but for accounts that receive tokens or an
/// allowance. The zero address is refused.
pub fn resolve_recipient(s: &str) -> Result<Address> {
	let address = resolve_account(s)?;
	if address.is_zero() {
		return Err(TokenError::InvalidAddress(format!(
			"{s}: the zero address cannot receive tokens"
		)));
	}
	Ok(address)
}

fn strip_0x(s: &str) -> &str {
	s.strip_prefix("0x")
		.or_else(|| s.strip_prefix("0X"))
		.unwrap_or(s)
}

#[cfg(test)]
mod tests {
	use super::*;

	// First dev account of a fresh Anvil/Hardhat node.
	const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

	#[test]
	fn derives_known_address() {
		let cred = SigningCredential::from_hex(DEV_KEY).unwrap();
		assert_eq!(cred.address(), DEV_ADDRESS.parse::<Address>().unwrap());
	}

	#[test]
	fn derivation_is_deterministic() {
		let a = SigningCredential::from_hex(DEV_KEY).unwrap();
		let b = SigningCredential::from_hex(&format!("0x{DEV_KEY}")).unwrap();
		assert_eq!(a.address(), b.address());
	}

	#[test]
	fn rejects_malformed_keys() {
		for bad in ["0", "", "zz", "0x1234", &"00".repeat(32), &"ff".repeat(32)] {
			let err = SigningCredential::from_hex(bad).unwrap_err();
			assert!(
				matches!(err, TokenError::InvalidKeyFormat(_)),
				"{bad:?} should be rejected, got {err:?}"
			);
		}
	}

	#[test]
	fn debug_hides_key() {
		let cred = SigningCredential::from_hex(DEV_KEY).unwrap();
		let shown = format!("{cred:?}");
		assert!(!shown.contains(DEV_KEY));
		assert!(shown.to_lowercase().contains("f39fd6e5"));
	}

	#[test]
	fn resolve_account_accepts_address_or_key() {
		let expected: Address = DEV_ADDRESS.parse().unwrap();
		assert_eq!(resolve_account(DEV_ADDRESS).unwrap(), expected);
		assert_eq!(resolve_account(DEV_KEY).unwrap(), expected);
		assert!(matches!(
			resolve_account("0x1234"),
			Err(TokenError::InvalidAddress(_))
		));
	}

	#[test]
	fn resolve_recipient_rejects_zero_address() {
		let expected: Address = DEV_ADDRESS.parse().unwrap();
		assert_eq!(resolve_recipient(DEV_ADDRESS).unwrap(), expected);
		assert_eq!(resolve_recipient(DEV_KEY).unwrap(), expected);
		for zero in ["0x0000000000000000000000000000000000000000", &"0".repeat(40)] {
			assert!(matches!(
				resolve_recipient(zero),
				Err(TokenError::InvalidAddress(_))
			));
		}
		// Plain lookups of the zero address stay allowed.
		assert_eq!(resolve_account(&"0".repeat(40)).unwrap(), Address::ZERO);
	}

	#[test]
	fn parse_address_rejects_garbage() {
		assert!(parse_address("not-an-address").is_err());
		assert!(parse_address("0x0000000000000000000000000000000000000000").is_ok());
	}
}
