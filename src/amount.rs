use std::fmt;

use alloy::primitives::U256;

/// A token quantity in base units, paired with the contract's decimals so it
/// can be shown as a human-readable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
	raw: U256,
	decimals: u8,
}

impl TokenAmount {
	pub fn new(raw: U256, decimals: u8) -> Self {
		Self { raw, decimals }
	}

	/// `whole` tokens, i.e. `whole * 10^decimals` base units.
	pub fn from_whole(whole: u64, decimals: u8) -> anyhow::Result<Self> {
		let raw = scale(decimals)?
			.checked_mul(U256::from(whole))
			.ok_or_else(|| anyhow::anyhow!("{whole} tokens overflow uint256"))?;
		Ok(Self::new(raw, decimals))
	}

	/// Parse a decimal string such as `"10"` or `"2.5"` into base units.
	pub fn parse(s: &str, decimals: u8) -> anyhow::Result<Self> {
		let s = s.trim();
		let unit = scale(decimals)?;
		let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
		if whole.is_empty() && frac.is_empty() {
			anyhow::bail!("empty amount");
		}
		if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
			anyhow::bail!("invalid amount {s:?}: only digits and one '.' allowed");
		}
		if frac.len() > decimals as usize {
			anyhow::bail!("amount {s:?} has more than {decimals} fractional digits");
		}

		let whole = if whole.is_empty() {
			U256::ZERO
		} else {
			U256::from_str_radix(whole, 10)?
		};
		let frac = if frac.is_empty() {
			U256::ZERO
		} else {
			let padded = format!("{frac:0<width$}", width = decimals as usize);
			U256::from_str_radix(&padded, 10)?
		};

		let raw = whole
			.checked_mul(unit)
			.and_then(|w| w.checked_add(frac))
			.ok_or_else(|| anyhow::anyhow!("amount {s:?} overflows uint256"))?;
		Ok(Self::new(raw, decimals))
	}

	/// Base units.
	pub fn raw(&self) -> U256 {
		self.raw
	}
}

impl fmt::Display for TokenAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// 10^78 and up do not fit in 256 bits; show base units instead.
		let Ok(unit) = scale(self.decimals) else {
			return write!(f, "{} (base units, {} decimals)", self.raw, self.decimals);
		};
		let whole = self.raw / unit;
		let frac = self.raw % unit;
		if frac.is_zero() {
			return write!(f, "{whole}");
		}
		let digits = format!("{:0>width$}", frac.to_string(), width = self.decimals as usize);
		write!(f, "{whole}.{}", digits.trim_end_matches('0'))
	}
}

fn scale(decimals: u8) -> anyhow::Result<U256> {
	U256::from(10u64)
		.checked_pow(U256::from(decimals))
		.ok_or_else(|| anyhow::anyhow!("{decimals} decimals overflow uint256"))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ten18() -> U256 {
		U256::from(10u64).pow(U256::from(18u64))
	}

	#[test]
	fn whole_tokens_scale_by_decimals() {
		let a = TokenAmount::from_whole(10, 18).unwrap();
		assert_eq!(a.raw(), U256::from(10u64) * ten18());
		assert_eq!(a.to_string(), "10");
	}

	#[test]
	fn display_trims_fraction() {
		assert_eq!(TokenAmount::new(U256::from(90u64) * ten18(), 18).to_string(), "90");
		assert_eq!(TokenAmount::new(U256::from(25u64), 1).to_string(), "2.5");
		assert_eq!(TokenAmount::new(U256::from(1u64), 6).to_string(), "0.000001");
		assert_eq!(TokenAmount::new(U256::ZERO, 18).to_string(), "0");
		assert_eq!(TokenAmount::new(U256::from(7u64), 0).to_string(), "7");
	}

	#[test]
	fn parse_decimal_strings() {
		assert_eq!(TokenAmount::parse("10", 18).unwrap(), TokenAmount::from_whole(10, 18).unwrap());
		assert_eq!(TokenAmount::parse("2.5", 1).unwrap().raw(), U256::from(25u64));
		assert_eq!(TokenAmount::parse(".5", 2).unwrap().raw(), U256::from(50u64));
		assert_eq!(TokenAmount::parse("0.000001", 6).unwrap().raw(), U256::from(1u64));
	}

	#[test]
	fn parse_rejects_bad_input() {
		assert!(TokenAmount::parse("", 18).is_err());
		assert!(TokenAmount::parse(".", 18).is_err());
		assert!(TokenAmount::parse("1.5", 0).is_err());
		assert!(TokenAmount::parse("-1", 18).is_err());
		assert!(TokenAmount::parse("1e18", 18).is_err());
		assert!(TokenAmount::parse("0.0000001", 6).is_err());
	}

	#[test]
	fn display_parse_agree() {
		let a = TokenAmount::parse("1234.0567", 18).unwrap();
		assert_eq!(a.to_string(), "1234.0567");
	}

	#[test]
	fn oversized_decimals_are_refused() {
		assert_eq!(scale(77).unwrap(), U256::from(10u64).pow(U256::from(77u64)));
		assert!(scale(78).is_err());
		assert!(TokenAmount::from_whole(1, 78).is_err());
		assert!(TokenAmount::from_whole(u64::MAX, 77).is_err());
		assert!(TokenAmount::parse("1", 78).is_err());
		assert!(TokenAmount::parse("0", 255).is_err());
		assert_eq!(
			TokenAmount::new(U256::from(5u64), 200).to_string(),
			"5 (base units, 200 decimals)"
		);
	}
}
