use alloy::primitives::TxHash;
use anyhow::{anyhow, Result};

use crate::cli::{Cli, TxCommand};
use crate::commands::{connect, resolve_config};

pub async fn run(cli: &Cli, cmd: &TxCommand) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;

	match cmd {
		TxCommand::Status { tx_hash } => {
			let hash = parse_tx_hash(tx_hash)?;
			match session.receipt(hash).await? {
				Some(receipt) => {
					let status = if receipt.status() { "success" } else { "reverted" };
					println!("Transaction: {hash}");
					println!("Status:      {status}");
					if let Some(block) = receipt.block_number {
						println!("Block:       {block}");
					}
					println!("Gas used:    {}", receipt.gas_used);
					if let Some(address) = receipt.contract_address {
						println!("Created:     {address}");
					}
				}
				None => println!("Transaction not found or still pending: {hash}"),
			}
			Ok(())
		}
	}
}

fn parse_tx_hash(s: &str) -> Result<TxHash> {
	s.trim()
		.parse()
		.map_err(|e| anyhow!("invalid transaction hash {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_prefixed_hash() {
		let h = parse_tx_hash(&format!("0x{}", "ab".repeat(32))).unwrap();
		assert_eq!(h, TxHash::repeat_byte(0xab));
	}

	#[test]
	fn rejects_short_hash() {
		assert!(parse_tx_hash("0x1234").is_err());
	}
}
