use anyhow::Result;

use crate::auth::TransactionAuthorization;
use crate::cli::Cli;
use crate::commands::{connect, resolve_config};
use crate::credential::SigningCredential;
use crate::token::{Deployment, TokenContract};

/// What `deploy` prints once the creation transaction is included.
#[derive(Debug, Clone)]
pub struct DeployReport {
	pub deployment: Deployment,
	pub block: Option<u64>,
}

impl DeployReport {
	pub fn lines(&self) -> Vec<String> {
		let mut lines = vec![
			String::new(),
			"Deployed Contract".to_string(),
			"---------------------------------------------".to_string(),
			format!("Deployed contract address:         {}", self.deployment.address),
			format!("Deployed by account with address:  {}", self.deployment.deployer),
			format!("Deployed in transaction with hash: {}", self.deployment.tx_hash),
		];
		if let Some(block) = self.block {
			lines.push(format!("Included in block:                 {block}"));
		}
		lines
	}
}

/// Deploy the token from the account behind `deployer_key` and wait for the
/// creation transaction to land.
pub async fn execute(cli: &Cli, deployer_key: &str) -> Result<DeployReport> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;

	let deployer = SigningCredential::from_hex(deployer_key)?;
	let auth = TransactionAuthorization::for_credential(&session, &deployer, &config.gas()).await?;

	let (_, deployment) = TokenContract::deploy(&session, auth).await?;
	let receipt = session.wait_for_receipt(deployment.tx_hash).await?;

	Ok(DeployReport {
		deployment,
		block: receipt.block_number,
	})
}

pub async fn run(cli: &Cli, deployer_key: &str) -> Result<()> {
	for line in execute(cli, deployer_key).await?.lines() {
		println!("{line}");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use alloy::primitives::{Address, TxHash};

	use super::*;

	#[test]
	fn report_lists_address_sender_and_hash() {
		let report = DeployReport {
			deployment: Deployment {
				address: Address::repeat_byte(0xaa),
				deployer: Address::repeat_byte(0xbb),
				tx_hash: TxHash::repeat_byte(0xcc),
			},
			block: Some(3),
		};
		let lines = report.lines();
		assert!(lines.iter().any(|l| l.starts_with("Deployed contract address:")
			&& l.ends_with(&Address::repeat_byte(0xaa).to_string())));
		assert!(lines.iter().any(|l| l.ends_with(&TxHash::repeat_byte(0xcc).to_string())));
		assert_eq!(lines.last().unwrap(), "Included in block:                 3");

		let pending = DeployReport { block: None, ..report };
		assert!(!pending.lines().iter().any(|l| l.starts_with("Included")));
	}
}
