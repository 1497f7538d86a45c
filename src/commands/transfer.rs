use alloy::primitives::TxHash;
use anyhow::Result;

use crate::amount::TokenAmount;
use crate::auth::TransactionAuthorization;
use crate::cli::Cli;
use crate::commands::{connect, resolve_config};
use crate::credential::{self, SigningCredential};
use crate::token::{TokenContract, TokenMetadata};

/// Balances around a `query-transfer` run.
#[derive(Debug, Clone)]
pub struct TransferReport {
	pub meta: TokenMetadata,
	pub amount: TokenAmount,
	pub tx_hash: TxHash,
	pub deployer_before: TokenAmount,
	pub receiver_before: TokenAmount,
	pub deployer_after: TokenAmount,
	pub receiver_after: TokenAmount,
}

impl TransferReport {
	pub fn lines(&self) -> Vec<String> {
		vec![
			format!("Token:    {} ({})", self.meta.name, self.meta.symbol),
			format!("Decimals: {}", self.meta.decimals),
			format!("Transferred {} {} in {}", self.amount, self.meta.symbol, self.tx_hash),
			String::new(),
			format!("deployer balance before: {}", self.deployer_before),
			format!("receiver balance before: {}", self.receiver_before),
			format!("deployer balance after:  {}", self.deployer_after),
			format!("receiver balance after:  {}", self.receiver_after),
		]
	}
}

/// Read both balances, move tokens from deployer to receiver, wait for the
/// receipt and read both balances again.
pub async fn execute_query_and_transfer(
	cli: &Cli,
	contract: &str,
	deployer_key: &str,
	receiver: &str,
	amount: Option<&str>,
) -> Result<TransferReport> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;

	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let deployer = SigningCredential::from_hex(deployer_key)?;
	let receiver = credential::resolve_recipient(receiver)?;

	let meta = contract.metadata().await?;
	let amount = TokenAmount::parse(amount.unwrap_or(&config.transfer.amount), meta.decimals)?;

	let deployer_before = contract.balance_amount(deployer.address(), meta.decimals).await?;
	let receiver_before = contract.balance_amount(receiver, meta.decimals).await?;

	let auth = TransactionAuthorization::for_credential(&session, &deployer, &config.gas()).await?;
	let tx_hash = contract.transfer(auth, receiver, amount.raw()).await?;
	session.wait_for_receipt(tx_hash).await?;

	let deployer_after = contract.balance_amount(deployer.address(), meta.decimals).await?;
	let receiver_after = contract.balance_amount(receiver, meta.decimals).await?;

	Ok(TransferReport {
		meta,
		amount,
		tx_hash,
		deployer_before,
		receiver_before,
		deployer_after,
		receiver_after,
	})
}

pub async fn query_and_transfer(
	cli: &Cli,
	contract: &str,
	deployer_key: &str,
	receiver: &str,
	amount: Option<&str>,
) -> Result<()> {
	let report = execute_query_and_transfer(cli, contract, deployer_key, receiver, amount).await?;
	for line in report.lines() {
		println!("{line}");
	}
	Ok(())
}

/// Spend an allowance: move `amount` from `from` to `to`, signed by the spender.
pub async fn transfer_from(
	cli: &Cli,
	contract: &str,
	spender_key: &str,
	from: &str,
	to: &str,
	amount: &str,
) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;

	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let spender = SigningCredential::from_hex(spender_key)?;
	let from = credential::resolve_account(from)?;
	let to = credential::resolve_recipient(to)?;

	let decimals = contract.decimals().await?;
	let amount = TokenAmount::parse(amount, decimals)?;

	let auth = TransactionAuthorization::for_credential(&session, &spender, &config.gas()).await?;
	let tx_hash = contract.transfer_from(auth, from, to, amount.raw()).await?;
	session.wait_for_receipt(tx_hash).await?;

	println!("Moved {amount} from {from} to {to}");
	println!("Spender:     {}", spender.address());
	println!("Transaction: {tx_hash}");
	println!("Allowance left: {}", TokenAmount::new(contract.allowance(from, spender.address()).await?, decimals));
	Ok(())
}

#[cfg(test)]
mod tests {
	use alloy::primitives::U256;

	use super::*;

	#[test]
	fn report_shows_balances_before_and_after() {
		let whole = |n: u64| TokenAmount::from_whole(n, 18).unwrap();
		let report = TransferReport {
			meta: TokenMetadata {
				name: "Token".into(),
				symbol: "TOK".into(),
				decimals: 18,
			},
			amount: whole(10),
			tx_hash: TxHash::ZERO,
			deployer_before: whole(100),
			receiver_before: TokenAmount::new(U256::ZERO, 18),
			deployer_after: whole(90),
			receiver_after: whole(10),
		};
		let lines = report.lines();
		assert_eq!(lines[0], "Token:    Token (TOK)");
		assert_eq!(lines[1], "Decimals: 18");
		assert_eq!(
			&lines[4..],
			[
				"deployer balance before: 100",
				"receiver balance before: 0",
				"deployer balance after:  90",
				"receiver balance after:  10",
			]
		);
	}
}
