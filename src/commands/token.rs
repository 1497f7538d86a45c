use anyhow::Result;

use crate::amount::TokenAmount;
use crate::auth::TransactionAuthorization;
use crate::cli::Cli;
use crate::commands::{connect, resolve_config};
use crate::credential::{self, SigningCredential};
use crate::token::TokenContract;

pub async fn info(cli: &Cli, contract: &str) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;
	let contract = TokenContract::at(&session, credential::parse_address(contract)?);

	let meta = contract.metadata().await?;
	let supply = TokenAmount::new(contract.total_supply().await?, meta.decimals);

	println!("Contract:     {}", contract.address());
	println!("Name:         {}", meta.name);
	println!("Symbol:       {}", meta.symbol);
	println!("Decimals:     {}", meta.decimals);
	println!("Total supply: {supply} {}", meta.symbol);
	Ok(())
}

pub async fn balance(cli: &Cli, contract: &str, account: &str) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;
	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let account = credential::resolve_account(account)?;

	let meta = contract.metadata().await?;
	let balance = contract.balance_amount(account, meta.decimals).await?;
	println!("{account}: {balance} {}", meta.symbol);
	Ok(())
}

pub async fn allowance(cli: &Cli, contract: &str, owner: &str, spender: &str) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;
	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let owner = credential::resolve_account(owner)?;
	let spender = credential::resolve_account(spender)?;

	let decimals = contract.decimals().await?;
	let allowance = TokenAmount::new(contract.allowance(owner, spender).await?, decimals);
	println!("Owner:     {owner}");
	println!("Spender:   {spender}");
	println!("Allowance: {allowance}");
	Ok(())
}

pub async fn approve(
	cli: &Cli,
	contract: &str,
	owner_key: &str,
	spender: &str,
	amount: &str,
) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;
	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let owner = SigningCredential::from_hex(owner_key)?;
	let spender = credential::resolve_recipient(spender)?;

	let decimals = contract.decimals().await?;
	let amount = TokenAmount::parse(amount, decimals)?;

	let auth = TransactionAuthorization::for_credential(&session, &owner, &config.gas()).await?;
	let tx_hash = contract.approve(auth, spender, amount.raw()).await?;
	session.wait_for_receipt(tx_hash).await?;

	println!("Approved {spender} to spend {amount} on behalf of {}", owner.address());
	println!("Transaction: {tx_hash}");
	Ok(())
}
