use anyhow::Result;

use crate::amount::TokenAmount;
use crate::cli::Cli;
use crate::commands::{connect, resolve_config};
use crate::credential;
use crate::token::{TokenContract, TokenEvent, TokenEventKind};

pub async fn run(cli: &Cli, contract: &str, from_block: u64) -> Result<()> {
	let config = resolve_config(cli)?;
	let session = connect(&config).await?;
	let contract = TokenContract::at(&session, credential::parse_address(contract)?);
	let decimals = contract.decimals().await?;

	let mut cursor = contract.events_from(from_block);
	let events = cursor.next_batch().await?;

	for event in &events {
		println!("{}", describe(event, decimals));
	}
	if events.is_empty() {
		let head = cursor.last_head().unwrap_or(from_block);
		println!("{}", no_events(from_block, head));
	} else {
		println!("\n{} event(s) total.", events.len());
	}
	Ok(())
}

fn no_events(from_block: u64, head: u64) -> String {
	if from_block > head {
		format!("No events: block {from_block} is past the chain head ({head}).")
	} else {
		format!("No events between block {from_block} and {head}.")
	}
}

fn describe(event: &TokenEvent, decimals: u8) -> String {
	let block = event
		.block_number
		.map(|b| b.to_string())
		.unwrap_or_else(|| "pending".into());
	match &event.kind {
		TokenEventKind::Transfer { from, to, value } => format!(
			"#{block}  Transfer  {from} -> {to}  {}",
			TokenAmount::new(*value, decimals)
		),
		TokenEventKind::Approval {
			owner,
			spender,
			value,
		} => format!(
			"#{block}  Approval  {owner} -> {spender}  {}",
			TokenAmount::new(*value, decimals)
		),
	}
}
