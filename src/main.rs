use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evmos_token_cli::cli::{Cli, Command};
use evmos_token_cli::commands;

#[tokio::main]
async fn main() -> Result<()> {
	// Diagnostics go to stderr so stdout only carries command output.
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();

	match &cli.command {
		Command::Deploy { deployer_key } => commands::deploy::run(&cli, deployer_key).await,
		Command::QueryTransfer {
			contract,
			deployer_key,
			receiver,
			amount,
		} => {
			commands::transfer::query_and_transfer(
				&cli,
				contract,
				deployer_key,
				receiver,
				amount.as_deref(),
			)
			.await
		}
		Command::Info { contract } => commands::token::info(&cli, contract).await,
		Command::Balance { contract, account } => {
			commands::token::balance(&cli, contract, account).await
		}
		Command::Allowance {
			contract,
			owner,
			spender,
		} => commands::token::allowance(&cli, contract, owner, spender).await,
		Command::Approve {
			contract,
			owner_key,
			spender,
			amount,
		} => commands::token::approve(&cli, contract, owner_key, spender, amount).await,
		Command::TransferFrom {
			contract,
			spender_key,
			from,
			to,
			amount,
		} => {
			commands::transfer::transfer_from(&cli, contract, spender_key, from, to, amount).await
		}
		Command::Events {
			contract,
			from_block,
		} => commands::events::run(&cli, contract, *from_block).await,
		Command::Tx { command } => commands::tx::run(&cli, command).await,
		Command::Config { command } => commands::config::run(&cli, command),
	}
}
