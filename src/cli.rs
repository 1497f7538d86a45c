use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
	name = "evmos-token",
	about = "Deploy and drive an ERC20 token on a local Evmos node.",
	version
)]
pub struct Cli {
	/// Override the node's JSON-RPC endpoint.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Override the gas limit attached to every transaction.
	#[arg(long, global = true)]
	pub gas_limit: Option<u64>,

	/// Read settings from this file instead of ~/.evmos-token/config.toml.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Deploy the token contract; the deployer receives the initial supply.
	Deploy {
		/// Deployer private key (hex).
		deployer_key: String,
	},

	/// Show both balances, transfer tokens to the receiver, show them again.
	QueryTransfer {
		/// Token contract address.
		contract: String,

		/// Deployer private key (hex).
		deployer_key: String,

		/// Receiver private key or address (hex).
		receiver: String,

		/// Whole tokens to send. Defaults to the configured transfer amount.
		#[arg(long)]
		amount: Option<String>,
	},

	/// Show name, symbol, decimals and total supply.
	Info {
		/// Token contract address.
		contract: String,
	},

	/// Show the balance of an account.
	Balance {
		/// Token contract address.
		contract: String,

		/// Account address or private key (hex).
		account: String,
	},

	/// Show how much a spender may move on behalf of an owner.
	Allowance {
		/// Token contract address.
		contract: String,

		/// Owner address or private key (hex).
		owner: String,

		/// Spender address or private key (hex).
		spender: String,
	},

	/// Allow a spender to move up to AMOUNT of the owner's tokens.
	Approve {
		/// Token contract address.
		contract: String,

		/// Owner private key (hex).
		owner_key: String,

		/// Spender address or private key (hex).
		spender: String,

		/// Allowance in tokens, e.g. 10 or 2.5.
		amount: String,
	},

	/// Move approved tokens from one account to another as the spender.
	TransferFrom {
		/// Token contract address.
		contract: String,

		/// Spender private key (hex).
		spender_key: String,

		/// Account the tokens are taken from.
		from: String,

		/// Account the tokens are sent to.
		to: String,

		/// Amount in tokens, e.g. 10 or 2.5.
		amount: String,
	},

	/// Print Transfer and Approval events emitted by the token.
	Events {
		/// Token contract address.
		contract: String,

		/// First block to scan.
		#[arg(long, default_value = "0")]
		from_block: u64,
	},

	/// Inspect submitted transactions.
	Tx {
		#[command(subcommand)]
		command: TxCommand,
	},

	/// Manage the settings file.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

// -- Config subcommands --

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Write the current settings (defaults plus flags) to the config file.
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
	/// Print the settings in effect.
	Show,
}

// -- Tx subcommands --

#[derive(Subcommand)]
pub enum TxCommand {
	/// Show the receipt status of a transaction.
	Status {
		/// Transaction hash (0x-prefixed).
		tx_hash: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deploy_takes_one_positional() {
		let cli = Cli::try_parse_from(["evmos-token", "deploy", "abcd"]).unwrap();
		assert!(matches!(cli.command, Command::Deploy { ref deployer_key } if deployer_key == "abcd"));
		assert!(cli.rpc_url.is_none());
	}

	#[test]
	fn query_transfer_positionals_in_order() {
		let cli = Cli::try_parse_from([
			"evmos-token",
			"query-transfer",
			"0xcontract",
			"deployerkey",
			"receiver",
		])
		.unwrap();
		match cli.command {
			Command::QueryTransfer {
				contract,
				deployer_key,
				receiver,
				amount,
			} => {
				assert_eq!(contract, "0xcontract");
				assert_eq!(deployer_key, "deployerkey");
				assert_eq!(receiver, "receiver");
				assert!(amount.is_none());
			}
			_ => panic!("wrong subcommand"),
		}
	}

	#[test]
	fn global_overrides_after_subcommand() {
		let cli = Cli::try_parse_from([
			"evmos-token",
			"info",
			"0xc",
			"--rpc-url",
			"http://127.0.0.1:9545",
			"--gas-limit",
			"300000",
		])
		.unwrap();
		assert_eq!(cli.rpc_url.as_deref(), Some("http://127.0.0.1:9545"));
		assert_eq!(cli.gas_limit, Some(300_000));
	}

	#[test]
	fn missing_positionals_are_rejected() {
		assert!(Cli::try_parse_from(["evmos-token", "deploy"]).is_err());
		assert!(Cli::try_parse_from(["evmos-token", "query-transfer", "0xc", "key"]).is_err());
	}

	#[test]
	fn config_init_takes_force_flag() {
		let cli = Cli::try_parse_from(["evmos-token", "config", "init", "--force"]).unwrap();
		assert!(matches!(
			cli.command,
			Command::Config {
				command: ConfigCommand::Init { force: true }
			}
		));
	}
}
