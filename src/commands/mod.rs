pub mod config;
pub mod deploy;
pub mod events;
pub mod token;
pub mod transfer;
pub mod tx;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::session::Session;

/// Load the config file named on the command line (or the default one) and
/// apply the global flag overrides on top of it.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
	let mut config = match &cli.config {
		Some(path) => Config::load_from(path)?,
		None => Config::load()?,
	};
	if let Some(url) = &cli.rpc_url {
		config.network.rpc_url = url.clone();
	}
	if let Some(gas_limit) = cli.gas_limit {
		config.tx.gas_limit = gas_limit;
	}
	Ok(config)
}

/// Open a session to the configured node, failing fast if it is unreachable.
pub async fn connect(config: &Config) -> Result<Session> {
	Ok(Session::connect(&config.session()).await?)
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;

	#[test]
	fn flags_override_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[network]\nrpc_url = \"http://10.0.0.1:8545\"\n[tx]\ngas_limit = 1\n").unwrap();

		let cli = Cli::try_parse_from([
			"evmos-token",
			"--config",
			path.to_str().unwrap(),
			"--gas-limit",
			"300000",
			"info",
			"0xc",
		])
		.unwrap();
		let config = resolve_config(&cli).unwrap();

		assert_eq!(config.network.rpc_url, "http://10.0.0.1:8545");
		assert_eq!(config.tx.gas_limit, 300_000);
	}
}
