use std::path::PathBuf;

use anyhow::Result;

use crate::cli::{Cli, ConfigCommand};
use crate::commands::resolve_config;
use crate::config::Config;

pub fn run(cli: &Cli, command: &ConfigCommand) -> Result<()> {
	match command {
		ConfigCommand::Init { force } => {
			let path = init(cli, *force)?;
			println!("Wrote {}", path.display());
		}
		ConfigCommand::Show => print!("{}", toml::to_string_pretty(&resolve_config(cli)?)?),
	}
	Ok(())
}

/// Save the resolved settings to `--config` or the default path.
pub fn init(cli: &Cli, force: bool) -> Result<PathBuf> {
	let path = match &cli.config {
		Some(path) => path.clone(),
		None => Config::path()?,
	};
	if path.exists() && !force {
		anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
	}
	resolve_config(cli)?.save_to(&path)?;
	Ok(path)
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;

	fn cli_for(path: &std::path::Path, extra: &[&str]) -> Cli {
		let mut argv = vec!["evmos-token", "--config", path.to_str().unwrap()];
		argv.extend_from_slice(extra);
		Cli::try_parse_from(argv).unwrap()
	}

	#[test]
	fn init_writes_flags_and_refuses_to_clobber() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("config.toml");

		let cli = cli_for(&path, &["--rpc-url", "http://127.0.0.1:9545", "config", "init"]);
		assert_eq!(init(&cli, false).unwrap(), path);

		let saved = Config::load_from(&path).unwrap();
		assert_eq!(saved.network.rpc_url, "http://127.0.0.1:9545");
		assert_eq!(saved.tx.gas_limit, 3_000_000);

		assert!(init(&cli, false).is_err());

		let cli = cli_for(&path, &["--gas-limit", "400000", "config", "init", "--force"]);
		init(&cli, true).unwrap();
		let saved = Config::load_from(&path).unwrap();
		assert_eq!(saved.tx.gas_limit, 400_000);
		assert_eq!(saved.network.rpc_url, "http://127.0.0.1:9545");
	}
}
