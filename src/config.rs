use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::GasSettings;
use crate::session::SessionConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub network: NetworkConfig,
	pub tx: TxConfig,
	pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub rpc_url: String,
	/// When set, refuse to talk to a node reporting a different chain ID.
	pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TxConfig {
	pub gas_limit: u64,
	pub confirmation_timeout_secs: u64,
	pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
	/// Whole tokens moved by `query-transfer`.
	pub amount: String,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			rpc_url: "http://localhost:8545".into(),
			chain_id: None,
		}
	}
}

impl Default for TxConfig {
	fn default() -> Self {
		Self {
			gas_limit: GasSettings::DEFAULT_GAS_LIMIT,
			confirmation_timeout_secs: 30,
			poll_interval_ms: 500,
		}
	}
}

impl Default for TransferConfig {
	fn default() -> Self {
		Self { amount: "10".into() }
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.evmos-token/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		dirs::home_dir()
			.map(|home| home.join(".evmos-token"))
			.ok_or_else(|| anyhow::anyhow!("could not determine home directory"))
	}

	/// Path to the default config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load the default config file, falling back to defaults if it does not exist.
	pub fn load() -> anyhow::Result<Self> {
		Self::load_from(&Self::path()?)
	}

	pub fn load_from(path: &Path) -> anyhow::Result<Self> {
		if path.exists() {
			let content = std::fs::read_to_string(path)?;
			let config = toml::from_str(&content)
				.map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
			tracing::debug!(path = %path.display(), "loaded config");
			Ok(config)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the config, creating the parent directory if needed.
	pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	pub fn session(&self) -> SessionConfig {
		SessionConfig {
			rpc_url: self.network.rpc_url.clone(),
			expected_chain_id: self.network.chain_id,
			poll_interval: Duration::from_millis(self.tx.poll_interval_ms),
			confirmation_timeout: Duration::from_secs(self.tx.confirmation_timeout_secs),
		}
	}

	pub fn gas(&self) -> GasSettings {
		GasSettings {
			gas_limit: self.tx.gas_limit,
		}
	}
}
