//! Configuration for the `awsconn` binary.
//!
//! Values come from `$XDG_CONFIG_HOME/awsconn/config.json` (or the file given
//! with `--config`), then command-line flags override them.

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use awsconn::runtime::{ExecutionSettings, TransportKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8888";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// On-disk config. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transport: Option<TransportKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub credential_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub credential_dir: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub marker: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_timeout_ms: Option<u64>,
}

/// Flag values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub transport: Option<TransportKind>,
	pub base_url: Option<String>,
	pub token: Option<String>,
}

impl From<&Cli> for Overrides {
	fn from(cli: &Cli) -> Self {
		Self {
			transport: cli.transport,
			base_url: cli.base_url.clone(),
			token: cli.token.clone(),
		}
	}
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub transport: TransportKind,
	pub base_url: String,
	pub token: Option<String>,
	pub execution: ExecutionSettings,
	pub request_timeout: Duration,
}

impl Settings {
	pub fn resolve(file: ConfigFile, overrides: &Overrides) -> Self {
		let defaults = ExecutionSettings::default();
		Self {
			transport: overrides.transport.or(file.transport).unwrap_or(TransportKind::Endpoint),
			base_url: overrides
				.base_url
				.clone()
				.or(file.base_url)
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			token: overrides.token.clone().or(file.token).filter(|t| !t.is_empty()),
			execution: ExecutionSettings {
				credential_path: file.credential_path.unwrap_or(defaults.credential_path),
				credential_dir: file.credential_dir.unwrap_or(defaults.credential_dir),
				marker: file.marker.unwrap_or(defaults.marker),
			},
			request_timeout: Duration::from_millis(file.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)),
		}
	}

	/// Loads the config file and applies the CLI flags.
	pub fn load(cli: &Cli) -> Result<Self> {
		let file = match &cli.config {
			Some(path) => load_file(path)?.ok_or_else(|| CliError::ConfigMissing(path.clone()))?,
			None => match default_config_path() {
				Some(path) => load_file(&path)?.unwrap_or_default(),
				None => ConfigFile::default(),
			},
		};
		Ok(Self::resolve(file, &Overrides::from(cli)))
	}
}

/// `$XDG_CONFIG_HOME/awsconn/config.json`, falling back to the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
	std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.filter(|p| p.is_absolute())
		.or_else(dirs::config_dir)
		.map(|dir| dir.join("awsconn").join("config.json"))
}

/// Reads a config file. A missing file is `Ok(None)`; a malformed one is an error.
pub fn load_file(path: &Path) -> Result<Option<ConfigFile>> {
	let content = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
			debug!(target = "awsconn.config", path = %path.display(), "no config file");
			return Ok(None);
		}
		Err(err) => return Err(err.into()),
	};

	let file = serde_json::from_str(&content).map_err(|e| CliError::Config {
		path: path.to_path_buf(),
		message: e.to_string(),
	})?;
	debug!(target = "awsconn.config", path = %path.display(), "loaded config");
	Ok(Some(file))
}
