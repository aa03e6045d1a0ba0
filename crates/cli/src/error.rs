use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid configuration in {path}: {message}")]
	Config { path: PathBuf, message: String },

	#[error("config file not found: {0}")]
	ConfigMissing(PathBuf),

	#[error("invalid input: {0}")]
	Input(String),

	#[error(transparent)]
	Transport(#[from] awsconn::runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Short hint printed under the error, if any.
	pub fn hint(&self) -> Option<&'static str> {
		match self {
			CliError::Transport(err) if err.is_unavailable() => Some("is the backend running? start one with `awsconn serve`"),
			CliError::Transport(awsconn::runtime::Error::Status { status: 401 | 403, .. }) => Some("check the `token` setting"),
			CliError::ConfigMissing(_) => Some("omit --config to use the default location"),
			_ => None,
		}
	}
}
