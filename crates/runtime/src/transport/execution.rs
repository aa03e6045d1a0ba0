use std::sync::Arc;

use async_trait::async_trait;
use awsconn_protocol::{DEFAULT_CREDENTIAL_DIR, DEFAULT_CREDENTIAL_PATH, DEFAULT_MARKER, read_command, write_command};
use tracing::debug;

use super::{Transport, TransportKind};
use crate::error::{Error, Result};
use crate::host::ExecutionHost;

/// Where the credential store lives and how to recognize its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
	pub credential_path: String,
	pub credential_dir: String,
	/// Captured output lacking this substring is treated as "nothing stored".
	pub marker: String,
}

impl Default for ExecutionSettings {
	fn default() -> Self {
		Self {
			credential_path: DEFAULT_CREDENTIAL_PATH.to_string(),
			credential_dir: DEFAULT_CREDENTIAL_DIR.to_string(),
			marker: DEFAULT_MARKER.to_string(),
		}
	}
}

/// Transport that runs shell commands in a hidden unit of the host document.
pub struct ExecutionTransport {
	host: Arc<dyn ExecutionHost>,
	settings: ExecutionSettings,
}

impl ExecutionTransport {
	pub fn new(host: Arc<dyn ExecutionHost>, settings: ExecutionSettings) -> Self {
		Self { host, settings }
	}

	pub fn settings(&self) -> &ExecutionSettings {
		&self.settings
	}
}

#[async_trait]
impl Transport for ExecutionTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Execution
	}

	async fn get(&self) -> Result<Option<String>> {
		let output = self.host.execute_hidden(&read_command(&self.settings.credential_path)).await?;
		if output.contains(&self.settings.marker) {
			Ok(Some(output))
		} else {
			debug!(target = "awsconn.exec", path = %self.settings.credential_path, "captured output lacks credential marker");
			Ok(None)
		}
	}

	async fn set(&self, value: &str) -> Result<()> {
		let command = write_command(&self.settings.credential_dir, &self.settings.credential_path, value);
		let output = self.host.execute_hidden(&command).await?;
		// the write redirects stdout, so anything captured is a shell error
		let output = output.trim();
		if output.is_empty() {
			Ok(())
		} else {
			Err(Error::Execution(output.to_string()))
		}
	}
}
