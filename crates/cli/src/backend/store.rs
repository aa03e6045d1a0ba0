use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

/// Plain-text credential file served by the reference backend.
#[derive(Debug, Clone)]
pub struct CredentialStore {
	path: PathBuf,
}

impl CredentialStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `~/.aws/credentials` of the user running the backend.
	pub fn default_path() -> Option<PathBuf> {
		dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// File content, or [`None`] if the file does not exist yet.
	pub async fn read(&self) -> io::Result<Option<String>> {
		match fs::read_to_string(&self.path).await {
			Ok(content) => Ok(Some(content)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// Replaces the file, creating its directory if needed.
	pub async fn write(&self, content: &str) -> io::Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}
		fs::write(&self.path, content).await
	}
}
