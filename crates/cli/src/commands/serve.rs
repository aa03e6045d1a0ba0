use tokio::net::TcpListener;

use crate::backend::{self, BackendState, CredentialStore};
use crate::cli::ServeArgs;
use crate::config::Settings;
use crate::error::{CliError, Result};

pub async fn run(args: &ServeArgs, settings: &Settings) -> Result<()> {
	let path = args
		.credentials
		.clone()
		.or_else(CredentialStore::default_path)
		.ok_or_else(|| CliError::Input("cannot locate home directory; pass --credentials".into()))?;

	let listener = TcpListener::bind(args.bind).await?;
	backend::serve(listener, BackendState::new(CredentialStore::new(path), settings.token.clone())).await?;
	Ok(())
}
