use awsconn::Notifier;
use awsconn::runtime::Transport;
use colored::Colorize;
use tokio::io::AsyncReadExt;

use crate::error::Result;
use crate::terminal::TerminalNotifier;

pub async fn run(transport: &dyn Transport, value: Option<String>) -> Result<()> {
	let value = match value {
		Some(value) => value,
		None => {
			let mut buf = String::new();
			tokio::io::stdin().read_to_string(&mut buf).await?;
			buf
		}
	};

	// same policy as the dialog: blank input is not sent
	if value.trim().is_empty() {
		eprintln!("{} nothing to save", "note:".yellow().bold());
		return Ok(());
	}

	transport.set(&value).await?;
	TerminalNotifier.success("Credentials saved");
	Ok(())
}
