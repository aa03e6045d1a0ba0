//! Interactive terminal dialog driven by the session manager.

use std::sync::Arc;

use awsconn::runtime::Transport;
use awsconn::{CredentialSessionManager, DetailSection, SurfaceIntents};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::Result;
use crate::terminal::{TerminalNotifier, TerminalSurfaces};

const HELP: &str = "commands: open, load, save, close, edit, show, more <role|creds|region|parts>, help, quit";

pub async fn run(transport: Arc<dyn Transport>) -> Result<()> {
	let surfaces = TerminalSurfaces::new();
	let manager = CredentialSessionManager::new(transport, Arc::new(surfaces.clone()), Arc::new(TerminalNotifier));
	let handle = manager.handle();
	let session = tokio::spawn(manager.run());

	handle.open();
	println!("{}", HELP.dimmed());

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let (command, arg) = match line.trim().split_once(char::is_whitespace) {
			Some((command, arg)) => (command.to_string(), arg.trim().to_string()),
			None => (line.trim().to_string(), String::new()),
		};

		match command.as_str() {
			"" => {}
			"open" => {
				handle.open();
			}
			"load" => with_dialog(&surfaces, SurfaceIntents::load),
			"save" => with_dialog(&surfaces, SurfaceIntents::save),
			"close" => with_dialog(&surfaces, SurfaceIntents::close),
			"more" => match DetailSection::find(&arg) {
				Some(section) => with_dialog(&surfaces, |intents| intents.toggle_detail(section.id)),
				None => eprintln!("{} unknown section '{arg}'", "note:".yellow().bold()),
			},
			"edit" => {
				if surfaces.intents().is_none() {
					dialog_closed();
					continue;
				}
				println!("{}", "enter credentials, finish with a line containing only '.'".dimmed());
				let text = read_block(&mut lines).await?;
				surfaces.set_text(text);
			}
			"show" => {
				let text = surfaces.text();
				println!("{}", if text.is_empty() { "(empty)".dimmed().to_string() } else { text });
			}
			"help" | "?" => println!("{}", HELP.dimmed()),
			"quit" | "exit" => break,
			other => eprintln!("{} unknown command '{other}'", "note:".yellow().bold()),
		}
	}

	handle.dispose();
	session.await.map_err(anyhow::Error::from)?;
	Ok(())
}

fn with_dialog(surfaces: &TerminalSurfaces, intent: impl FnOnce(&SurfaceIntents)) {
	match surfaces.intents() {
		Some(intents) => intent(&intents),
		None => dialog_closed(),
	}
}

fn dialog_closed() {
	eprintln!("{} dialog is closed; type 'open'", "note:".yellow().bold());
}

async fn read_block(lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
	let mut text = String::new();
	while let Some(line) = lines.next_line().await? {
		if line == "." {
			break;
		}
		text.push_str(&line);
		text.push('\n');
	}
	Ok(text)
}
