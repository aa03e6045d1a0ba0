use awsconn::runtime::Transport;
use colored::Colorize;

use crate::error::Result;

pub async fn run(transport: &dyn Transport) -> Result<()> {
	match transport.get().await? {
		Some(value) => {
			print!("{value}");
			if !value.ends_with('\n') {
				println!();
			}
		}
		None => eprintln!("{} no credential stored", "note:".yellow().bold()),
	}
	Ok(())
}
