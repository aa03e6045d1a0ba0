use awsconn_cli::cli::Cli;
use awsconn_cli::error::CliError;
use awsconn_cli::{commands, logging};
use clap::Parser;
use colored::Colorize;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		handle_error(&err);
		std::process::exit(1);
	}
}

fn handle_error(err: &CliError) {
	eprintln!("{} {err}", "error:".red().bold());
	if let Some(hint) = err.hint() {
		eprintln!("  {} {hint}", "hint:".cyan());
	}
}
