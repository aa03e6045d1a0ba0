
use std::net::SocketAddr;
use std::path::PathBuf;

use awsconn::runtime::TransportKind;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand};

/// Root CLI for awsconn.
#[derive(Parser, Debug)]
#[command(name = "awsconn")]
#[command(about = "Edit and synchronize AWS credentials with a notebook backend")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file (default: $XDG_CONFIG_HOME/awsconn/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Transport: execution, channel or endpoint
	#[arg(short, long, global = true, value_name = "KIND")]
	pub transport: Option<TransportKind>,

	/// Backend base URL for the channel and endpoint transports
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,

	/// Backend API token
	#[arg(long, global = true, value_name = "TOKEN")]
	pub token: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Load the stored credential and print it.
	Get,
	/// Store a credential read from --value or stdin.
	Set(SetArgs),
	/// Open the interactive credential dialog.
	Edit,
	/// Run the reference backend (endpoint, channel and readiness routes).
	Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
	/// Credential text; read from stdin when omitted.
	#[arg(long, value_name = "TEXT")]
	pub value: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
	/// Address to listen on.
	#[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8888")]
	pub bind: SocketAddr,

	/// Credential file served by the backend.
	#[arg(long, value_name = "FILE")]
	pub credentials: Option<PathBuf>,
}

/// Help colors: green headers, cyan literals.
fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
}
