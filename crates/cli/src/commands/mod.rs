mod edit;
mod get;
mod serve;
mod set;

use std::sync::Arc;
use std::time::Duration;

use awsconn::runtime::{
	ChannelTransport, EndpointTransport, ExecutionTransport, Notebook, ShellKernel, Transport, TransportKind, WebSocketConnector, probe_readiness,
};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;

/// How often the channel transport polls backend readiness.
const READINESS_INTERVAL: Duration = Duration::from_millis(500);

pub async fn dispatch(cli: Cli) -> Result<()> {
	let settings = Settings::load(&cli)?;

	match cli.command {
		Commands::Serve(args) => serve::run(&args, &settings).await,
		Commands::Get => get::run(build_transport(&settings)?.as_ref()).await,
		Commands::Set(args) => set::run(build_transport(&settings)?.as_ref(), args.value).await,
		Commands::Edit => edit::run(build_transport(&settings)?).await,
	}
}

/// Builds the configured transport. The session manager only ever sees the trait object.
pub fn build_transport(settings: &Settings) -> Result<Arc<dyn Transport>> {
	debug!(target = "awsconn.cli", transport = %settings.transport, base_url = %settings.base_url, "building transport");

	let transport: Arc<dyn Transport> = match settings.transport {
		TransportKind::Execution => {
			let host = Arc::new(Notebook::new(ShellKernel::default()));
			Arc::new(ExecutionTransport::new(host, settings.execution.clone()))
		}
		TransportKind::Channel => {
			let connector = Arc::new(WebSocketConnector::new(&settings.base_url, settings.token.clone()));
			let status = probe_readiness(&settings.base_url, READINESS_INTERVAL);
			Arc::new(ChannelTransport::spawn(connector, status).with_request_timeout(settings.request_timeout))
		}
		TransportKind::Endpoint => Arc::new(EndpointTransport::with_timeout(
			&settings.base_url,
			settings.token.clone(),
			settings.request_timeout,
		)?),
	};
	Ok(transport)
}
