//! Credential transports for the AWSConnector editor.
//!
//! This crate moves credential text between an editor session and the backend
//! that stores it. All transports implement [`Transport`] and are chosen at
//! construction time:
//!
//! - **Execution**: runs `cat` / `printf` inside a hidden unit of the host
//!   document and scrapes the captured output ([`ExecutionTransport`])
//! - **Channel**: persistent named channel to the backend process, gated on the
//!   backend session reporting ready ([`ChannelTransport`])
//! - **Endpoint**: one HTTP request per operation ([`EndpointTransport`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   awsconn    │  Session manager (one per document panel)
//! └──────┬───────┘
//!        │ Arc<dyn Transport>
//! ┌──────▼─────────────────────────────────┐
//! │ awsconn-runtime                        │
//! │  Execution ─► ExecutionHost (Notebook) │
//! │  Channel   ─► ChannelPump ─► Connector │
//! │  Endpoint  ─► reqwest                  │
//! └────────────────────────────────────────┘
//! ```

pub mod error;
pub mod host;
pub mod link;
pub mod transport;

pub use error::{Error, Result};
pub use host::{ExecutionHost, Kernel, Notebook, ShellKernel, Unit, UnitKind};
pub use link::{ChannelConnector, ChannelLink, KernelStatus, WebSocketConnector, probe_readiness};
pub use transport::{
	ChannelPump, ChannelTransport, EndpointTransport, ExecutionSettings, ExecutionTransport, Transport, TransportKind, TransportRequest, TransportResponse,
	exchange,
};
