//! Transport contract and its three realizations.
//!
//! A transport delivers exactly one response or one failure per request. It
//! does not serialize requests itself: the session manager keeps at most one
//! request in flight per session.

mod channel;
mod endpoint;
mod execution;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use channel::{ChannelPump, ChannelTransport};
pub use endpoint::EndpointTransport;
pub use execution::{ExecutionSettings, ExecutionTransport};

use crate::error::Result;

/// Bidirectional credential channel to a backend.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Which realization this is, for logging.
	fn kind(&self) -> TransportKind;

	/// Reads the stored credential text. `Ok(None)` means nothing is stored.
	async fn get(&self) -> Result<Option<String>>;

	/// Replaces the stored credential text.
	async fn set(&self, value: &str) -> Result<()>;
}

/// Transport realization, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
	Execution,
	Channel,
	Endpoint,
}

impl fmt::Display for TransportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			TransportKind::Execution => "execution",
			TransportKind::Channel => "channel",
			TransportKind::Endpoint => "endpoint",
		})
	}
}

impl FromStr for TransportKind {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"execution" | "exec" => Ok(TransportKind::Execution),
			"channel" | "comm" => Ok(TransportKind::Channel),
			"endpoint" | "http" => Ok(TransportKind::Endpoint),
			other => Err(format!("unknown transport '{other}' (expected execution, channel or endpoint)")),
		}
	}
}

/// A single request issued by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportRequest {
	Get,
	Set { value: String },
}

impl TransportRequest {
	/// Short name for logs; never includes the credential text.
	pub fn label(&self) -> &'static str {
		match self {
			TransportRequest::Get => "get",
			TransportRequest::Set { .. } => "set",
		}
	}
}

/// Response to a [`TransportRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportResponse {
	/// Stored text, [`None`] when the backend has no credential yet.
	GetResult { value: Option<String> },
	SetAck,
}

/// Issues `request` on `transport` and wraps the outcome as a response.
pub async fn exchange(transport: &dyn Transport, request: TransportRequest) -> Result<TransportResponse> {
	tracing::debug!(target = "awsconn.transport", kind = %transport.kind(), request = request.label(), "issuing request");
	match request {
		TransportRequest::Get => transport.get().await.map(|value| TransportResponse::GetResult { value }),
		TransportRequest::Set { value } => transport.set(&value).await.map(|()| TransportResponse::SetAck),
	}
}

#[cfg(test)]
mod tests;
