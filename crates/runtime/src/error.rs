//! Error types for the credential transports.

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the backend.
///
/// "Nothing stored" is not an error: transports report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
	/// Backend session never became ready, or the channel could not be opened.
	#[error("Backend session not ready: {0}")]
	NotReady(String),

	/// Channel closed before the response arrived.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// Timeout waiting for a response.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// HTTP request failed before a response was received.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Backend answered with a non-success status.
	#[error("Backend returned HTTP {status} for {url}")]
	Status { status: u16, url: String },

	/// Hidden execution unit failed to run, or reported an error.
	#[error("Execution failed: {0}")]
	Execution(String),

	/// The execution target is not a code unit.
	#[error("Execution unit at index {0} is not a code unit")]
	InvalidUnit(usize),

	/// WebSocket-level error on the channel.
	#[error("WebSocket error: {0}")]
	WebSocket(String),

	/// Malformed payload from the backend.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns true if the backend was unreachable rather than misbehaving.
	pub fn is_unavailable(&self) -> bool {
		match self {
			Error::NotReady(_) | Error::ChannelClosed | Error::Timeout(_) | Error::WebSocket(_) => true,
			Error::Http(err) => err.is_connect() || err.is_timeout(),
			_ => false,
		}
	}
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		Error::WebSocket(err.to_string())
	}
}
