//! Bodies of the stateless `/AWSConnector` endpoint.

use serde::{Deserialize, Serialize};

/// Path of the credential endpoint, relative to the backend base URL.
pub const ENDPOINT_PATH: &str = "/AWSConnector";

/// Credential text as carried by `GET` responses and `PUT` requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
	#[serde(default)]
	pub data: String,
}

impl CredentialPayload {
	pub fn new(data: impl Into<String>) -> Self {
		Self { data: data.into() }
	}

	/// Stored text, or [`None`] when the backend has nothing stored.
	pub fn into_credential(self) -> Option<String> {
		if self.data.is_empty() { None } else { Some(self.data) }
	}
}

/// Acknowledgement returned by `PUT`. Clients may ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
}

impl Ack {
	pub fn ok() -> Self {
		Self { status: Some("OK".into()) }
	}
}
