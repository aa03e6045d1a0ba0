//! Message format for the `AWSConnector` comm channel.
//!
//! Every payload carries an `action` tag. Requests flow from the editor to the
//! backend process, responses flow back:
//!
//! 1. Editor sends [`ChannelMessage::GetRequest`], backend answers [`ChannelMessage::GetResponse`]
//! 2. Editor sends [`ChannelMessage::SetRequest`], backend answers [`ChannelMessage::SetResponse`]
//!
//! The channel is shared with unrelated traffic, so receivers must look at the
//! tag before acting on a message. [`ChannelMessage::from_value`] returns
//! [`None`] for anything that is not one of the four known actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the comm target registered by the backend process.
pub const CHANNEL_NAME: &str = "AWSConnector";

/// Message exchanged over the credential channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ChannelMessage {
	/// Ask the backend for the stored credential text.
	#[serde(rename = "awsconn-get-request")]
	GetRequest,
	/// Stored credential text, empty when nothing is stored.
	#[serde(rename = "awsconn-get-response")]
	GetResponse {
		#[serde(default)]
		creds: String,
	},
	/// Replace the stored credential text.
	#[serde(rename = "awsconn-set-request")]
	SetRequest { credentials: String },
	/// Acknowledges a [`ChannelMessage::SetRequest`].
	#[serde(rename = "awsconn-set-response")]
	SetResponse,
}

/// Response kinds a requester waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
	Get,
	Set,
}

impl ChannelMessage {
	/// Parses a raw channel payload, returning [`None`] for unrelated traffic.
	pub fn from_value(value: &Value) -> Option<Self> {
		serde_json::from_value(value.clone()).ok()
	}

	/// Serializes into the raw payload sent on the channel.
	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}

	/// Response kind a request expects, or [`None`] for responses.
	pub fn expects(&self) -> Option<ResponseKind> {
		match self {
			ChannelMessage::GetRequest => Some(ResponseKind::Get),
			ChannelMessage::SetRequest { .. } => Some(ResponseKind::Set),
			_ => None,
		}
	}

	/// Kind of this message if it is a response.
	pub fn response_kind(&self) -> Option<ResponseKind> {
		match self {
			ChannelMessage::GetResponse { .. } => Some(ResponseKind::Get),
			ChannelMessage::SetResponse => Some(ResponseKind::Set),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn get_request_serializes_to_bare_action() {
		let value = ChannelMessage::GetRequest.to_value();
		assert_eq!(value, json!({"action": "awsconn-get-request"}));
	}

	#[test]
	fn set_request_carries_credentials_field() {
		let value = ChannelMessage::SetRequest {
			credentials: "[default]\nkey=1".into(),
		}
		.to_value();
		assert_eq!(value["action"], "awsconn-set-request");
		assert_eq!(value["credentials"], "[default]\nkey=1");
	}

	#[test]
	fn get_response_reads_creds_field() {
		let msg = ChannelMessage::from_value(&json!({"action": "awsconn-get-response", "creds": "abc"}));
		assert_eq!(msg, Some(ChannelMessage::GetResponse { creds: "abc".into() }));
	}

	#[test]
	fn get_response_without_creds_is_empty() {
		let msg = ChannelMessage::from_value(&json!({"action": "awsconn-get-response"}));
		assert_eq!(msg, Some(ChannelMessage::GetResponse { creds: String::new() }));
	}

	#[test]
	fn unrelated_traffic_is_not_a_channel_message() {
		assert_eq!(ChannelMessage::from_value(&json!({"action": "kernel-status", "state": "idle"})), None);
		assert_eq!(ChannelMessage::from_value(&json!({"text": "hello"})), None);
		assert_eq!(ChannelMessage::from_value(&json!("awsconn-get-response")), None);
	}

	#[test]
	fn requests_and_responses_pair_up() {
		assert_eq!(ChannelMessage::GetRequest.expects(), Some(ResponseKind::Get));
		assert_eq!(ChannelMessage::SetResponse.response_kind(), Some(ResponseKind::Set));
		assert_eq!(ChannelMessage::SetResponse.expects(), None);
		assert_eq!(ChannelMessage::GetRequest.response_kind(), None);
	}
}
