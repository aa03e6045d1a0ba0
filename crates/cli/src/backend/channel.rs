use awsconn_protocol::ChannelMessage;
use axum::extract::ws::{Message, WebSocket};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::BackendState;

/// Serves one `AWSConnector` channel until the client disconnects.
pub(super) async fn handle_channel(mut socket: WebSocket, state: BackendState) {
	info!(target = "awsconn.backend", "channel client connected");

	while let Some(frame) = socket.recv().await {
		let text = match frame {
			Ok(Message::Text(text)) => text,
			Ok(Message::Close(_)) => break,
			Ok(_) => continue,
			Err(err) => {
				warn!(target = "awsconn.backend", error = %err, "channel read failed");
				break;
			}
		};

		let Some(reply) = answer(text.as_str(), &state).await else {
			continue;
		};
		if let Err(err) = socket.send(Message::Text(reply.to_string().into())).await {
			warn!(target = "awsconn.backend", error = %err, "channel write failed");
			break;
		}
	}

	info!(target = "awsconn.backend", "channel client disconnected");
}

async fn answer(text: &str, state: &BackendState) -> Option<Value> {
	let payload: Value = serde_json::from_str(text).ok()?;
	let message = ChannelMessage::from_value(&payload)?;

	match message {
		ChannelMessage::GetRequest => match state.store.read().await {
			Ok(creds) => Some(
				ChannelMessage::GetResponse {
					creds: creds.unwrap_or_default(),
				}
				.to_value(),
			),
			Err(err) => {
				warn!(target = "awsconn.backend", error = %err, "failed to read credentials");
				None
			}
		},
		ChannelMessage::SetRequest { credentials } => match state.store.write(&credentials).await {
			Ok(()) => Some(ChannelMessage::SetResponse.to_value()),
			Err(err) => {
				warn!(target = "awsconn.backend", error = %err, "failed to write credentials");
				None
			}
		},
		other => {
			debug!(target = "awsconn.backend", kind = ?other.response_kind(), "ignoring response sent by client");
			None
		}
	}
}
