//! Backend session readiness and channel links.
//!
//! A [`ChannelLink`] is the raw pair of queues behind one open channel:
//! outbound JSON payloads go to the backend, inbound payloads come back.
//! [`ChannelConnector`] opens links; [`WebSocketConnector`] does so over a
//! WebSocket at `<base>/api/channels/<name>`.
//!
//! Readiness is published through a [`tokio::sync::watch`] of [`KernelStatus`].
//! Each restart of the backend session bumps `generation`, which tells the
//! channel transport to drop its link and open a fresh one.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Readiness of the backend session the channel attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelStatus {
	/// Incremented every time the backend session is replaced.
	pub generation: u64,
	pub ready: bool,
}

impl KernelStatus {
	pub fn ready(generation: u64) -> Self {
		Self { generation, ready: true }
	}

	pub fn starting(generation: u64) -> Self {
		Self { generation, ready: false }
	}
}

/// Queues of one open channel.
pub struct ChannelLink {
	pub outbound: mpsc::UnboundedSender<Value>,
	pub inbound: mpsc::UnboundedReceiver<Value>,
}

/// Opens named channels against the current backend session.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
	async fn open(&self, name: &str) -> Result<ChannelLink>;
}

/// Connector speaking JSON text frames over a WebSocket.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
	base_url: String,
	token: Option<String>,
}

impl WebSocketConnector {
	pub fn new(base_url: &str, token: Option<String>) -> Self {
		Self {
			base_url: websocket_base(base_url),
			token,
		}
	}

	pub fn channel_url(&self, name: &str) -> String {
		format!("{}/api/channels/{name}", self.base_url)
	}
}

fn websocket_base(base_url: &str) -> String {
	let base = base_url.trim_end_matches('/');
	if let Some(rest) = base.strip_prefix("https://") {
		format!("wss://{rest}")
	} else if let Some(rest) = base.strip_prefix("http://") {
		format!("ws://{rest}")
	} else {
		base.to_string()
	}
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
	async fn open(&self, name: &str) -> Result<ChannelLink> {
		let url = self.channel_url(name);
		let mut request = url.as_str().into_client_request()?;
		if let Some(token) = &self.token {
			let value = HeaderValue::from_str(&format!("token {token}")).map_err(|e| Error::WebSocket(e.to_string()))?;
			request.headers_mut().insert("Authorization", value);
		}

		let (socket, _) = connect_async(request).await?;
		info!(target = "awsconn.channel", %url, "channel opened");

		let (mut ws_tx, mut ws_rx) = socket.split();
		let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Value>();
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

		tokio::spawn(async move {
			while let Some(payload) = outbound_rx.recv().await {
				if let Err(err) = ws_tx.send(Message::Text(payload.to_string())).await {
					warn!(target = "awsconn.channel", error = %err, "channel write failed");
					break;
				}
			}
			let _ = ws_tx.close().await;
		});

		tokio::spawn(async move {
			while let Some(frame) = ws_rx.next().await {
				match frame {
					Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
						Ok(value) => {
							if inbound_tx.send(value).is_err() {
								break;
							}
						}
						Err(err) => debug!(target = "awsconn.channel", error = %err, "ignoring non-JSON frame"),
					},
					Ok(Message::Close(_)) => break,
					Ok(_) => {}
					Err(err) => {
						warn!(target = "awsconn.channel", error = %err, "channel read failed");
						break;
					}
				}
			}
		});

		Ok(ChannelLink {
			outbound: outbound_tx,
			inbound: inbound_rx,
		})
	}
}

/// Polls `<base>/api/status` until the backend answers, then reports ready.
///
/// The returned receiver starts at [`KernelStatus::starting`]. If the backend
/// later stops answering the status flips back to not-ready, and the next
/// successful probe publishes a new generation.
pub fn probe_readiness(base_url: &str, interval: Duration) -> watch::Receiver<KernelStatus> {
	let url = format!("{}/api/status", base_url.trim_end_matches('/'));
	let (tx, rx) = watch::channel(KernelStatus::starting(0));

	tokio::spawn(async move {
		let client = reqwest::Client::new();
		let mut generation = 0;
		loop {
			let alive = matches!(client.get(&url).timeout(interval).send().await, Ok(resp) if resp.status().is_success());
			let current = *tx.borrow();
			let next = match (alive, current.ready) {
				(true, false) => {
					generation += 1;
					debug!(target = "awsconn.channel", generation, "backend session ready");
					KernelStatus::ready(generation)
				}
				(false, true) => {
					debug!(target = "awsconn.channel", generation, "backend session lost");
					KernelStatus::starting(generation)
				}
				_ => current,
			};
			if next != current && tx.send(next).is_err() {
				break;
			}
			if tx.is_closed() {
				break;
			}
			tokio::time::sleep(interval).await;
		}
	});

	rx
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn websocket_base_swaps_scheme() {
		assert_eq!(websocket_base("http://127.0.0.1:8888/"), "ws://127.0.0.1:8888");
		assert_eq!(websocket_base("https://hub.example.com/user/a"), "wss://hub.example.com/user/a");
		assert_eq!(websocket_base("ws://already"), "ws://already");
	}

	#[test]
	fn channel_url_appends_name() {
		let connector = WebSocketConnector::new("http://localhost:8888", None);
		assert_eq!(connector.channel_url("AWSConnector"), "ws://localhost:8888/api/channels/AWSConnector");
	}
}
