//! Channel transport: requests over a persistent named channel.
//!
//! All channel state lives in a single [`ChannelPump`] task. Callers hand it
//! requests through an unbounded queue and await a oneshot reply:
//!
//! 1. `get()`/`set()` push a [`PendingRequest`] and await its reply
//! 2. If no channel is open (backend not ready), the pump defers the request
//! 3. Once the backend reports ready, the pump opens the channel and flushes
//!    deferred requests in order, each exactly once
//! 4. Incoming payloads are routed by `action` tag to the oldest waiter of
//!    that response kind; everything else on the channel is ignored
//! 5. A new backend session (generation bump) drops the link; requests that
//!    were already sent on it fail with [`Error::ChannelClosed`]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use awsconn_protocol::{CHANNEL_NAME, ChannelMessage, ResponseKind};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::{Transport, TransportKind};
use crate::error::{Error, Result};
use crate::link::{ChannelConnector, ChannelLink, KernelStatus};

type Reply = oneshot::Sender<Result<Option<String>>>;

struct PendingRequest {
	message: ChannelMessage,
	expects: ResponseKind,
	reply: Reply,
}

/// Transport over the `AWSConnector` channel.
#[derive(Clone)]
pub struct ChannelTransport {
	requests: mpsc::UnboundedSender<PendingRequest>,
	request_timeout: Option<Duration>,
}

impl ChannelTransport {
	/// Creates the transport and the pump that must be run for it to make progress.
	pub fn new(connector: Arc<dyn ChannelConnector>, status: watch::Receiver<KernelStatus>) -> (Self, ChannelPump) {
		let (requests, requests_rx) = mpsc::unbounded_channel();
		let transport = Self {
			requests,
			request_timeout: None,
		};
		let pump = ChannelPump {
			connector,
			status,
			status_closed: false,
			requests: requests_rx,
			link: None,
			deferred: VecDeque::new(),
			awaiting_get: VecDeque::new(),
			awaiting_set: VecDeque::new(),
		};
		(transport, pump)
	}

	/// Creates the transport and spawns its pump on the current runtime.
	pub fn spawn(connector: Arc<dyn ChannelConnector>, status: watch::Receiver<KernelStatus>) -> Self {
		let (transport, pump) = Self::new(connector, status);
		tokio::spawn(pump.run());
		transport
	}

	/// Fails requests that get no reply within `timeout`, including time spent deferred.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);
		self
	}

	async fn request(&self, message: ChannelMessage) -> Result<Option<String>> {
		let expects = message.expects().ok_or_else(|| Error::ProtocolError("only requests can be sent on the channel".into()))?;
		let (reply, rx) = oneshot::channel();
		self.requests
			.send(PendingRequest { message, expects, reply })
			.map_err(|_| Error::ChannelClosed)?;

		let outcome = match self.request_timeout {
			Some(timeout) => tokio::time::timeout(timeout, rx)
				.await
				.map_err(|_| Error::Timeout(format!("no {expects:?} response within {}ms", timeout.as_millis())))?,
			None => rx.await,
		};
		outcome.map_err(|_| Error::ChannelClosed)?
	}
}

#[async_trait]
impl Transport for ChannelTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Channel
	}

	async fn get(&self) -> Result<Option<String>> {
		self.request(ChannelMessage::GetRequest).await
	}

	async fn set(&self, value: &str) -> Result<()> {
		self.request(ChannelMessage::SetRequest {
			credentials: value.to_string(),
		})
		.await
		.map(|_| ())
	}
}

struct ActiveLink {
	generation: u64,
	link: ChannelLink,
}

/// Task owning the channel link, the deferred queue and the reply routing.
pub struct ChannelPump {
	connector: Arc<dyn ChannelConnector>,
	status: watch::Receiver<KernelStatus>,
	status_closed: bool,
	requests: mpsc::UnboundedReceiver<PendingRequest>,
	link: Option<ActiveLink>,
	deferred: VecDeque<PendingRequest>,
	awaiting_get: VecDeque<Reply>,
	awaiting_set: VecDeque<Reply>,
}

impl ChannelPump {
	/// Runs until every [`ChannelTransport`] handle has been dropped.
	pub async fn run(mut self) {
		let initial = *self.status.borrow_and_update();
		self.on_status(initial).await;

		loop {
			tokio::select! {
				request = self.requests.recv() => match request {
					Some(request) => self.submit(request).await,
					None => break,
				},
				changed = self.status.changed(), if !self.status_closed => {
					if changed.is_err() {
						self.status_closed = true;
						self.fail_deferred(|| Error::NotReady("backend session ended".into()));
					} else {
						let status = *self.status.borrow_and_update();
						self.on_status(status).await;
					}
				}
				inbound = next_inbound(&mut self.link) => match inbound {
					Some(payload) => self.route(payload),
					None => {
						warn!(target = "awsconn.channel", "channel closed by backend");
						self.drop_link();
					}
				},
			}
		}

		self.drop_link();
		self.fail_deferred(|| Error::ChannelClosed);
	}

	async fn on_status(&mut self, status: KernelStatus) {
		let stale = self.link.as_ref().is_some_and(|active| active.generation != status.generation || !status.ready);
		if stale {
			info!(target = "awsconn.channel", generation = status.generation, "backend session changed; dropping channel");
			self.drop_link();
		}

		if status.ready && self.link.is_none() {
			if let Err(err) = self.connect(status.generation).await {
				warn!(target = "awsconn.channel", error = %err, "failed to open channel");
				let reason = err.to_string();
				self.fail_deferred(|| Error::NotReady(reason.clone()));
				return;
			}
			self.flush_deferred();
		}
	}

	async fn connect(&mut self, generation: u64) -> Result<()> {
		let link = self.connector.open(CHANNEL_NAME).await?;
		debug!(target = "awsconn.channel", generation, "channel link established");
		self.link = Some(ActiveLink { generation, link });
		Ok(())
	}

	async fn submit(&mut self, request: PendingRequest) {
		if self.link.is_none() {
			if self.status_closed {
				let _ = request.reply.send(Err(Error::NotReady("backend session ended".into())));
				return;
			}
			let status = *self.status.borrow();
			if !status.ready {
				debug!(target = "awsconn.channel", expects = ?request.expects, "backend not ready; deferring request");
				self.deferred.push_back(request);
				return;
			}
			if let Err(err) = self.connect(status.generation).await {
				warn!(target = "awsconn.channel", error = %err, "failed to open channel");
				let _ = request.reply.send(Err(Error::NotReady(err.to_string())));
				return;
			}
		}
		self.send(request);
	}

	fn flush_deferred(&mut self) {
		if !self.deferred.is_empty() {
			debug!(target = "awsconn.channel", count = self.deferred.len(), "flushing deferred requests");
		}
		while let Some(request) = self.deferred.pop_front() {
			if request.reply.is_closed() {
				debug!(target = "awsconn.channel", expects = ?request.expects, "caller gone; dropping deferred request");
				continue;
			}
			self.send(request);
		}
	}

	fn send(&mut self, request: PendingRequest) {
		let Some(active) = &self.link else {
			self.deferred.push_back(request);
			return;
		};

		if active.link.outbound.send(request.message.to_value()).is_err() {
			let _ = request.reply.send(Err(Error::ChannelClosed));
			self.drop_link();
			return;
		}

		match request.expects {
			ResponseKind::Get => self.awaiting_get.push_back(request.reply),
			ResponseKind::Set => self.awaiting_set.push_back(request.reply),
		}
	}

	fn route(&mut self, payload: Value) {
		let Some(message) = ChannelMessage::from_value(&payload) else {
			debug!(target = "awsconn.channel", "ignoring unrelated channel traffic");
			return;
		};

		let (waiters, result) = match message {
			ChannelMessage::GetResponse { creds } => (&mut self.awaiting_get, Ok(if creds.is_empty() { None } else { Some(creds) })),
			ChannelMessage::SetResponse => (&mut self.awaiting_set, Ok(None)),
			other => {
				debug!(target = "awsconn.channel", action = ?other.expects(), "ignoring request echoed on channel");
				return;
			}
		};

		while let Some(reply) = waiters.pop_front() {
			if reply.is_closed() {
				debug!(target = "awsconn.channel", "caller gone; skipping waiter");
				continue;
			}
			let _ = reply.send(result);
			return;
		}
		debug!(target = "awsconn.channel", "unsolicited response ignored");
	}

	fn drop_link(&mut self) {
		self.link = None;
		for reply in self.awaiting_get.drain(..).chain(self.awaiting_set.drain(..)) {
			let _ = reply.send(Err(Error::ChannelClosed));
		}
	}

	fn fail_deferred(&mut self, err: impl Fn() -> Error) {
		for request in self.deferred.drain(..) {
			let _ = request.reply.send(Err(err()));
		}
	}
}

async fn next_inbound(link: &mut Option<ActiveLink>) -> Option<Value> {
	match link {
		Some(active) => active.link.inbound.recv().await,
		None => std::future::pending().await,
	}
}
