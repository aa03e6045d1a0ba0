//! Credential session manager.
//!
//! One [`CredentialSessionManager`] owns the state of one document panel.
//! Every input (dialog intents, host triggers, transport completions) is a
//! [`SessionEvent`] on the manager's queue, and [`CredentialSessionManager::run`]
//! applies them one at a time. Transitions are synchronous; only the transport
//! call itself runs on a spawned task, which posts [`SessionEvent::Completed`]
//! back when it finishes.
//!
//! ```text
//!  Closed ──open──► Open ──load/save (pending)──► Open
//!    ▲                │
//!    └──close / save acknowledged──┘
//! ```

use std::sync::Arc;

use awsconn_runtime::{Result, Transport, TransportRequest, TransportResponse, exchange};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::notify::Notifier;
use crate::state::SessionState;
use crate::surface::{DetailSection, DialogLayout, DialogSurface, SurfaceFactory, SurfaceIntents};

/// Which user action a transport call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
	Load,
	Save,
}

impl RequestKind {
	fn verb(self) -> &'static str {
		match self {
			RequestKind::Load => "load",
			RequestKind::Save => "save",
		}
	}
}

/// Input to a session's event queue.
#[derive(Debug)]
pub enum SessionEvent {
	Open,
	Load,
	Save,
	Close,
	ToggleDetail(String),
	Completed { request: RequestKind, result: Result<TransportResponse> },
	/// Panel closed: tear down the dialog and stop the event loop.
	Dispose,
}

/// Cloneable sender for host-side triggers.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
	pub fn open(&self) -> bool {
		self.tx.send(SessionEvent::Open).is_ok()
	}

	pub fn load(&self) -> bool {
		self.tx.send(SessionEvent::Load).is_ok()
	}

	pub fn save(&self) -> bool {
		self.tx.send(SessionEvent::Save).is_ok()
	}

	pub fn close(&self) -> bool {
		self.tx.send(SessionEvent::Close).is_ok()
	}

	pub fn dispose(&self) -> bool {
		self.tx.send(SessionEvent::Dispose).is_ok()
	}
}

/// Owns one panel's [`SessionState`] and its dialog.
pub struct CredentialSessionManager {
	state: SessionState,
	transport: Arc<dyn Transport>,
	surfaces: Arc<dyn SurfaceFactory>,
	notifier: Arc<dyn Notifier>,
	surface: Option<Box<dyn DialogSurface>>,
	layout: DialogLayout,
	expanded: Vec<&'static str>,
	in_flight: Option<RequestKind>,
	/// Bumped on every `open`, so a save ack only closes the dialog it was sent from.
	dialog_generation: u64,
	saving_from: Option<u64>,
	tx: mpsc::UnboundedSender<SessionEvent>,
	rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl CredentialSessionManager {
	pub fn new(transport: Arc<dyn Transport>, surfaces: Arc<dyn SurfaceFactory>, notifier: Arc<dyn Notifier>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			state: SessionState::new(),
			transport,
			surfaces,
			notifier,
			surface: None,
			layout: DialogLayout::default(),
			expanded: Vec::new(),
			in_flight: None,
			dialog_generation: 0,
			saving_from: None,
			tx,
			rx,
		}
	}

	pub fn with_layout(mut self, layout: DialogLayout) -> Self {
		self.layout = layout;
		self
	}

	pub fn handle(&self) -> SessionHandle {
		SessionHandle { tx: self.tx.clone() }
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	/// Whether a load or save is awaiting its transport result.
	pub fn in_flight(&self) -> Option<RequestKind> {
		self.in_flight
	}

	/// Shows the dialog with the current credential. No-op if already open.
	pub fn open(&mut self) {
		if self.state.dialog_open() {
			debug!(target = "awsconn.session", "dialog already open");
			return;
		}

		let intents = SurfaceIntents::new(self.tx.clone());
		let mut surface = self.surfaces.create(intents, &DetailSection::ALL);
		self.expanded.clear();
		surface.render(self.state.credential());
		surface.resize(self.layout.height(0));
		self.surface = Some(surface);
		self.dialog_generation += 1;
		self.state.mark_open();
		debug!(target = "awsconn.session", transport = %self.transport.kind(), "dialog opened");
	}

	/// Reads the dialog's current text into the session state.
	pub fn capture_editor_value(&mut self) {
		if let Some(surface) = &self.surface {
			self.state.capture(surface.text());
		}
	}

	pub fn trigger_load(&mut self) {
		if self.busy(RequestKind::Load) {
			return;
		}
		self.dispatch(RequestKind::Load, TransportRequest::Get);
	}

	/// Captures the editor text and stores it on the backend.
	///
	/// Blank text sends nothing and closes the dialog without a notification.
	pub fn trigger_save(&mut self) {
		if self.busy(RequestKind::Save) {
			return;
		}
		self.capture_editor_value();

		let value = match self.state.credential() {
			Some(value) if !value.trim().is_empty() => value.to_string(),
			_ => {
				debug!(target = "awsconn.session", "blank credential; skipping save");
				self.close();
				return;
			}
		};
		self.saving_from = Some(self.dialog_generation);
		self.dispatch(RequestKind::Save, TransportRequest::Set { value });
	}

	/// Captures the editor text, then tears the dialog down if it is open.
	pub fn close(&mut self) {
		self.capture_editor_value();
		if !self.state.dialog_open() {
			return;
		}

		if let Some(mut surface) = self.surface.take() {
			surface.destroy();
		}
		self.expanded.clear();
		self.state.mark_closed();
		debug!(target = "awsconn.session", "dialog closed");
	}

	/// Shows or hides the help text of one detail section and resizes the dialog.
	pub fn toggle_detail(&mut self, section_id: &str) {
		let Some(section) = DetailSection::find(section_id) else {
			debug!(target = "awsconn.session", section_id, "unknown detail section");
			return;
		};
		let Some(surface) = self.surface.as_mut() else {
			return;
		};

		let visible = match self.expanded.iter().position(|id| *id == section.id) {
			Some(pos) => {
				self.expanded.remove(pos);
				false
			}
			None => {
				self.expanded.push(section.id);
				true
			}
		};
		surface.set_detail_visible(&section, visible);
		surface.resize(self.layout.height(self.expanded.len()));
	}

	/// Applies one event. Returns `false` once the session is disposed.
	pub fn apply(&mut self, event: SessionEvent) -> bool {
		match event {
			SessionEvent::Open => self.open(),
			SessionEvent::Load => self.trigger_load(),
			SessionEvent::Save => self.trigger_save(),
			SessionEvent::Close => self.close(),
			SessionEvent::ToggleDetail(id) => self.toggle_detail(&id),
			SessionEvent::Completed { request, result } => self.complete(request, result),
			SessionEvent::Dispose => {
				self.close();
				debug!(target = "awsconn.session", "session disposed");
				return false;
			}
		}
		true
	}

	/// Waits for and applies the next event.
	pub async fn step(&mut self) -> bool {
		match self.rx.recv().await {
			Some(event) => self.apply(event),
			None => false,
		}
	}

	/// Drains the event queue until [`SessionEvent::Dispose`] and returns the final state.
	pub async fn run(mut self) -> SessionState {
		while self.step().await {}
		self.state
	}

	fn busy(&self, requested: RequestKind) -> bool {
		match self.in_flight {
			Some(pending) => {
				debug!(target = "awsconn.session", requested = requested.verb(), pending = pending.verb(), "request in flight; ignoring");
				true
			}
			None => false,
		}
	}

	fn dispatch(&mut self, kind: RequestKind, request: TransportRequest) {
		self.in_flight = Some(kind);
		let transport = Arc::clone(&self.transport);
		let tx = self.tx.clone();
		tokio::spawn(async move {
			let result = exchange(transport.as_ref(), request).await;
			let _ = tx.send(SessionEvent::Completed { request: kind, result });
		});
	}

	fn complete(&mut self, request: RequestKind, result: Result<TransportResponse>) {
		self.in_flight = None;
		let saving_from = self.saving_from.take();
		match (request, result) {
			(RequestKind::Load, Ok(TransportResponse::GetResult { value: None })) => {
				debug!(target = "awsconn.session", "no stored credential");
			}
			(RequestKind::Load, Ok(TransportResponse::GetResult { value })) => {
				self.state.apply_loaded(value);
				match self.surface.as_mut() {
					Some(surface) => surface.render(self.state.credential()),
					None => debug!(target = "awsconn.session", "credential loaded after dialog closed"),
				}
			}
			(RequestKind::Save, Ok(TransportResponse::SetAck)) => {
				info!(target = "awsconn.session", "credential saved");
				if saving_from == Some(self.dialog_generation) {
					self.close();
				} else {
					debug!(target = "awsconn.session", "dialog reopened since save; leaving it open");
				}
				self.notifier.success("Credentials saved");
			}
			(request, Ok(_)) => {
				warn!(target = "awsconn.session", request = request.verb(), "mismatched transport response");
			}
			(request, Err(err)) => {
				warn!(target = "awsconn.session", request = request.verb(), error = %err, "transport request failed");
				self.notifier.failure(&format!("Failed to {} credentials: {err}", request.verb()));
			}
		}
	}
}
