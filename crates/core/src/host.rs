//! Host integration: one session manager per document panel.

use std::collections::HashMap;
use std::sync::Arc;

use awsconn_runtime::Transport;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::manager::{CredentialSessionManager, SessionHandle};
use crate::notify::Notifier;
use crate::state::SessionState;
use crate::surface::SurfaceFactory;

/// Supplies the transport for a newly attached panel.
pub trait TransportProvider: Send + Sync {
	fn transport_for(&self, panel_id: &str) -> Arc<dyn Transport>;
}

impl<F> TransportProvider for F
where
	F: Fn(&str) -> Arc<dyn Transport> + Send + Sync,
{
	fn transport_for(&self, panel_id: &str) -> Arc<dyn Transport> {
		self(panel_id)
	}
}

struct Panel {
	handle: SessionHandle,
	task: JoinHandle<SessionState>,
}

/// Tracks open panels and the session running behind each.
pub struct PanelRegistry {
	provider: Arc<dyn TransportProvider>,
	surfaces: Arc<dyn SurfaceFactory>,
	notifier: Arc<dyn Notifier>,
	panels: Mutex<HashMap<String, Panel>>,
}

impl PanelRegistry {
	pub fn new(provider: Arc<dyn TransportProvider>, surfaces: Arc<dyn SurfaceFactory>, notifier: Arc<dyn Notifier>) -> Self {
		Self {
			provider,
			surfaces,
			notifier,
			panels: Mutex::new(HashMap::new()),
		}
	}

	/// Starts a session for `panel_id`, or returns the running one.
	pub fn attach(&self, panel_id: &str) -> SessionHandle {
		let mut panels = self.panels.lock();
		if let Some(panel) = panels.get(panel_id) {
			return panel.handle.clone();
		}

		let transport = self.provider.transport_for(panel_id);
		let manager = CredentialSessionManager::new(transport, Arc::clone(&self.surfaces), Arc::clone(&self.notifier));
		let handle = manager.handle();
		let task = tokio::spawn(manager.run());
		debug!(target = "awsconn.host", panel_id, "session attached");
		panels.insert(panel_id.to_string(), Panel { handle: handle.clone(), task });
		handle
	}

	/// Toolbar trigger: opens the dialog of an attached panel.
	pub fn trigger(&self, panel_id: &str) -> bool {
		self.panels.lock().get(panel_id).is_some_and(|panel| panel.handle.open())
	}

	/// Disposes the panel's session. The returned task resolves to its final state.
	pub fn detach(&self, panel_id: &str) -> Option<JoinHandle<SessionState>> {
		let panel = self.panels.lock().remove(panel_id)?;
		panel.handle.dispose();
		debug!(target = "awsconn.host", panel_id, "session detached");
		Some(panel.task)
	}

	pub fn len(&self) -> usize {
		self.panels.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.panels.lock().is_empty()
	}
}
