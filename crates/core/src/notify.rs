//! Transient user notifications.

use tracing::{info, warn};

/// Shows short-lived confirmations and failures to the user.
pub trait Notifier: Send + Sync {
	fn success(&self, message: &str);
	fn failure(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn success(&self, message: &str) {
		info!(target = "awsconn.notify", "{message}");
	}

	fn failure(&self, message: &str) {
		warn!(target = "awsconn.notify", "{message}");
	}
}
