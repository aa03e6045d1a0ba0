//! Dialog surface boundary.
//!
//! The manager never renders anything itself. A [`SurfaceFactory`] builds a
//! [`DialogSurface`] when the dialog opens and hands it a [`SurfaceIntents`]
//! handle; the surface reports user actions through that handle only.

use tokio::sync::mpsc;
use tracing::debug;

use crate::manager::SessionEvent;

/// Collapsible help panel shown under one field of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailSection {
	pub id: &'static str,
	pub label: &'static str,
	pub help: &'static str,
}

impl DetailSection {
	pub const ROLE: Self = Self {
		id: "role",
		label: "Role",
		help: "AWS identity with permission policies that determine what the identity can and cannot do in AWS.",
	};
	pub const CREDS: Self = Self {
		id: "creds",
		label: "Credentials",
		help: "AWS security credentials are used to verify whether you have permission to access the requested resources.",
	};
	pub const REGION: Self = Self {
		id: "region",
		label: "Region",
		help: "AWS region is a physical location around the world where a data center is clustered.",
	};
	pub const PARTS: Self = Self {
		id: "parts",
		label: "Number of partitions",
		help: "The data set will be split into specified number of partitions for computation.",
	};

	/// Sections in dialog order.
	pub const ALL: [Self; 4] = [Self::ROLE, Self::CREDS, Self::REGION, Self::PARTS];

	pub fn find(id: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|section| section.id == id)
	}
}

/// Dialog height bookkeeping: a base height plus one step per expanded section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
	pub base_height: u32,
	pub detail_step: u32,
}

impl Default for DialogLayout {
	fn default() -> Self {
		Self {
			base_height: 360,
			detail_step: 48,
		}
	}
}

impl DialogLayout {
	pub fn height(&self, expanded: usize) -> u32 {
		self.base_height + self.detail_step * expanded as u32
	}
}

/// Rendered credential dialog.
pub trait DialogSurface: Send {
	/// Replaces the editor text. [`None`] renders an empty editor.
	fn render(&mut self, value: Option<&str>);

	/// Current editor text, including unsaved edits.
	fn text(&self) -> String;

	fn set_detail_visible(&mut self, section: &DetailSection, visible: bool);

	fn resize(&mut self, height: u32);

	/// Removes the dialog. No other method is called afterwards.
	fn destroy(&mut self);
}

/// Builds dialog surfaces on demand.
pub trait SurfaceFactory: Send + Sync {
	fn create(&self, intents: SurfaceIntents, sections: &[DetailSection]) -> Box<dyn DialogSurface>;
}

/// Handle through which a surface forwards user intents to its manager.
#[derive(Debug, Clone)]
pub struct SurfaceIntents {
	tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SurfaceIntents {
	pub(crate) fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
		Self { tx }
	}

	pub fn load(&self) {
		self.post(SessionEvent::Load);
	}

	pub fn save(&self) {
		self.post(SessionEvent::Save);
	}

	pub fn close(&self) {
		self.post(SessionEvent::Close);
	}

	pub fn toggle_detail(&self, section_id: &str) {
		self.post(SessionEvent::ToggleDetail(section_id.to_string()));
	}

	fn post(&self, event: SessionEvent) {
		if self.tx.send(event).is_err() {
			debug!(target = "awsconn.session", "intent after session ended; ignoring");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sections_are_found_by_id() {
		assert_eq!(DetailSection::find("region"), Some(DetailSection::REGION));
		assert_eq!(DetailSection::find("parts").map(|s| s.label), Some("Number of partitions"));
		assert_eq!(DetailSection::find("bucket"), None);
	}

	#[test]
	fn layout_grows_per_expanded_section() {
		let layout = DialogLayout::default();
		assert_eq!(layout.height(0), 360);
		assert_eq!(layout.height(2), 456);
	}
}
