//! Terminal rendition of the credential dialog.
//!
//! The dialog is a block of text on stdout; the interactive `edit` command
//! feeds typed commands back through the [`SurfaceIntents`] the manager
//! registered when it opened the dialog.

use std::sync::Arc;

use awsconn::{DetailSection, DialogSurface, Notifier, SurfaceFactory, SurfaceIntents};
use colored::Colorize;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
	intents: Option<SurfaceIntents>,
	text: String,
}

/// Factory for terminal dialogs. At most one dialog exists at a time.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurfaces {
	slot: Arc<Mutex<Slot>>,
}

impl TerminalSurfaces {
	pub fn new() -> Self {
		Self::default()
	}

	/// Intents of the open dialog, [`None`] while it is closed.
	pub fn intents(&self) -> Option<SurfaceIntents> {
		self.slot.lock().intents.clone()
	}

	/// Replaces the editor text without rendering.
	pub fn set_text(&self, text: String) {
		self.slot.lock().text = text;
	}

	pub fn text(&self) -> String {
		self.slot.lock().text.clone()
	}
}

impl SurfaceFactory for TerminalSurfaces {
	fn create(&self, intents: SurfaceIntents, sections: &[DetailSection]) -> Box<dyn DialogSurface> {
		{
			let mut slot = self.slot.lock();
			slot.intents = Some(intents);
			slot.text.clear();
		}

		println!("{}", "Configure environment".green().bold());
		for section in sections {
			println!("  {} {}", section.label.bold(), format!("(more {})", section.id).dimmed());
		}
		Box::new(TerminalSurface {
			slot: Arc::clone(&self.slot),
		})
	}
}

struct TerminalSurface {
	slot: Arc<Mutex<Slot>>,
}

impl DialogSurface for TerminalSurface {
	fn render(&mut self, value: Option<&str>) {
		let text = value.unwrap_or_default();
		self.slot.lock().text = text.to_string();

		println!("{}", "── credentials ──".cyan());
		if text.is_empty() {
			println!("{}", "(empty)".dimmed());
		} else {
			for line in text.lines() {
				println!("{line}");
			}
		}
		println!("{}", "─────────────────".cyan());
	}

	fn text(&self) -> String {
		self.slot.lock().text.clone()
	}

	fn set_detail_visible(&mut self, section: &DetailSection, visible: bool) {
		if visible {
			println!("  {}: {}", section.label.bold(), section.help.italic());
		} else {
			println!("  {}", format!("{} details hidden", section.label).dimmed());
		}
	}

	fn resize(&mut self, height: u32) {
		debug!(target = "awsconn.terminal", height, "dialog resized");
	}

	fn destroy(&mut self) {
		self.slot.lock().intents = None;
		println!("{}", "dialog closed".dimmed());
	}
}

/// Prints notifications as single colored lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
	fn success(&self, message: &str) {
		println!("{} {message}", "✓".green().bold());
	}

	fn failure(&self, message: &str) {
		eprintln!("{} {message}", "✗".red().bold());
	}
}
