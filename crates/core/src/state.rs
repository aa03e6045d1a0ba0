//! Per-panel session state.

/// In-memory state of one credential session.
///
/// Created empty for every panel and never persisted; a reopened panel starts
/// with no credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
	credential: Option<String>,
	dialog_open: bool,
}

impl SessionState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current credential text, [`None`] until something is loaded or typed.
	pub fn credential(&self) -> Option<&str> {
		self.credential.as_deref()
	}

	pub fn dialog_open(&self) -> bool {
		self.dialog_open
	}

	/// Stores text captured from the editor. Empty text clears the credential.
	pub(crate) fn capture(&mut self, text: String) {
		self.credential = if text.is_empty() { None } else { Some(text) };
	}

	/// Applies a load result. `None` means nothing is stored and keeps the current value.
	///
	/// Returns whether the credential changed.
	pub(crate) fn apply_loaded(&mut self, value: Option<String>) -> bool {
		match value {
			Some(value) => {
				let changed = self.credential.as_deref() != Some(value.as_str());
				self.credential = Some(value);
				changed
			}
			None => false,
		}
	}

	pub(crate) fn mark_open(&mut self) {
		self.dialog_open = true;
	}

	pub(crate) fn mark_closed(&mut self) {
		self.dialog_open = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_closed_and_empty() {
		let state = SessionState::new();
		assert_eq!(state.credential(), None);
		assert!(!state.dialog_open());
	}

	#[test]
	fn missing_load_result_keeps_previous_value() {
		let mut state = SessionState::new();
		state.capture("[default]".into());
		assert!(!state.apply_loaded(None));
		assert_eq!(state.credential(), Some("[default]"));
		assert!(state.apply_loaded(Some("[prod]".into())));
		assert_eq!(state.credential(), Some("[prod]"));
	}

	#[test]
	fn capturing_empty_text_clears() {
		let mut state = SessionState::new();
		state.capture("x".into());
		state.capture(String::new());
		assert_eq!(state.credential(), None);
	}
}
