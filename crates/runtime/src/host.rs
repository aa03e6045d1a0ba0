//! Host document model used by the execution transport.
//!
//! The execution transport never talks to a shell directly. It hands a
//! command to an [`ExecutionHost`], which runs it somewhere the user cannot
//! see. [`Notebook`] is the document-backed host: it splices a hidden code
//! unit in front of the user's units, runs it on its [`Kernel`], scrapes the
//! output and splices the unit back out, restoring the active index exactly.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Runs a command invisibly and returns its captured text output.
#[async_trait]
pub trait ExecutionHost: Send + Sync {
	async fn execute_hidden(&self, command: &str) -> Result<String>;
}

/// Executes unit sources and returns their output streams.
#[async_trait]
pub trait Kernel: Send + Sync {
	async fn run(&self, source: &str) -> Result<Vec<String>>;
}

/// Kernel that runs each source as a `sh -c` invocation.
///
/// A non-zero exit status is not an error: like a notebook shell escape, the
/// captured stderr simply becomes part of the output.
#[derive(Debug, Clone)]
pub struct ShellKernel {
	shell: String,
}

impl Default for ShellKernel {
	fn default() -> Self {
		Self { shell: "sh".to_string() }
	}
}

impl ShellKernel {
	pub fn new(shell: impl Into<String>) -> Self {
		Self { shell: shell.into() }
	}
}

#[async_trait]
impl Kernel for ShellKernel {
	async fn run(&self, source: &str) -> Result<Vec<String>> {
		let output = Command::new(&self.shell)
			.arg("-c")
			.arg(source)
			.kill_on_drop(true)
			.output()
			.await
			.map_err(|e| Error::Execution(format!("failed to start {}: {e}", self.shell)))?;

		tracing::debug!(target = "awsconn.exec", status = ?output.status, "hidden unit finished");

		Ok([output.stdout, output.stderr]
			.into_iter()
			.filter(|stream| !stream.is_empty())
			.map(|stream| String::from_utf8_lossy(&stream).into_owned())
			.collect())
	}
}

/// Kind of a document unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
	Code,
	Markdown,
}

/// One unit of the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
	id: u64,
	pub kind: UnitKind,
	pub source: String,
	pub hidden: bool,
	pub outputs: Vec<String>,
}

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

impl Unit {
	pub fn code(source: impl Into<String>) -> Self {
		Self::with_kind(UnitKind::Code, source)
	}

	pub fn markdown(source: impl Into<String>) -> Self {
		Self::with_kind(UnitKind::Markdown, source)
	}

	fn with_kind(kind: UnitKind, source: impl Into<String>) -> Self {
		Self {
			id: NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed),
			kind,
			source: source.into(),
			hidden: false,
			outputs: Vec::new(),
		}
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

#[derive(Debug, Default)]
struct Document {
	units: Vec<Unit>,
	active: usize,
}

/// In-memory host document with an attached kernel.
///
/// Hidden executions on one notebook run one at a time, so each restores
/// the active index the user left.
pub struct Notebook<K> {
	doc: Mutex<Document>,
	kernel: K,
	hidden_exec: tokio::sync::Mutex<()>,
}

impl<K: Kernel> Notebook<K> {
	pub fn new(kernel: K) -> Self {
		Self::with_units(kernel, Vec::new())
	}

	pub fn with_units(kernel: K, units: Vec<Unit>) -> Self {
		Self {
			doc: Mutex::new(Document { units, active: 0 }),
			kernel,
			hidden_exec: tokio::sync::Mutex::new(()),
		}
	}

	/// Snapshot of the document's units.
	pub fn units(&self) -> Vec<Unit> {
		self.doc.lock().units.clone()
	}

	pub fn active_index(&self) -> usize {
		self.doc.lock().active
	}

	pub fn set_active_index(&self, index: usize) {
		let mut doc = self.doc.lock();
		doc.active = index.min(doc.units.len().saturating_sub(1));
	}

	pub fn push(&self, unit: Unit) {
		self.doc.lock().units.push(unit);
	}

	/// Splices a hidden code unit in at index 0 and makes it active.
	fn insert_hidden(&self, command: &str) -> HiddenUnit<'_> {
		let mut unit = Unit::code(command);
		unit.hidden = true;
		let id = unit.id;

		let mut doc = self.doc.lock();
		let restore_active = doc.active;
		doc.units.insert(0, unit);
		doc.active = 0;

		HiddenUnit {
			doc: &self.doc,
			id,
			restore_active,
		}
	}
}

#[async_trait]
impl<K: Kernel> ExecutionHost for Notebook<K> {
	async fn execute_hidden(&self, command: &str) -> Result<String> {
		let _serial = self.hidden_exec.lock().await;
		let hidden = self.insert_hidden(command);

		let source = {
			let doc = self.doc.lock();
			let unit = &doc.units[0];
			if unit.kind != UnitKind::Code {
				return Err(Error::InvalidUnit(0));
			}
			unit.source.clone()
		};

		let outputs = self.kernel.run(&source).await?;
		hidden.record(&outputs);
		Ok(outputs.concat())
	}
}

/// Removes the hidden unit and restores the active index when dropped,
/// including when the kernel fails or the future is cancelled.
struct HiddenUnit<'a> {
	doc: &'a Mutex<Document>,
	id: u64,
	restore_active: usize,
}

impl HiddenUnit<'_> {
	fn record(&self, outputs: &[String]) {
		let mut doc = self.doc.lock();
		if let Some(unit) = doc.units.iter_mut().find(|u| u.id == self.id) {
			unit.outputs = outputs.to_vec();
		}
	}
}

impl Drop for HiddenUnit<'_> {
	fn drop(&mut self) {
		let mut doc = self.doc.lock();
		if let Some(pos) = doc.units.iter().position(|u| u.id == self.id) {
			doc.units.remove(pos);
		}
		doc.active = self.restore_active;
	}
}
