use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};

use super::*;
use crate::error::Error;
use crate::host::{ExecutionHost, Notebook, ShellKernel, Unit};
use crate::link::{ChannelConnector, ChannelLink, KernelStatus};

/// Backend side of one link opened by [`MockConnector`].
struct BackendEnd {
	from_editor: mpsc::UnboundedReceiver<Value>,
	to_editor: mpsc::UnboundedSender<Value>,
}

impl BackendEnd {
	async fn next_request(&mut self) -> Value {
		tokio::time::timeout(Duration::from_secs(1), self.from_editor.recv())
			.await
			.expect("request within timeout")
			.expect("link open")
	}

	fn reply(&self, payload: Value) {
		self.to_editor.send(payload).expect("editor side open");
	}
}

struct MockConnector {
	opened: mpsc::UnboundedSender<BackendEnd>,
	opens: AtomicUsize,
}

impl MockConnector {
	fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<BackendEnd>) {
		let (opened, rx) = mpsc::unbounded_channel();
		(
			Arc::new(Self {
				opened,
				opens: AtomicUsize::new(0),
			}),
			rx,
		)
	}
}

#[async_trait]
impl ChannelConnector for MockConnector {
	async fn open(&self, name: &str) -> crate::Result<ChannelLink> {
		assert_eq!(name, "AWSConnector");
		self.opens.fetch_add(1, Ordering::SeqCst);
		let (outbound, from_editor) = mpsc::unbounded_channel();
		let (to_editor, inbound) = mpsc::unbounded_channel();
		let _ = self.opened.send(BackendEnd { from_editor, to_editor });
		Ok(ChannelLink { outbound, inbound })
	}
}

struct RefusingConnector;

#[async_trait]
impl ChannelConnector for RefusingConnector {
	async fn open(&self, _name: &str) -> crate::Result<ChannelLink> {
		Err(Error::WebSocket("connection refused".into()))
	}
}

async fn next_link(links: &mut mpsc::UnboundedReceiver<BackendEnd>) -> BackendEnd {
	tokio::time::timeout(Duration::from_secs(1), links.recv())
		.await
		.expect("link opened within timeout")
		.expect("connector alive")
}

#[tokio::test]
async fn get_issued_before_ready_is_sent_exactly_once_after_ready() {
	let (connector, mut links) = MockConnector::new();
	let (status_tx, status_rx) = watch::channel(KernelStatus::starting(0));
	let transport = ChannelTransport::spawn(connector.clone(), status_rx);

	let pending = tokio::spawn({
		let transport = transport.clone();
		async move { transport.get().await }
	});
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(connector.opens.load(Ordering::SeqCst), 0);
	assert!(!pending.is_finished());

	status_tx.send(KernelStatus::ready(1)).unwrap();
	let mut backend = next_link(&mut links).await;
	assert_eq!(backend.next_request().await, json!({"action": "awsconn-get-request"}));
	backend.reply(json!({"action": "awsconn-get-response", "creds": "[default]\naws_access_key_id = A"}));

	let value = pending.await.unwrap().unwrap();
	assert_eq!(value.as_deref(), Some("[default]\naws_access_key_id = A"));

	tokio::time::sleep(Duration::from_millis(20)).await;
	assert!(backend.from_editor.try_recv().is_err());
	assert_eq!(connector.opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrelated_traffic_is_ignored() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx);

	let pending = tokio::spawn({
		let transport = transport.clone();
		async move { transport.get().await }
	});
	let mut backend = next_link(&mut links).await;
	backend.next_request().await;

	backend.reply(json!({"action": "kernel-status", "state": "idle"}));
	backend.reply(json!({"text": "hello"}));
	backend.reply(json!({"action": "awsconn-set-response"}));
	backend.reply(json!({"action": "awsconn-get-response", "creds": "stored"}));

	assert_eq!(pending.await.unwrap().unwrap().as_deref(), Some("stored"));
}

#[tokio::test]
async fn empty_creds_mean_nothing_stored() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx);

	let pending = tokio::spawn(async move { transport.get().await });
	let mut backend = next_link(&mut links).await;
	backend.next_request().await;
	backend.reply(json!({"action": "awsconn-get-response", "creds": ""}));

	assert_eq!(pending.await.unwrap().unwrap(), None);
}

#[tokio::test]
async fn set_sends_credentials_and_waits_for_ack() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx);

	let pending = tokio::spawn(async move { transport.set("[default]\nregion = eu-west-1\n").await });
	let mut backend = next_link(&mut links).await;
	assert_eq!(
		backend.next_request().await,
		json!({"action": "awsconn-set-request", "credentials": "[default]\nregion = eu-west-1\n"})
	);
	backend.reply(json!({"action": "awsconn-set-response"}));

	pending.await.unwrap().unwrap();
}

#[tokio::test]
async fn new_generation_fails_outstanding_and_reopens() {
	let (connector, mut links) = MockConnector::new();
	let (status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector.clone(), status_rx);

	let outstanding = tokio::spawn({
		let transport = transport.clone();
		async move { transport.get().await }
	});
	let mut first = next_link(&mut links).await;
	first.next_request().await;

	status_tx.send(KernelStatus::ready(2)).unwrap();
	let err = outstanding.await.unwrap().unwrap_err();
	assert!(matches!(err, Error::ChannelClosed));

	let retry = tokio::spawn(async move { transport.get().await });
	let mut second = next_link(&mut links).await;
	second.next_request().await;
	second.reply(json!({"action": "awsconn-get-response", "creds": "fresh"}));

	assert_eq!(retry.await.unwrap().unwrap().as_deref(), Some("fresh"));
	assert_eq!(connector.opens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn request_times_out_without_response() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx).with_request_timeout(Duration::from_millis(50));

	let pending = tokio::spawn(async move { transport.get().await });
	let mut backend = next_link(&mut links).await;
	backend.next_request().await;

	let err = pending.await.unwrap().unwrap_err();
	assert!(err.is_timeout());
}

#[tokio::test]
async fn response_after_timed_out_request_reaches_next_caller() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx).with_request_timeout(Duration::from_millis(100));

	let first = tokio::spawn({
		let transport = transport.clone();
		async move { transport.get().await }
	});
	let mut backend = next_link(&mut links).await;
	backend.next_request().await;
	assert!(first.await.unwrap().unwrap_err().is_timeout());

	let second = tokio::spawn(async move { transport.get().await });
	assert_eq!(backend.next_request().await, json!({"action": "awsconn-get-request"}));
	backend.reply(json!({"action": "awsconn-get-response", "creds": "fresh"}));

	assert_eq!(second.await.unwrap().unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn dropped_caller_does_not_swallow_set_ack() {
	let (connector, mut links) = MockConnector::new();
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(connector, status_rx);

	let abandoned = tokio::spawn({
		let transport = transport.clone();
		async move { transport.set("old").await }
	});
	let mut backend = next_link(&mut links).await;
	backend.next_request().await;
	abandoned.abort();
	let _ = abandoned.await;

	let pending = tokio::spawn(async move { transport.set("new").await });
	assert_eq!(backend.next_request().await, json!({"action": "awsconn-set-request", "credentials": "new"}));
	backend.reply(json!({"action": "awsconn-set-response"}));

	pending.await.unwrap().unwrap();
}

#[tokio::test]
async fn refused_channel_reports_not_ready() {
	let (_status_tx, status_rx) = watch::channel(KernelStatus::ready(1));
	let transport = ChannelTransport::spawn(Arc::new(RefusingConnector), status_rx);

	let err = transport.get().await.unwrap_err();
	assert!(matches!(err, Error::NotReady(ref reason) if reason.contains("connection refused")));
	assert!(err.is_unavailable());
}

#[tokio::test]
async fn deferred_requests_fail_when_status_source_goes_away() {
	let (status_tx, status_rx) = watch::channel(KernelStatus::starting(0));
	let (connector, _links) = MockConnector::new();
	let transport = ChannelTransport::spawn(connector, status_rx);

	let pending = tokio::spawn(async move { transport.get().await });
	tokio::time::sleep(Duration::from_millis(20)).await;
	drop(status_tx);

	let err = pending.await.unwrap().unwrap_err();
	assert!(matches!(err, Error::NotReady(_)));
}

/// Host that records commands and replays scripted output.
#[derive(Default)]
struct ScriptedHost {
	commands: Mutex<Vec<String>>,
	output: Mutex<String>,
}

#[async_trait]
impl ExecutionHost for ScriptedHost {
	async fn execute_hidden(&self, command: &str) -> crate::Result<String> {
		self.commands.lock().push(command.to_string());
		Ok(self.output.lock().clone())
	}
}

#[tokio::test]
async fn execution_get_without_marker_is_nothing_stored() {
	let host = Arc::new(ScriptedHost::default());
	*host.output.lock() = "cat: /home/u/.aws/credentials: No such file or directory\n".into();
	let transport = ExecutionTransport::new(host.clone(), ExecutionSettings::default());

	assert_eq!(transport.get().await.unwrap(), None);
	assert_eq!(*host.commands.lock(), vec!["cat ~/.aws/credentials".to_string()]);
}

#[tokio::test]
async fn execution_get_returns_output_verbatim() {
	let host = Arc::new(ScriptedHost::default());
	let stored = "[default]\naws_access_key_id = AKIA\naws_secret_access_key = s\n";
	*host.output.lock() = stored.into();
	let transport = ExecutionTransport::new(host, ExecutionSettings::default());

	assert_eq!(transport.get().await.unwrap().as_deref(), Some(stored));
}

#[tokio::test]
async fn execution_set_treats_output_as_failure() {
	let host = Arc::new(ScriptedHost::default());
	*host.output.lock() = "sh: 1: cannot create /root/.aws/credentials: Permission denied\n".into();
	let transport = ExecutionTransport::new(host, ExecutionSettings::default());

	let err = transport.set("[default]").await.unwrap_err();
	assert!(matches!(err, Error::Execution(ref msg) if msg.contains("Permission denied")));
}

#[tokio::test]
async fn execution_transport_writes_and_reads_through_shell() {
	let dir = tempfile::tempdir().unwrap();
	let cred_dir = dir.path().join("aws");
	let cred_path = cred_dir.join("credentials");
	let settings = ExecutionSettings {
		credential_path: cred_path.display().to_string(),
		credential_dir: cred_dir.display().to_string(),
		..ExecutionSettings::default()
	};
	let notebook = Arc::new(Notebook::with_units(ShellKernel::default(), vec![Unit::code("print('hi')")]));
	let transport = ExecutionTransport::new(notebook.clone(), settings);

	let text = "[default]\naws_access_key_id = AKIA\n\taws_secret_access_key = \"a$b`c%d\\e\"\nnote = 100%\n";
	transport.set(text).await.unwrap();

	assert_eq!(std::fs::read_to_string(&cred_path).unwrap(), text);
	assert_eq!(transport.get().await.unwrap().as_deref(), Some(text));
	assert_eq!(notebook.units().len(), 1);
	assert_eq!(notebook.active_index(), 0);
}

struct StaticTransport {
	stored: Option<String>,
	fail: bool,
}

#[async_trait]
impl Transport for StaticTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Endpoint
	}

	async fn get(&self) -> crate::Result<Option<String>> {
		if self.fail {
			return Err(Error::Status {
				status: 500,
				url: "http://localhost/AWSConnector".into(),
			});
		}
		Ok(self.stored.clone())
	}

	async fn set(&self, _value: &str) -> crate::Result<()> {
		if self.fail {
			return Err(Error::ChannelClosed);
		}
		Ok(())
	}
}

#[tokio::test]
async fn exchange_wraps_outcomes() {
	let transport = StaticTransport {
		stored: Some("x".into()),
		fail: false,
	};
	assert_eq!(
		exchange(&transport, TransportRequest::Get).await.unwrap(),
		TransportResponse::GetResult { value: Some("x".into()) }
	);
	assert_eq!(
		exchange(&transport, TransportRequest::Set { value: "y".into() }).await.unwrap(),
		TransportResponse::SetAck
	);

	let broken = StaticTransport { stored: None, fail: true };
	assert!(matches!(exchange(&broken, TransportRequest::Get).await, Err(Error::Status { status: 500, .. })));
}

#[test]
fn transport_kind_parses_aliases() {
	assert_eq!("execution".parse::<TransportKind>(), Ok(TransportKind::Execution));
	assert_eq!("Comm".parse::<TransportKind>(), Ok(TransportKind::Channel));
	assert_eq!(" http ".parse::<TransportKind>(), Ok(TransportKind::Endpoint));
	assert!("pipe".parse::<TransportKind>().is_err());
	assert_eq!(TransportKind::Channel.to_string(), "channel");
}

#[test]
fn request_label_hides_value() {
	let request = TransportRequest::Set { value: "secret".into() };
	assert_eq!(request.label(), "set");
	assert!(!request.label().contains("secret"));
}
