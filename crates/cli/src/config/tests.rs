use std::fs;

use tempfile::TempDir;

use super::*;

#[test]
fn defaults_without_file_or_flags() {
	let settings = Settings::resolve(ConfigFile::default(), &Overrides::default());

	assert_eq!(settings.transport, TransportKind::Endpoint);
	assert_eq!(settings.base_url, DEFAULT_BASE_URL);
	assert_eq!(settings.token, None);
	assert_eq!(settings.execution, ExecutionSettings::default());
	assert_eq!(settings.request_timeout, Duration::from_secs(30));
}

#[test]
fn flags_override_file_values() {
	let file = ConfigFile {
		transport: Some(TransportKind::Execution),
		base_url: Some("http://file:8888".into()),
		token: Some("file-token".into()),
		marker: Some("[default]".into()),
		request_timeout_ms: Some(500),
		..ConfigFile::default()
	};
	let overrides = Overrides {
		transport: Some(TransportKind::Channel),
		base_url: None,
		token: Some("flag-token".into()),
	};

	let settings = Settings::resolve(file, &overrides);

	assert_eq!(settings.transport, TransportKind::Channel);
	assert_eq!(settings.base_url, "http://file:8888");
	assert_eq!(settings.token.as_deref(), Some("flag-token"));
	assert_eq!(settings.execution.marker, "[default]");
	assert_eq!(settings.execution.credential_path, "~/.aws/credentials");
	assert_eq!(settings.request_timeout, Duration::from_millis(500));
}

#[test]
fn empty_token_is_no_token() {
	let file = ConfigFile {
		token: Some(String::new()),
		..ConfigFile::default()
	};
	assert_eq!(Settings::resolve(file, &Overrides::default()).token, None);
}

#[test]
fn load_file_missing_is_none() {
	let tmp = TempDir::new().unwrap();
	assert_eq!(load_file(&tmp.path().join("config.json")).unwrap(), None);
}

#[test]
fn load_file_reads_json() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("config.json");
	fs::write(&path, r#"{"transport": "channel", "base_url": "http://hub:8888", "request_timeout_ms": 1000}"#).unwrap();

	let file = load_file(&path).unwrap().unwrap();

	assert_eq!(file.transport, Some(TransportKind::Channel));
	assert_eq!(file.base_url.as_deref(), Some("http://hub:8888"));
	assert_eq!(file.request_timeout_ms, Some(1000));
	assert_eq!(file.token, None);
}

#[test]
fn load_file_rejects_malformed_json() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("config.json");
	fs::write(&path, r#"{"transport": "pipe"}"#).unwrap();

	let err = load_file(&path).unwrap_err();
	assert!(matches!(err, CliError::Config { .. }));
}

#[test]
fn config_file_round_trips_without_empty_fields() {
	let file = ConfigFile {
		transport: Some(TransportKind::Endpoint),
		..ConfigFile::default()
	};
	assert_eq!(serde_json::to_string(&file).unwrap(), r#"{"transport":"endpoint"}"#);
}
