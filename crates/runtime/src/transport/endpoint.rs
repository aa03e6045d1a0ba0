use std::time::Duration;

use async_trait::async_trait;
use awsconn_protocol::{Ack, CredentialPayload, ENDPOINT_PATH};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use super::{Transport, TransportKind};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport issuing one HTTP request per operation against `<base>/AWSConnector`.
#[derive(Debug, Clone)]
pub struct EndpointTransport {
	client: Client,
	url: String,
	token: Option<String>,
}

impl EndpointTransport {
	pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
		Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
	}

	pub fn with_timeout(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
		let client = Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			url: format!("{}{ENDPOINT_PATH}", base_url.trim_end_matches('/')),
			token,
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.token {
			Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("token {token}")),
			None => request,
		}
	}

	fn check(&self, status: StatusCode) -> Result<()> {
		if status.is_success() {
			Ok(())
		} else {
			Err(Error::Status {
				status: status.as_u16(),
				url: self.url.clone(),
			})
		}
	}
}

#[async_trait]
impl Transport for EndpointTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Endpoint
	}

	async fn get(&self) -> Result<Option<String>> {
		let response = self.authorized(self.client.get(&self.url)).send().await?;
		if response.status() == StatusCode::NOT_FOUND {
			debug!(target = "awsconn.endpoint", url = %self.url, "no credential stored");
			return Ok(None);
		}
		self.check(response.status())?;
		let payload: CredentialPayload = response.json().await?;
		Ok(payload.into_credential())
	}

	async fn set(&self, value: &str) -> Result<()> {
		let response = self.authorized(self.client.put(&self.url)).json(&CredentialPayload::new(value)).send().await?;
		self.check(response.status())?;
		let ack: Ack = response.json().await.unwrap_or_default();
		debug!(target = "awsconn.endpoint", status = ?ack.status, "credential stored");
		Ok(())
	}
}
