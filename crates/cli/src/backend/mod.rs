//! Reference backend for the channel and endpoint transports.
//!
//! Serves three routes over one credential file:
//!
//! - `GET /api/status`: readiness probe polled by the channel transport
//! - `GET|PUT /AWSConnector`: the stateless endpoint (`{data}` bodies)
//! - `GET /api/channels/AWSConnector`: WebSocket carrying channel messages
//!
//! When a token is configured, the endpoint and channel routes require an
//! `Authorization: token <t>` header.

mod channel;
mod store;

use std::sync::Arc;

use anyhow::Context;
use awsconn_protocol::{Ack, CHANNEL_NAME, CredentialPayload, ENDPOINT_PATH};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub use store::CredentialStore;

#[derive(Debug, Clone)]
pub struct BackendState {
	store: CredentialStore,
	token: Option<Arc<str>>,
}

impl BackendState {
	pub fn new(store: CredentialStore, token: Option<String>) -> Self {
		Self {
			store,
			token: token.map(Arc::from),
		}
	}

	fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
		let Some(expected) = self.token.as_deref() else {
			return Ok(());
		};
		let presented = headers
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("token "));
		if presented == Some(expected) {
			Ok(())
		} else {
			debug!(target = "awsconn.backend", "rejected request without valid token");
			Err(StatusCode::UNAUTHORIZED)
		}
	}
}

pub fn router(state: BackendState) -> Router {
	Router::new()
		.route("/api/status", get(status))
		.route(ENDPOINT_PATH, get(read_credentials).put(write_credentials))
		.route("/api/channels/{name}", get(open_channel))
		.with_state(state)
}

/// Serves until the listener fails.
pub async fn serve(listener: TcpListener, state: BackendState) -> anyhow::Result<()> {
	let addr = listener.local_addr().context("listener has no local address")?;
	info!(
		target = "awsconn.backend",
		%addr,
		credentials = %state.store.path().display(),
		authenticated = state.token.is_some(),
		"backend listening"
	);
	axum::serve(listener, router(state)).await.context("backend server error")
}

async fn status() -> Json<Value> {
	Json(json!({ "ready": true }))
}

async fn read_credentials(State(state): State<BackendState>, headers: HeaderMap) -> Result<Json<CredentialPayload>, StatusCode> {
	state.authorize(&headers)?;
	match state.store.read().await {
		Ok(Some(data)) => Ok(Json(CredentialPayload::new(data))),
		Ok(None) => Err(StatusCode::NOT_FOUND),
		Err(err) => {
			warn!(target = "awsconn.backend", error = %err, "failed to read credentials");
			Err(StatusCode::INTERNAL_SERVER_ERROR)
		}
	}
}

async fn write_credentials(
	State(state): State<BackendState>,
	headers: HeaderMap,
	Json(payload): Json<CredentialPayload>,
) -> Result<Json<Ack>, StatusCode> {
	state.authorize(&headers)?;
	match state.store.write(&payload.data).await {
		Ok(()) => {
			info!(target = "awsconn.backend", bytes = payload.data.len(), "credentials written");
			Ok(Json(Ack::ok()))
		}
		Err(err) => {
			warn!(target = "awsconn.backend", error = %err, "failed to write credentials");
			Err(StatusCode::INTERNAL_SERVER_ERROR)
		}
	}
}

async fn open_channel(Path(name): Path<String>, State(state): State<BackendState>, headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
	if let Err(status) = state.authorize(&headers) {
		return status.into_response();
	}
	if name != CHANNEL_NAME {
		debug!(target = "awsconn.backend", name = %name, "unknown channel");
		return StatusCode::NOT_FOUND.into_response();
	}
	ws.on_upgrade(move |socket| channel::handle_channel(socket, state))
}
