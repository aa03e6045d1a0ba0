//! Wire types shared by the credential transports and the reference backend.
//!
//! Three boundaries are described here:
//!
//! - [`channel`]: JSON messages exchanged over the persistent `AWSConnector` channel
//! - [`endpoint`]: request/response bodies of the stateless `/AWSConnector` endpoint
//! - [`command`]: single-line shell commands run inside a hidden execution unit

pub mod channel;
pub mod command;
pub mod endpoint;

pub use channel::{CHANNEL_NAME, ChannelMessage, ResponseKind};
pub use command::{DEFAULT_CREDENTIAL_DIR, DEFAULT_CREDENTIAL_PATH, DEFAULT_MARKER, decode_printf_payload, escape_printf_payload, read_command, write_command};
pub use endpoint::{Ack, CredentialPayload, ENDPOINT_PATH};
