//! Credential session management for the AWSConnector editor.
//!
//! A [`CredentialSessionManager`] sits between a dialog surface and a
//! [`Transport`](awsconn_runtime::Transport). It owns the per-panel
//! [`SessionState`], decides when the transport is called, and is the only
//! thing that tells the surface what to display.
//!
//! ```ignore
//! let manager = CredentialSessionManager::new(transport, surfaces, Arc::new(TracingNotifier));
//! let handle = manager.handle();
//! tokio::spawn(manager.run());
//! handle.open();
//! ```

pub mod host;
pub mod manager;
pub mod notify;
pub mod state;
pub mod surface;

pub use awsconn_runtime as runtime;
pub use host::{PanelRegistry, TransportProvider};
pub use manager::{CredentialSessionManager, RequestKind, SessionEvent, SessionHandle};
pub use notify::{Notifier, TracingNotifier};
pub use state::SessionState;
pub use surface::{DetailSection, DialogLayout, DialogSurface, SurfaceFactory, SurfaceIntents};
