//! Error types for the ezDV runtime.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ezDV runtime.
#[derive(Debug, Error)]
pub enum Error {
	/// A frame was offered while the connection was not open.
	#[error("Not connected to ezDV (session is {0})")]
	NotConnected(SessionState),

	/// The WebSocket could not be opened.
	#[error("Failed to connect to ezDV: {0}")]
	ConnectionFailed(String),

	/// Transport-level error on an open connection.
	#[error("Transport error: {0}")]
	Transport(String),

	/// A local file could not be read before uploading it.
	#[error("Could not open file for upload: {}", path.display())]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// The session task is gone (shut down or all handles dropped).
	#[error("Session closed")]
	SessionClosed,

	/// JSON serialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if the frame was refused because the connection is not open.
	///
	/// Callers can retry the action once the session reports it is open again.
	pub fn is_not_connected(&self) -> bool {
		matches!(self, Error::NotConnected(_) | Error::SessionClosed)
	}
}
