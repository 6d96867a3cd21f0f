//! Error types for the ezDV client.

use std::time::Duration;

use thiserror::Error;

use crate::panel::Form;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Session or transport failure.
	#[error(transparent)]
	Runtime(#[from] ezdv_runtime::Error),

	/// An upload was requested without a file.
	#[error("No file selected")]
	NoFileSelected,

	/// The device did not answer in time.
	#[error("Timed out after {}ms waiting for {waiting_for}", after.as_millis())]
	Timeout { after: Duration, waiting_for: String },

	/// The device reported `success: false` for a save or upload.
	#[error("ezDV reported failure saving {0}")]
	DeviceRejected(Form),
}

impl Error {
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout { .. })
	}

	pub fn is_not_connected(&self) -> bool {
		matches!(self, Error::Runtime(e) if e.is_not_connected())
	}
}
