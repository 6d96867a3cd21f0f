use ezdv::RuntimeError;
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Device(#[from] ezdv::Error),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::Device(err) => classify_device_error(err),
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
			CliError::Json(err) => (ErrorCode::InternalError, format!("JSON error: {err}"), None),
			CliError::Anyhow(err) => (ErrorCode::InternalError, format!("{err:#}"), None),
		};

		CommandError {
			code,
			message,
			details,
		}
	}
}

fn classify_device_error(err: &ezdv::Error) -> (ErrorCode, String, Option<serde_json::Value>) {
	let message = err.to_string();
	match err {
		ezdv::Error::Runtime(runtime) => match runtime {
			RuntimeError::ConnectionFailed(_) | RuntimeError::Transport(_) => {
				(ErrorCode::ConnectionFailed, message, None)
			}
			RuntimeError::NotConnected(state) => (
				ErrorCode::SessionError,
				message,
				Some(serde_json::json!({ "state": state.to_string() })),
			),
			RuntimeError::SessionClosed => (ErrorCode::SessionError, message, None),
			RuntimeError::FileRead { path, source } => (
				ErrorCode::IoError,
				format!("{message}: {source}"),
				Some(serde_json::json!({ "path": path })),
			),
			RuntimeError::Json(_) => (ErrorCode::InternalError, message, None),
		},
		ezdv::Error::NoFileSelected => (ErrorCode::NoFileSelected, message, None),
		ezdv::Error::Timeout { after, waiting_for } => (
			ErrorCode::Timeout,
			message,
			Some(serde_json::json!({
				"timeoutMs": after.as_millis() as u64,
				"waitingFor": waiting_for,
			})),
		),
		ezdv::Error::DeviceRejected(form) => (
			ErrorCode::DeviceRejected,
			message,
			Some(serde_json::json!({ "form": form })),
		),
	}
}
