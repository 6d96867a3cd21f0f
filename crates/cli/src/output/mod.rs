//! Structured output for CLI commands.
//!
//! Every command produces one result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "mode",
//!   "data": { "mode": "700D" },
//!   "timings": { "durationMs": 412 }
//! }
//! ```
//!
//! On failure `data` is replaced by an `error` object with a stable `code`.
//! In text format the envelope is reduced to a human summary.


use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ezdv::{Availability, FlexRadio, PanelState, SaveStatuses, SessionEvent};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// Pretty-printed JSON
	Json,
	/// One JSON object per line
	Ndjson,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"text" => Ok(OutputFormat::Text),
			"json" => Ok(OutputFormat::Json),
			"ndjson" => Ok(OutputFormat::Ndjson),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,

	pub command: String,

	/// Device the command talked to
	#[serde(skip_serializing_if = "Option::is_none")]
	pub host: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,

	/// Summary printed instead of the data in text format
	#[serde(skip)]
	pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Could not reach the device
	ConnectionFailed,
	/// The device did not answer in time
	Timeout,
	/// The device reported `success: false`
	DeviceRejected,
	/// An upload was requested without a file
	NoFileSelected,
	/// Local file I/O error
	IoError,
	/// The connection dropped mid-command
	SessionError,
	InvalidInput,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::ConnectionFailed => write!(f, "CONNECTION_FAILED"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::DeviceRejected => write!(f, "DEVICE_REJECTED"),
			ErrorCode::NoFileSelected => write!(f, "NO_FILE_SELECTED"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::SessionError => write!(f, "SESSION_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

pub struct ResultBuilder<T: Serialize> {
	command: String,
	host: Option<String>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	text: Option<String>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			host: None,
			data: None,
			error: None,
			start_time: Instant::now(),
			text: None,
		}
	}

	/// Measure the duration from an earlier start.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			host: self.host,
			data: self.data,
			error: self.error,
			timings: Some(Timings::from(self.start_time.elapsed())),
			text: self.text,
		}
	}
}

/// Prints a command result to stdout in the given format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref text) = result.text {
			let _ = writeln!(stdout, "{text}");
		} else if let Some(ref data) = result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				let _ = writeln!(stdout, "{json}");
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
	}
}

pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// One line of `monitor` output.
#[derive(Debug, Serialize)]
#[serde(tag = "session", rename_all = "camelCase")]
pub enum MonitorLine<'a> {
	Opened,
	#[serde(rename_all = "camelCase")]
	Closed {
		reason: &'a str,
		reconnect_in_ms: u64,
	},
	Event {
		#[serde(flatten)]
		event: &'a ezdv::Event,
	},
}

impl<'a> From<&'a SessionEvent> for MonitorLine<'a> {
	fn from(event: &'a SessionEvent) -> Self {
		match event {
			SessionEvent::Opened => MonitorLine::Opened,
			SessionEvent::Closed { reason, reconnect_in } => MonitorLine::Closed {
				reason,
				reconnect_in_ms: reconnect_in.as_millis() as u64,
			},
			SessionEvent::Event(event) => MonitorLine::Event { event },
		}
	}
}

impl std::fmt::Display for MonitorLine<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			MonitorLine::Opened => write!(f, "connected"),
			MonitorLine::Closed {
				reason,
				reconnect_in_ms,
			} => write!(f, "disconnected: {reason} (reconnecting in {reconnect_in_ms}ms)"),
			MonitorLine::Event { event } => {
				let body = serde_json::to_value(event).unwrap_or_default();
				let mut fields = match body {
					serde_json::Value::Object(map) => map,
					_ => serde_json::Map::new(),
				};
				fields.remove("type");
				write!(f, "{} {}", event.type_name(), serde_json::Value::Object(fields))
			}
		}
	}
}

/// Prints one monitor line. Text is one line per event; JSON formats print
/// one compact object per line so the stream can be piped.
pub fn print_monitor_line(line: &MonitorLine<'_>, format: OutputFormat) {
	match format {
		OutputFormat::Text => println!("{line}"),
		OutputFormat::Json | OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(line) {
				println!("{json}");
			}
		}
	}
}

/// Result data for `status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData<'a> {
	pub connected: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mode: Option<String>,
	pub voice_keyer_running: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub battery: Option<BatteryData>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub led_duty_cycle: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub wifi: Option<&'a ezdv::WifiSettings>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub radio: Option<&'a ezdv::RadioSettings>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub voice_keyer: Option<&'a ezdv::VoiceKeyerSettings>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reporting: Option<&'a ezdv::ReportingSettings>,
	#[serde(skip_serializing_if = "no_radios")]
	pub flex_radios: &'a [FlexRadio],
	pub availability: Availability,
	pub save_status: SaveStatuses,
}

fn no_radios(radios: &&[FlexRadio]) -> bool {
	radios.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryData {
	pub percent: u8,
	pub charging: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub time_remaining: Option<String>,
}

impl<'a> From<&'a PanelState> for StatusData<'a> {
	fn from(panel: &'a PanelState) -> Self {
		Self {
			connected: panel.connected,
			mode: panel.mode().map(|m| m.label().to_string()),
			voice_keyer_running: panel.voice_keyer_running,
			battery: panel.battery.map(|b| BatteryData {
				percent: b.percent(),
				charging: b.is_charging(),
				time_remaining: b.time_remaining(),
			}),
			led_duty_cycle: panel.led_duty_cycle,
			wifi: panel.wifi.as_ref(),
			radio: panel.radio.as_ref(),
			voice_keyer: panel.voice_keyer.as_ref(),
			reporting: panel.reporting.as_ref(),
			flex_radios: &panel.flex_radios,
			availability: panel.availability(),
			save_status: panel.save_status,
		}
	}
}

/// Result data for the settings commands.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedData<S: Serialize> {
	pub form: ezdv::Form,
	pub settings: S,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upload: Option<UploadData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
	pub file: PathBuf,
	pub bytes: usize,
	pub chunks: usize,
}

/// Result data for commands that change one value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlData {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mode: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub voice_keyer_running: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub led_duty_cycle: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rebooting: Option<bool>,
}
