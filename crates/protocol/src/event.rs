use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::settings::{FreeDvMode, RadioSettings, ReportingSettings, VoiceKeyerSettings, WifiSettings};


/// Message sent from the device to the client.
///
/// `*Info` events report stored configuration and arrive unsolicited right
/// after a connection opens. `*Saved` / `*UploadComplete` events report the
/// outcome of an earlier command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
	WifiInfo(WifiSettings),
	WifiSaved { success: bool },
	RadioInfo(RadioSettings),
	RadioSaved { success: bool },
	/// A Flex radio answered discovery on the local network.
	FlexRadioDiscovered { ip: String, description: String },
	VoiceKeyerInfo(VoiceKeyerSettings),
	VoiceKeyerSaved { success: bool },
	ReportingInfo(ReportingSettings),
	ReportingSaved { success: bool },
	LedBrightnessInfo { duty_cycle: u16 },
	VoiceKeyerUploadComplete { success: bool },
	FirmwareUploadComplete { success: bool },
	/// Battery state in percent, and its rate of change in percent per hour.
	BatteryStatus { state_of_charge: f64, state_of_charge_change: f64 },
	CurrentMode { current_mode: u8 },
	VoiceKeyerRunning { running: bool },
}

impl Event {
	/// Every `type` tag the device may send.
	pub const TYPES: &'static [&'static str] = &[
		"wifiInfo",
		"wifiSaved",
		"radioInfo",
		"radioSaved",
		"flexRadioDiscovered",
		"voiceKeyerInfo",
		"voiceKeyerSaved",
		"reportingInfo",
		"reportingSaved",
		"ledBrightnessInfo",
		"voiceKeyerUploadComplete",
		"firmwareUploadComplete",
		"batteryStatus",
		"currentMode",
		"voiceKeyerRunning",
	];

	/// Wire value of the `type` tag.
	pub fn type_name(&self) -> &'static str {
		match self {
			Event::WifiInfo(_) => "wifiInfo",
			Event::WifiSaved { .. } => "wifiSaved",
			Event::RadioInfo(_) => "radioInfo",
			Event::RadioSaved { .. } => "radioSaved",
			Event::FlexRadioDiscovered { .. } => "flexRadioDiscovered",
			Event::VoiceKeyerInfo(_) => "voiceKeyerInfo",
			Event::VoiceKeyerSaved { .. } => "voiceKeyerSaved",
			Event::ReportingInfo(_) => "reportingInfo",
			Event::ReportingSaved { .. } => "reportingSaved",
			Event::LedBrightnessInfo { .. } => "ledBrightnessInfo",
			Event::VoiceKeyerUploadComplete { .. } => "voiceKeyerUploadComplete",
			Event::FirmwareUploadComplete { .. } => "firmwareUploadComplete",
			Event::BatteryStatus { .. } => "batteryStatus",
			Event::CurrentMode { .. } => "currentMode",
			Event::VoiceKeyerRunning { .. } => "voiceKeyerRunning",
		}
	}

	/// Outcome flag of a `*Saved` or `*UploadComplete` event.
	pub fn outcome(&self) -> Option<bool> {
		match *self {
			Event::WifiSaved { success }
			| Event::RadioSaved { success }
			| Event::VoiceKeyerSaved { success }
			| Event::ReportingSaved { success }
			| Event::VoiceKeyerUploadComplete { success }
			| Event::FirmwareUploadComplete { success } => Some(success),
			_ => None,
		}
	}

	/// Named mode of a `currentMode` event, if the number is one we know.
	pub fn free_dv_mode(&self) -> Option<FreeDvMode> {
		match *self {
			Event::CurrentMode { current_mode } => FreeDvMode::from_wire(current_mode),
			_ => None,
		}
	}
}

/// Decodes one inbound text frame.
///
/// Returns `Ok(None)` when the frame is well formed but its `type` is not one
/// of [`Event::TYPES`]; newer firmware may send events this client does not
/// know about, and those are skipped silently.
///
/// # Errors
///
/// Returns [`DecodeError`] if the frame is not JSON, has no string `type`, or
/// carries fields that do not fit its (known) type.
pub fn decode(text: &str) -> Result<Option<Event>, DecodeError> {
	let value: Value = serde_json::from_str(text)?;

	let type_name = match value.get("type").and_then(Value::as_str) {
		Some(type_name) => type_name,
		None => return Err(DecodeError::MissingType),
	};

	if !Event::TYPES.contains(&type_name) {
		return Ok(None);
	}

	let type_name = type_name.to_string();
	serde_json::from_value(value)
		.map(Some)
		.map_err(|source| DecodeError::InvalidFields { type_name, source })
}
