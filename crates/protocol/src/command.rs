use serde::{Deserialize, Serialize};

use crate::settings::{FreeDvMode, RadioSettings, ReportingSettings, VoiceKeyerSettings, WifiSettings};

/// Message sent from the client to the device.
///
/// Serialized as a JSON object whose `type` tag names the variant
/// (`{"type":"setMode","mode":1}`). The device only understands this closed
/// set; it never replies to a command directly, results come back later as
/// [`Event`](crate::Event)s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
	/// Persist voice keyer settings. Answered by `voiceKeyerSaved`.
	SaveVoiceKeyerInfo(VoiceKeyerSettings),
	/// Switch the FreeDV mode. Answered by `currentMode`.
	SetMode { mode: u8 },
	/// Persist Wi-Fi settings. Answered by `wifiSaved`.
	SaveWifiInfo(WifiSettings),
	/// Persist spot reporting settings. Answered by `reportingSaved`.
	SaveReportingInfo(ReportingSettings),
	/// Persist network radio settings. Answered by `radioSaved`.
	SaveRadioInfo(RadioSettings),
	RebootDevice,
	/// Announces a voice keyer audio upload of `size` bytes.
	///
	/// The binary chunks follow immediately; the device answers with
	/// `voiceKeyerUploadComplete` once it has all of them.
	UploadVoiceKeyerFile { size: u64 },
	/// Announces a firmware image upload.
	///
	/// Unlike the voice keyer announcement this carries no size; the device
	/// firmware relies on the exact shape, so it stays as is.
	UploadFirmwareFile,
	/// Start (`true`) or stop (`false`) the voice keyer. Answered by
	/// `voiceKeyerRunning`.
	StartStopVoiceKeyer { running: bool },
	SaveLedBrightnessInfo { duty_cycle: u16 },
}

impl Command {
	pub fn set_mode(mode: FreeDvMode) -> Self {
		Command::SetMode { mode: mode.to_wire() }
	}

	/// Wire value of the `type` tag.
	pub fn type_name(&self) -> &'static str {
		match self {
			Command::SaveVoiceKeyerInfo(_) => "saveVoiceKeyerInfo",
			Command::SetMode { .. } => "setMode",
			Command::SaveWifiInfo(_) => "saveWifiInfo",
			Command::SaveReportingInfo(_) => "saveReportingInfo",
			Command::SaveRadioInfo(_) => "saveRadioInfo",
			Command::RebootDevice => "rebootDevice",
			Command::UploadVoiceKeyerFile { .. } => "uploadVoiceKeyerFile",
			Command::UploadFirmwareFile => "uploadFirmwareFile",
			Command::StartStopVoiceKeyer { .. } => "startStopVoiceKeyer",
			Command::SaveLedBrightnessInfo { .. } => "saveLedBrightnessInfo",
		}
	}
}
