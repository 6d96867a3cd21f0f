//! Client-side model of the ezDV control panel.
//!
//! [`PanelState`] folds session events into the latest known device state
//! and tracks the outcome of each form's last save. It is pure: applying an
//! event never performs I/O, it only returns the commands that should be
//! sent in response.

use std::fmt;

use ezdv_protocol::{
	Command, Event, FreeDvMode, RadioSettings, ReportingSettings, VoiceKeyerSettings, WifiSettings,
};
use ezdv_runtime::SessionEvent;
use serde::Serialize;
use tracing::debug;

use crate::battery::BatteryStatus;


/// Outcome of the most recent save of one form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveStatus {
	#[default]
	Idle,
	InProgress,
	Succeeded,
	Failed,
}

impl SaveStatus {
	pub fn success_visible(self) -> bool {
		self == SaveStatus::Succeeded
	}

	pub fn failure_visible(self) -> bool {
		self == SaveStatus::Failed
	}

	pub fn is_pending(self) -> bool {
		self == SaveStatus::InProgress
	}
}

/// A settings form that can be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Form {
	Wifi,
	Radio,
	VoiceKeyer,
	Reporting,
	Firmware,
}

impl Form {
	pub const ALL: [Form; 5] = [Form::Wifi, Form::Radio, Form::VoiceKeyer, Form::Reporting, Form::Firmware];

	pub fn label(self) -> &'static str {
		match self {
			Form::Wifi => "Wi-Fi settings",
			Form::Radio => "radio settings",
			Form::VoiceKeyer => "voice keyer settings",
			Form::Reporting => "reporting settings",
			Form::Firmware => "firmware update",
		}
	}
}

impl fmt::Display for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatuses {
	pub wifi: SaveStatus,
	pub radio: SaveStatus,
	pub voice_keyer: SaveStatus,
	pub reporting: SaveStatus,
	pub firmware: SaveStatus,
}

impl SaveStatuses {
	pub fn get(&self, form: Form) -> SaveStatus {
		match form {
			Form::Wifi => self.wifi,
			Form::Radio => self.radio,
			Form::VoiceKeyer => self.voice_keyer,
			Form::Reporting => self.reporting,
			Form::Firmware => self.firmware,
		}
	}

	fn get_mut(&mut self, form: Form) -> &mut SaveStatus {
		match form {
			Form::Wifi => &mut self.wifi,
			Form::Radio => &mut self.radio,
			Form::VoiceKeyer => &mut self.voice_keyer,
			Form::Reporting => &mut self.reporting,
			Form::Firmware => &mut self.firmware,
		}
	}
}

/// A Flex radio seen on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlexRadio {
	pub ip: String,
	pub description: String,
}

/// Which controls make sense given the current settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
	/// Radio settings are pointless without Wi-Fi.
	pub radio_form: bool,
	/// Security type and channel only apply in access point mode.
	pub wifi_security_and_channel: bool,
	pub wifi_password: bool,
	/// Port and credentials are not used for Flex radios.
	pub radio_credentials: bool,
	pub voice_keyer_start: bool,
}

/// What to do when the voice keyer form is saved.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceKeyerPlan {
	/// No new audio: save the settings right away.
	SaveNow(Command),
	/// Upload the audio first. The settings are held back and saved once
	/// the device confirms the upload.
	UploadFirst,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
	pub connected: bool,
	pub wifi: Option<WifiSettings>,
	pub radio: Option<RadioSettings>,
	pub voice_keyer: Option<VoiceKeyerSettings>,
	pub reporting: Option<ReportingSettings>,
	pub led_duty_cycle: Option<u16>,
	pub battery: Option<BatteryStatus>,
	/// Raw mode value from the last `currentMode` event.
	pub current_mode: Option<u8>,
	pub voice_keyer_running: bool,
	/// In discovery order; each ip appears once.
	pub flex_radios: Vec<FlexRadio>,
	pub save_status: SaveStatuses,
	#[serde(skip)]
	pending_voice_keyer: Option<VoiceKeyerSettings>,
	/// Number of `voiceKeyerRunning` events applied so far.
	#[serde(skip)]
	voice_keyer_reports: u64,
}

impl PanelState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn status(&self, form: Form) -> SaveStatus {
		self.save_status.get(form)
	}

	pub fn mode(&self) -> Option<FreeDvMode> {
		self.current_mode.and_then(FreeDvMode::from_wire)
	}

	/// Folds one session event into the state.
	///
	/// Returns the commands the client should send in response. The only
	/// such follow-up is the held-back voice keyer save after a successful
	/// audio upload.
	pub fn apply(&mut self, event: &SessionEvent) -> Vec<Command> {
		match event {
			SessionEvent::Opened => {
				self.connected = true;
				Vec::new()
			}
			SessionEvent::Closed { .. } => {
				self.connected = false;
				Vec::new()
			}
			SessionEvent::Event(event) => self.apply_event(event),
		}
	}

	fn apply_event(&mut self, event: &Event) -> Vec<Command> {
		match event {
			Event::WifiInfo(settings) => self.wifi = Some(settings.clone()),
			Event::RadioInfo(settings) => self.radio = Some(settings.clone()),
			Event::VoiceKeyerInfo(settings) => self.voice_keyer = Some(*settings),
			Event::ReportingInfo(settings) => self.reporting = Some(settings.clone()),
			Event::LedBrightnessInfo { duty_cycle } => self.led_duty_cycle = Some(*duty_cycle),

			Event::WifiSaved { success } => self.finish(Form::Wifi, *success),
			Event::RadioSaved { success } => self.finish(Form::Radio, *success),
			Event::VoiceKeyerSaved { success } => self.finish(Form::VoiceKeyer, *success),
			Event::ReportingSaved { success } => self.finish(Form::Reporting, *success),
			Event::FirmwareUploadComplete { success } => self.finish(Form::Firmware, *success),

			Event::VoiceKeyerUploadComplete { success } => {
				let pending = self.pending_voice_keyer.take();
				if !*success {
					self.finish(Form::VoiceKeyer, false);
				} else if let Some(settings) = pending {
					return vec![Command::SaveVoiceKeyerInfo(settings)];
				} else {
					debug!("Voice keyer upload completed with no settings waiting");
				}
			}

			Event::FlexRadioDiscovered { ip, description } => {
				if !self.flex_radios.iter().any(|radio| radio.ip == *ip) {
					self.flex_radios.push(FlexRadio {
						ip: ip.clone(),
						description: description.clone(),
					});
				}
			}

			Event::BatteryStatus {
				state_of_charge,
				state_of_charge_change,
			} => self.battery = Some(BatteryStatus::new(*state_of_charge, *state_of_charge_change)),
			Event::CurrentMode { current_mode } => self.current_mode = Some(*current_mode),
			Event::VoiceKeyerRunning { running } => {
				self.voice_keyer_running = *running;
				self.voice_keyer_reports += 1;
			}
		}
		Vec::new()
	}

	fn finish(&mut self, form: Form, success: bool) {
		*self.save_status.get_mut(form) = if success { SaveStatus::Succeeded } else { SaveStatus::Failed };
	}

	/// Marks a save as sent, hiding the previous result.
	pub fn begin_save(&mut self, form: Form) {
		*self.save_status.get_mut(form) = SaveStatus::InProgress;
	}

	/// Returns a form to its idle state after a save that never reached the
	/// device.
	pub fn reset(&mut self, form: Form) {
		*self.save_status.get_mut(form) = SaveStatus::Idle;
		if form == Form::VoiceKeyer {
			self.pending_voice_keyer = None;
		}
	}

	/// Decides how to save the voice keyer form.
	pub fn plan_voice_keyer_save(&mut self, settings: VoiceKeyerSettings, file_present: bool) -> VoiceKeyerPlan {
		if file_present {
			self.pending_voice_keyer = Some(settings);
			VoiceKeyerPlan::UploadFirst
		} else {
			self.pending_voice_keyer = None;
			VoiceKeyerPlan::SaveNow(Command::SaveVoiceKeyerInfo(settings))
		}
	}

	/// Settings waiting for a voice keyer upload to complete.
	pub fn pending_voice_keyer(&self) -> Option<&VoiceKeyerSettings> {
		self.pending_voice_keyer.as_ref()
	}

	/// How many times the device has reported the voice keyer state. The
	/// running flag defaults to false before the first report.
	pub fn voice_keyer_reports(&self) -> u64 {
		self.voice_keyer_reports
	}

	/// Command that flips the voice keyer between running and stopped.
	pub fn toggle_voice_keyer(&self) -> Command {
		Command::StartStopVoiceKeyer {
			running: !self.voice_keyer_running,
		}
	}

	pub fn availability(&self) -> Availability {
		let wifi = self.wifi.as_ref();
		Availability {
			radio_form: wifi.is_some_and(|w| w.enabled),
			wifi_security_and_channel: wifi.is_some_and(WifiSettings::access_point_options_editable),
			wifi_password: wifi.is_none_or(WifiSettings::password_required),
			radio_credentials: self.radio.as_ref().is_none_or(RadioSettings::uses_credentials),
			voice_keyer_start: self.voice_keyer.is_some_and(|vk| vk.enabled),
		}
	}
}
