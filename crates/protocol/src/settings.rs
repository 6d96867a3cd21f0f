//! Settings records shared by `*Info` events and `save*Info` commands.
//!
//! The device reports its current configuration with the same field set it
//! accepts when saving, so each form has one struct used in both directions.

use serde::{Deserialize, Serialize};

/// Wi-Fi configuration (`wifiInfo` / `saveWifiInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiSettings {
	pub enabled: bool,
	/// Raw [`WifiMode`] value.
	pub mode: u8,
	/// Raw [`WifiSecurity`] value. Only meaningful in access point mode.
	pub security: u8,
	/// Access point channel. Only meaningful in access point mode.
	pub channel: u8,
	pub ssid: String,
	pub password: String,
}

impl WifiSettings {
	pub fn wifi_mode(&self) -> Option<WifiMode> {
		WifiMode::from_wire(self.mode)
	}

	pub fn wifi_security(&self) -> Option<WifiSecurity> {
		WifiSecurity::from_wire(self.security)
	}

	/// Security type and channel can only be chosen when ezDV hosts the network.
	pub fn access_point_options_editable(&self) -> bool {
		self.wifi_mode() == Some(WifiMode::AccessPoint)
	}

	/// An open access point has no password; every other combination needs one.
	pub fn password_required(&self) -> bool {
		!(self.wifi_mode() == Some(WifiMode::AccessPoint) && self.wifi_security() == Some(WifiSecurity::Open))
	}
}

/// Network radio configuration (`radioInfo` / `saveRadioInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioSettings {
	pub enabled: bool,
	/// Raw [`RadioType`] value. Older firmware neither sends nor expects it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub radio_type: Option<u8>,
	pub host: String,
	pub port: u16,
	pub username: String,
	pub password: String,
}

impl RadioSettings {
	pub fn kind(&self) -> Option<RadioType> {
		self.radio_type.and_then(RadioType::from_wire)
	}

	/// Flex radios are addressed by host only; port and credentials are ignored.
	pub fn uses_credentials(&self) -> bool {
		self.kind() != Some(RadioType::Flex)
	}
}

/// Voice keyer configuration (`voiceKeyerInfo` / `saveVoiceKeyerInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceKeyerSettings {
	pub enabled: bool,
	pub seconds_to_wait: u32,
	pub times_to_transmit: u32,
}

/// Spot reporting configuration (`reportingInfo` / `saveReportingInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingSettings {
	pub callsign: String,
	pub grid_square: String,
}

/// Wi-Fi operating mode as stored by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiMode {
	/// ezDV hosts its own network.
	AccessPoint,
	/// ezDV joins an existing network.
	Client,
}

impl WifiMode {
	pub fn from_wire(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::AccessPoint),
			1 => Some(Self::Client),
			_ => None,
		}
	}

	pub fn to_wire(self) -> u8 {
		match self {
			Self::AccessPoint => 0,
			Self::Client => 1,
		}
	}
}

/// Access point security type as stored by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiSecurity {
	Open,
	Wep,
	Wpa,
	Wpa2,
	WpaWpa2,
	Wpa3,
	Wpa2Wpa3,
}

impl WifiSecurity {
	pub fn from_wire(value: u8) -> Option<Self> {
		Some(match value {
			0 => Self::Open,
			1 => Self::Wep,
			2 => Self::Wpa,
			3 => Self::Wpa2,
			4 => Self::WpaWpa2,
			5 => Self::Wpa3,
			6 => Self::Wpa2Wpa3,
			_ => return None,
		})
	}

	pub fn to_wire(self) -> u8 {
		match self {
			Self::Open => 0,
			Self::Wep => 1,
			Self::Wpa => 2,
			Self::Wpa2 => 3,
			Self::WpaWpa2 => 4,
			Self::Wpa3 => 5,
			Self::Wpa2Wpa3 => 6,
		}
	}
}

/// Kind of network-attached radio ezDV controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioType {
	Icom,
	Flex,
}

impl RadioType {
	pub fn from_wire(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Icom),
			1 => Some(Self::Flex),
			_ => None,
		}
	}

	pub fn to_wire(self) -> u8 {
		match self {
			Self::Icom => 0,
			Self::Flex => 1,
		}
	}
}

/// FreeDV operating mode (`setMode.mode`, `currentMode.currentMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeDvMode {
	/// Analog passthrough.
	Analog,
	Mode700D,
	Mode700E,
	Mode1600,
}

impl FreeDvMode {
	pub fn from_wire(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Analog),
			1 => Some(Self::Mode700D),
			2 => Some(Self::Mode700E),
			3 => Some(Self::Mode1600),
			_ => None,
		}
	}

	pub fn to_wire(self) -> u8 {
		match self {
			Self::Analog => 0,
			Self::Mode700D => 1,
			Self::Mode700E => 2,
			Self::Mode1600 => 3,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Analog => "ANA",
			Self::Mode700D => "700D",
			Self::Mode700E => "700E",
			Self::Mode1600 => "1600",
		}
	}
}

impl std::fmt::Display for FreeDvMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}
