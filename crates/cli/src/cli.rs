use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ezdv::{FreeDvMode, RadioType, WifiMode, WifiSecurity};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "ezdv")]
#[command(about = "Control an ezDV FreeDV adapter over its web interface")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Device address, optionally with a port [default: from config, else 192.168.4.1]
	#[arg(long, global = true, env = "EZDV_HOST", value_name = "HOST")]
	pub host: Option<String>,

	/// How long to wait for the device in milliseconds [default: from config, else 10000]
	#[arg(long, global = true, value_name = "MS")]
	pub timeout: Option<u64>,

	/// Config file to read instead of the default location
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print every event from the device until interrupted
	Monitor,

	/// Show device settings, battery and mode
	Status {
		/// How long to collect the initial burst of device state (milliseconds)
		#[arg(long, default_value = "1500", value_name = "MS")]
		settle: u64,
	},

	/// Change Wi-Fi settings
	Wifi(WifiArgs),

	/// Change network radio settings
	Radio(RadioArgs),

	/// Change spot reporting settings
	Reporting(ReportingArgs),

	/// Change voice keyer settings, optionally uploading new audio
	VoiceKeyer(VoiceKeyerArgs),

	/// Start or stop the voice keyer
	#[command(name = "voice-keyer-run", alias = "vk")]
	VoiceKeyerRun {
		#[arg(value_enum)]
		action: RunAction,
	},

	/// Switch FreeDV mode
	Mode {
		#[arg(value_enum)]
		mode: ModeArg,
	},

	/// Set LED brightness (PWM duty cycle)
	Led {
		#[arg(value_parser = clap::value_parser!(u16).range(0..=8192))]
		duty_cycle: u16,
	},

	/// Upload a firmware image
	Firmware {
		/// Firmware tarball
		file: PathBuf,
	},

	/// Reboot the device
	Reboot,
}

impl Commands {
	/// Name used in the result envelope.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Monitor => "monitor",
			Commands::Status { .. } => "status",
			Commands::Wifi(_) => "wifi",
			Commands::Radio(_) => "radio",
			Commands::Reporting(_) => "reporting",
			Commands::VoiceKeyer(_) => "voice-keyer",
			Commands::VoiceKeyerRun { .. } => "voice-keyer-run",
			Commands::Mode { .. } => "mode",
			Commands::Led { .. } => "led",
			Commands::Firmware { .. } => "firmware",
			Commands::Reboot => "reboot",
		}
	}
}

/// `--enable` / `--disable` pair; neither leaves the current value.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct Toggle {
	#[arg(long, conflicts_with = "disable")]
	pub enable: bool,

	#[arg(long)]
	pub disable: bool,
}

impl Toggle {
	pub fn resolve(self, current: bool) -> bool {
		match (self.enable, self.disable) {
			(true, _) => true,
			(_, true) => false,
			_ => current,
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct WifiArgs {
	#[command(flatten)]
	pub toggle: Toggle,

	#[arg(long, value_enum)]
	pub mode: Option<WifiModeArg>,

	/// Access point security
	#[arg(long, value_enum)]
	pub security: Option<WifiSecurityArg>,

	/// Access point channel
	#[arg(long, value_parser = clap::value_parser!(u8).range(1..=13))]
	pub channel: Option<u8>,

	#[arg(long)]
	pub ssid: Option<String>,

	#[arg(long)]
	pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RadioArgs {
	#[command(flatten)]
	pub toggle: Toggle,

	#[arg(long = "type", value_enum)]
	pub radio_type: Option<RadioTypeArg>,

	/// Radio address (for Flex radios, one of the discovered IPs)
	#[arg(long = "radio-host", value_name = "HOST")]
	pub radio_host: Option<String>,

	#[arg(long)]
	pub port: Option<u16>,

	#[arg(long)]
	pub username: Option<String>,

	#[arg(long)]
	pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportingArgs {
	#[arg(long)]
	pub callsign: Option<String>,

	#[arg(long)]
	pub grid_square: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VoiceKeyerArgs {
	#[command(flatten)]
	pub toggle: Toggle,

	/// Seconds to wait between transmissions
	#[arg(long)]
	pub seconds_to_wait: Option<u32>,

	/// Number of times to transmit
	#[arg(long)]
	pub times_to_transmit: Option<u32>,

	/// WAV file to upload as the new voice keyer message
	#[arg(long, value_name = "WAV")]
	pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunAction {
	Start,
	Stop,
	Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
	#[value(alias = "ana")]
	Analog,
	#[value(name = "700d")]
	Mode700D,
	#[value(name = "700e")]
	Mode700E,
	#[value(name = "1600")]
	Mode1600,
}

impl From<ModeArg> for FreeDvMode {
	fn from(mode: ModeArg) -> Self {
		match mode {
			ModeArg::Analog => FreeDvMode::Analog,
			ModeArg::Mode700D => FreeDvMode::Mode700D,
			ModeArg::Mode700E => FreeDvMode::Mode700E,
			ModeArg::Mode1600 => FreeDvMode::Mode1600,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WifiModeArg {
	/// ezDV hosts its own network
	Ap,
	/// ezDV joins an existing network
	Client,
}

impl From<WifiModeArg> for WifiMode {
	fn from(mode: WifiModeArg) -> Self {
		match mode {
			WifiModeArg::Ap => WifiMode::AccessPoint,
			WifiModeArg::Client => WifiMode::Client,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WifiSecurityArg {
	Open,
	Wep,
	Wpa,
	Wpa2,
	WpaWpa2,
	Wpa3,
	Wpa2Wpa3,
}

impl From<WifiSecurityArg> for WifiSecurity {
	fn from(security: WifiSecurityArg) -> Self {
		match security {
			WifiSecurityArg::Open => WifiSecurity::Open,
			WifiSecurityArg::Wep => WifiSecurity::Wep,
			WifiSecurityArg::Wpa => WifiSecurity::Wpa,
			WifiSecurityArg::Wpa2 => WifiSecurity::Wpa2,
			WifiSecurityArg::WpaWpa2 => WifiSecurity::WpaWpa2,
			WifiSecurityArg::Wpa3 => WifiSecurity::Wpa3,
			WifiSecurityArg::Wpa2Wpa3 => WifiSecurity::Wpa2Wpa3,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RadioTypeArg {
	Icom,
	Flex,
}

impl From<RadioTypeArg> for RadioType {
	fn from(kind: RadioTypeArg) -> Self {
		match kind {
			RadioTypeArg::Icom => RadioType::Icom,
			RadioTypeArg::Flex => RadioType::Flex,
		}
	}
}
