//! Settings form commands.
//!
//! Each command waits for the device to report the form's current values,
//! overlays the flags that were given, saves, and waits for the device's
//! `*Saved` verdict. Flags that are not given keep the device's value.

use std::time::Instant;

use ezdv::{
	Device, Form, PanelState, RadioSettings, RadioType, ReportingSettings, VoiceKeyerSettings, WifiMode,
	WifiSecurity, WifiSettings,
};
use serde::Serialize;
use tracing::{info, warn};

use super::CommandContext;
use crate::cli::{RadioArgs, ReportingArgs, VoiceKeyerArgs, WifiArgs};
use crate::error::{CliError, Result};
use crate::output::{ResultBuilder, SavedData, UploadData};

pub async fn wifi(ctx: &CommandContext, args: WifiArgs) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;
	let current = current(&mut device, ctx, "wifiInfo", |panel| panel.wifi.clone()).await?;

	let settings = merge_wifi(current, &args);
	if settings.wifi_mode() == Some(WifiMode::Client) && (args.security.is_some() || args.channel.is_some()) {
		warn!(target = "ezdv", "security and channel only apply in access point mode");
	}
	info!(target = "ezdv", enabled = settings.enabled, mode = settings.mode, "saving Wi-Fi settings");

	device.save_wifi(settings.clone())?;
	finish(ctx, &mut device, started, "wifi", Form::Wifi, settings, None).await
}

pub async fn radio(ctx: &CommandContext, args: RadioArgs) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;
	let current = current(&mut device, ctx, "radioInfo", |panel| panel.radio.clone()).await?;

	if wifi_known_disabled(device.panel()) {
		warn!(target = "ezdv", "radio settings have no effect while Wi-Fi is disabled");
	}

	let settings = merge_radio(current, &args);
	if !settings.uses_credentials() && (args.port.is_some() || args.username.is_some() || args.password.is_some()) {
		warn!(target = "ezdv", "port and credentials are ignored for Flex radios");
	}
	if settings.kind() == Some(RadioType::Flex) {
		let radios = &device.panel().flex_radios;
		if !radios.is_empty() && !radios.iter().any(|r| r.ip == settings.host) {
			warn!(target = "ezdv", host = %settings.host, "not among the Flex radios ezDV has discovered");
		}
	}
	info!(target = "ezdv", enabled = settings.enabled, host = %settings.host, "saving radio settings");

	device.save_radio(settings.clone())?;
	finish(ctx, &mut device, started, "radio", Form::Radio, settings, None).await
}

pub async fn reporting(ctx: &CommandContext, args: ReportingArgs) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;
	let current = current(&mut device, ctx, "reportingInfo", |panel| panel.reporting.clone()).await?;

	let settings = ReportingSettings {
		callsign: args.callsign.unwrap_or(current.callsign),
		grid_square: args.grid_square.unwrap_or(current.grid_square),
	};
	info!(target = "ezdv", callsign = %settings.callsign, "saving reporting settings");

	device.save_reporting(settings.clone())?;
	finish(ctx, &mut device, started, "reporting", Form::Reporting, settings, None).await
}

/// Saves voice keyer settings. With `--file`, the audio is uploaded first
/// and the settings follow once the device has accepted it.
pub async fn voice_keyer(ctx: &CommandContext, args: VoiceKeyerArgs) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;
	let current = current(&mut device, ctx, "voiceKeyerInfo", |panel| panel.voice_keyer).await?;

	let settings = merge_voice_keyer(current, &args);
	info!(
		target = "ezdv",
		enabled = settings.enabled,
		file = ?args.file,
		"saving voice keyer settings"
	);

	let report = device.save_voice_keyer(settings, args.file.as_deref()).await?;
	let upload = report.zip(args.file).map(|(report, file)| UploadData {
		file,
		bytes: report.bytes,
		chunks: report.chunks,
	});
	finish(ctx, &mut device, started, "voice-keyer", Form::VoiceKeyer, settings, upload).await
}

/// Waits for the device's `*Info` report and returns its value.
async fn current<T, F>(device: &mut Device, ctx: &CommandContext, waiting_for: &str, mut read: F) -> Result<T>
where
	F: FnMut(&PanelState) -> Option<T>,
{
	device
		.wait_for(ctx.timeout(), waiting_for, |panel| read(panel).is_some())
		.await?;
	read(device.panel()).ok_or_else(|| CliError::InvalidInput(format!("device did not report {waiting_for}")))
}

async fn finish<S: Serialize>(
	ctx: &CommandContext,
	device: &mut Device,
	started: Instant,
	command: &str,
	form: Form,
	settings: S,
	upload: Option<UploadData>,
) -> Result<()> {
	device.wait_for_result(form, ctx.timeout()).await?;
	info!(target = "ezdv", %form, "saved");

	let mut text = format!("Saved {form}");
	if let Some(upload) = &upload {
		text.push_str(&format!(
			" after uploading {} ({} bytes)",
			upload.file.display(),
			upload.bytes
		));
	}
	ctx.emit(
		ResultBuilder::new(command)
			.started_at(started)
			.data(SavedData { form, settings, upload })
			.text(text),
	);

	device.shutdown();
	Ok(())
}

/// True only once ezDV has reported its Wi-Fi as switched off.
fn wifi_known_disabled(panel: &PanelState) -> bool {
	panel.wifi.as_ref().is_some_and(|wifi| !wifi.enabled)
}

pub(crate) fn merge_wifi(current: WifiSettings, args: &WifiArgs) -> WifiSettings {
	WifiSettings {
		enabled: args.toggle.resolve(current.enabled),
		mode: args.mode.map(|m| WifiMode::from(m).to_wire()).unwrap_or(current.mode),
		security: args
			.security
			.map(|s| WifiSecurity::from(s).to_wire())
			.unwrap_or(current.security),
		channel: args.channel.unwrap_or(current.channel),
		ssid: args.ssid.clone().unwrap_or(current.ssid),
		password: args.password.clone().unwrap_or(current.password),
	}
}

pub(crate) fn merge_radio(current: RadioSettings, args: &RadioArgs) -> RadioSettings {
	RadioSettings {
		enabled: args.toggle.resolve(current.enabled),
		radio_type: args
			.radio_type
			.map(|t| RadioType::from(t).to_wire())
			.or(current.radio_type),
		host: args.radio_host.clone().unwrap_or(current.host),
		port: args.port.unwrap_or(current.port),
		username: args.username.clone().unwrap_or(current.username),
		password: args.password.clone().unwrap_or(current.password),
	}
}

pub(crate) fn merge_voice_keyer(current: VoiceKeyerSettings, args: &VoiceKeyerArgs) -> VoiceKeyerSettings {
	VoiceKeyerSettings {
		enabled: args.toggle.resolve(current.enabled),
		seconds_to_wait: args.seconds_to_wait.unwrap_or(current.seconds_to_wait),
		times_to_transmit: args.times_to_transmit.unwrap_or(current.times_to_transmit),
	}
}
