//! Device status snapshot.

use std::fmt::Write as _;
use std::time::Duration;

use ezdv::{Form, PanelState, RadioType, SaveStatus, WifiMode};

use super::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, StatusData};

/// Connects, collects the state the device reports for `settle`, and prints it.
pub async fn execute(ctx: &CommandContext, settle: Duration) -> Result<()> {
	let mut device = ctx.connect().await?;
	device.settle(settle).await;

	let panel = device.panel();
	let text = summarize(&ctx.options.host, panel);
	ctx.emit(ResultBuilder::new("status").data(StatusData::from(panel)).text(text));

	device.shutdown();
	Ok(())
}

/// Human-readable status, one line per section.
pub(crate) fn summarize(host: &str, panel: &PanelState) -> String {
	let mut out = format!("ezDV at {host}");

	let mode = match panel.mode() {
		Some(mode) => mode.label().to_string(),
		None => match panel.current_mode {
			Some(raw) => format!("unknown ({raw})"),
			None => "not reported".to_string(),
		},
	};
	let _ = write!(out, "\nMode:         {mode}");

	if let Some(battery) = panel.battery {
		let charging = if battery.is_charging() { ", charging" } else { "" };
		let _ = write!(out, "\nBattery:      {battery}{charging}");
	}

	let _ = write!(
		out,
		"\nVoice keyer:  {}",
		match &panel.voice_keyer {
			Some(vk) if vk.enabled => format!(
				"{}, wait {}s, transmit {}x",
				if panel.voice_keyer_running { "running" } else { "idle" },
				vk.seconds_to_wait,
				vk.times_to_transmit
			),
			Some(_) => "disabled".to_string(),
			None => "not reported".to_string(),
		}
	);

	let _ = write!(
		out,
		"\nWi-Fi:        {}",
		match &panel.wifi {
			Some(wifi) if !wifi.enabled => "disabled".to_string(),
			Some(wifi) => match wifi.wifi_mode() {
				Some(WifiMode::AccessPoint) => {
					format!("access point \"{}\" on channel {}", wifi.ssid, wifi.channel)
				}
				Some(WifiMode::Client) => format!("joined \"{}\"", wifi.ssid),
				None => format!("mode {} \"{}\"", wifi.mode, wifi.ssid),
			},
			None => "not reported".to_string(),
		}
	);

	let _ = write!(
		out,
		"\nRadio:        {}",
		match &panel.radio {
			Some(radio) if !radio.enabled => "disabled".to_string(),
			Some(radio) => match radio.kind() {
				Some(RadioType::Flex) => format!("Flex at {}", radio.host),
				_ => format!("Icom at {}:{}", radio.host, radio.port),
			},
			None => "not reported".to_string(),
		}
	);

	if let Some(reporting) = &panel.reporting {
		let _ = write!(out, "\nReporting:    {} {}", reporting.callsign, reporting.grid_square);
	}

	if let Some(duty_cycle) = panel.led_duty_cycle {
		let _ = write!(out, "\nLED:          {duty_cycle}/8192");
	}

	for radio in &panel.flex_radios {
		let _ = write!(out, "\nFlex radio:   {} ({})", radio.ip, radio.description);
	}

	for form in Form::ALL {
		match panel.status(form) {
			SaveStatus::Failed => {
				let _ = write!(out, "\nLast save of {form} failed");
			}
			SaveStatus::InProgress => {
				let _ = write!(out, "\nSave of {form} still pending");
			}
			_ => {}
		}
	}

	if !panel.connected {
		out.push_str("\n(disconnected)");
	}

	out
}

#[cfg(test)]
mod tests {
	use ezdv::{Event, SessionEvent, WifiSettings};

	use super::*;

	fn apply(panel: &mut PanelState, event: Event) {
		panel.apply(&SessionEvent::Event(event));
	}

	#[test]
	fn summary_of_fresh_panel() {
		let text = summarize("192.168.4.1", &PanelState::new());
		assert!(text.starts_with("ezDV at 192.168.4.1"));
		assert!(text.contains("Mode:         not reported"));
		assert!(text.contains("Wi-Fi:        not reported"));
		assert!(text.ends_with("(disconnected)"));
	}

	#[test]
	fn summary_with_reported_state() {
		let mut panel = PanelState::new();
		panel.apply(&SessionEvent::Opened);
		apply(&mut panel, Event::CurrentMode { current_mode: 2 });
		apply(
			&mut panel,
			Event::BatteryStatus {
				state_of_charge: 40.0,
				state_of_charge_change: 20.0,
			},
		);
		apply(
			&mut panel,
			Event::WifiInfo(WifiSettings {
				enabled: true,
				mode: 0,
				security: 4,
				channel: 6,
				ssid: "ezDV 1234".into(),
				password: "secret".into(),
			}),
		);
		apply(&mut panel, Event::WifiSaved { success: false });

		let text = summarize("ezdv.local", &panel);
		assert!(text.contains("Mode:         700E"));
		assert!(text.contains("Battery:      40% (3h to full), charging"));
		assert!(text.contains("access point \"ezDV 1234\" on channel 6"));
		assert!(text.contains("Last save of Wi-Fi settings failed"));
		assert!(!text.contains("disconnected"));
	}

	#[test]
	fn unknown_mode_shows_raw_value() {
		let mut panel = PanelState::new();
		apply(&mut panel, Event::CurrentMode { current_mode: 9 });
		assert!(summarize("h", &panel).contains("unknown (9)"));
	}
}
