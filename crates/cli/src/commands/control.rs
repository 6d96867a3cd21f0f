//! One-shot device controls: mode, LED, voice keyer, reboot.

use std::time::{Duration, Instant};

use ezdv::FreeDvMode;
use tracing::info;

use super::CommandContext;
use crate::cli::RunAction;
use crate::error::Result;
use crate::output::{ControlData, ResultBuilder};

/// Time allowed for the `voiceKeyerRunning` report before a toggle.
const TOGGLE_SETTLE: Duration = Duration::from_millis(500);

fn control_data() -> ControlData {
	ControlData {
		mode: None,
		voice_keyer_running: None,
		led_duty_cycle: None,
		rebooting: None,
	}
}

/// Switches mode and waits for the device to report it.
pub async fn mode(ctx: &CommandContext, mode: FreeDvMode) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;

	info!(target = "ezdv", mode = mode.label(), "setting mode");
	device.set_mode(mode)?;
	device.wait_for_mode(mode, ctx.timeout()).await?;

	ctx.emit(
		ResultBuilder::new("mode")
			.started_at(started)
			.data(ControlData {
				mode: Some(mode.label().to_string()),
				..control_data()
			})
			.text(format!("Mode: {}", mode.label())),
	);
	device.shutdown();
	Ok(())
}

/// Sets the LED duty cycle. The device does not acknowledge it.
pub async fn led(ctx: &CommandContext, duty_cycle: u16) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;

	info!(target = "ezdv", duty_cycle, "setting LED brightness");
	device.set_led_brightness(duty_cycle)?;
	device.flush().await?;

	ctx.emit(
		ResultBuilder::new("led")
			.started_at(started)
			.data(ControlData {
				led_duty_cycle: Some(duty_cycle),
				..control_data()
			})
			.text(format!("LED duty cycle set to {duty_cycle}")),
	);
	device.shutdown();
	Ok(())
}

/// Asks the device to reboot. The connection drops right after.
pub async fn reboot(ctx: &CommandContext) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;

	info!(target = "ezdv", "rebooting");
	device.reboot()?;
	device.flush().await?;

	ctx.emit(
		ResultBuilder::new("reboot")
			.started_at(started)
			.data(ControlData {
				rebooting: Some(true),
				..control_data()
			})
			.text("Reboot requested"),
	);
	device.shutdown();
	Ok(())
}

/// Starts, stops or toggles the voice keyer and waits for the device to
/// report the new state.
pub async fn voice_keyer_run(ctx: &CommandContext, action: RunAction) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;

	let running = match action {
		RunAction::Start => {
			device.start_stop_voice_keyer(true)?;
			true
		}
		RunAction::Stop => {
			device.start_stop_voice_keyer(false)?;
			false
		}
		RunAction::Toggle => {
			device.settle(TOGGLE_SETTLE).await;
			device.toggle_voice_keyer()?
		}
	};
	info!(target = "ezdv", running, "voice keyer");
	device.wait_for_voice_keyer(running, ctx.timeout()).await?;

	ctx.emit(
		ResultBuilder::new("voice-keyer-run")
			.started_at(started)
			.data(ControlData {
				voice_keyer_running: Some(running),
				..control_data()
			})
			.text(if running { "Voice keyer running" } else { "Voice keyer stopped" }),
	);
	device.shutdown();
	Ok(())
}
