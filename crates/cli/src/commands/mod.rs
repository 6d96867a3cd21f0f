mod control;
mod firmware;
mod forms;
mod monitor;
mod status;

use std::time::Duration;

use ezdv::{Device, DeviceOptions};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::config::{Config, ConnectOptions};
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
	pub options: ConnectOptions,
	pub format: OutputFormat,
}

impl CommandContext {
	pub fn from_cli(cli: &Cli, format: OutputFormat) -> Self {
		let config = match cli.config.as_deref() {
			Some(path) => Config::load_from(path),
			None => Config::load(),
		};
		let options = ConnectOptions::resolve(cli.host.as_deref(), cli.timeout, &config);
		debug!(target = "ezdv", host = %options.host, timeout_ms = options.timeout.as_millis() as u64, "resolved options");
		Self { options, format }
	}

	pub fn timeout(&self) -> Duration {
		self.options.timeout
	}

	/// Starts a session without waiting for it to open.
	pub fn device(&self) -> Device {
		info!(target = "ezdv", host = %self.options.host, "connecting");
		Device::connect(
			&self.options.host,
			DeviceOptions {
				reconnect_delay: self.options.reconnect_delay,
			},
		)
	}

	/// Starts a session and waits until it is open.
	pub async fn connect(&self) -> Result<Device> {
		let mut device = self.device();
		device.wait_open(self.timeout()).await?;
		Ok(device)
	}

	/// Prints a finished command result, tagged with the device address.
	pub fn emit<T: Serialize>(&self, builder: ResultBuilder<T>) {
		let result = builder.host(self.options.host.clone()).build();
		print_result(&result, self.format);
	}
}

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let ctx = CommandContext::from_cli(&cli, format);

	match cli.command {
		Commands::Monitor => monitor::execute(&ctx).await,
		Commands::Status { settle } => status::execute(&ctx, Duration::from_millis(settle)).await,
		Commands::Wifi(args) => forms::wifi(&ctx, args).await,
		Commands::Radio(args) => forms::radio(&ctx, args).await,
		Commands::Reporting(args) => forms::reporting(&ctx, args).await,
		Commands::VoiceKeyer(args) => forms::voice_keyer(&ctx, args).await,
		Commands::VoiceKeyerRun { action } => control::voice_keyer_run(&ctx, action).await,
		Commands::Mode { mode } => control::mode(&ctx, mode.into()).await,
		Commands::Led { duty_cycle } => control::led(&ctx, duty_cycle).await,
		Commands::Firmware { file } => firmware::execute(&ctx, &file).await,
		Commands::Reboot => control::reboot(&ctx).await,
	}
}
