//! High-level handle to one ezDV device.

use std::path::Path;
use std::time::Duration;

use ezdv_protocol::{
	Command, FreeDvMode, RadioSettings, ReportingSettings, VoiceKeyerSettings, WifiSettings,
};
use ezdv_runtime::{
	Connector, Session, SessionConfig, SessionEvent, SessionEvents, SessionHandle, TcpConnector, UploadKind,
	UploadReport, read_payload, upload,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::panel::{Form, PanelState, SaveStatus, VoiceKeyerPlan};


#[derive(Debug, Clone)]
pub struct DeviceOptions {
	pub reconnect_delay: Duration,
}

impl Default for DeviceOptions {
	fn default() -> Self {
		Self {
			reconnect_delay: ezdv_runtime::DEFAULT_RECONNECT_DELAY,
		}
	}
}

/// A connection to an ezDV device plus the panel state built from it.
///
/// Events are only processed while [`next_event`](Device::next_event) (or
/// one of the `wait_*` helpers) is being awaited; the panel state does not
/// change on its own.
pub struct Device {
	session: SessionHandle,
	events: SessionEvents,
	panel: PanelState,
}

impl Device {
	/// Starts a session to `host` over TCP.
	///
	/// Returns immediately; the connection is made in the background.
	pub fn connect(host: &str, options: DeviceOptions) -> Self {
		let config = SessionConfig::for_host(host).with_reconnect_delay(options.reconnect_delay);
		Self::with_connector(config, TcpConnector)
	}

	pub fn with_connector<C: Connector>(config: SessionConfig, connector: C) -> Self {
		info!(url = %config.url, "Starting ezDV session");
		let (session, events) = Session::spawn(config, connector);
		Self {
			session,
			events,
			panel: PanelState::new(),
		}
	}

	pub fn panel(&self) -> &PanelState {
		&self.panel
	}

	pub fn session(&self) -> &SessionHandle {
		&self.session
	}

	/// Receives the next session event and applies it to the panel.
	///
	/// Follow-up commands produced by the panel are sent before returning.
	/// Returns `None` once the session has stopped.
	pub async fn next_event(&mut self) -> Option<SessionEvent> {
		let event = self.events.recv().await?;
		for command in self.panel.apply(&event) {
			debug!(command = command.type_name(), "Sending follow-up command");
			if let Err(e) = self.session.send_command(&command) {
				warn!(command = command.type_name(), error = %e, "Follow-up command not sent");
				if matches!(command, Command::SaveVoiceKeyerInfo(_)) {
					self.panel.reset(Form::VoiceKeyer);
				}
			}
		}
		Some(event)
	}

	/// Processes events until `done` holds for the panel state.
	pub async fn wait_for<F>(&mut self, timeout: Duration, waiting_for: &str, mut done: F) -> Result<()>
	where
		F: FnMut(&PanelState) -> bool,
	{
		let deadline = Instant::now() + timeout;
		while !done(&self.panel) {
			match tokio::time::timeout_at(deadline, self.next_event()).await {
				Ok(Some(_)) => {}
				Ok(None) => return Err(ezdv_runtime::Error::SessionClosed.into()),
				Err(_) => {
					return Err(Error::Timeout {
						after: timeout,
						waiting_for: waiting_for.to_string(),
					});
				}
			}
		}
		Ok(())
	}

	/// Waits for the connection to open.
	pub async fn wait_open(&mut self, timeout: Duration) -> Result<()> {
		self.wait_for(timeout, "connection", |panel| panel.connected).await
	}

	/// Processes events for `window`, e.g. to collect the `*Info` burst the
	/// device sends after connecting.
	pub async fn settle(&mut self, window: Duration) {
		let deadline = Instant::now() + window;
		while let Ok(Some(_)) = tokio::time::timeout_at(deadline, self.next_event()).await {}
	}

	/// Waits until the device reports the outcome of the last save of `form`.
	pub async fn wait_for_result(&mut self, form: Form, timeout: Duration) -> Result<()> {
		self.wait_for(timeout, form.label(), |panel| !panel.status(form).is_pending())
			.await?;
		match self.panel.status(form) {
			SaveStatus::Failed => Err(Error::DeviceRejected(form)),
			_ => Ok(()),
		}
	}

	/// Waits until the device reports it is in `mode`.
	pub async fn wait_for_mode(&mut self, mode: FreeDvMode, timeout: Duration) -> Result<()> {
		self.wait_for(timeout, "mode change", |panel| panel.mode() == Some(mode))
			.await
	}

	/// Waits for a `voiceKeyerRunning` report with the given state.
	///
	/// Only reports processed after this call count; the state already in
	/// the panel is not taken as an answer.
	pub async fn wait_for_voice_keyer(&mut self, running: bool, timeout: Duration) -> Result<()> {
		let seen = self.panel.voice_keyer_reports();
		self.wait_for(timeout, "voice keyer state", |panel| {
			panel.voice_keyer_reports() > seen && panel.voice_keyer_running == running
		})
		.await
	}

	fn save(&mut self, form: Form, command: Command) -> Result<()> {
		self.panel.begin_save(form);
		if let Err(e) = self.session.send_command(&command) {
			self.panel.reset(form);
			return Err(e.into());
		}
		Ok(())
	}

	pub fn save_wifi(&mut self, settings: WifiSettings) -> Result<()> {
		self.save(Form::Wifi, Command::SaveWifiInfo(settings))
	}

	pub fn save_radio(&mut self, settings: RadioSettings) -> Result<()> {
		self.save(Form::Radio, Command::SaveRadioInfo(settings))
	}

	pub fn save_reporting(&mut self, settings: ReportingSettings) -> Result<()> {
		self.save(Form::Reporting, Command::SaveReportingInfo(settings))
	}

	pub fn set_mode(&mut self, mode: FreeDvMode) -> Result<()> {
		Ok(self.session.send_command(&Command::set_mode(mode))?)
	}

	pub fn set_led_brightness(&mut self, duty_cycle: u16) -> Result<()> {
		Ok(self.session.send_command(&Command::SaveLedBrightnessInfo { duty_cycle })?)
	}

	pub fn reboot(&mut self) -> Result<()> {
		info!("Requesting device reboot");
		Ok(self.session.send_command(&Command::RebootDevice)?)
	}

	/// Starts or stops the voice keyer.
	pub fn start_stop_voice_keyer(&mut self, running: bool) -> Result<()> {
		Ok(self.session.send_command(&Command::StartStopVoiceKeyer { running })?)
	}

	/// Flips the voice keyer relative to the last reported state.
	///
	/// Returns the requested state.
	pub fn toggle_voice_keyer(&mut self) -> Result<bool> {
		let command = self.panel.toggle_voice_keyer();
		self.session.send_command(&command)?;
		Ok(matches!(command, Command::StartStopVoiceKeyer { running: true }))
	}

	/// Saves voice keyer settings, uploading new audio first if `file` is given.
	///
	/// With a file, the settings themselves are sent once the device reports
	/// `voiceKeyerUploadComplete`, which happens while events are processed.
	/// A file that cannot be read leaves the form idle and sends nothing.
	pub async fn save_voice_keyer(
		&mut self,
		settings: VoiceKeyerSettings,
		file: Option<&Path>,
	) -> Result<Option<UploadReport>> {
		let plan = self.panel.plan_voice_keyer_save(settings, file.is_some());
		match (plan, file) {
			(VoiceKeyerPlan::SaveNow(command), _) => self.save(Form::VoiceKeyer, command).map(|()| None),
			(VoiceKeyerPlan::UploadFirst, Some(path)) => {
				self.panel.begin_save(Form::VoiceKeyer);
				self.upload_file(Form::VoiceKeyer, UploadKind::VoiceKeyer, path).await.map(Some)
			}
			(VoiceKeyerPlan::UploadFirst, None) => Err(Error::NoFileSelected),
		}
	}

	/// Uploads a firmware image. The device reboots into it after reporting
	/// `firmwareUploadComplete`.
	pub async fn update_firmware(&mut self, file: Option<&Path>) -> Result<UploadReport> {
		let Some(path) = file else {
			self.panel.reset(Form::Firmware);
			return Err(Error::NoFileSelected);
		};
		self.panel.begin_save(Form::Firmware);
		self.upload_file(Form::Firmware, UploadKind::Firmware, path).await
	}

	async fn upload_file(&mut self, form: Form, kind: UploadKind, path: &Path) -> Result<UploadReport> {
		let payload = match read_payload(path).await {
			Ok(payload) => payload,
			Err(e) => {
				warn!(path = %path.display(), error = %e, "Could not read upload file");
				self.panel.reset(form);
				return Err(e.into());
			}
		};

		match upload(&self.session, kind, &payload) {
			Ok(report) => Ok(report),
			Err(e) => {
				self.panel.reset(form);
				Err(e.into())
			}
		}
	}

	/// Waits until every command sent so far has reached the socket.
	pub async fn flush(&self) -> Result<()> {
		Ok(self.session.flush().await?)
	}

	/// Stops the session. Also happens on drop.
	pub fn shutdown(&self) {
		self.session.shutdown();
	}
}

impl Drop for Device {
	fn drop(&mut self) {
		self.session.shutdown();
	}
}
