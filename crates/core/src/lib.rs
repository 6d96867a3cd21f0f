//! ezdv: client for the ezDV web control interface
//!
//! ezDV exposes its settings over a single WebSocket. This crate connects to
//! it, keeps a [`PanelState`] in sync with what the device reports, and turns
//! user intents (save Wi-Fi settings, upload new voice keyer audio, switch
//! FreeDV mode, ...) into the right commands and uploads.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use ezdv::{Device, DeviceOptions, FreeDvMode};
//!
//! #[tokio::main]
//! async fn main() -> ezdv::Result<()> {
//!     let mut device = Device::connect("192.168.4.1", DeviceOptions::default());
//!     device.wait_open(Duration::from_secs(10)).await?;
//!
//!     device.set_mode(FreeDvMode::Mode700D)?;
//!     device.wait_for_mode(FreeDvMode::Mode700D, Duration::from_secs(5)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Device`] - session plus panel state, with one method per user action
//! - [`PanelState`] - latest settings, battery, mode and per-form save status
//! - [`Error`] - unified error type

pub mod battery;
pub mod device;
pub mod error;
pub mod panel;

pub use battery::BatteryStatus;
pub use device::{Device, DeviceOptions};
pub use error::{Error, Result};
pub use ezdv_protocol::{
	Command, Event, FreeDvMode, RadioSettings, RadioType, ReportingSettings, VoiceKeyerSettings, WifiMode,
	WifiSecurity, WifiSettings,
};
pub use ezdv_runtime::{Error as RuntimeError, SessionEvent, SessionState, UploadKind, UploadReport};
pub use panel::{Availability, FlexRadio, Form, PanelState, SaveStatus, SaveStatuses, VoiceKeyerPlan};
