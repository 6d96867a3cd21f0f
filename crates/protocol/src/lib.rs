//! Wire types for the ezDV web control channel.
//!
//! The device serves a single WebSocket endpoint at `ws://<host>/ws`. Every
//! frame on it is one of:
//!
//! - a UTF-8 text frame holding a JSON object with a mandatory `type` tag,
//!   either a [`Command`] (client to device) or an [`Event`] (device to client)
//! - a binary frame holding one chunk of an upload, sent right after an
//!   `uploadVoiceKeyerFile` / `uploadFirmwareFile` announcement
//!
//! Binary chunks carry no sequence number or upload id. Which upload a chunk
//! belongs to is purely positional, so only one upload may be in flight on a
//! connection at a time.
//!
//! # Main Types
//!
//! - [`Command`] - closed set of client-to-device messages
//! - [`Event`] - closed set of device-to-client messages
//! - [`Frame`] - one text or binary WebSocket frame
//! - [`decode`] - parses a text frame into an [`Event`], ignoring unknown tags

mod command;
mod error;
mod event;
mod frame;
mod settings;

pub use command::Command;
pub use error::DecodeError;
pub use event::{Event, decode};
pub use frame::{Frame, encode};
pub use settings::{
	FreeDvMode, RadioSettings, RadioType, ReportingSettings, VoiceKeyerSettings, WifiMode, WifiSecurity,
	WifiSettings,
};

/// Size of one binary upload chunk.
///
/// The device's receive path is sized around this; larger frames are not
/// accepted reliably.
pub const CHUNK_SIZE: usize = 4096;

/// Path of the control WebSocket on the device's HTTP server.
pub const WEBSOCKET_PATH: &str = "/ws";

/// Builds the control WebSocket URL for a device host (`ws://<host>/ws`).
///
/// `host` may carry a port (`"10.0.0.5:8080"`).
pub fn websocket_url(host: &str) -> String {
	format!("ws://{}{}", host.trim_end_matches('/'), WEBSOCKET_PATH)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn websocket_url_uses_ws_path() {
		assert_eq!(websocket_url("192.168.4.1"), "ws://192.168.4.1/ws");
		assert_eq!(websocket_url("ezdv.local:8080/"), "ws://ezdv.local:8080/ws");
	}
}
