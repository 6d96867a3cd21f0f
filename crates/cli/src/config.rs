//! Persistent CLI defaults.
//!
//! Read from `ezdv/config.json` under the platform config directory
//! (`~/.config` on Linux). A missing or unreadable file means defaults;
//! command-line flags and `EZDV_HOST` override whatever it holds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

/// Address ezDV uses for itself in access point mode.
pub const DEFAULT_HOST: &str = "192.168.4.1";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	pub host: String,
	pub reconnect_delay_ms: u64,
	pub timeout_ms: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			reconnect_delay_ms: 1000,
			timeout_ms: 10_000,
		}
	}
}

impl Config {
	/// Loads the config from its default location.
	pub fn load() -> Self {
		Self::load_from(&config_path())
	}

	pub fn load_from(path: &Path) -> Self {
		load_json(path).unwrap_or_default()
	}
}

/// Default config file location.
///
/// Falls back to the working directory when the platform has no config
/// directory.
pub fn config_path() -> PathBuf {
	dirs::config_dir()
		.map(|dir| dir.join("ezdv").join("config.json"))
		.unwrap_or_else(|| PathBuf::from("ezdv-config.json"))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
	let content = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(e) => {
			debug!(path = %path.display(), error = %e, "No config file");
			return None;
		}
	};
	match serde_json::from_str(&content) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
			None
		}
	}
}

/// Connection parameters after applying flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
	pub host: String,
	pub timeout: Duration,
	pub reconnect_delay: Duration,
}

impl ConnectOptions {
	pub fn resolve(host: Option<&str>, timeout_ms: Option<u64>, config: &Config) -> Self {
		Self {
			host: host.unwrap_or(&config.host).to_string(),
			timeout: Duration::from_millis(timeout_ms.unwrap_or(config.timeout_ms)),
			reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
		}
	}
}
