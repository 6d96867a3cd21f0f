use clap::Parser;

use super::*;

#[test]
fn parse_global_options() {
	let cli = Cli::try_parse_from(["ezdv", "--host", "10.0.0.5", "-vv", "-f", "json", "--timeout", "2500", "reboot"])
		.unwrap();

	assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.timeout, Some(2500));
	assert!(matches!(cli.command, Commands::Reboot));
}

#[test]
fn global_options_after_subcommand() {
	let cli = Cli::try_parse_from(["ezdv", "status", "--host", "ezdv.local", "-f", "json"]).unwrap();

	assert_eq!(cli.host.as_deref(), Some("ezdv.local"));
	match cli.command {
		Commands::Status { settle } => assert_eq!(settle, 1500),
		other => panic!("Expected Status, got {other:?}"),
	}
}

#[test]
fn parse_mode_names() {
	for (arg, expected) in [
		("analog", FreeDvMode::Analog),
		("ana", FreeDvMode::Analog),
		("700d", FreeDvMode::Mode700D),
		("700e", FreeDvMode::Mode700E),
		("1600", FreeDvMode::Mode1600),
	] {
		let cli = Cli::try_parse_from(["ezdv", "mode", arg]).unwrap();
		match cli.command {
			Commands::Mode { mode } => assert_eq!(FreeDvMode::from(mode), expected),
			other => panic!("Expected Mode, got {other:?}"),
		}
	}
	assert!(Cli::try_parse_from(["ezdv", "mode", "2020"]).is_err());
}

#[test]
fn parse_wifi_command() {
	let cli = Cli::try_parse_from([
		"ezdv",
		"wifi",
		"--enable",
		"--mode",
		"ap",
		"--security",
		"wpa2-wpa3",
		"--channel",
		"6",
		"--ssid",
		"ezDV shack",
	])
	.unwrap();

	match cli.command {
		Commands::Wifi(args) => {
			assert!(args.toggle.enable);
			assert_eq!(args.mode, Some(WifiModeArg::Ap));
			assert_eq!(WifiSecurity::from(args.security.unwrap()), WifiSecurity::Wpa2Wpa3);
			assert_eq!(args.channel, Some(6));
			assert_eq!(args.ssid.as_deref(), Some("ezDV shack"));
			assert!(args.password.is_none());
		}
		other => panic!("Expected Wifi, got {other:?}"),
	}
}

#[test]
fn wifi_channel_out_of_range() {
	assert!(Cli::try_parse_from(["ezdv", "wifi", "--channel", "0"]).is_err());
	assert!(Cli::try_parse_from(["ezdv", "wifi", "--channel", "14"]).is_err());
}

#[test]
fn enable_and_disable_conflict() {
	assert!(Cli::try_parse_from(["ezdv", "voice-keyer", "--enable", "--disable"]).is_err());
}

#[test]
fn toggle_resolution() {
	let neither = Toggle::default();
	assert!(neither.resolve(true));
	assert!(!neither.resolve(false));

	let enable = Toggle {
		enable: true,
		disable: false,
	};
	assert!(enable.resolve(false));

	let disable = Toggle {
		enable: false,
		disable: true,
	};
	assert!(!disable.resolve(true));
}

#[test]
fn parse_radio_command() {
	let cli = Cli::try_parse_from([
		"ezdv",
		"--host",
		"192.168.4.1",
		"radio",
		"--type",
		"flex",
		"--radio-host",
		"192.168.1.20",
	])
	.unwrap();

	assert_eq!(cli.host.as_deref(), Some("192.168.4.1"));
	match cli.command {
		Commands::Radio(args) => {
			assert_eq!(args.radio_type.map(RadioType::from), Some(RadioType::Flex));
			assert_eq!(args.radio_host.as_deref(), Some("192.168.1.20"));
			assert!(args.port.is_none());
		}
		other => panic!("Expected Radio, got {other:?}"),
	}
}

#[test]
fn parse_voice_keyer_with_file() {
	let cli = Cli::try_parse_from([
		"ezdv",
		"voice-keyer",
		"--seconds-to-wait",
		"10",
		"--file",
		"/tmp/cq.wav",
	])
	.unwrap();

	match cli.command {
		Commands::VoiceKeyer(args) => {
			assert_eq!(args.seconds_to_wait, Some(10));
			assert_eq!(args.times_to_transmit, None);
			assert_eq!(args.file, Some(PathBuf::from("/tmp/cq.wav")));
		}
		other => panic!("Expected VoiceKeyer, got {other:?}"),
	}
}

#[test]
fn parse_voice_keyer_run_alias() {
	let cli = Cli::try_parse_from(["ezdv", "vk", "toggle"]).unwrap();
	assert!(matches!(cli.command, Commands::VoiceKeyerRun { action: RunAction::Toggle }));
}

#[test]
fn led_duty_cycle_range() {
	let cli = Cli::try_parse_from(["ezdv", "led", "8192"]).unwrap();
	assert!(matches!(cli.command, Commands::Led { duty_cycle: 8192 }));
	assert!(Cli::try_parse_from(["ezdv", "led", "9000"]).is_err());
}

#[test]
fn firmware_requires_file() {
	assert!(Cli::try_parse_from(["ezdv", "firmware"]).is_err());
	let cli = Cli::try_parse_from(["ezdv", "firmware", "ezdv-2.0.tar"]).unwrap();
	assert!(matches!(cli.command, Commands::Firmware { file } if file == PathBuf::from("ezdv-2.0.tar")));
}

#[test]
fn command_names_match_subcommands() {
	let cli = Cli::try_parse_from(["ezdv", "vk", "start"]).unwrap();
	assert_eq!(cli.command.name(), "voice-keyer-run");
	let cli = Cli::try_parse_from(["ezdv", "voice-keyer", "--disable"]).unwrap();
	assert_eq!(cli.command.name(), "voice-keyer");
}
