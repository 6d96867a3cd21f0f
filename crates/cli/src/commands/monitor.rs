//! Event stream command.

use anyhow::Context;
use tracing::info;

use super::CommandContext;
use crate::error::Result;
use crate::output::{MonitorLine, print_monitor_line};

/// Prints every session event until Ctrl-C.
///
/// Keeps running across disconnects; the session reconnects on its own and
/// each drop shows up as a `closed` line.
pub async fn execute(ctx: &CommandContext) -> Result<()> {
	let mut device = ctx.device();

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	loop {
		tokio::select! {
			event = device.next_event() => match event {
				Some(event) => print_monitor_line(&MonitorLine::from(&event), ctx.format),
				None => break,
			},
			res = &mut ctrl_c => {
				res.context("failed to listen for Ctrl-C")?;
				info!(target = "ezdv", "interrupted");
				break;
			}
		}
	}

	device.shutdown();
	Ok(())
}
