//! Firmware update.

use std::path::Path;
use std::time::{Duration, Instant};

use ezdv::Form;
use tracing::info;

use super::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, UploadData};

/// Lower bound on the wait for the verdict; the device writes the whole
/// image to flash before answering.
const MIN_FIRMWARE_TIMEOUT: Duration = Duration::from_secs(120);

/// Uploads `file` and waits for `firmwareUploadComplete`. ezDV reboots into
/// the new image afterwards.
pub async fn execute(ctx: &CommandContext, file: &Path) -> Result<()> {
	let started = Instant::now();
	let mut device = ctx.connect().await?;

	info!(target = "ezdv", file = %file.display(), "uploading firmware");
	let report = device.update_firmware(Some(file)).await?;
	info!(target = "ezdv", bytes = report.bytes, chunks = report.chunks, "firmware queued");
	device
		.wait_for_result(Form::Firmware, ctx.timeout().max(MIN_FIRMWARE_TIMEOUT))
		.await?;

	ctx.emit(
		ResultBuilder::new("firmware")
			.started_at(started)
			.data(UploadData {
				file: file.to_path_buf(),
				bytes: report.bytes,
				chunks: report.chunks,
			})
			.text(format!(
				"Firmware uploaded ({} bytes); ezDV is rebooting",
				report.bytes
			)),
	);
	device.shutdown();
	Ok(())
}
