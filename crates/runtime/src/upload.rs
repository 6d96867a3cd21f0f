//! Chunked file uploads.
//!
//! An upload is one JSON announcement followed by the file contents as
//! binary frames of at most [`CHUNK_SIZE`] bytes, all on the same
//! connection and in order. The device reports the result later with an
//! `*UploadComplete` event; nothing here waits for it.

use std::fmt;
use std::path::Path;

use ezdv_protocol::{CHUNK_SIZE, Command, Frame, encode};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::session::SessionHandle;

/// Destination for outbound frames.
pub trait FrameSink {
	fn send_frame(&self, frame: Frame) -> Result<()>;
}

impl FrameSink for SessionHandle {
	fn send_frame(&self, frame: Frame) -> Result<()> {
		self.send(frame)
	}
}

/// What is being uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
	/// Voice keyer audio (WAV).
	VoiceKeyer,
	/// Firmware image (tarball).
	Firmware,
}

impl UploadKind {
	/// Command that announces an upload of `size` bytes.
	///
	/// Only the voice keyer announcement carries the size.
	pub fn announcement(self, size: u64) -> Command {
		match self {
			UploadKind::VoiceKeyer => Command::UploadVoiceKeyerFile { size },
			UploadKind::Firmware => Command::UploadFirmwareFile,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			UploadKind::VoiceKeyer => "voice keyer file",
			UploadKind::Firmware => "firmware",
		}
	}
}

impl fmt::Display for UploadKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Summary of a finished upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
	pub kind: UploadKind,
	pub bytes: usize,
	pub chunks: usize,
}

/// Number of binary frames needed for `len` bytes.
pub fn chunk_count(len: usize) -> usize {
	len.div_ceil(CHUNK_SIZE)
}

/// Sends the announcement and then every chunk of `payload`.
///
/// Stops at the first frame the sink refuses. Chunks already sent stay sent;
/// there is no way to abort an upload on the device side.
pub fn upload<S: FrameSink + ?Sized>(sink: &S, kind: UploadKind, payload: &[u8]) -> Result<UploadReport> {
	let chunks = chunk_count(payload.len());
	info!(kind = %kind, bytes = payload.len(), chunks, "Starting upload");

	sink.send_frame(encode(&kind.announcement(payload.len() as u64))?)?;

	for (index, chunk) in payload.chunks(CHUNK_SIZE).enumerate() {
		sink.send_frame(Frame::Binary(chunk.to_vec()))?;
		debug!(kind = %kind, chunk = index + 1, of = chunks, len = chunk.len(), "Sent chunk");
	}

	Ok(UploadReport {
		kind,
		bytes: payload.len(),
		chunks,
	})
}

/// Reads a whole file to be uploaded.
pub async fn read_payload(path: &Path) -> Result<Vec<u8>> {
	tokio::fs::read(path).await.map_err(|source| Error::FileRead {
		path: path.to_path_buf(),
		source,
	})
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;

	use super::*;

	#[derive(Default)]
	struct Recorder {
		frames: Mutex<Vec<Frame>>,
		/// Refuse every frame after this many have been accepted.
		fail_after: Option<usize>,
	}

	impl FrameSink for Recorder {
		fn send_frame(&self, frame: Frame) -> Result<()> {
			let mut frames = self.frames.lock();
			if self.fail_after.is_some_and(|n| frames.len() >= n) {
				return Err(Error::NotConnected(crate::SessionState::Closed));
			}
			frames.push(frame);
			Ok(())
		}
	}

	fn announcement(frame: &Frame) -> serde_json::Value {
		serde_json::from_str(frame.as_text().expect("announcement must be text")).unwrap()
	}

	#[test]
	fn test_firmware_upload_sequence() {
		let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
		let sink = Recorder::default();

		let report = upload(&sink, UploadKind::Firmware, &payload).unwrap();
		assert_eq!(report, UploadReport { kind: UploadKind::Firmware, bytes: 10_000, chunks: 3 });

		let frames = sink.frames.lock();
		assert_eq!(frames.len(), 4);
		assert_eq!(announcement(&frames[0]), serde_json::json!({"type": "uploadFirmwareFile"}));

		let sizes: Vec<usize> = frames[1..].iter().map(|f| f.as_binary().unwrap().len()).collect();
		assert_eq!(sizes, vec![4096, 4096, 1808]);

		let joined: Vec<u8> = frames[1..].iter().flat_map(|f| f.as_binary().unwrap().to_vec()).collect();
		assert_eq!(joined, payload);
	}

	#[test]
	fn test_voice_keyer_announcement_carries_size() {
		let sink = Recorder::default();
		upload(&sink, UploadKind::VoiceKeyer, &[0u8; 5000]).unwrap();

		let frames = sink.frames.lock();
		assert_eq!(
			announcement(&frames[0]),
			serde_json::json!({"type": "uploadVoiceKeyerFile", "size": 5000})
		);
		assert_eq!(frames.len(), 3);
	}

	#[test]
	fn test_empty_file_sends_only_announcement() {
		let sink = Recorder::default();
		let report = upload(&sink, UploadKind::VoiceKeyer, &[]).unwrap();

		assert_eq!(report.chunks, 0);
		let frames = sink.frames.lock();
		assert_eq!(frames.len(), 1);
		assert_eq!(
			announcement(&frames[0]),
			serde_json::json!({"type": "uploadVoiceKeyerFile", "size": 0})
		);
	}

	#[test]
	fn test_exact_multiple_has_no_short_chunk() {
		let sink = Recorder::default();
		upload(&sink, UploadKind::Firmware, &vec![1u8; CHUNK_SIZE * 2]).unwrap();

		let frames = sink.frames.lock();
		assert_eq!(frames.len(), 3);
		assert!(frames[1..].iter().all(|f| f.as_binary().unwrap().len() == CHUNK_SIZE));
	}

	#[test]
	fn test_chunk_count() {
		assert_eq!(chunk_count(0), 0);
		assert_eq!(chunk_count(1), 1);
		assert_eq!(chunk_count(4096), 1);
		assert_eq!(chunk_count(4097), 2);
		assert_eq!(chunk_count(10_000), 3);
	}

	#[test]
	fn test_refused_frame_stops_upload() {
		let sink = Recorder {
			fail_after: Some(2),
			..Default::default()
		};
		let err = upload(&sink, UploadKind::Firmware, &[0u8; 20_000]).unwrap_err();

		assert!(err.is_not_connected());
		assert_eq!(sink.frames.lock().len(), 2);
	}

	#[test]
	fn test_refused_announcement_sends_nothing() {
		let sink = Recorder {
			fail_after: Some(0),
			..Default::default()
		};
		assert!(upload(&sink, UploadKind::VoiceKeyer, &[0u8; 10]).is_err());
		assert!(sink.frames.lock().is_empty());
	}

	#[tokio::test]
	async fn test_read_payload() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("keyer.wav");
		std::fs::write(&path, b"RIFF....WAVE").unwrap();

		assert_eq!(read_payload(&path).await.unwrap(), b"RIFF....WAVE");
	}

	#[tokio::test]
	async fn test_read_payload_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.tar");

		match read_payload(&path).await {
			Err(Error::FileRead { path: failed, source }) => {
				assert_eq!(failed, path);
				assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
			}
			other => panic!("Expected FileRead error, got {other:?}"),
		}
	}
}
