use crate::command::Command;

/// One WebSocket data frame on the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
	/// JSON command or event.
	Text(String),
	/// One upload chunk.
	Binary(Vec<u8>),
}

impl Frame {
	pub fn len(&self) -> usize {
		match self {
			Frame::Text(text) => text.len(),
			Frame::Binary(bytes) => bytes.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn is_binary(&self) -> bool {
		matches!(self, Frame::Binary(_))
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Frame::Text(text) => Some(text),
			Frame::Binary(_) => None,
		}
	}

	pub fn as_binary(&self) -> Option<&[u8]> {
		match self {
			Frame::Binary(bytes) => Some(bytes),
			Frame::Text(_) => None,
		}
	}
}

/// Serializes a command into a single text frame.
///
/// Control frames are never split; only binary uploads are chunked.
pub fn encode(command: &Command) -> Result<Frame, serde_json::Error> {
	serde_json::to_string(command).map(Frame::Text)
}
