use thiserror::Error;

/// Errors produced while decoding an inbound text frame.
///
/// An unknown `type` tag is not an error: [`decode`](crate::decode) returns
/// `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The frame is not valid JSON.
	#[error("malformed JSON frame: {0}")]
	Json(#[from] serde_json::Error),

	/// The frame is JSON but not an object with a string `type` field.
	#[error("frame has no string `type` field")]
	MissingType,

	/// The `type` tag is known but the remaining fields do not match it.
	#[error("invalid fields for `{type_name}` event: {source}")]
	InvalidFields {
		type_name: String,
		#[source]
		source: serde_json::Error,
	},
}
