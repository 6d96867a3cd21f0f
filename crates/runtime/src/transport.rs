//! WebSocket transport for the ezDV control channel.
//!
//! A [`Connector`] opens one WebSocket stream per connection attempt. The
//! session drives the stream itself; this module only knows how to open it
//! and how to translate between [`Frame`]s and WebSocket messages.

use std::future::Future;

use ezdv_protocol::Frame;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{Error, Result};


/// Opens WebSocket streams to the device.
///
/// Implemented by [`TcpConnector`] for real devices. Tests plug in
/// connectors backed by in-memory pipes.
pub trait Connector: Send + Sync + 'static {
	/// Underlying byte stream of an open connection.
	type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

	/// Performs one connection attempt, including the WebSocket handshake.
	fn connect(&self, url: &str) -> impl Future<Output = Result<WebSocketStream<Self::Stream>>> + Send;
}

/// Connects over plain TCP (`ws://`), the only scheme ezDV serves.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
	type Stream = MaybeTlsStream<TcpStream>;

	async fn connect(&self, url: &str) -> Result<WebSocketStream<Self::Stream>> {
		let (stream, response) = tokio_tungstenite::connect_async(url)
			.await
			.map_err(|e| Error::ConnectionFailed(format!("{url}: {e}")))?;
		debug!(url, status = %response.status(), "WebSocket handshake complete");
		Ok(stream)
	}
}

/// Converts an outbound frame into a WebSocket message.
pub(crate) fn into_message(frame: Frame) -> Message {
	match frame {
		Frame::Text(text) => Message::Text(text),
		Frame::Binary(bytes) => Message::Binary(bytes),
	}
}

/// Extracts the data frame from an inbound message.
///
/// Control messages (ping, pong, close) yield `None`; tungstenite answers
/// pings on its own.
pub(crate) fn into_frame(message: Message) -> Option<Frame> {
	match message {
		Message::Text(text) => Some(Frame::Text(text)),
		Message::Binary(bytes) => Some(Frame::Binary(bytes)),
		Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
	}
}
