//! Reconnecting WebSocket session.
//!
//! [`Session::spawn`] starts a background task that owns the connection. The
//! task connects, forwards decoded [`Event`]s, and after any close or error
//! waits a fixed delay and connects again. It never gives up on its own.
//!
//! Callers talk to the task through a cloneable [`SessionHandle`]. Frames are
//! only accepted while the connection is open, and a frame accepted on one
//! connection is never delivered on a later one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ezdv_protocol::{Command, Event, Frame, decode, encode, websocket_url};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::transport::{Connector, into_frame, into_message};

#[cfg(test)]
mod tests;

/// Delay between a connection ending and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Lifecycle of the connection owned by a session.
///
/// `Disconnected` is only ever seen before the task first runs. After that
/// the session cycles `Connecting -> Open -> Closed -> Connecting`, with
/// failed attempts going straight from `Connecting` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Disconnected,
	Connecting,
	Open,
	Closed,
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SessionState::Disconnected => "disconnected",
			SessionState::Connecting => "connecting",
			SessionState::Open => "open",
			SessionState::Closed => "closed",
		})
	}
}

/// Notification delivered to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
	/// A connection was established. Sent once per successful connect.
	Opened,
	/// The device sent a recognized event.
	Event(Event),
	/// The connection ended, or an attempt failed. Another attempt follows
	/// after `reconnect_in`.
	Closed { reason: String, reconnect_in: Duration },
}

/// Receiving side of a session's notifications.
///
/// Yields `None` once the session task has stopped.
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Full WebSocket URL, e.g. `ws://192.168.4.1/ws`.
	pub url: String,
	pub reconnect_delay: Duration,
}

impl SessionConfig {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			reconnect_delay: DEFAULT_RECONNECT_DELAY,
		}
	}

	/// Config for the device's control endpoint on `host`.
	pub fn for_host(host: &str) -> Self {
		Self::new(websocket_url(host))
	}

	pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
		self.reconnect_delay = delay;
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
	state: SessionState,
	/// Incremented on every successful connect.
	generation: u64,
	stopped: bool,
}

enum Outbound {
	Frame { generation: u64, frame: Frame },
	/// Answered with `true` once every earlier frame has been written to an
	/// open connection, `false` if they were discarded.
	Flush(oneshot::Sender<bool>),
}

/// Entry point for starting a session.
pub struct Session;

impl Session {
	/// Spawns the session task onto the current tokio runtime.
	///
	/// The first connection attempt starts immediately. The task runs until
	/// [`SessionHandle::shutdown`] is called or every handle is dropped.
	pub fn spawn<C: Connector>(config: SessionConfig, connector: C) -> (SessionHandle, SessionEvents) {
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let status = Arc::new(watch::Sender::new(Status {
			state: SessionState::Disconnected,
			generation: 0,
			stopped: false,
		}));

		let task = SessionTask {
			url: config.url.clone(),
			reconnect_delay: config.reconnect_delay,
			connector,
			status: Arc::clone(&status),
			outbound: outbound_rx,
			events: events_tx,
			generation: 0,
		};
		let join = tokio::spawn(task.run());

		let handle = SessionHandle {
			url: Arc::from(config.url),
			outbound: outbound_tx,
			status,
			task: Arc::new(Mutex::new(Some(join))),
		};
		(handle, events_rx)
	}
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
	url: Arc<str>,
	outbound: mpsc::UnboundedSender<Outbound>,
	status: Arc<watch::Sender<Status>>,
	task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl fmt::Debug for SessionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionHandle")
			.field("url", &self.url)
			.field("state", &self.state())
			.finish()
	}
}

impl SessionHandle {
	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn state(&self) -> SessionState {
		self.status.borrow().state
	}

	pub fn is_open(&self) -> bool {
		self.state() == SessionState::Open
	}

	/// Queues one frame on the current connection.
	///
	/// Fails with [`Error::NotConnected`] unless the session is open. Frames
	/// are written in the order they were accepted. If the connection drops
	/// before a queued frame is written, the frame is discarded.
	pub fn send(&self, frame: Frame) -> Result<()> {
		let status = *self.status.borrow();
		if status.stopped {
			return Err(Error::SessionClosed);
		}
		if status.state != SessionState::Open {
			return Err(Error::NotConnected(status.state));
		}
		self.outbound
			.send(Outbound::Frame {
				generation: status.generation,
				frame,
			})
			.map_err(|_| Error::SessionClosed)
	}

	/// Encodes and queues a command.
	pub fn send_command(&self, command: &Command) -> Result<()> {
		debug!(command = command.type_name(), "Sending command");
		self.send(encode(command)?)
	}

	/// Waits until every frame accepted so far has been written.
	///
	/// Fails with [`Error::NotConnected`] if the connection dropped first and
	/// the frames were discarded.
	pub async fn flush(&self) -> Result<()> {
		let (done, written) = oneshot::channel();
		self.outbound.send(Outbound::Flush(done)).map_err(|_| Error::SessionClosed)?;
		match written.await {
			Ok(true) => Ok(()),
			Ok(false) => Err(Error::NotConnected(SessionState::Closed)),
			Err(_) => Err(Error::SessionClosed),
		}
	}

	/// Waits until the session is open.
	///
	/// Returns immediately if it already is. Fails with
	/// [`Error::SessionClosed`] if the session is shut down first.
	pub async fn wait_open(&self) -> Result<()> {
		let mut rx = self.status.subscribe();
		let stopped = rx
			.wait_for(|s| s.state == SessionState::Open || s.stopped)
			.await
			.map_err(|_| Error::SessionClosed)?
			.stopped;
		if stopped { Err(Error::SessionClosed) } else { Ok(()) }
	}

	/// Stops the session task and drops the connection.
	///
	/// The event stream ends once the task has been torn down. Calling this
	/// more than once is a no-op.
	pub fn shutdown(&self) {
		if let Some(join) = self.task.lock().take() {
			join.abort();
			info!(url = %self.url, "Session shut down");
		}
		self.status.send_modify(|s| {
			s.state = SessionState::Closed;
			s.stopped = true;
		});
	}
}

/// How a single connection ended.
enum Ended {
	/// Closed by the peer or by an error; the session should reconnect.
	Closed(String),
	/// Every handle is gone; the session should stop.
	Stopped,
}

struct SessionTask<C> {
	url: String,
	reconnect_delay: Duration,
	connector: C,
	status: Arc<watch::Sender<Status>>,
	outbound: mpsc::UnboundedReceiver<Outbound>,
	events: mpsc::UnboundedSender<SessionEvent>,
	generation: u64,
}

impl<C: Connector> SessionTask<C> {
	async fn run(mut self) {
		loop {
			self.set_state(SessionState::Connecting);
			debug!(url = %self.url, "Connecting to ezDV");

			let reason = match self.connector.connect(&self.url).await {
				Ok(stream) => {
					self.generation += 1;
					self.set_open();
					info!(url = %self.url, "Connected to ezDV");
					self.emit(SessionEvent::Opened);

					match self.drive(stream).await {
						Ended::Closed(reason) => reason,
						Ended::Stopped => break,
					}
				}
				Err(e) => {
					warn!(url = %self.url, error = %e, "Connection attempt failed");
					e.to_string()
				}
			};

			self.set_state(SessionState::Closed);
			info!(
				url = %self.url,
				reason = %reason,
				delay_ms = self.reconnect_delay.as_millis() as u64,
				"Disconnected from ezDV, reconnecting"
			);
			self.emit(SessionEvent::Closed {
				reason,
				reconnect_in: self.reconnect_delay,
			});

			if !self.wait_reconnect().await {
				break;
			}
		}

		self.set_state(SessionState::Closed);
		debug!(url = %self.url, "Session task stopped");
	}

	/// Pumps one open connection until it ends.
	async fn drive<S>(&mut self, stream: WebSocketStream<S>) -> Ended
	where
		S: AsyncRead + AsyncWrite + Unpin,
	{
		let (mut sink, mut source) = stream.split();
		let mut close_reason: Option<String> = None;

		loop {
			tokio::select! {
				inbound = source.next() => match inbound {
					Some(Ok(Message::Close(frame))) => {
						close_reason = Some(match frame {
							Some(frame) if !frame.reason.is_empty() => format!("closed by device: {}", frame.reason),
							_ => "closed by device".to_string(),
						});
					}
					Some(Ok(message)) => {
						if let Some(frame) = into_frame(message) {
							self.dispatch(frame);
						}
					}
					Some(Err(e)) => {
						error!(url = %self.url, error = %e, "WebSocket error");
						let _ = sink.close().await;
						return Ended::Closed(e.to_string());
					}
					None => {
						return Ended::Closed(close_reason.unwrap_or_else(|| "connection closed".to_string()));
					}
				},
				outbound = self.outbound.recv() => match outbound {
					Some(Outbound::Frame { generation, frame }) if generation == self.generation => {
						if let Err(e) = sink.send(into_message(frame)).await {
							error!(url = %self.url, error = %e, "WebSocket write failed");
							return Ended::Closed(e.to_string());
						}
					}
					Some(Outbound::Frame { .. }) => debug!("Discarding frame queued for an earlier connection"),
					Some(Outbound::Flush(done)) => {
						let _ = done.send(true);
					}
					None => {
						let _ = sink.close().await;
						return Ended::Stopped;
					}
				},
			}
		}
	}

	fn dispatch(&self, frame: Frame) {
		let text = match frame {
			Frame::Text(text) => text,
			Frame::Binary(bytes) => {
				debug!(len = bytes.len(), "Ignoring binary frame from device");
				return;
			}
		};

		match decode(&text) {
			Ok(Some(event)) => {
				debug!(event = event.type_name(), "Received event");
				self.emit(SessionEvent::Event(event));
			}
			Ok(None) => debug!(frame = %text, "Ignoring unknown event type"),
			Err(e) => warn!(error = %e, frame = %text, "Ignoring malformed frame"),
		}
	}

	/// Sleeps out the reconnect delay, discarding anything queued meanwhile.
	///
	/// Returns false if every handle was dropped while waiting.
	async fn wait_reconnect(&mut self) -> bool {
		let sleep = tokio::time::sleep(self.reconnect_delay);
		tokio::pin!(sleep);

		loop {
			tokio::select! {
				_ = &mut sleep => return true,
				outbound = self.outbound.recv() => match outbound {
					Some(Outbound::Frame { .. }) => debug!("Discarding frame queued while disconnected"),
					Some(Outbound::Flush(done)) => {
						let _ = done.send(false);
					}
					None => return false,
				},
			}
		}
	}

	fn emit(&self, event: SessionEvent) {
		// The presenter may have stopped listening; the session keeps running.
		let _ = self.events.send(event);
	}

	fn set_state(&self, state: SessionState) {
		self.status.send_if_modified(|s| {
			if s.stopped || s.state == state {
				return false;
			}
			s.state = state;
			true
		});
	}

	fn set_open(&self) {
		let generation = self.generation;
		self.status.send_if_modified(|s| {
			if s.stopped {
				return false;
			}
			s.state = SessionState::Open;
			s.generation = generation;
			true
		});
	}
}
