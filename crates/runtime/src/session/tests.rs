use std::sync::atomic::{AtomicUsize, Ordering};

use ezdv_protocol::{Command, Event, FreeDvMode};
use tokio::io::DuplexStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::protocol::Role;

use super::*;

type DeviceSocket = WebSocketStream<DuplexStream>;

/// Connector that pairs each successful attempt with an in-memory device.
#[derive(Clone)]
struct DuplexConnector {
	attempts: Arc<Mutex<Vec<Instant>>>,
	refuse: Arc<AtomicUsize>,
	devices: mpsc::UnboundedSender<DeviceSocket>,
}

impl DuplexConnector {
	fn new() -> (Self, mpsc::UnboundedReceiver<DeviceSocket>) {
		let (devices, rx) = mpsc::unbounded_channel();
		let connector = Self {
			attempts: Arc::new(Mutex::new(Vec::new())),
			refuse: Arc::new(AtomicUsize::new(0)),
			devices,
		};
		(connector, rx)
	}

	fn refusing(self, count: usize) -> Self {
		self.refuse.store(count, Ordering::SeqCst);
		self
	}

	fn attempts(&self) -> Vec<Instant> {
		self.attempts.lock().clone()
	}
}

impl Connector for DuplexConnector {
	type Stream = DuplexStream;

	async fn connect(&self, _url: &str) -> Result<WebSocketStream<DuplexStream>> {
		self.attempts.lock().push(Instant::now());

		let refused = self
			.refuse
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if refused {
			return Err(Error::ConnectionFailed("connection refused".to_string()));
		}

		let (client_io, device_io) = tokio::io::duplex(64 * 1024);
		let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
		let device = WebSocketStream::from_raw_socket(device_io, Role::Server, None).await;
		let _ = self.devices.send(device);
		Ok(client)
	}
}

fn spawn_session(connector: DuplexConnector) -> (SessionHandle, SessionEvents) {
	Session::spawn(SessionConfig::new("ws://ezdv.test/ws"), connector)
}

async fn next_event(events: &mut SessionEvents) -> SessionEvent {
	tokio::time::timeout(Duration::from_secs(30), events.recv())
		.await
		.expect("timed out waiting for session event")
		.expect("session event stream ended")
}

async fn next_device(devices: &mut mpsc::UnboundedReceiver<DeviceSocket>) -> DeviceSocket {
	tokio::time::timeout(Duration::from_secs(30), devices.recv())
		.await
		.expect("timed out waiting for connection")
		.expect("connector dropped")
}

async fn device_send(device: &mut DeviceSocket, text: &str) {
	device.send(Message::Text(text.to_string())).await.unwrap();
}

async fn device_recv(device: &mut DeviceSocket) -> Message {
	tokio::time::timeout(Duration::from_secs(30), device.next())
		.await
		.expect("timed out waiting for frame")
		.expect("client closed")
		.unwrap()
}

#[test]
fn test_config_for_host() {
	let config = SessionConfig::for_host("192.168.4.1");
	assert_eq!(config.url, "ws://192.168.4.1/ws");
	assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);

	let config = config.with_reconnect_delay(Duration::from_millis(250));
	assert_eq!(config.reconnect_delay, Duration::from_millis(250));
}

#[tokio::test]
async fn test_send_rejected_before_open() {
	let (connector, _devices) = DuplexConnector::new();
	// Refuse forever so the session never opens.
	let connector = connector.refusing(usize::MAX);
	let (handle, _events) = spawn_session(connector);

	let err = handle.send_command(&Command::RebootDevice).unwrap_err();
	assert!(err.is_not_connected());
	assert!(matches!(err, Error::NotConnected(state) if state != SessionState::Open));

	handle.shutdown();
}

#[tokio::test]
async fn test_events_dispatched_and_junk_ignored() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	assert!(handle.is_open());
	let mut device = next_device(&mut devices).await;

	device_send(&mut device, "this is not json").await;
	device_send(&mut device, r#"{"type":"someFutureEvent","value":1}"#).await;
	device_send(&mut device, r#"{"noType":true}"#).await;
	device.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
	device_send(&mut device, r#"{"type":"wifiSaved","success":false}"#).await;
	device_send(&mut device, r#"{"type":"currentMode","currentMode":2}"#).await;

	assert_eq!(next_event(&mut events).await, SessionEvent::Event(Event::WifiSaved { success: false }));
	assert_eq!(next_event(&mut events).await, SessionEvent::Event(Event::CurrentMode { current_mode: 2 }));
	assert!(handle.is_open(), "junk frames must not close the connection");

	handle.shutdown();
}

#[tokio::test]
async fn test_frames_arrive_in_send_order() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	handle.wait_open().await.unwrap();
	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let mut device = next_device(&mut devices).await;

	handle.send_command(&Command::UploadFirmwareFile).unwrap();
	handle.send(Frame::Binary(vec![0xaa; 4096])).unwrap();
	handle.send(Frame::Binary(vec![0xbb; 10])).unwrap();
	handle.send_command(&Command::set_mode(FreeDvMode::Mode700D)).unwrap();

	match device_recv(&mut device).await {
		Message::Text(text) => assert_eq!(text, r#"{"type":"uploadFirmwareFile"}"#),
		other => panic!("Expected text frame, got {other:?}"),
	}
	assert_eq!(device_recv(&mut device).await, Message::Binary(vec![0xaa; 4096]));
	assert_eq!(device_recv(&mut device).await, Message::Binary(vec![0xbb; 10]));
	match device_recv(&mut device).await {
		Message::Text(text) => assert_eq!(text, r#"{"type":"setMode","mode":1}"#),
		other => panic!("Expected text frame, got {other:?}"),
	}

	handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_once_after_close() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector.clone());

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let mut device = next_device(&mut devices).await;
	device.close(None).await.unwrap();
	drop(device);

	match next_event(&mut events).await {
		SessionEvent::Closed { reconnect_in, .. } => assert_eq!(reconnect_in, DEFAULT_RECONNECT_DELAY),
		other => panic!("Expected Closed, got {other:?}"),
	}
	assert_eq!(handle.state(), SessionState::Closed);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let _device = next_device(&mut devices).await;

	let attempts = connector.attempts();
	assert_eq!(attempts.len(), 2);
	assert!(attempts[1] - attempts[0] >= DEFAULT_RECONNECT_DELAY);

	// The new connection stays up, so no further attempts are made.
	tokio::time::sleep(Duration::from_secs(10)).await;
	assert_eq!(connector.attempts().len(), 2);
	assert!(handle.is_open());

	handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_failed_attempts_retry_at_fixed_delay() {
	let (connector, mut devices) = DuplexConnector::new();
	let connector = connector.refusing(3);
	let (handle, mut events) = spawn_session(connector.clone());

	for _ in 0..3 {
		match next_event(&mut events).await {
			SessionEvent::Closed { reason, .. } => assert!(reason.contains("refused"), "got: {reason}"),
			other => panic!("Expected Closed, got {other:?}"),
		}
	}
	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let _device = next_device(&mut devices).await;

	let attempts = connector.attempts();
	assert_eq!(attempts.len(), 4);
	for pair in attempts.windows(2) {
		let gap = pair[1] - pair[0];
		assert!(gap >= DEFAULT_RECONNECT_DELAY, "gap {gap:?} shorter than delay");
		assert!(gap < DEFAULT_RECONNECT_DELAY * 2, "gap {gap:?} grew");
	}

	handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_abrupt_drop_reconnects() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector.clone());

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	// Dropping without a close frame looks like the device rebooting.
	drop(next_device(&mut devices).await);

	assert!(matches!(next_event(&mut events).await, SessionEvent::Closed { .. }));
	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	assert_eq!(connector.attempts().len(), 2);

	handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_send_after_close_rejected() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	drop(next_device(&mut devices).await);
	assert!(matches!(next_event(&mut events).await, SessionEvent::Closed { .. }));

	let err = handle.send_command(&Command::RebootDevice).unwrap_err();
	assert!(matches!(err, Error::NotConnected(_)), "got {err:?}");

	handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_frame_queued_before_drop_not_replayed() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	drop(next_device(&mut devices).await);
	// Accepted against the first connection, which is already gone.
	let _ = handle.send_command(&Command::RebootDevice);

	assert!(matches!(next_event(&mut events).await, SessionEvent::Closed { .. }));
	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let mut device = next_device(&mut devices).await;

	handle.send_command(&Command::StartStopVoiceKeyer { running: true }).unwrap();
	match device_recv(&mut device).await {
		Message::Text(text) => assert_eq!(text, r#"{"type":"startStopVoiceKeyer","running":true}"#),
		other => panic!("Expected text frame, got {other:?}"),
	}

	handle.shutdown();
}

#[tokio::test]
async fn test_shutdown_ends_event_stream() {
	let (connector, _devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	handle.shutdown();
	handle.shutdown();

	let end = tokio::time::timeout(Duration::from_secs(5), async {
		while events.recv().await.is_some() {}
	})
	.await;
	assert!(end.is_ok(), "event stream did not end after shutdown");
	assert!(matches!(handle.send(Frame::Text("{}".to_string())), Err(Error::SessionClosed)));
	assert!(matches!(handle.wait_open().await, Err(Error::SessionClosed)));
}

#[tokio::test]
async fn test_flush_waits_for_queued_frames() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	let mut device = next_device(&mut devices).await;

	handle.send_command(&Command::SaveLedBrightnessInfo { duty_cycle: 100 }).unwrap();
	handle.send_command(&Command::RebootDevice).unwrap();
	handle.flush().await.unwrap();

	// Both frames are already buffered on the device side.
	assert!(matches!(device_recv(&mut device).await, Message::Text(t) if t.contains("saveLedBrightnessInfo")));
	assert!(matches!(device_recv(&mut device).await, Message::Text(t) if t.contains("rebootDevice")));

	handle.shutdown();
	assert!(matches!(handle.flush().await, Err(Error::SessionClosed)));
}

#[tokio::test(start_paused = true)]
async fn test_flush_after_drop_reports_discarded_frames() {
	let (connector, mut devices) = DuplexConnector::new();
	let (handle, mut events) = spawn_session(connector);

	assert_eq!(next_event(&mut events).await, SessionEvent::Opened);
	drop(next_device(&mut devices).await);
	// May be accepted against the dead connection; never written either way.
	let _ = handle.send_command(&Command::RebootDevice);

	assert!(matches!(handle.flush().await, Err(Error::NotConnected(_))));
	assert!(matches!(next_event(&mut events).await, SessionEvent::Closed { .. }));

	handle.shutdown();
}
