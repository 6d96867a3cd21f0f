//! ezDV Runtime - control session and upload sequencing
//!
//! This crate owns the one WebSocket connection to an ezDV device:
//!
//! - **Transport**: opening a WebSocket stream via a [`Connector`]
//! - **Session**: connect, dispatch inbound events, reconnect forever after a
//!   fixed delay, reject sends while not open
//! - **Upload**: announce a file upload, then stream it in 4096 byte chunks
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  SessionEvent   ┌────────────┐
//! │   presenter  │ ◄────────────── │  session   │ ◄── text frames (events)
//! │  (ezdv core) │ ──────────────► │   task     │ ──► text frames (commands)
//! └──────┬───────┘  SessionHandle  └─────▲──────┘ ──► binary frames (chunks)
//!        │                               │
//!        │ upload()                      │ FrameSink
//!        └──────────► upload ────────────┘
//! ```
//!
//! All outbound frames go through a single queue, so the device sees them in
//! exactly the order they were sent.

pub mod error;
pub mod session;
pub mod transport;
pub mod upload;

pub use error::{Error, Result};
pub use session::{
	DEFAULT_RECONNECT_DELAY, Session, SessionConfig, SessionEvent, SessionEvents, SessionHandle, SessionState,
};
pub use transport::{Connector, TcpConnector};
pub use upload::{FrameSink, UploadKind, UploadReport, chunk_count, read_payload, upload};
