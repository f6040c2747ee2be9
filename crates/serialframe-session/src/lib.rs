//! Start/stop lifecycle and event delivery for serial frame reader sessions.
//!
//! This is the "just works" layer. Point a [`ReadController`] at a device
//! path and every recovered frame is delivered to an [`EventSink`] as an
//! `onDataReceived` event, until the device ends, a read fails, or
//! [`ReadController::stop`] is called.

pub mod controller;
pub mod error;
pub mod session;
pub mod sink;

pub use controller::{ReadController, WORKER_THREAD_NAME};
pub use error::{Result, SessionError};
pub use session::SessionHandle;
pub use sink::{ChannelSink, DataEvent, EventSink, SinkEvent, DATA_RECEIVED_EVENT};

pub use serialframe_frame::{ReaderConfig, Termination};
