//! Recover JSON-like frames from noisy serial character devices.
//!
//! serialframe reads a character device (a UART exposed as `/dev/ttyS*`, a
//! USB CDC port, a FIFO) in fixed-size chunks and recovers the last complete
//! `{...}` object in each chunk, handing it to an event sink. Reading runs on
//! a dedicated background thread that can be started and stopped from any
//! thread.
//!
//! # Crate Structure
//!
//! - [`transport`]: Device handle: fail-fast open, poll-based read timeout
//! - [`frame`]: Frame scanner and the chunked reader loop
//! - [`session`]: Start/stop lifecycle and event sinks (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use serialframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serialframe_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use serialframe_session::*;
}
