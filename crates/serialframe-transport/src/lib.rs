//! Character-device handle for serial frame extraction.
//!
//! Provides the lowest layer of serialframe: an owned, read-only, non-seekable
//! byte stream opened from a device path such as `/dev/ttyS1`. Opening fails
//! fast when the path does not exist, and an optional read timeout lets reader
//! loops wake up periodically to observe a stop request.
//!
//! Everything else builds on top of the [`DeviceStream`] type provided here.

pub mod device;
pub mod error;

pub use device::{device_exists, DeviceStream};
pub use error::{Result, TransportError};
