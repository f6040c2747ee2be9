//! Brace-matching frame recovery from noisy, chunked byte streams.
//!
//! This is the core value-add layer of serialframe. A character device hands
//! out bytes in arbitrary chunks with no message boundaries; this crate pulls
//! those chunks and recovers the last complete `{...}` object in each one:
//! - A depth counter over `{` / `}` only (no string or escape awareness)
//! - Empty `{}` and doubled-empty `{{}}` spans are treated as noise
//! - The last complete span in a chunk wins; nothing is carried across chunks
//!
//! No JSON parsing happens here. A [`Frame`] is an opaque span of bytes.

pub mod config;
pub mod error;
pub mod frame;
pub mod reader;
pub mod scanner;

pub use config::{ReaderConfig, DEFAULT_CHUNK_SIZE, DEFAULT_READ_TIMEOUT, NOISE_CHUNK_LEN};
pub use error::{FrameError, Result};
pub use frame::{Frame, DOUBLE_EMPTY_OBJECT, EMPTY_OBJECT};
pub use reader::{FrameReader, Termination};
pub use scanner::{scan, scan_or_sentinel, Scanner};
