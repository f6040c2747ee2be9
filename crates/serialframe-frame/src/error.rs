/// Errors that can occur while reading and scanning chunks.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The configured chunk size cannot hold any data.
    #[error("invalid chunk size ({0} bytes, must be at least 1)")]
    InvalidChunkSize(usize),

    /// The device signalled end-of-stream.
    #[error("end of stream")]
    EndOfStream,

    /// An I/O error occurred while reading from the device.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
