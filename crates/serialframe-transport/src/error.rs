use std::path::PathBuf;

/// Errors that can occur while opening or configuring a device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device path does not exist.
    #[error("device not found: {path}")]
    DeviceNotFound { path: PathBuf },

    /// The device exists but could not be opened for reading.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the device stream.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The device path involved, when the error is tied to one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            TransportError::DeviceNotFound { path } | TransportError::Open { path, .. } => {
                Some(path)
            }
            TransportError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
