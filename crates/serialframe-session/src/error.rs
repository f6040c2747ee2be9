use std::io::ErrorKind;
use std::path::PathBuf;

/// Errors that can occur in session lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The device path does not exist. No session was started.
    #[error("device not found: {path}")]
    DeviceNotFound { path: PathBuf },

    /// A session is still reading; stop it before starting another.
    #[error("a reader session is already active on {device}")]
    AlreadyActive { device: String },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] serialframe_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] serialframe_frame::FrameError),

    /// The background reader thread could not be spawned.
    #[error("failed to spawn reader worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The background reader thread is gone.
    #[error("reader worker unavailable")]
    WorkerUnavailable,
}

impl SessionError {
    /// The underlying I/O error kind, when there is one.
    pub fn io_kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::DeviceNotFound { .. } => Some(ErrorKind::NotFound),
            SessionError::Transport(serialframe_transport::TransportError::DeviceNotFound {
                ..
            }) => Some(ErrorKind::NotFound),
            SessionError::Transport(serialframe_transport::TransportError::Open {
                source, ..
            })
            | SessionError::Transport(serialframe_transport::TransportError::Io(source))
            | SessionError::Frame(serialframe_frame::FrameError::Io(source))
            | SessionError::WorkerSpawn(source) => Some(source.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
