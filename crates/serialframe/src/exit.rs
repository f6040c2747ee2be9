use std::fmt;
use std::io;

use serialframe_frame::{FrameError, Termination};
use serialframe_session::SessionError;
use serialframe_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn code_for_kind(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        io::ErrorKind::InvalidInput => USAGE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(code_for_kind(err.kind()), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidChunkSize(_) => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::EndOfStream => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::DeviceNotFound { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        SessionError::AlreadyActive { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

/// Map a finished reader loop onto an exit status.
pub fn termination_result(termination: &Termination) -> CliResult<i32> {
    match termination {
        Termination::EndOfStream | Termination::Cancelled => Ok(SUCCESS),
        Termination::IoError { kind, message } => Err(CliError::new(
            code_for_kind(*kind),
            format!("read failed: {message}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_device_maps_to_transport_error() {
        let err = session_error(
            "start failed",
            SessionError::DeviceNotFound {
                path: PathBuf::from("/dev/ttyMISSING"),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("start failed: "));
    }

    #[test]
    fn invalid_chunk_size_is_usage_error() {
        let err = frame_error("config", FrameError::InvalidChunkSize(0));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn permission_denied_open_maps_through() {
        let err = transport_error(
            "open",
            TransportError::Open {
                path: PathBuf::from("/dev/ttyS0"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn clean_terminations_succeed() {
        assert_eq!(termination_result(&Termination::EndOfStream).unwrap(), SUCCESS);
        assert_eq!(termination_result(&Termination::Cancelled).unwrap(), SUCCESS);
    }

    #[test]
    fn io_termination_carries_kind() {
        let err = termination_result(&Termination::IoError {
            kind: io::ErrorKind::BrokenPipe,
            message: "broken pipe".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.code, INTERNAL);
        assert_eq!(err.message, "read failed: broken pipe");
    }
}
