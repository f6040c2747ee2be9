use napi::{Error, Status};
use serialframe_session::SessionError;

pub(crate) fn to_napi_error(context: &str, err: impl std::fmt::Display) -> Error {
    Error::new(Status::GenericFailure, format!("{context}: {err}"))
}

pub(crate) fn invalid_state(message: &str) -> Error {
    Error::new(Status::InvalidArg, message.to_string())
}

/// Device failures are generic failures; misuse of the lifecycle and bad
/// configuration are invalid arguments.
pub(crate) fn session_error(context: &str, err: SessionError) -> Error {
    match err {
        SessionError::AlreadyActive { .. } | SessionError::Frame(_) => {
            Error::new(Status::InvalidArg, format!("{context}: {err}"))
        }
        other => to_napi_error(context, other),
    }
}
