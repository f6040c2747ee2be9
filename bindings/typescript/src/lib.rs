mod api;
mod error;
mod event;

pub use api::{ReaderOptions, SerialPortApi};
pub use event::DataReceived;

/// Event name frames are delivered under.
#[napi_derive::napi]
pub fn data_received_event() -> String {
    serialframe_session::DATA_RECEIVED_EVENT.to_string()
}

#[napi_derive::napi]
pub fn default_chunk_size() -> u32 {
    serialframe_frame::DEFAULT_CHUNK_SIZE as u32
}
