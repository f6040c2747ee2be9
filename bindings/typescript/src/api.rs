use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use napi::threadsafe_function::ThreadSafeCallContext;
use napi::{Env, JsFunction, Result};
use napi_derive::napi;
use serialframe_frame::ReaderConfig;
use serialframe_session::{DataEvent, ReadController, DATA_RECEIVED_EVENT};

use crate::error::{invalid_state, session_error};
use crate::event::{DataReceived, Listener, ListenerRegistry};

/// Reader tuning. Omitted fields keep their defaults; `readTimeoutMs: 0`
/// blocks in read until data arrives.
#[napi(object)]
pub struct ReaderOptions {
    pub chunk_size: Option<u32>,
    pub read_timeout_ms: Option<u32>,
    pub min_chunk_len: Option<u32>,
}

impl ReaderOptions {
    fn into_config(self) -> ReaderConfig {
        let defaults = ReaderConfig::default();
        ReaderConfig {
            chunk_size: self
                .chunk_size
                .map_or(defaults.chunk_size, |n| n as usize),
            read_timeout: match self.read_timeout_ms {
                None => defaults.read_timeout,
                Some(0) => None,
                Some(ms) => Some(Duration::from_millis(u64::from(ms))),
            },
            min_chunk_len: self
                .min_chunk_len
                .map_or(defaults.min_chunk_len, |n| n as usize),
        }
    }
}

/// Serial port reader exposed to JavaScript.
///
/// Frames recovered on the background reader thread are queued to every
/// `onDataReceived` listener as `{ data }` without blocking the reader.
#[napi]
pub struct SerialPortApi {
    controller: ReadController,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

#[napi]
impl SerialPortApi {
    #[napi(constructor)]
    pub fn new(options: Option<ReaderOptions>) -> Result<Self> {
        let config = options.map(ReaderOptions::into_config).unwrap_or_default();
        let listeners = Arc::new(Mutex::new(ListenerRegistry::default()));

        let registry = Arc::clone(&listeners);
        let sink = move |event: &str, payload: DataEvent| {
            if event != DATA_RECEIVED_EVENT {
                return;
            }
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .dispatch(&DataReceived { data: payload.data });
        };

        let controller = ReadController::with_config(sink, config)
            .map_err(|err| session_error("reader setup failed", err))?;

        Ok(Self {
            controller,
            listeners,
        })
    }

    /// Start reading frames from `path`. Throws when the device does not
    /// exist or a session is already reading.
    #[napi]
    pub fn start_reading(&self, path: String) -> Result<()> {
        self.controller
            .start(&path)
            .map(|_| ())
            .map_err(|err| session_error("startReading failed", err))
    }

    /// Ask the reader to stop. Returns immediately; true if a session was
    /// signalled.
    #[napi]
    pub fn stop_reading(&self) -> bool {
        self.controller.stop()
    }

    #[napi]
    pub fn is_reading(&self) -> bool {
        self.controller.is_active()
    }

    /// Register a listener for `{ data }` events. Returns an id for
    /// `removeListener`.
    #[napi]
    pub fn on_data_received(&self, env: Env, listener: JsFunction) -> Result<u32> {
        let mut listener: Listener = listener.create_threadsafe_function(
            0,
            |ctx: ThreadSafeCallContext<DataReceived>| Ok(vec![ctx.value]),
        )?;
        // Listeners alone must not keep the process alive.
        listener.unref(&env)?;

        let mut registry = self
            .listeners
            .lock()
            .map_err(|_| invalid_state("listener registry lock poisoned"))?;
        Ok(registry.add(listener))
    }

    #[napi]
    pub fn remove_listener(&self, id: u32) -> Result<bool> {
        let mut registry = self
            .listeners
            .lock()
            .map_err(|_| invalid_state("listener registry lock poisoned"))?;
        Ok(registry.remove(id))
    }

    /// Remove every listener. Returns how many were removed.
    #[napi]
    pub fn remove_all_listeners(&self) -> Result<u32> {
        let mut registry = self
            .listeners
            .lock()
            .map_err(|_| invalid_state("listener registry lock poisoned"))?;
        Ok(registry.clear())
    }

    #[napi(getter)]
    pub fn listener_count(&self) -> Result<u32> {
        let registry = self
            .listeners
            .lock()
            .map_err(|_| invalid_state("listener registry lock poisoned"))?;
        Ok(registry.len())
    }
}
