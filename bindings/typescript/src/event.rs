use napi::threadsafe_function::{ErrorStrategy, ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi::Status;
use napi_derive::napi;
use tracing::warn;

/// Payload delivered to `onDataReceived` listeners.
#[napi(object)]
#[derive(Clone)]
pub struct DataReceived {
    pub data: String,
}

pub(crate) type Listener = ThreadsafeFunction<DataReceived, ErrorStrategy::Fatal>;

/// Registered JS listeners keyed by the id handed back to the caller.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u32,
    listeners: Vec<(u32, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, listener: Listener) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u32) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn clear(&mut self) -> u32 {
        let removed = self.listeners.len();
        self.listeners.clear();
        u32::try_from(removed).unwrap_or(u32::MAX)
    }

    pub(crate) fn len(&self) -> u32 {
        u32::try_from(self.listeners.len()).unwrap_or(u32::MAX)
    }

    /// Queue the event for every listener without waiting on the JS thread.
    pub(crate) fn dispatch(&self, event: &DataReceived) {
        for (id, listener) in &self.listeners {
            let status = listener.call(event.clone(), ThreadsafeFunctionCallMode::NonBlocking);
            if status != Status::Ok {
                warn!(listener = *id, ?status, "dropping data event");
            }
        }
    }
}
