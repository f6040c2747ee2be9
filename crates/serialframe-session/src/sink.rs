use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use serialframe_frame::Frame;
use tracing::debug;

/// Event name under which recovered frames are emitted.
pub const DATA_RECEIVED_EVENT: &str = "onDataReceived";

/// Payload of a data event: the frame span as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEvent {
    pub data: String,
}

impl From<&Frame> for DataEvent {
    fn from(frame: &Frame) -> Self {
        Self {
            data: frame.to_text().into_owned(),
        }
    }
}

/// Receives `(event, payload)` pairs from the reader loop.
///
/// Delivery is fire-and-forget: there is no error channel back to the loop,
/// and implementations must hand off quickly instead of blocking it.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: DataEvent);
}

impl<F> EventSink for F
where
    F: Fn(&str, DataEvent) + Send + Sync,
{
    fn emit(&self, event: &str, payload: DataEvent) {
        self(event, payload)
    }
}

/// An emitted event, as received from a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEvent {
    pub name: String,
    pub payload: DataEvent,
}

/// Sink backed by an unbounded std channel. Never blocks the reader.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<SinkEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::Receiver<SinkEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: DataEvent) {
        let event = SinkEvent {
            name: event.to_string(),
            payload,
        };
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped; discarding event");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn data_event_serializes_as_data_field() {
        let frame = Frame::new(b"{\"t\":1}".to_vec());
        let event = DataEvent::from(&frame);

        let json = serde_json::to_string(&event).expect("event should serialize");
        assert_eq!(json, r#"{"data":"{\"t\":1}"}"#);

        let back: DataEvent = serde_json::from_str(&json).expect("event should deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(
            DATA_RECEIVED_EVENT,
            DataEvent {
                data: "{\"a\":1}".to_string(),
            },
        );

        let event = rx.recv().expect("event should arrive");
        assert_eq!(event.name, "onDataReceived");
        assert_eq!(event.payload.data, "{\"a\":1}");
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(
            DATA_RECEIVED_EVENT,
            DataEvent {
                data: "{}".to_string(),
            },
        );
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |event: &str, payload: DataEvent| {
            captured
                .lock()
                .unwrap()
                .push(format!("{event}:{}", payload.data));
        };

        sink.emit(
            DATA_RECEIVED_EVENT,
            DataEvent {
                data: "{\"x\":5}".to_string(),
            },
        );
        assert_eq!(*seen.lock().unwrap(), vec!["onDataReceived:{\"x\":5}"]);
    }
}
