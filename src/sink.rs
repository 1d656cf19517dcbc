//! Logging sinks for non-fatal decoder events
//!
//! The decoder reports attribute types it does not know and other
//! anomalies through a [`LogSink`]. A sink only observes; nothing it does
//! changes the result of a decode.

use parking_lot::Mutex;

/// Receiver for non-fatal decoder events
///
/// Implementations must be `Send + Sync` so one decoder can be shared
/// between threads.
pub trait LogSink: Send + Sync {
    /// An attribute type this decoder does not handle was skipped
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]);

    /// Something unusual that did not stop decoding
    fn anomaly(&self, message: &str);
}

/// Forwards events to the `log` facade under the `nflog_decode` target
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]) {
        log::debug!(target: "nflog_decode", "Unknown attribute: {attr_type} {data:?}");
    }

    fn anomaly(&self, message: &str) {
        log::warn!(target: "nflog_decode", "{message}");
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn unknown_attribute(&self, _attr_type: u16, _data: &[u8]) {}

    fn anomaly(&self, _message: &str) {}
}

/// One event recorded by [`CollectingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    UnknownAttribute { attr_type: u16, data: Vec<u8> },
    Anomaly(String),
}

/// Sink that keeps every event in memory
///
/// # Example
///
/// ```
/// # use nflog_decode::{Decoder, DecoderConfig};
/// # use nflog_decode::sink::{CollectingSink, SinkEvent};
/// let sink = CollectingSink::new();
/// let decoder = Decoder::new(DecoderConfig::default(), &sink);
///
/// let mut data = Vec::new();
/// data.extend_from_slice(&8u16.to_ne_bytes());
/// data.extend_from_slice(&200u16.to_ne_bytes());
/// data.extend_from_slice(&[1, 2, 3, 4]);
///
/// decoder.decode(&data)?;
/// assert_eq!(
///     sink.take(),
///     vec![SinkEvent::UnknownAttribute { attr_type: 200, data: vec![1, 2, 3, 4] }]
/// );
/// # Ok::<(), nflog_decode::DecodeError>(())
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Remove and return the events recorded so far
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl LogSink for CollectingSink {
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]) {
        self.events.lock().push(SinkEvent::UnknownAttribute {
            attr_type,
            data: data.to_vec(),
        });
    }

    fn anomaly(&self, message: &str) {
        self.events
            .lock()
            .push(SinkEvent::Anomaly(message.to_string()));
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]) {
        (**self).unknown_attribute(attr_type, data);
    }

    fn anomaly(&self, message: &str) {
        (**self).anomaly(message);
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]) {
        (**self).unknown_attribute(attr_type, data);
    }

    fn anomaly(&self, message: &str) {
        (**self).anomaly(message);
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn unknown_attribute(&self, attr_type: u16, data: &[u8]) {
        (**self).unknown_attribute(attr_type, data);
    }

    fn anomaly(&self, message: &str) {
        (**self).anomaly(message);
    }
}
