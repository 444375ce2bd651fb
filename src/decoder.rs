use crate::error::{SinkError, StreamError};
use crate::frame::{classify, Frame};
use crate::sse_codec::LineBuffer;
use crate::types::MalformedEventPayload;
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Receives decoded events, synchronously and in stream order.
pub trait EventSink {
    fn on_event(&mut self, event: Value) -> Result<(), SinkError>;

    /// Called for a data line whose payload is not JSON. The decoder moves
    /// on to the next line regardless.
    fn on_malformed(&mut self, diagnostic: MalformedEventPayload) {
        log_malformed(&diagnostic);
    }
}

impl<F, E> EventSink for F
where
    F: FnMut(Value) -> Result<(), E>,
    E: Into<SinkError>,
{
    fn on_event(&mut self, event: Value) -> Result<(), SinkError> {
        self(event).map_err(Into::into)
    }
}

pub(crate) fn log_malformed(diagnostic: &MalformedEventPayload) {
    warn!(
        payload = %diagnostic.payload,
        error = %diagnostic.error,
        "dropping malformed event payload"
    );
}

/// One item handed to a [`Collect`] sink.
#[derive(Debug)]
pub enum Delivery {
    Event(Value),
    Malformed(MalformedEventPayload),
}

/// Sink that buffers everything it receives, in order.
#[derive(Debug, Default)]
pub struct Collect {
    pub deliveries: Vec<Delivery>,
}

impl Collect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }

    pub fn events(&self) -> impl Iterator<Item = &Value> {
        self.deliveries.iter().filter_map(|d| match d {
            Delivery::Event(event) => Some(event),
            Delivery::Malformed(_) => None,
        })
    }
}

impl EventSink for Collect {
    fn on_event(&mut self, event: Value) -> Result<(), SinkError> {
        self.deliveries.push(Delivery::Event(event));
        Ok(())
    }

    fn on_malformed(&mut self, diagnostic: MalformedEventPayload) {
        log_malformed(&diagnostic);
        self.deliveries.push(Delivery::Malformed(diagnostic));
    }
}

/// Incremental decoder for a single event stream.
///
/// Feed it the response body chunk by chunk, then call [`finish`](Self::finish)
/// once the body ends. Chunk boundaries never change what gets delivered.
pub struct StreamDecoder<S> {
    lines: LineBuffer,
    sink: S,
    closed: bool,
}

impl<S: EventSink> StreamDecoder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            lines: LineBuffer::new(),
            sink,
            closed: false,
        }
    }

    /// Appends `chunk` and dispatches every line it completes.
    ///
    /// If the sink fails, the complete lines after the failing one are dropped.
    /// Only the unterminated tail is kept, so a later `feed` can still finish it.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::StreamAlreadyClosed);
        }
        debug!(bytes = chunk.len(), "feeding chunk");

        self.lines.extend(chunk);
        self.drain_lines()
    }

    /// Closes the stream, dispatching a final line that had no trailing newline.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::StreamAlreadyClosed);
        }
        self.closed = true;

        if let Some(rest) = self.lines.take_remainder() {
            if !rest.trim().is_empty() {
                debug!("flushing unterminated final line");
                self.dispatch(&rest)?;
            }
        }
        debug!("event stream closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.lines.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn drain_lines(&mut self) -> Result<(), StreamError> {
        while let Some(line) = self.lines.next_line() {
            if let Err(e) = self.dispatch(&line) {
                let dropped = self.lines.discard_complete_lines();
                warn!(dropped, "event consumer failed, dropping rest of chunk");
                return Err(e);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<(), StreamError> {
        match classify(line) {
            Frame::Ignored => {
                trace!(line, "skipping non-data line");
                Ok(())
            }
            Frame::Empty => {
                trace!("skipping empty data frame");
                Ok(())
            }
            Frame::Data(payload) => match serde_json::from_str::<Value>(payload) {
                Ok(event) => {
                    debug!("delivering event");
                    self.sink
                        .on_event(event)
                        .map_err(StreamError::ConsumerDeliveryFailure)
                }
                Err(error) => {
                    self.sink.on_malformed(MalformedEventPayload {
                        payload: payload.to_string(),
                        error,
                    });
                    Ok(())
                }
            },
        }
    }
}
