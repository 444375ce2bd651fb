use thiserror::Error;

/// Error type returned by an [`EventSink`](crate::EventSink).
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of a [`StreamDecoder`](crate::StreamDecoder) call.
#[derive(Debug, Error)]
pub enum StreamError {
    /// `feed` or `finish` was called after `finish`
    #[error("event stream already closed")]
    StreamAlreadyClosed,

    /// The sink rejected an event. Lines after it are kept for the next call.
    #[error("event consumer failed: {0}")]
    ConsumerDeliveryFailure(#[source] SinkError),
}

/// Failures surfaced by [`decode_body`](crate::decode_body).
#[derive(Debug, Error)]
pub enum BodyError<E> {
    #[error("transport error: {0}")]
    Transport(#[source] E),

    #[error(transparent)]
    Stream(#[from] StreamError),
}
