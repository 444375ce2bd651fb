//! Incremental decoder for `text/event-stream` bodies relayed through a proxy.
//!
//! Bytes go in through [`StreamDecoder::feed`] in whatever pieces the network
//! delivers them; every complete `data:` frame is parsed as JSON and handed to
//! an [`EventSink`] before `feed` returns. Frames whose `data:` marker was
//! duplicated by the relay (`data:data: {...}`) decode as if the marker
//! appeared once.

pub mod decoder;
pub mod error;
pub mod frame;
pub mod sse_codec;
pub mod stream;
pub mod types;

pub use decoder::{Collect, Delivery, EventSink, StreamDecoder};
pub use error::{BodyError, SinkError, StreamError};
pub use frame::{classify, Frame, FRAME_MARKER};
pub use stream::{decode_body, decode_response};
pub use types::{AgentEvent, MalformedEventPayload};
