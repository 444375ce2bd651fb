use crate::decoder::{Collect, Delivery, StreamDecoder};
use crate::error::BodyError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

/// Decodes a streaming response body into its events, in arrival order.
///
/// Malformed payloads are logged and skipped. The stream ends after the first
/// transport error.
pub fn decode_body<S, E>(body: S) -> impl Stream<Item = Result<Value, BodyError<E>>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = StreamDecoder::new(Collect::new());
        let mut body = Box::pin(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("event stream body failed: {}", e);
                    yield Err(BodyError::Transport(e));
                    return;
                }
            };

            let fed = decoder.feed(&chunk);
            for delivery in decoder.sink_mut().take() {
                if let Delivery::Event(event) = delivery {
                    yield Ok(event);
                }
            }
            if let Err(e) = fed {
                yield Err(e.into());
                return;
            }
        }

        let finished = decoder.finish();
        for delivery in decoder.sink_mut().take() {
            if let Delivery::Event(event) = delivery {
                yield Ok(event);
            }
        }
        if let Err(e) = finished {
            yield Err(e.into());
        }
    }
}

/// [`decode_body`] over an already established `reqwest` response.
pub fn decode_response(
    response: reqwest::Response,
) -> impl Stream<Item = Result<Value, BodyError<reqwest::Error>>> {
    decode_body(response.bytes_stream())
}

#[cfg(test)]
mod tests {
    use super::decode_body;
    use crate::error::BodyError;
    use bytes::Bytes;
    use serde_json::json;
    use std::io;
    use tokio_stream::StreamExt;

    fn chunks_to_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl tokio_stream::Stream<Item = Result<Bytes, io::Error>> {
        tokio_stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c))))
    }

    #[tokio::test]
    async fn test_events_across_chunks() {
        let body = chunks_to_stream(vec![
            b"data: {\"type\":\"token\",".as_slice(),
            b"\"content\":\"Hi\"}\n\ndata:data: {\"type\":\"done\"}\n".as_slice(),
            b"data: oops\ndata: {\"type\":\"tail\"}".as_slice(),
        ]);
        let events: Vec<_> = decode_body(body).collect().await;
        let events: Vec<_> = events.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(
            events,
            vec![
                json!({ "type": "token", "content": "Hi" }),
                json!({ "type": "done" }),
                json!({ "type": "tail" }),
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let body = tokio_stream::iter(vec![
            Ok(Bytes::from_static(b"data: {\"n\":1}\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"data: {\"n\":2}\n")),
        ]);
        let results: Vec<_> = decode_body(body).collect().await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &json!({ "n": 1 }));
        match &results[1] {
            Err(BodyError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body() {
        let results: Vec<_> = decode_body(chunks_to_stream(vec![])).collect().await;
        assert!(results.is_empty());
    }
}
