//! Server-sent-event decoding for long-running AI responses.
//!
//! The wire format is a sequence of text blocks over one HTTP response body:
//! a line beginning `event:<name>`, a line beginning `data:<json>`, and a
//! terminating blank line. Network chunk boundaries are arbitrary and
//! unrelated to line or event boundaries, so the decoder buffers and
//! re-splits on every chunk, and an event is only complete once a blank line
//! is seen.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;

use crate::{client::Client, types::Response, Error};

/// One decoded frame: the event name and its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event: String,
    pub data: serde_json::Value,
}

/// Incremental SSE parser. All parse state for one request lives here: the
/// undecoded byte remainder, the unframed text buffer, and the pending
/// `event`/`data` fields of the frame under construction. Partial frames
/// survive across [`SseDecoder::feed`] calls.
#[derive(Default)]
pub struct SseDecoder {
    /// Bytes that did not yet decode to a full UTF-8 character.
    remainder: Vec<u8>,
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    event: String,
    data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one network chunk and returns every frame it completed.
    ///
    /// A chunk boundary may split a multi-byte UTF-8 character or fall in the
    /// middle of a line; both are re-buffered, never dropped. The trailing
    /// element of the newline split has no guaranteed delimiter yet and is
    /// kept for the next call rather than processed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, Error> {
        self.remainder.extend_from_slice(chunk);
        let valid_to = match std::str::from_utf8(&self.remainder) {
            Ok(_) => self.remainder.len(),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(Error::Decode("stream is not valid UTF-8".to_string()));
                }
                e.valid_up_to()
            }
        };
        if let Ok(text) = std::str::from_utf8(&self.remainder[..valid_to]) {
            self.buffer.push_str(text);
        }
        self.remainder.drain(..valid_to);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);
            if let Some(rest) = line.strip_prefix("event:") {
                self.event = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("data:") {
                self.data = rest.trim().to_string();
            } else if line.is_empty() && !self.event.is_empty() && !self.data.is_empty() {
                let data = serde_json::from_str(&self.data).map_err(|e| {
                    tracing::error!("malformed event payload: {}", e);
                    Error::Decode(format!("malformed event payload: {e}"))
                })?;
                events.push(SseEvent {
                    event: std::mem::take(&mut self.event),
                    data,
                });
                self.data.clear();
            }
        }
        Ok(events)
    }
}

/// Pull-based sequence of decoded frames for one streaming request.
///
/// Reads are strictly sequential: each chunk is awaited, decoded, and drained
/// before the next read. Any read or decode error is terminal. Dropping the
/// stream drops the response body, which closes the connection.
pub struct SseStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    decoder: SseDecoder,
    ready: VecDeque<SseEvent>,
    done: bool,
}

impl SseStream {
    fn new(inner: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Returns the next decoded frame, or `None` once the server closes the
    /// stream. After an error the stream yields nothing further.
    pub async fn next(&mut self) -> Option<Result<SseEvent, Error>> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            match self.inner.next().await {
                Some(Ok(chunk)) => match self.decoder.feed(&chunk) {
                    Ok(events) => self.ready.extend(events),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.done = true;
                    tracing::error!("stream read failed: {}", e);
                    return Some(Err(Error::Network(e)));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// Outcome of a streaming POST: either an open event stream, or the envelope
/// the server sent instead when it declared JSON to signal an out-of-band
/// error.
pub enum StreamResponse {
    Stream(SseStream),
    Envelope(Response<serde_json::Value>),
}

impl Client {
    /// Issues a streaming POST (chat, audio synthesis, prompt optimization).
    ///
    /// Auth injection, URL building, and JSON body handling match
    /// [`Client::post`], but the body is consumed incrementally and no
    /// timeout is raced against the long-lived stream.
    pub async fn sse_post<B>(&self, path: &str, body: &B) -> Result<StreamResponse, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, &[])?;
        let req = self
            .authorize(self.http.post(url))
            .header("content-type", "application/json")
            .json(body);
        let resp = req.send().await.map_err(|e| {
            tracing::error!("streaming request to {} failed: {}", path, e);
            self.notifier.error(&e.to_string());
            Error::Network(e)
        })?;

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if is_json {
            let envelope = resp.json::<Response<serde_json::Value>>().await?;
            return Ok(StreamResponse::Envelope(envelope));
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: crate::client::truncate_body(&body),
            });
        }
        Ok(StreamResponse::Stream(SseStream::new(resp.bytes_stream())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_split_across_chunks_emits_once() {
        let mut decoder = SseDecoder::new();
        let first = decoder.feed(b"event: msg\ndata: {\"a\":1").unwrap();
        assert!(first.is_empty());
        let second = decoder.feed(b"}\n\n").unwrap();
        assert_eq!(
            second,
            vec![SseEvent {
                event: "msg".to_string(),
                data: json!({"a": 1}),
            }]
        );
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let payload = "event: msg\ndata: {\"text\":\"宇宙\"}\n\n".as_bytes();
        // Split inside the second multi-byte character.
        let cut = payload.len() - 8;
        let mut decoder = SseDecoder::new();
        let first = decoder.feed(&payload[..cut]).unwrap();
        assert!(first.is_empty());
        let second = decoder.feed(&payload[cut..]).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].data, json!({"text": "宇宙"}));
    }

    #[test]
    fn two_frames_in_one_chunk_emit_in_order() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .feed(b"event: ping\ndata: {\"n\":1}\n\nevent: pong\ndata: {\"n\":2}\n\n")
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "ping");
        assert_eq!(events[0].data, json!({"n": 1}));
        assert_eq!(events[1].event, "pong");
        assert_eq!(events[1].data, json!({"n": 2}));
    }

    #[test]
    fn frame_without_data_is_never_emitted() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: msg\n\n").unwrap();
        assert!(events.is_empty());
        // A later complete frame still comes through.
        let events = decoder.feed(b"event: msg\ndata: {}\n\n").unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn chunking_is_equivalent_to_one_shot() {
        let payload = b"event: delta\ndata: {\"token\":\"he\"}\n\nevent: delta\ndata: {\"token\":\"llo\"}\n\n";
        let mut one_shot = SseDecoder::new();
        let expected = one_shot.feed(payload).unwrap();

        for size in [1, 2, 3, 7] {
            let mut decoder = SseDecoder::new();
            let mut events = Vec::new();
            for chunk in payload.chunks(size) {
                events.extend(decoder.feed(chunk).unwrap());
            }
            assert_eq!(events, expected, "chunk size {size}");
        }
    }

    #[test]
    fn malformed_payload_is_a_terminal_error() {
        let mut decoder = SseDecoder::new();
        let result = decoder.feed(b"event: msg\ndata: {broken\n\n");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn whitespace_around_fields_is_tolerated() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event:  msg  \ndata:  {\"a\":1}  \n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "msg");
    }

    #[test]
    fn trailing_partial_line_is_rebuffered() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: msg\ndata: {\"a\"").unwrap().is_empty());
        assert!(decoder.feed(b":1}").unwrap().is_empty());
        let events = decoder.feed(b"\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, json!({"a": 1}));
    }
}
