//! Server-Sent Events (SSE) framing for streamed responses.
//!
//! This module turns the raw byte stream of an HTTP response into a stream of [`Chunk`]s.
//! It knows nothing about what the chunks mean; that is the job of
//! [`StreamParser`](crate::StreamParser).

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::types::Chunk;
use crate::{Error, Result};

/// One framed SSE block.
enum Frame {
    Data(Chunk),
    Done,
}

struct SseState<S> {
    stream: S,
    buffer: Vec<u8>,
    pending_cr: bool,
    finished: bool,
}

/// Process a stream of bytes into a stream of raw chunks.
///
/// Events are delimited by a blank line.  Multi-line `data:` fields are joined, comment lines
/// are skipped, and the `[DONE]` sentinel ends the stream.  Bytes are buffered until a full
/// event arrives, so a UTF-8 sequence split across network reads is decoded intact.
///
/// A transport error is yielded once and ends the stream.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<Chunk>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + Unpin + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let state = SseState {
        stream: byte_stream,
        buffer: Vec::new(),
        pending_cr: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            if let Some(block) = take_block(&mut state.buffer) {
                match parse_block(&block) {
                    Some(Ok(Frame::Data(chunk))) => return Some((Ok(chunk), state)),
                    Some(Ok(Frame::Done)) => return None,
                    Some(Err(e)) => return Some((Err(e), state)),
                    None => continue,
                }
            }

            match state.stream.next().await {
                Some(Ok(bytes)) => {
                    push_normalized(&mut state.buffer, &mut state.pending_cr, &bytes);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    let err =
                        Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)));
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buffer);
                    return match parse_block(&rest) {
                        Some(Ok(Frame::Data(chunk))) => Some((Ok(chunk), state)),
                        Some(Err(e)) => Some((Err(e), state)),
                        Some(Ok(Frame::Done)) | None => None,
                    };
                }
            }
        }
    })
}

/// Append `bytes` with `\r\n` and lone `\r` line endings rewritten to `\n`.
///
/// `pending_cr` carries a trailing `\r` over to the next read so a `\r\n` pair split
/// across reads still yields one line break.
fn push_normalized(buffer: &mut Vec<u8>, pending_cr: &mut bool, bytes: &[u8]) {
    for &b in bytes {
        if std::mem::take(pending_cr) && b == b'\n' {
            continue;
        }
        if b == b'\r' {
            buffer.push(b'\n');
            *pending_cr = true;
        } else {
            buffer.push(b);
        }
    }
}

/// Remove and return the first complete event block from the buffer.
fn take_block(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let mut block: Vec<u8> = buffer.drain(..end + 2).collect();
    block.truncate(end);
    Some(block)
}

/// Parse one event block.  Returns `None` for blocks that carry no data.
fn parse_block(block: &[u8]) -> Option<Result<Frame>> {
    let text = match std::str::from_utf8(block) {
        Ok(text) => text,
        Err(e) => {
            return Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    let mut event = None;
    let mut data = Vec::new();
    for line in text.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.trim() == "[DONE]" {
        return Some(Ok(Frame::Done));
    }
    Some(Chunk::from_sse(event, data).map(Frame::Data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    fn bytes_of(parts: &[&[u8]]) -> Vec<std::result::Result<Bytes, io::Error>> {
        parts.iter().map(|p| Ok(Bytes::copy_from_slice(p))).collect()
    }

    async fn collect(parts: &[&[u8]]) -> Vec<Result<Chunk>> {
        let stream = stream::iter(bytes_of(parts));
        process_sse(stream).collect().await
    }

    #[tokio::test]
    async fn parse_single_event() {
        let events = collect(&[
            b"event: response.output_text.delta\ndata: {\"type\":\"response.output_text.delta\",\"delta\":\"Hi\"}\n\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        let chunk = events[0].as_ref().unwrap();
        assert_eq!(chunk.kind(), Some("response.output_text.delta"));
        assert_eq!(chunk.event(), Some("response.output_text.delta"));
    }

    #[tokio::test]
    async fn handle_split_event() {
        let events = collect(&[
            b"data: {\"type\":\"a\",",
            b"\"delta\":\"x\"}\n",
            b"\ndata: {\"type\":\"b\"}\n\n",
        ])
        .await;
        let kinds: Vec<_> = events
            .iter()
            .map(|e| e.as_ref().unwrap().kind().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn utf8_split_across_reads() {
        let whole = "data: {\"type\":\"t\",\"delta\":\"caf\u{e9}\"}\n\n".as_bytes();
        let split = whole.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let events = collect(&[&whole[..split], &whole[split..]]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data()["delta"], "caf\u{e9}");
    }

    #[tokio::test]
    async fn crlf_and_comments() {
        let events = collect(&[b": keep-alive\r\n\r\nevent: x\r\ndata: {\"type\":\"x\"}\r\n\r\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().kind(), Some("x"));
    }

    #[tokio::test]
    async fn bare_cr_line_endings() {
        let events = collect(&[b"event: x\rdata: {\"type\":\"x\"}\r\rdata: {\"type\":\"y\"}\r\r"]).await;
        assert_eq!(events.len(), 2);
        let first = events[0].as_ref().unwrap();
        assert_eq!(first.event(), Some("x"));
        assert_eq!(first.kind(), Some("x"));
        assert_eq!(events[1].as_ref().unwrap().kind(), Some("y"));
    }

    #[tokio::test]
    async fn crlf_split_across_reads() {
        let events = collect(&[
            b"data: {\"type\":\"a\"}\r",
            b"\n\r",
            b"\ndata: {\"type\":\"b\"}\r\n\r\n",
        ])
        .await;
        let kinds: Vec<_> = events
            .iter()
            .map(|e| e.as_ref().unwrap().kind().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn done_sentinel_ends_stream() {
        let events = collect(&[b"data: {\"type\":\"a\"}\n\ndata: [DONE]\n\ndata: {\"type\":\"b\"}\n\n"]).await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn trailing_event_without_blank_line() {
        let events = collect(&[b"data: {\"type\":\"a\"}\n\ndata: {\"type\":\"b\"}"]).await;
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let events = collect(&[b"data: {broken\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_err());
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let parts: Vec<std::result::Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"a\"}\n\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"data: {\"type\":\"b\"}\n\n")),
        ];
        let events: Vec<_> = process_sse(stream::iter(parts)).collect().await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(events[1].as_ref().unwrap_err().is_streaming());
    }
}
