//! Decodes raw response chunks into typed [`StreamEvent`]s.
//!
//! [`StreamParser`] is the pure state machine: it is fed one [`Chunk`] at a time and returns
//! the events that chunk produces.  [`EventStream`] drives a parser over a chunk stream and
//! exposes the result as a pull-based `Stream`.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::client::ChunkStream;
use crate::logger::StreamLogger;
use crate::observability::{STREAM_CHUNKS, STREAM_ERRORS, STREAM_UNKNOWN_CHUNKS};
use crate::types::{Chunk, StreamEvent, ToolCall};

const UNKNOWN_FUNCTION: &str = "unknown_function";

#[derive(Deserialize)]
struct TextDelta {
    #[serde(default)]
    delta: String,
}

#[derive(Deserialize)]
struct OutputItemEvent {
    #[serde(default)]
    output_index: Option<u64>,
    item: OutputItem,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum OutputItem {
    #[serde(rename = "function_call")]
    FunctionCall(FunctionCallPayload),
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct FunctionCallPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct ArgumentsDelta {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    output_index: Option<u64>,
    #[serde(default)]
    delta: String,
}

#[derive(Deserialize)]
struct ArgumentsDone {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    output_index: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug)]
struct ToolCallBuilder {
    id: String,
    call_id: String,
    name: String,
    output_index: Option<u64>,
    initial_arguments: String,
    arguments: String,
    saw_delta: bool,
    completed: bool,
}

impl ToolCallBuilder {
    fn new(id: String, call_id: Option<String>, name: String, output_index: Option<u64>) -> Self {
        let call_id = call_id.unwrap_or_else(|| id.clone());
        Self {
            id,
            call_id,
            name,
            output_index,
            initial_arguments: String::new(),
            arguments: String::new(),
            saw_delta: false,
            completed: false,
        }
    }

    fn finish(&mut self) -> ToolCall {
        self.completed = true;
        let text = if self.saw_delta {
            &self.arguments
        } else {
            &self.initial_arguments
        };
        ToolCall::complete(&self.id, &self.call_id, &self.name, text.as_str())
    }
}

/// Incremental decoder from raw chunks to [`StreamEvent`]s.
///
/// Tool calls are tracked by their stream identifier, falling back to the output index and
/// then to the most recent open call when the chunk carries neither.  Unknown chunk kinds are
/// skipped.  After a terminal event the parser ignores further input.
#[derive(Debug, Default)]
pub struct StreamParser {
    calls: Vec<ToolCallBuilder>,
    finished: bool,
}

impl StreamParser {
    /// Create a parser for one response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Interpret one chunk.
    pub fn feed(&mut self, chunk: &Chunk) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        let Some(kind) = chunk.kind() else {
            STREAM_UNKNOWN_CHUNKS.click();
            return Vec::new();
        };
        let result = match kind {
            "response.reasoning_summary_text.delta"
            | "response.reasoning_text.delta"
            | "response.reasoning.delta"
            | "response.thinking.delta" => decode::<TextDelta>(chunk)
                .map(|d| text_event(d.delta, StreamEvent::thinking)),
            "response.output_text.delta" => {
                decode::<TextDelta>(chunk).map(|d| text_event(d.delta, StreamEvent::content))
            }
            "response.output_item.added" => {
                decode::<OutputItemEvent>(chunk).map(|e| self.on_item_added(e))
            }
            "response.function_call_arguments.delta" => {
                decode::<ArgumentsDelta>(chunk).map(|d| self.on_arguments_delta(d))
            }
            "response.function_call_arguments.done" => {
                decode::<ArgumentsDone>(chunk).map(|d| self.on_arguments_done(d))
            }
            "response.output_item.done" => {
                decode::<OutputItemEvent>(chunk).map(|e| self.on_item_done(e))
            }
            "response.completed" | "response.done" | "response.incomplete" => {
                Ok(self.on_completed())
            }
            "response.failed" => {
                let reason = chunk
                    .data()
                    .pointer("/response/error/message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("the response failed");
                Ok(vec![self.fail(reason)])
            }
            "error" => {
                let data = chunk.data();
                let reason = data
                    .get("message")
                    .or_else(|| data.pointer("/error/message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("the server reported an error");
                Ok(vec![self.fail(reason)])
            }
            _ => {
                STREAM_UNKNOWN_CHUNKS.click();
                Ok(Vec::new())
            }
        };
        match result {
            Ok(events) => events,
            Err(e) => vec![self.fail(format!("malformed {kind} chunk: {e}"))],
        }
    }

    /// Terminate the stream with an error.
    pub fn fail(&mut self, reason: impl Into<String>) -> StreamEvent {
        self.finished = true;
        StreamEvent::error(reason)
    }

    /// Signal that the chunk source is exhausted.
    ///
    /// Returns a `StreamError` when the source ended without a completion marker.
    pub fn end_of_input(&mut self) -> Option<StreamEvent> {
        if self.finished {
            None
        } else {
            Some(self.fail("stream ended before the response completed"))
        }
    }

    fn on_item_added(&mut self, event: OutputItemEvent) -> Vec<StreamEvent> {
        let OutputItem::FunctionCall(item) = event.item else {
            return Vec::new();
        };
        let id = item
            .id
            .or_else(|| item.call_id.clone())
            .unwrap_or_else(|| self.synthetic_id());
        if self.locate(Some(&id), None).is_some() {
            return Vec::new();
        }
        let name = item.name.unwrap_or_else(|| UNKNOWN_FUNCTION.to_string());
        let mut builder = ToolCallBuilder::new(id.clone(), item.call_id, name.clone(), event.output_index);
        builder.initial_arguments = item.arguments.unwrap_or_default();
        self.calls.push(builder);
        vec![StreamEvent::ToolCallStart { id, name }]
    }

    fn on_arguments_delta(&mut self, delta: ArgumentsDelta) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let idx = self.locate_or_start(delta.item_id, delta.output_index, None, &mut events);
        let call = &mut self.calls[idx];
        if call.completed || delta.delta.is_empty() {
            return events;
        }
        call.saw_delta = true;
        call.arguments.push_str(&delta.delta);
        events.push(StreamEvent::ToolCallArgsDelta {
            id: call.id.clone(),
            text: delta.delta,
        });
        events
    }

    fn on_arguments_done(&mut self, done: ArgumentsDone) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let idx = self.locate_or_start(done.item_id, done.output_index, done.name, &mut events);
        let call = &mut self.calls[idx];
        if call.completed {
            return events;
        }
        if !call.saw_delta {
            if let Some(arguments) = done.arguments {
                call.initial_arguments = arguments;
            }
        }
        events.push(StreamEvent::ToolCallComplete {
            call: call.finish(),
        });
        events
    }

    fn on_item_done(&mut self, event: OutputItemEvent) -> Vec<StreamEvent> {
        let OutputItem::FunctionCall(item) = event.item else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let item_id = item.id.or_else(|| item.call_id.clone());
        let idx = self.locate_or_start(item_id, event.output_index, item.name, &mut events);
        let call = &mut self.calls[idx];
        if call.completed {
            return events;
        }
        if let Some(call_id) = item.call_id {
            call.call_id = call_id;
        }
        if !call.saw_delta {
            if let Some(arguments) = item.arguments {
                call.initial_arguments = arguments;
            }
        }
        events.push(StreamEvent::ToolCallComplete {
            call: call.finish(),
        });
        events
    }

    fn on_completed(&mut self) -> Vec<StreamEvent> {
        let mut events: Vec<StreamEvent> = self
            .calls
            .iter_mut()
            .filter(|call| !call.completed)
            .map(|call| StreamEvent::ToolCallComplete {
                call: call.finish(),
            })
            .collect();
        events.push(StreamEvent::TurnComplete);
        self.finished = true;
        events
    }

    fn locate(&self, item_id: Option<&str>, output_index: Option<u64>) -> Option<usize> {
        if let Some(id) = item_id {
            if let Some(idx) = self
                .calls
                .iter()
                .position(|c| c.id == id || c.call_id == id)
            {
                return Some(idx);
            }
        }
        if let Some(index) = output_index {
            if let Some(idx) = self
                .calls
                .iter()
                .position(|c| c.output_index == Some(index))
            {
                return Some(idx);
            }
        }
        if item_id.is_none() && output_index.is_none() {
            return self.calls.iter().rposition(|c| !c.completed);
        }
        None
    }

    fn locate_or_start(
        &mut self,
        item_id: Option<String>,
        output_index: Option<u64>,
        name: Option<String>,
        events: &mut Vec<StreamEvent>,
    ) -> usize {
        if let Some(idx) = self.locate(item_id.as_deref(), output_index) {
            return idx;
        }
        let id = item_id.unwrap_or_else(|| self.synthetic_id());
        let name = name.unwrap_or_else(|| UNKNOWN_FUNCTION.to_string());
        events.push(StreamEvent::ToolCallStart {
            id: id.clone(),
            name: name.clone(),
        });
        self.calls
            .push(ToolCallBuilder::new(id, None, name, output_index));
        self.calls.len() - 1
    }

    fn synthetic_id(&self) -> String {
        format!("synthetic_call_{}", self.calls.len())
    }
}

fn decode<T: DeserializeOwned>(chunk: &Chunk) -> std::result::Result<T, serde_json::Error> {
    T::deserialize(chunk.data())
}

fn text_event(text: String, make: fn(String) -> StreamEvent) -> Vec<StreamEvent> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![make(text)]
    }
}

/// A stream of [`StreamEvent`]s decoded from a chunk stream.
///
/// The logger sees every raw chunk before it is interpreted.  A transport error becomes a
/// `StreamError` event, after which the stream ends.
pub struct EventStream {
    inner: ChunkStream,
    parser: StreamParser,
    pending: VecDeque<StreamEvent>,
    logger: Arc<dyn StreamLogger>,
    done: bool,
}

impl EventStream {
    /// Wrap a chunk stream.
    pub fn new(inner: ChunkStream, logger: Arc<dyn StreamLogger>) -> Self {
        Self {
            inner,
            parser: StreamParser::new(),
            pending: VecDeque::new(),
            logger,
            done: false,
        }
    }
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(event) = this.pending.pop_front() {
                if matches!(event, StreamEvent::StreamError { .. }) {
                    STREAM_ERRORS.click();
                }
                this.logger.log_event(&event);
                return Poll::Ready(Some(event));
            }
            if this.done {
                return Poll::Ready(None);
            }
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    STREAM_CHUNKS.click();
                    this.logger.log_chunk(&chunk);
                    this.pending.extend(this.parser.feed(&chunk));
                    this.done = this.parser.is_finished();
                }
                Poll::Ready(Some(Err(e))) => {
                    this.pending.push_back(this.parser.fail(e.to_string()));
                    this.done = true;
                }
                Poll::Ready(None) => {
                    this.pending.extend(this.parser.end_of_input());
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::types::ToolArguments;
    use futures::StreamExt;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    fn feed_all(chunks: Vec<Value>) -> Vec<StreamEvent> {
        let mut parser = StreamParser::new();
        let mut events = Vec::new();
        for data in chunks {
            events.extend(parser.feed(&Chunk::new(data)));
        }
        events.extend(parser.end_of_input());
        events
    }

    fn text_delta(kind: &str, delta: &str) -> Value {
        json!({"type": kind, "delta": delta})
    }

    fn completed() -> Value {
        json!({"type": "response.completed", "response": {"status": "completed"}})
    }

    #[test]
    fn content_deltas_concatenate() {
        let events = feed_all(vec![
            json!({"type": "response.created", "response": {}}),
            text_delta("response.reasoning_summary_text.delta", "Let me think."),
            text_delta("response.output_text.delta", "Hello"),
            text_delta("response.output_text.delta", ", "),
            text_delta("response.output_text.delta", "world"),
            completed(),
        ]);
        let content: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ContentDelta { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(content, "Hello, world");
        assert_eq!(events[0], StreamEvent::thinking("Let me think."));
        let completes = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::TurnComplete))
            .count();
        assert_eq!(completes, 1);
        assert_eq!(events.last(), Some(&StreamEvent::TurnComplete));
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let events = feed_all(vec![
            json!({"type": "response.in_progress"}),
            json!({"type": "response.content_part.added", "part": {}}),
            json!({"no_type": true}),
            json!({"type": "something.new", "delta": "x"}),
            completed(),
        ]);
        assert_eq!(events, vec![StreamEvent::TurnComplete]);
    }

    #[test]
    fn tool_call_arguments_accumulate() {
        let events = feed_all(vec![
            json!({"type": "response.output_item.added", "output_index": 0,
                   "item": {"type": "function_call", "id": "fc_1", "call_id": "call_1",
                            "name": "assess_location_risks", "arguments": ""}}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "fc_1",
                   "output_index": 0, "delta": "{\"loca"}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "fc_1",
                   "output_index": 0, "delta": "tion\": \"Kyiv\"}"}),
            json!({"type": "response.function_call_arguments.done", "item_id": "fc_1",
                   "output_index": 0, "arguments": "{\"location\": \"Kyiv\"}"}),
            json!({"type": "response.output_item.done", "output_index": 0,
                   "item": {"type": "function_call", "id": "fc_1", "call_id": "call_1",
                            "name": "assess_location_risks", "arguments": "{\"location\": \"Kyiv\"}"}}),
            completed(),
        ]);
        assert_eq!(
            events[0],
            StreamEvent::ToolCallStart {
                id: "fc_1".to_string(),
                name: "assess_location_risks".to_string()
            }
        );
        assert!(matches!(&events[1], StreamEvent::ToolCallArgsDelta { id, .. } if id == "fc_1"));
        let StreamEvent::ToolCallComplete { call } = &events[3] else {
            panic!("expected completion, got {:?}", events[3]);
        };
        assert_eq!(call.call_id, "call_1");
        assert_eq!(call.parsed_arguments().unwrap(), &json!({"location": "Kyiv"}));
        assert_eq!(events.len(), 5);
        assert_eq!(events[4], StreamEvent::TurnComplete);
    }

    fn arguments_from_pieces(pieces: &[&str]) -> ToolCall {
        let mut chunks = vec![json!({"type": "response.output_item.added", "output_index": 0,
            "item": {"type": "function_call", "id": "fc_1", "call_id": "call_1",
                     "name": "get_preparation_guidance", "arguments": ""}})];
        for piece in pieces {
            chunks.push(json!({"type": "response.function_call_arguments.delta",
                               "item_id": "fc_1", "output_index": 0, "delta": piece}));
        }
        chunks.push(json!({"type": "response.function_call_arguments.done",
                           "item_id": "fc_1", "output_index": 0}));
        chunks.push(completed());
        feed_all(chunks)
            .into_iter()
            .find_map(|e| match e {
                StreamEvent::ToolCallComplete { call } => Some(call),
                _ => None,
            })
            .expect("a completed call")
    }

    #[test]
    fn arguments_survive_any_split() {
        let whole = r#"{"scenario": "armed conflict", "location": "Tallinn, Eesti ä", "note": "café ☃"}"#;
        let expected: Value = serde_json::from_str(whole).unwrap();
        let boundaries: Vec<usize> = (0..=whole.len())
            .filter(|i| whole.is_char_boundary(*i))
            .collect();
        for (n, &first) in boundaries.iter().enumerate() {
            for &second in &boundaries[n..] {
                let pieces = [&whole[..first], &whole[first..second], &whole[second..]];
                let call = arguments_from_pieces(&pieces);
                assert_eq!(call.raw_arguments, whole, "split at {first}/{second}");
                assert_eq!(call.parsed_arguments().unwrap(), &expected);
            }
        }
    }

    #[test]
    fn arguments_survive_one_char_at_a_time() {
        let whole = "{\"location\": \"Kharkiv\", \"radius_km\": [10, 20.5]}";
        let pieces: Vec<String> = whole.chars().map(String::from).collect();
        let pieces: Vec<&str> = pieces.iter().map(String::as_str).collect();
        let call = arguments_from_pieces(&pieces);
        assert_eq!(
            call.parsed_arguments().unwrap(),
            &serde_json::from_str::<Value>(whole).unwrap()
        );
    }

    #[test]
    fn calls_without_ids_do_not_merge_with_upstream_ids() {
        let events = feed_all(vec![
            json!({"type": "response.output_item.added", "output_index": 0,
                   "item": {"type": "function_call", "id": "call_1", "name": "get_world_conflicts"}}),
            json!({"type": "response.output_item.added", "output_index": 1,
                   "item": {"type": "function_call", "name": "assess_location_risks"}}),
            completed(),
        ]);
        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolCallStart { id, name } => Some((id.as_str(), name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            started,
            vec![
                ("call_1", "get_world_conflicts"),
                ("synthetic_call_1", "assess_location_risks")
            ]
        );
        let completed_calls = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::ToolCallComplete { .. }))
            .count();
        assert_eq!(completed_calls, 2);
    }

    #[test]
    fn interleaved_calls_stay_separate() {
        let events = feed_all(vec![
            json!({"type": "response.output_item.added", "output_index": 0,
                   "item": {"type": "function_call", "id": "a", "call_id": "ca", "name": "one"}}),
            json!({"type": "response.output_item.added", "output_index": 1,
                   "item": {"type": "function_call", "id": "b", "call_id": "cb", "name": "two"}}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "a", "delta": "{\"x\":"}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "b", "delta": "{\"y\":"}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "a", "delta": "1}"}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "b", "delta": "2}"}),
            json!({"type": "response.function_call_arguments.done", "item_id": "b"}),
            json!({"type": "response.function_call_arguments.done", "item_id": "a"}),
            completed(),
        ]);
        let completed: Vec<&ToolCall> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolCallComplete { call } => Some(call),
                _ => None,
            })
            .collect();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].name, "two");
        assert_eq!(completed[0].parsed_arguments().unwrap(), &json!({"y": 2}));
        assert_eq!(completed[1].name, "one");
        assert_eq!(completed[1].parsed_arguments().unwrap(), &json!({"x": 1}));
    }

    #[test]
    fn completion_finalizes_open_calls() {
        let events = feed_all(vec![
            json!({"type": "response.output_item.added",
                   "item": {"type": "function_call", "id": "fc_9", "name": "get_world_conflicts"}}),
            completed(),
        ]);
        let StreamEvent::ToolCallComplete { call } = &events[1] else {
            panic!("expected completion, got {:?}", events[1]);
        };
        assert_eq!(call.call_id, "fc_9");
        assert_eq!(call.parsed_arguments().unwrap(), &json!({}));
        assert_eq!(events[2], StreamEvent::TurnComplete);
    }

    #[test]
    fn delta_for_unseen_call_starts_it() {
        let events = feed_all(vec![
            json!({"type": "response.function_call_arguments.delta", "item_id": "ghost", "delta": "{}"}),
            json!({"type": "response.function_call_arguments.done", "item_id": "ghost"}),
            completed(),
        ]);
        assert_eq!(
            events[0],
            StreamEvent::ToolCallStart {
                id: "ghost".to_string(),
                name: UNKNOWN_FUNCTION.to_string()
            }
        );
        assert!(matches!(events[2], StreamEvent::ToolCallComplete { .. }));
    }

    #[test]
    fn malformed_arguments_are_surfaced() {
        let events = feed_all(vec![
            json!({"type": "response.output_item.added",
                   "item": {"type": "function_call", "id": "fc_1", "name": "get_preparation_guidance"}}),
            json!({"type": "response.function_call_arguments.delta", "item_id": "fc_1", "delta": "{\"scenario\""}),
            json!({"type": "response.function_call_arguments.done", "item_id": "fc_1"}),
            completed(),
        ]);
        let StreamEvent::ToolCallComplete { call } = &events[2] else {
            panic!("expected completion, got {:?}", events[2]);
        };
        assert!(matches!(call.arguments, ToolArguments::Malformed { .. }));
        assert!(call.parsed_arguments().unwrap_err().is_malformed_tool_arguments());
    }

    #[test]
    fn failure_chunks_terminate() {
        let events = feed_all(vec![
            text_delta("response.reasoning_summary_text.delta", "hmm"),
            json!({"type": "response.failed", "response": {"error": {"message": "overloaded"}}}),
            text_delta("response.output_text.delta", "ignored"),
        ]);
        assert_eq!(
            events,
            vec![StreamEvent::thinking("hmm"), StreamEvent::error("overloaded")]
        );

        let events = feed_all(vec![json!({"type": "error", "message": "bad things"})]);
        assert_eq!(events, vec![StreamEvent::error("bad things")]);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let events = feed_all(vec![text_delta("response.output_text.delta", "partial")]);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], StreamEvent::StreamError { .. }));
    }

    #[test]
    fn malformed_known_chunk_is_an_error() {
        let events = feed_all(vec![json!({"type": "response.output_text.delta", "delta": 7})]);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::StreamError { reason } if reason.contains("malformed")));
    }

    #[derive(Default)]
    struct RecordingLogger {
        chunks: Mutex<Vec<String>>,
    }

    impl StreamLogger for RecordingLogger {
        fn log_chunk(&self, chunk: &Chunk) {
            self.chunks.lock().unwrap().push(chunk.raw().to_string());
        }
    }

    #[tokio::test]
    async fn event_stream_logs_every_chunk() {
        let chunks = vec![
            Ok(Chunk::new(json!({"type": "response.in_progress"}))),
            Ok(Chunk::new(text_delta("response.output_text.delta", "Hi"))),
            Ok(Chunk::new(completed())),
        ];
        let logger = Arc::new(RecordingLogger::default());
        let stream = EventStream::new(Box::pin(futures::stream::iter(chunks)), logger.clone());
        let events: Vec<_> = stream.collect().await;
        assert_eq!(
            events,
            vec![StreamEvent::content("Hi"), StreamEvent::TurnComplete]
        );
        assert_eq!(logger.chunks.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn transport_error_becomes_stream_error() {
        let chunks = vec![
            Ok(Chunk::new(text_delta("response.reasoning_text.delta", "thinking"))),
            Err(Error::connection("connection reset", None)),
            Ok(Chunk::new(completed())),
        ];
        let stream = EventStream::new(
            Box::pin(futures::stream::iter(chunks)),
            Arc::new(crate::logger::NoopLogger),
        );
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], StreamEvent::StreamError { reason } if reason.contains("connection reset")));
    }
}
