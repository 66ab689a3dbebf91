//! Diagnostic logging for stream and session activity.
//!
//! This module provides the [`StreamLogger`] trait that lets callers observe every request,
//! raw chunk, decoded event, and tool call passing through a
//! [`ChatSession`](crate::chat::ChatSession).

use serde_json::Value;

use crate::types::{Chunk, Message, ResponseCreateParams, StreamEvent};

/// A trait for observing session traffic.
///
/// Every method has an empty default, so implementors override only what they need.
/// Loggers observe; they never alter the event sequence.
///
/// # Example
///
/// ```rust,ignore
/// use warbot::{Chunk, StreamLogger};
/// use std::sync::Mutex;
///
/// struct CountingLogger {
///     chunks: Mutex<usize>,
/// }
///
/// impl StreamLogger for CountingLogger {
///     fn log_chunk(&self, _chunk: &Chunk) {
///         *self.chunks.lock().unwrap() += 1;
///     }
/// }
/// ```
pub trait StreamLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, _params: &ResponseCreateParams) {}

    /// Log a raw chunk before it is interpreted.
    fn log_chunk(&self, _chunk: &Chunk) {}

    /// Log a decoded stream event.
    fn log_event(&self, _event: &StreamEvent) {}

    /// Log a tool invocation and its outcome.
    fn log_tool_call(&self, _name: &str, _arguments: &Value, _result: &Value, _is_error: bool) {}

    /// Log a message as it is appended to history.
    fn log_message(&self, _message: &Message) {}
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl StreamLogger for NoopLogger {}

/// A logger that echoes raw chunks and tool calls to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogger;

impl StreamLogger for StderrLogger {
    fn log_request(&self, params: &ResponseCreateParams) {
        eprintln!(
            "[debug] request model={} input_items={} tools={}",
            params.model,
            params.input.len(),
            params.tools.len()
        );
    }

    fn log_chunk(&self, chunk: &Chunk) {
        eprintln!("[debug] chunk {}", chunk.raw());
    }

    fn log_tool_call(&self, name: &str, arguments: &Value, result: &Value, is_error: bool) {
        let status = if is_error { "error" } else { "ok" };
        eprintln!("[debug] tool {name} {arguments} -> {status} {result}");
    }
}
