//! Core chat session management.
//!
//! This module provides the `ChatSession` struct, which owns the conversation history, drives
//! each user turn through the model and the tool registry, and reports progress to a
//! [`Renderer`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use serde_json::Value;

use crate::Renderer;
use crate::chat::config::{ChatConfig, validate_model};
use crate::chat::conversation::Conversation;
use crate::client::{ChunkStream, ModelTransport, OpenAi};
use crate::error::{Error, Result};
use crate::event_stream::EventStream;
use crate::logger::{NoopLogger, StderrLogger, StreamLogger};
use crate::observability::{
    CLIENT_REQUEST_RETRIES, CLIENT_RETRY_BACKOFF, SESSION_FAILED_TURNS, SESSION_TURN_DURATION,
    SESSION_TURN_REQUESTS, SESSION_TURNS,
};
use crate::tools::{ToolOutcome, ToolRegistry, error_payload};
use crate::types::{
    Message, ReasoningParam, ResponseCreateParams, StreamEvent, ToolCall, ToolCallRecord,
    ToolDescriptor,
};

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Where a session is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for user input.
    Idle,
    /// A request is open and no event has arrived yet.
    AwaitingResponse,
    /// Thinking or content text is streaming.
    RenderingDelta,
    /// A tool call is running.
    ExecutingTool,
    /// The model produced its final content.
    TurnComplete,
    /// The turn failed and is being rolled back.
    Errored,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for new requests.
    pub model: String,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Total number of requests opened, retries included.
    pub total_requests: u64,
    /// Requests that were retried.
    pub retries: u64,
    /// Turns that ended with final content.
    pub completed_turns: u64,
    /// Turns that were rolled back.
    pub failed_turns: u64,
    /// Tool calls executed.
    pub tool_calls: u64,
    /// Tool calls whose result was an error payload.
    pub tool_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    requests: u64,
    retries: u64,
    completed_turns: u64,
    failed_turns: u64,
    tool_calls: u64,
    tool_errors: u64,
}

/// A chat session that manages conversation state and model interactions.
pub struct ChatSession<T: ModelTransport> {
    transport: T,
    registry: ToolRegistry,
    config: ChatConfig,
    conversation: Conversation,
    logger: Arc<dyn StreamLogger>,
    state: TurnState,
    counters: Counters,
}

impl ChatSession<OpenAi> {
    /// Creates a session that talks to the configured API with the built-in tools.
    pub fn from_config(config: ChatConfig) -> Result<Self> {
        let client = OpenAi::with_options(
            config.api_key.expose(),
            Some(config.base_url.clone()),
            Some(config.timeout),
        )?;
        let registry = ToolRegistry::with_default_tools()?;
        Ok(Self::new(client, registry, config))
    }
}

impl<T: ModelTransport> ChatSession<T> {
    /// Creates a new chat session.
    ///
    /// Debug configuration installs a logger that echoes raw chunks to stderr.
    pub fn new(transport: T, registry: ToolRegistry, config: ChatConfig) -> Self {
        let logger: Arc<dyn StreamLogger> = if config.debug {
            Arc::new(StderrLogger)
        } else {
            Arc::new(NoopLogger)
        };
        Self {
            transport,
            registry,
            config,
            conversation: Conversation::new(),
            logger,
            state: TurnState::Idle,
            counters: Counters::default(),
        }
    }

    /// Replaces the logger.
    pub fn with_logger(mut self, logger: Arc<dyn StreamLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Sends a user message and runs the turn to completion.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Streams the response, rendering thinking and content as it arrives
    /// 3. Executes tool calls and re-issues the request with their results
    /// 4. Adds the final assistant content to history and returns it
    ///
    /// # Errors
    ///
    /// On any failure the history is rolled back to where it was before the call, the error
    /// is shown on the renderer, and the session returns to idle.
    pub async fn send_message(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<String> {
        let previous_len = self.conversation.len();
        let started = Instant::now();
        SESSION_TURNS.click();

        self.push(Message::user(user_input));

        match self.run_turn(renderer).await {
            Ok(content) => {
                self.state = TurnState::TurnComplete;
                renderer.finish_response();
                self.counters.completed_turns += 1;
                SESSION_TURN_DURATION.add(started.elapsed().as_secs_f64());
                self.state = TurnState::Idle;
                Ok(content)
            }
            Err(err) => {
                self.state = TurnState::Errored;
                self.conversation.rollback(previous_len);
                self.counters.failed_turns += 1;
                SESSION_FAILED_TURNS.click();
                renderer.print_error(&err.to_string());
                self.state = TurnState::Idle;
                Err(err)
            }
        }
    }

    async fn run_turn(&mut self, renderer: &mut dyn Renderer) -> Result<String> {
        let mut rounds = 0u32;
        loop {
            let params = self.build_request();
            self.logger.log_request(&params);
            self.state = TurnState::AwaitingResponse;
            let chunks = self.open_with_retry(&params).await?;
            let mut events = EventStream::new(chunks, Arc::clone(&self.logger));

            let mut content = String::new();
            let mut executed: Vec<(ToolCallRecord, ToolOutcome)> = Vec::new();
            let mut saw_tool_call = false;
            let mut complete = false;

            while let Some(event) = events.next().await {
                match event {
                    StreamEvent::ThinkingDelta { text } => {
                        self.state = TurnState::RenderingDelta;
                        renderer.print_thinking(&text);
                    }
                    StreamEvent::ContentDelta { text } => {
                        self.state = TurnState::RenderingDelta;
                        if !saw_tool_call {
                            renderer.print_text(&text);
                        }
                        content.push_str(&text);
                    }
                    StreamEvent::ToolCallStart { id, name } => {
                        saw_tool_call = true;
                        renderer.start_tool_use(&name, &id);
                    }
                    StreamEvent::ToolCallArgsDelta { text, .. } => {
                        renderer.print_tool_input(&text);
                    }
                    StreamEvent::ToolCallComplete { call } => {
                        saw_tool_call = true;
                        renderer.finish_tool_use();
                        self.state = TurnState::ExecutingTool;
                        let outcome = self.execute_tool_call(&call);
                        let (payload, is_error) = match &outcome {
                            Ok(payload) => (payload, false),
                            Err(payload) => (payload, true),
                        };
                        renderer.start_tool_result(&call.call_id, is_error);
                        renderer.print_tool_result_text(&payload.to_string());
                        renderer.finish_tool_result();
                        executed.push((call.to_record(), outcome));
                    }
                    StreamEvent::TurnComplete => {
                        complete = true;
                        break;
                    }
                    StreamEvent::StreamError { reason } => {
                        return Err(Error::streaming(reason, None));
                    }
                }
            }
            if !complete {
                return Err(Error::streaming(
                    "stream ended before the response completed",
                    None,
                ));
            }

            if executed.is_empty() {
                self.push(Message::assistant(content.clone()));
                return Ok(content);
            }

            rounds += 1;
            if rounds > self.config.max_tool_rounds {
                return Err(Error::tool_loop(self.config.max_tool_rounds));
            }
            let records = executed.iter().map(|(record, _)| record.clone()).collect();
            self.push(Message::assistant_tool_calls(records));
            for (record, outcome) in executed {
                let payload = match outcome {
                    Ok(payload) | Err(payload) => payload,
                };
                self.push(Message::tool_result(record.call_id, payload));
            }
        }
    }

    fn build_request(&self) -> ResponseCreateParams {
        let tools = self
            .registry
            .describe_all()
            .iter()
            .map(ToolDescriptor::to_param)
            .collect();
        ResponseCreateParams::new(&self.config.model, self.conversation.input_items())
            .with_instructions(self.config.system_prompt.clone())
            .with_tools(tools)
            .with_reasoning(
                self.config
                    .reasoning_summary
                    .clone()
                    .map(ReasoningParam::with_summary),
            )
    }

    async fn open_with_retry(&mut self, params: &ResponseCreateParams) -> Result<ChunkStream> {
        let mut attempt = 0u32;
        loop {
            self.counters.requests += 1;
            SESSION_TURN_REQUESTS.click();
            match self.transport.open_stream(params).await {
                Ok(stream) => return Ok(stream),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(&err, attempt);
                    self.counters.retries += 1;
                    CLIENT_REQUEST_RETRIES.click();
                    CLIENT_RETRY_BACKOFF.add(delay.as_secs_f64());
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn execute_tool_call(&mut self, call: &ToolCall) -> ToolOutcome {
        self.counters.tool_calls += 1;
        let outcome = match call.parsed_arguments() {
            Ok(arguments) => match self.registry.invoke(&call.name, arguments) {
                Ok(outcome) => outcome,
                Err(err) => Err(error_payload(&err)),
            },
            Err(err) => Err(error_payload(&err)),
        };
        let arguments = match call.parsed_arguments() {
            Ok(arguments) => arguments.clone(),
            Err(_) => Value::String(call.raw_arguments.clone()),
        };
        match &outcome {
            Ok(payload) => self
                .logger
                .log_tool_call(&call.name, &arguments, payload, false),
            Err(payload) => {
                self.counters.tool_errors += 1;
                self.logger
                    .log_tool_call(&call.name, &arguments, payload, true);
            }
        }
        outcome
    }

    fn push(&mut self, message: Message) {
        self.logger.log_message(&message);
        self.conversation.push(message);
    }

    /// Changes the model used for subsequent requests.
    pub fn set_model(&mut self, model: &str) -> Result<()> {
        self.config.model = validate_model(model)?;
        Ok(())
    }

    /// Turns raw-chunk echo on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
        self.logger = if debug {
            Arc::new(StderrLogger)
        } else {
            Arc::new(NoopLogger)
        };
    }

    /// Returns the current model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the conversation history.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Returns where the session is within a turn.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.conversation.len(),
            total_requests: self.counters.requests,
            retries: self.counters.retries,
            completed_turns: self.counters.completed_turns,
            failed_turns: self.counters.failed_turns,
            tool_calls: self.counters.tool_calls,
            tool_errors: self.counters.tool_errors,
        }
    }
}

/// Backoff before retry number `attempt` (starting at 1).
///
/// A server-supplied `retry-after` wins; otherwise the delay doubles from 250ms up to 8s.
fn retry_delay(err: &Error, attempt: u32) -> Duration {
    let hinted = match err {
        Error::RateLimit { retry_after, .. } | Error::ServiceUnavailable { retry_after, .. } => {
            *retry_after
        }
        _ => None,
    };
    match hinted {
        Some(secs) => Duration::from_secs(secs).min(MAX_BACKOFF),
        None => INITIAL_BACKOFF
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
            .min(MAX_BACKOFF),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let err = Error::connection("reset", None);
        assert_eq!(retry_delay(&err, 1), Duration::from_millis(250));
        assert_eq!(retry_delay(&err, 2), Duration::from_millis(500));
        assert_eq!(retry_delay(&err, 3), Duration::from_secs(1));
        assert_eq!(retry_delay(&err, 10), MAX_BACKOFF);
    }

    #[test]
    fn backoff_honors_retry_after() {
        let err = Error::rate_limit("slow down", Some(3));
        assert_eq!(retry_delay(&err, 1), Duration::from_secs(3));
        let err = Error::service_unavailable("busy", Some(600));
        assert_eq!(retry_delay(&err, 1), MAX_BACKOFF);
    }
}
