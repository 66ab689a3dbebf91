use serde::{Deserialize, Serialize};

use crate::types::ToolCall;

/// A typed event decoded from the response stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental reasoning text.
    ThinkingDelta {
        /// The text fragment.
        text: String,
    },

    /// Incremental output text.
    ContentDelta {
        /// The text fragment.
        text: String,
    },

    /// The model began a tool call.
    ToolCallStart {
        /// Stream identifier of the call.
        id: String,
        /// The tool name.
        name: String,
    },

    /// A fragment of tool-call argument text.
    ToolCallArgsDelta {
        /// Stream identifier of the call.
        id: String,
        /// The text fragment.
        text: String,
    },

    /// A tool call's arguments are complete.
    ToolCallComplete {
        /// The finalized call.
        call: ToolCall,
    },

    /// The response finished.
    TurnComplete,

    /// The stream failed; no further events follow.
    StreamError {
        /// Why the stream failed.
        reason: String,
    },
}

impl StreamEvent {
    /// Create a thinking delta.
    pub fn thinking(text: impl Into<String>) -> Self {
        StreamEvent::ThinkingDelta { text: text.into() }
    }

    /// Create a content delta.
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::ContentDelta { text: text.into() }
    }

    /// Create a stream error.
    pub fn error(reason: impl Into<String>) -> Self {
        StreamEvent::StreamError {
            reason: reason.into(),
        }
    }

    /// Returns the stream identifier this event belongs to, if it is a tool-call event.
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            StreamEvent::ToolCallStart { id, .. } => Some(id),
            StreamEvent::ToolCallArgsDelta { id, .. } => Some(id),
            StreamEvent::ToolCallComplete { call } => Some(&call.id),
            _ => None,
        }
    }

    /// Returns true for the events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::TurnComplete | StreamEvent::StreamError { .. }
        )
    }
}
