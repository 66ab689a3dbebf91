use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ToolCallRecord;

/// The arguments of a completed tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolArguments {
    /// The argument text parsed as JSON.
    Parsed {
        /// The parsed argument record.
        value: Value,
    },

    /// The argument text could not be parsed.
    Malformed {
        /// Why parsing failed.
        reason: String,
    },
}

/// A tool call whose argument stream has finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Stream identifier; argument deltas are keyed by it.
    pub id: String,

    /// Correlation identifier echoed back with the tool result.
    pub call_id: String,

    /// The tool name.
    pub name: String,

    /// The accumulated argument text, exactly as received.
    pub raw_arguments: String,

    /// The parsed arguments or the reason they could not be parsed.
    pub arguments: ToolArguments,
}

impl ToolCall {
    /// Finalize a tool call from its accumulated argument text.
    pub fn complete(
        id: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        let raw_arguments = raw_arguments.into();
        let arguments = match parse_arguments(&raw_arguments) {
            Ok(value) => ToolArguments::Parsed { value },
            Err(err) => ToolArguments::Malformed {
                reason: err.to_string(),
            },
        };
        Self {
            id: id.into(),
            call_id: call_id.into(),
            name: name.into(),
            raw_arguments,
            arguments,
        }
    }

    /// Returns the parsed arguments, or `MalformedToolArguments`.
    pub fn parsed_arguments(&self) -> Result<&Value> {
        match &self.arguments {
            ToolArguments::Parsed { value } => Ok(value),
            ToolArguments::Malformed { reason } => Err(Error::malformed_tool_arguments(
                self.call_id.clone(),
                self.raw_arguments.clone(),
                reason.clone(),
            )),
        }
    }

    /// Returns true if the arguments parsed.
    pub fn is_well_formed(&self) -> bool {
        matches!(self.arguments, ToolArguments::Parsed { .. })
    }

    /// The record stored on the assistant message that made this call.
    pub fn to_record(&self) -> ToolCallRecord {
        ToolCallRecord::new(
            self.call_id.clone(),
            self.name.clone(),
            self.raw_arguments.clone(),
        )
    }
}

/// Parse accumulated tool-call argument text.
///
/// Blank text is an empty argument record.
pub fn parse_arguments(text: &str) -> std::result::Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text)
}
