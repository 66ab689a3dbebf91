use serde_json::Value;

use crate::error::Result;

/// One raw record of the response stream, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    event: Option<String>,
    data: Value,
    raw: String,
}

impl Chunk {
    /// Wrap an already-decoded record.
    pub fn new(data: Value) -> Self {
        let raw = data.to_string();
        Self {
            event: None,
            data,
            raw,
        }
    }

    /// Decode a record from the text of an SSE `data:` field.
    pub fn from_sse(event: Option<String>, raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let data = serde_json::from_str(&raw)?;
        Ok(Self { event, data, raw })
    }

    /// The discriminant of the record.
    ///
    /// This is the `type` field of the payload, falling back to the SSE event name.
    pub fn kind(&self) -> Option<&str> {
        self.data
            .get("type")
            .and_then(Value::as_str)
            .or(self.event.as_deref())
    }

    /// The SSE event name, if the server sent one.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// The decoded payload.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The payload text exactly as it arrived.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl From<Value> for Chunk {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_prefers_payload_type() {
        let chunk = Chunk::from_sse(
            Some("response.output_text.delta".to_string()),
            r#"{"type":"response.output_text.delta","delta":"Hi"}"#,
        )
        .unwrap();
        assert_eq!(chunk.kind(), Some("response.output_text.delta"));
        assert_eq!(chunk.raw(), r#"{"type":"response.output_text.delta","delta":"Hi"}"#);
    }

    #[test]
    fn kind_falls_back_to_event_name() {
        let chunk = Chunk::from_sse(Some("error".to_string()), r#"{"message":"boom"}"#).unwrap();
        assert_eq!(chunk.kind(), Some("error"));
        assert_eq!(Chunk::new(json!({"delta": "x"})).kind(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Chunk::from_sse(None, "{not json").is_err());
    }
}
