//! Error types for warbot.
//!
//! One error enum covers the whole crate: transport failures while talking to
//! the model API, tool dispatch failures that are fed back to the model, and
//! configuration problems that abort startup.

use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;
use std::sync::Arc;

/// The main error type for warbot.
#[derive(Clone, Debug)]
pub enum Error {
    /// A generic API error occurred.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error type string from the API.
        error_type: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Request ID for debugging and support.
        request_id: Option<String>,
    },

    /// Authentication error.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Rate limit exceeded.
    RateLimit {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// Bad request due to invalid parameters.
    BadRequest {
        /// Human-readable error message.
        message: String,
        /// Parameter that caused the error.
        param: Option<String>,
    },

    /// API timeout error.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Server returned a 500 internal error.
    InternalServer {
        /// Human-readable error message.
        message: String,
        /// Request ID for debugging and support.
        request_id: Option<String>,
    },

    /// Server is overloaded or unavailable.
    ServiceUnavailable {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// Error during JSON or YAML serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// The event stream was interrupted or could not be framed.
    Streaming {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Encoding/decoding error.
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Startup configuration is unusable (missing credential, bad model name, bad URL).
    Configuration {
        /// Human-readable error message.
        message: String,
        /// The setting at fault.
        setting: Option<String>,
    },

    /// A tool with the same name is already registered.
    DuplicateToolName {
        /// The offending tool name.
        name: String,
    },

    /// The model asked for a tool that is not registered.
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// The accumulated tool-call argument text is not valid JSON.
    MalformedToolArguments {
        /// The tool call identifier.
        call_id: String,
        /// The raw argument text as received.
        arguments: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A tool handler failed.
    ToolExecution {
        /// The tool name.
        name: String,
        /// Human-readable error message.
        message: String,
    },

    /// A single user turn called tools more times than allowed.
    ToolLoop {
        /// The number of tool rounds taken.
        rounds: u32,
    },

    /// Unknown error.
    Unknown {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(
        status_code: u16,
        error_type: Option<String>,
        message: String,
        request_id: Option<String>,
    ) -> Self {
        Error::Api {
            status_code,
            error_type,
            message,
            request_id,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new bad request error.
    pub fn bad_request(message: impl Into<String>, param: Option<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            param,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new internal server error.
    pub fn internal_server(message: impl Into<String>, request_id: Option<String>) -> Self {
        Error::InternalServer {
            message: message.into(),
            request_id,
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new streaming error.
    pub fn streaming(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Streaming {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>, setting: Option<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            setting,
        }
    }

    /// Creates a new duplicate tool name error.
    pub fn duplicate_tool_name(name: impl Into<String>) -> Self {
        Error::DuplicateToolName { name: name.into() }
    }

    /// Creates a new unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Error::UnknownTool { name: name.into() }
    }

    /// Creates a new malformed tool arguments error.
    pub fn malformed_tool_arguments(
        call_id: impl Into<String>,
        arguments: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedToolArguments {
            call_id: call_id.into(),
            arguments: arguments.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new tool execution error.
    pub fn tool_execution(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolExecution {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new tool loop error.
    pub fn tool_loop(rounds: u32) -> Self {
        Error::ToolLoop { rounds }
    }

    /// Creates a new unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Error::Unknown {
            message: message.into(),
        }
    }

    /// Returns true if this error happened while reading the event stream.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Error::Streaming { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Returns true if this error names an unregistered tool.
    pub fn is_unknown_tool(&self) -> bool {
        matches!(self, Error::UnknownTool { .. })
    }

    /// Returns true if this error is a duplicate tool registration.
    pub fn is_duplicate_tool_name(&self) -> bool {
        matches!(self, Error::DuplicateToolName { .. })
    }

    /// Returns true if this error is unparseable tool-call arguments.
    pub fn is_malformed_tool_arguments(&self) -> bool {
        matches!(self, Error::MalformedToolArguments { .. })
    }

    /// Returns true if this error came out of a tool handler.
    pub fn is_tool_execution(&self) -> bool {
        matches!(self, Error::ToolExecution { .. })
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status_code, .. } => {
                matches!(status_code, 408 | 409 | 429 | 500..=599)
            }
            Error::Timeout { .. } => true,
            Error::Connection { .. } => true,
            Error::RateLimit { .. } => true,
            Error::ServiceUnavailable { .. } => true,
            Error::InternalServer { .. } => true,
            _ => false,
        }
    }

    /// A short machine-readable label for the error kind.
    ///
    /// This is the `type` field of the error payload sent back to the model.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Api { .. } => "api_error",
            Error::Authentication { .. } => "authentication_error",
            Error::RateLimit { .. } => "rate_limit_error",
            Error::BadRequest { .. } => "bad_request",
            Error::Timeout { .. } => "timeout",
            Error::Connection { .. } => "connection_error",
            Error::InternalServer { .. } => "internal_server_error",
            Error::ServiceUnavailable { .. } => "service_unavailable",
            Error::Serialization { .. } => "serialization_error",
            Error::Io { .. } => "io_error",
            Error::HttpClient { .. } => "http_client_error",
            Error::Url { .. } => "url_error",
            Error::Streaming { .. } => "streaming_error",
            Error::Encoding { .. } => "encoding_error",
            Error::Configuration { .. } => "configuration_error",
            Error::DuplicateToolName { .. } => "duplicate_tool_name",
            Error::UnknownTool { .. } => "unknown_tool",
            Error::MalformedToolArguments { .. } => "malformed_tool_arguments",
            Error::ToolExecution { .. } => "tool_execution_error",
            Error::ToolLoop { .. } => "tool_loop",
            Error::Unknown { .. } => "unknown_error",
        }
    }

    /// Returns the request ID associated with this error, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api { request_id, .. } => request_id.as_deref(),
            Error::InternalServer { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                message,
                error_type,
                request_id,
                ..
            } => {
                if let Some(error_type) = error_type {
                    if let Some(request_id) = request_id {
                        write!(f, "{error_type}: {message} (Request ID: {request_id})")
                    } else {
                        write!(f, "{error_type}: {message}")
                    }
                } else if let Some(request_id) = request_id {
                    write!(f, "API error: {message} (Request ID: {request_id})")
                } else {
                    write!(f, "API error: {message}")
                }
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Rate limit exceeded: {message}")
                }
            }
            Error::BadRequest { message, param } => {
                if let Some(param) = param {
                    write!(f, "Bad request: {message} (parameter: {param})")
                } else {
                    write!(f, "Bad request: {message}")
                }
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::InternalServer {
                message,
                request_id,
            } => {
                if let Some(request_id) = request_id {
                    write!(
                        f,
                        "Internal server error: {message} (Request ID: {request_id})"
                    )
                } else {
                    write!(f, "Internal server error: {message}")
                }
            }
            Error::ServiceUnavailable {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Service unavailable: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Service unavailable: {message}")
                }
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Streaming { message, .. } => {
                write!(f, "Streaming error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
            Error::Configuration { message, setting } => {
                if let Some(setting) = setting {
                    write!(f, "Configuration error: {message} (setting: {setting})")
                } else {
                    write!(f, "Configuration error: {message}")
                }
            }
            Error::DuplicateToolName { name } => {
                write!(f, "Tool '{name}' is already registered")
            }
            Error::UnknownTool { name } => {
                write!(f, "Tool '{name}' is not registered")
            }
            Error::MalformedToolArguments {
                call_id, reason, ..
            } => {
                write!(f, "Malformed arguments for tool call {call_id}: {reason}")
            }
            Error::ToolExecution { name, message } => {
                write!(f, "Tool '{name}' failed: {message}")
            }
            Error::ToolLoop { rounds } => {
                write!(f, "Gave up after {rounds} consecutive tool rounds")
            }
            Error::Unknown { message } => {
                write!(f, "Unknown error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Streaming { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Encoding { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::serialization(format!("YAML error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::encoding(format!("UTF-8 error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for warbot operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(Error::timeout("slow", Some(1.0)).is_retryable());
        assert!(Error::connection("reset", None).is_retryable());
        assert!(Error::api(429, None, "busy".to_string(), None).is_retryable());
        assert!(Error::api(503, None, "down".to_string(), None).is_retryable());
        assert!(!Error::api(400, None, "bad".to_string(), None).is_retryable());
        assert!(!Error::streaming("dropped", None).is_retryable());
        assert!(!Error::unknown_tool("nope").is_retryable());
    }

    #[test]
    fn tool_errors_display() {
        assert_eq!(
            Error::unknown_tool("launch_missiles").to_string(),
            "Tool 'launch_missiles' is not registered"
        );
        assert_eq!(
            Error::duplicate_tool_name("get_world_conflicts").to_string(),
            "Tool 'get_world_conflicts' is already registered"
        );
        let err = Error::malformed_tool_arguments("call_1", "{\"a\":", "EOF while parsing");
        assert!(err.is_malformed_tool_arguments());
        assert_eq!(
            err.to_string(),
            "Malformed arguments for tool call call_1: EOF while parsing"
        );
    }

    #[test]
    fn configuration_display_names_setting() {
        let err = Error::configuration("API key is required", Some("OPENAI_API_KEY".to_string()));
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Configuration error: API key is required (setting: OPENAI_API_KEY)"
        );
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(Error::unknown_tool("x").kind(), "unknown_tool");
        assert_eq!(Error::tool_execution("x", "boom").kind(), "tool_execution_error");
        assert_eq!(
            Error::malformed_tool_arguments("c", "", "r").kind(),
            "malformed_tool_arguments"
        );
    }

    #[test]
    fn api_errors_expose_status_and_request_id() {
        let err = Error::api(
            418,
            Some("teapot_error".to_string()),
            "short and stout".to_string(),
            Some("req_123".to_string()),
        );
        assert_eq!(err.status_code(), Some(418));
        assert_eq!(err.request_id(), Some("req_123"));
        assert_eq!(
            err.to_string(),
            "teapot_error: short and stout (Request ID: req_123)"
        );

        let err = Error::internal_server("boom", Some("req_500".to_string()));
        assert_eq!(err.request_id(), Some("req_500"));
        assert_eq!(err.status_code(), None);
        assert_eq!(Error::unknown_tool("x").request_id(), None);
    }

    #[test]
    fn io_yaml_and_url_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "io_error");
        assert!(std::error::Error::source(&err).is_some());

        let err: Error = serde_yaml::from_str::<u32>("[").unwrap_err().into();
        assert_eq!(err.kind(), "serialization_error");

        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.kind(), "url_error");
        assert!(!err.is_retryable());
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
