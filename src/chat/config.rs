//! Configuration types for the chat application.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an optional YAML file,
//! the environment, then command-line flags parsed via `arrrg`.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;

use crate::client::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "OPENAI_APIKEY"];

/// Environment variable overriding the model.
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

/// Default number of retries when opening a request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default limit on tool rounds within one user turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 8;

/// Reasoning summary detail requested unless configured otherwise.
pub const DEFAULT_REASONING_SUMMARY: &str = "auto";

/// The built-in system prompt.
pub const SYSTEM_PROMPT: &str = "You are an assistant that helps users understand major world \
conflicts, assess risks for specific locations, and prepare for emergency scenarios such as \
utilities interruption, internet loss, and armed conflict. Be concise, clear, and prioritize \
actionable guidance.

CRITICAL RULES FOR TOOL USAGE:
1. When you receive tool results, interpret the JSON data and present it in a clear, \
human-readable format. Do NOT dump raw JSON.
2. You MUST ONLY use information from the tool results. NEVER supplement with your own \
knowledge or add information not present in the tool results.
3. If the tool returns limited data, present ONLY what the tool returned in a formatted way. \
Do not add conflicts, details, or information from your training data.
4. Format the tool data nicely (use bullet points, clear structure, etc.) but only include \
the exact data from the tool results.";

/// Command-line arguments for the warbot tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gpt-5-mini)", "MODEL")]
    pub model: Option<String>,

    /// API root for OpenAI-compatible endpoints.
    #[arrrg(optional, "Custom base URL for OpenAI-compatible endpoints", "URL")]
    pub base_url: Option<String>,

    /// Echo raw stream chunks to stderr.
    #[arrrg(flag, "Enable debug logging of raw stream chunks")]
    pub debug: bool,

    /// A first question to send before the interactive loop.
    #[arrrg(optional, "First question to send before the interactive loop", "TEXT")]
    pub question: Option<String>,

    /// Path to a YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Settings read from a YAML configuration file.  Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_tool_rounds: Option<u32>,
    /// Absent keeps the default; `null` or `none` turns summaries off.
    #[serde(deserialize_with = "explicit")]
    pub reasoning_summary: Option<Option<String>>,
    pub debug: Option<bool>,
    pub color: Option<bool>,
}

fn explicit<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

impl FileConfig {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(
                format!("cannot read {}: {e}", path.display()),
                Some("config".to_string()),
            )
        })?;
        Self::parse(&text).map_err(|e| {
            Error::configuration(
                format!("invalid {}: {e}", path.display()),
                Some("config".to_string()),
            )
        })
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// An API key.  Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key itself.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The bearer credential.
    pub api_key: Credential,

    /// The model to use for generating responses.
    pub model: String,

    /// The API root; always ends with `/`.
    pub base_url: String,

    /// Instructions sent with every request.
    pub system_prompt: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Retries when opening a request fails with a retryable error.
    pub max_retries: u32,

    /// Tool rounds allowed within one user turn.
    pub max_tool_rounds: u32,

    /// Requested reasoning summary detail, if any.
    pub reasoning_summary: Option<String>,

    /// Echo raw chunks and tool calls to stderr.
    pub debug: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gpt-5-mini
    /// - Base URL: https://api.openai.com/v1/
    /// - Timeout: 120 seconds
    /// - Retries: 2
    /// - Tool rounds: 8
    /// - Reasoning summary: auto
    /// - Color: enabled
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Credential::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            reasoning_summary: Some(DEFAULT_REASONING_SUMMARY.to_string()),
            debug: false,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the tool-round limit.
    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Sets the reasoning summary detail.
    pub fn with_reasoning_summary(mut self, summary: Option<String>) -> Self {
        self.reasoning_summary = summary;
        self
    }

    /// Enables or disables debug output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Resolve configuration from the process environment and command line.
    pub fn from_env(args: &ChatArgs) -> Result<Self> {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from `args` and an environment lookup.
    ///
    /// Fails with a configuration error when the key is missing or a setting is invalid.
    pub fn resolve<F>(args: &ChatArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let file = match &args.config {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };

        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| lookup(*name))
            .ok_or_else(|| {
                Error::configuration(
                    "OpenAI API key is required; set OPENAI_API_KEY in the environment",
                    Some(API_KEY_ENV_VARS[0].to_string()),
                )
            })?;

        let model = args
            .model
            .clone()
            .or_else(|| lookup(MODEL_ENV_VAR))
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = args
            .base_url
            .clone()
            .or_else(|| lookup(BASE_URL_ENV_VAR))
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match file.timeout_secs {
            Some(0) => {
                return Err(Error::configuration(
                    "timeout must be at least one second",
                    Some("timeout_secs".to_string()),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };
        let max_tool_rounds = match file.max_tool_rounds {
            Some(0) => {
                return Err(Error::configuration(
                    "at least one tool round is required",
                    Some("max_tool_rounds".to_string()),
                ));
            }
            Some(rounds) => rounds,
            None => DEFAULT_MAX_TOOL_ROUNDS,
        };

        Ok(Self {
            api_key: Credential::new(api_key),
            model: validate_model(&model)?,
            base_url: normalize_base_url(&base_url)?,
            system_prompt: Some(file.system_prompt.unwrap_or_else(|| SYSTEM_PROMPT.to_string())),
            timeout,
            max_retries: file.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            max_tool_rounds,
            reasoning_summary: match file.reasoning_summary {
                None => Some(DEFAULT_REASONING_SUMMARY.to_string()),
                Some(summary) => summary
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none")),
            },
            debug: args.debug || file.debug.unwrap_or(false),
            use_color: !args.no_color && file.color.unwrap_or(true),
        })
    }
}

/// Check a model identifier and return it trimmed.
pub fn validate_model(model: &str) -> Result<String> {
    let model = model.trim();
    if model.is_empty() {
        return Err(Error::configuration(
            "model name must not be empty",
            Some("model".to_string()),
        ));
    }
    if model.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::configuration(
            format!("invalid model name {model:?}"),
            Some("model".to_string()),
        ));
    }
    Ok(model.to_string())
}

/// Check an API root and return it with a trailing `/`.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let url = url::Url::parse(raw.trim()).map_err(|e| {
        Error::configuration(
            format!("invalid base URL {raw:?}: {e}"),
            Some("base_url".to_string()),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(
            format!("base URL must use http or https, not {}", url.scheme()),
            Some("base_url".to_string()),
        ));
    }
    let mut url = url.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}
