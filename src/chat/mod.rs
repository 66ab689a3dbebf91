//! Interactive chat sessions.
//!
//! This module provides the session layer the `warbot` binary is built on:
//!
//! - Streaming responses with thinking text shown apart from the answer
//! - Tool calls dispatched through a [`ToolRegistry`](crate::tools::ToolRegistry)
//! - Multi-turn history that is rolled back when a turn fails
//! - Slash commands for session control
//!
//! # Architecture
//!
//! - `config`: CLI arguments, config files, and environment resolution
//! - `session`: the turn loop and retry policy
//! - `conversation`: the ordered message history
//! - `commands`: slash command parsing

mod commands;
mod config;
mod conversation;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    API_KEY_ENV_VARS, BASE_URL_ENV_VAR, ChatArgs, ChatConfig, Credential, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL, FileConfig, MODEL_ENV_VAR, SYSTEM_PROMPT,
    normalize_base_url, validate_model,
};
pub use conversation::Conversation;
pub use session::{ChatSession, SessionStats, TurnState};
