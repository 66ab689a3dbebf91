// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod event_stream;
pub mod logger;
pub mod observability;
pub mod render;
pub mod sse;
pub mod tools;
pub mod types;

// Re-exports
pub use client::{ChunkStream, ModelTransport, OpenAi};
pub use error::{Error, Result};
pub use event_stream::{EventStream, StreamParser};
pub use logger::{NoopLogger, StderrLogger, StreamLogger};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use tools::ToolRegistry;
pub use types::*;
