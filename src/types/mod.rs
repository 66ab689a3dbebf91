// Public modules
pub mod chunk;
pub mod input_item;
pub mod message;
pub mod response_create_params;
pub mod stream_event;
pub mod tool_call;
pub mod tool_descriptor;

// Re-exports
pub use chunk::Chunk;
pub use input_item::{FunctionCallItem, FunctionCallOutputItem, InputItem, InputMessage};
pub use message::{Message, MessageContent, Role, ToolCallRecord};
pub use response_create_params::{ReasoningParam, ResponseCreateParams};
pub use stream_event::StreamEvent;
pub use tool_call::{ToolArguments, ToolCall, parse_arguments};
pub use tool_descriptor::{FunctionToolParam, ToolDescriptor};
