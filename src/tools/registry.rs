use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::observability::{TOOL_CALLS, TOOL_DURATION, TOOL_ERRORS};
use crate::types::ToolDescriptor;

/// The result of invoking a registered tool.
///
/// Both arms carry the payload that goes back to the model; `Err` marks it as an error
/// payload built by [`error_payload`].
pub type ToolOutcome = std::result::Result<Value, Value>;

/// A callable that runs a tool against parsed arguments.
///
/// Any `Fn(&Value) -> Result<Value>` closure is a handler.
pub trait ToolHandler: Send + Sync {
    /// Run the tool.
    fn invoke(&self, arguments: &Value) -> Result<Value>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Value) -> Result<Value> + Send + Sync,
{
    fn invoke(&self, arguments: &Value) -> Result<Value> {
        self(arguments)
    }
}

/// A tool that knows its own descriptor.
pub trait Tool: Send + Sync {
    /// The descriptor advertised to the model.
    fn descriptor(&self) -> ToolDescriptor;

    /// Run the tool.
    fn call(&self, arguments: &Value) -> Result<Value>;
}

struct ToolAdapter<T: Tool>(T);

impl<T: Tool> ToolHandler for ToolAdapter<T> {
    fn invoke(&self, arguments: &Value) -> Result<Value> {
        self.0.call(arguments)
    }
}

struct Entry {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

/// Maps tool names to descriptors and handlers, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.descriptor.name))
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in tools.
    pub fn with_default_tools() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_tool(super::WorldConflicts)?;
        registry.register_tool(super::LocationRisks)?;
        registry.register_tool(super::PreparationGuidance)?;
        Ok(registry)
    }

    /// Register a handler under the descriptor's name.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<()> {
        if self.contains(&descriptor.name) {
            return Err(Error::duplicate_tool_name(descriptor.name));
        }
        self.entries.push(Entry {
            descriptor,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Register a self-describing tool.
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register(tool.descriptor(), ToolAdapter(tool))
    }

    /// The descriptors of every registered tool, in registration order.
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Returns true if a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.descriptor.name == name)
    }

    /// The number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke the named tool.
    ///
    /// Fails with `UnknownTool` if nothing is registered under `name`.  A handler that returns
    /// an error or panics yields `Ok(Err(payload))` so the conversation can continue.
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolOutcome> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .ok_or_else(|| Error::unknown_tool(name))?;

        TOOL_CALLS.click();
        let started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| entry.handler.invoke(arguments)));
        TOOL_DURATION.add(started.elapsed().as_secs_f64());

        let err = match result {
            Ok(Ok(value)) => return Ok(Ok(value)),
            Ok(Err(err)) if err.is_tool_execution() => err,
            Ok(Err(err)) => Error::tool_execution(name, err.to_string()),
            Err(panic) => Error::tool_execution(name, panic_message(panic.as_ref())),
        };
        TOOL_ERRORS.click();
        Ok(Err(error_payload(&err)))
    }
}

/// The payload returned to the model in place of a tool result when something went wrong.
pub fn error_payload(err: &Error) -> Value {
    json!({
        "error": {
            "type": err.kind(),
            "message": err.to_string(),
        }
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
