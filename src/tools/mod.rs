//! Tool dispatch and the built-in stub tools.

mod location_risks;
mod preparation_guidance;
mod registry;
mod world_conflicts;

pub use location_risks::LocationRisks;
pub use preparation_guidance::PreparationGuidance;
pub use registry::{Tool, ToolHandler, ToolOutcome, ToolRegistry, error_payload};
pub use world_conflicts::{Conflict, WorldConflicts};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode a tool's typed input from its argument record.
pub(crate) fn decode_input<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T> {
    T::deserialize(arguments)
        .map_err(|e| Error::tool_execution(tool, format!("invalid arguments: {e}")))
}
