use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Tool, decode_input};
use crate::error::{Error, Result};
use crate::types::ToolDescriptor;

const NAME: &str = "assess_location_risks";

/// Produces a stub risk assessment for a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationRisks;

#[derive(Debug, Deserialize)]
struct Input {
    location: String,
}

#[derive(Debug, Serialize)]
struct Risk {
    category: &'static str,
    level: &'static str,
    notes: &'static str,
}

#[derive(Debug, Serialize)]
struct Assessment {
    location: String,
    risks: Vec<Risk>,
    note: &'static str,
}

impl Tool for LocationRisks {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            NAME,
            "Assess risks for a specified location, including proximity to conflicts, \
             infrastructure stability, and other relevant factors.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City, country, or coordinates to assess risks for."
                    }
                },
                "required": ["location"]
            }),
        )
    }

    fn call(&self, arguments: &Value) -> Result<Value> {
        let input: Input = decode_input(NAME, arguments)?;
        let location = input.location.trim();
        if location.is_empty() {
            return Err(Error::tool_execution(NAME, "location must not be empty"));
        }
        let assessment = Assessment {
            location: location.to_string(),
            risks: vec![
                Risk {
                    category: "armed_conflict",
                    level: "medium",
                    notes: "No active conflict nearby.",
                },
                Risk {
                    category: "infrastructure",
                    level: "medium",
                    notes: "Potential for utilities interruptions; keep backup power and water.",
                },
                Risk {
                    category: "digital",
                    level: "medium",
                    notes: "Possible internet throttling or outages.",
                },
            ],
            note: "Stub data; integrate geocoding and threat intelligence sources for real assessments.",
        };
        Ok(serde_json::to_value(assessment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_covers_three_categories() {
        let result = LocationRisks.call(&json!({"location": "Kyiv"})).unwrap();
        assert_eq!(result["location"], "Kyiv");
        let categories: Vec<_> = result["risks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["category"].as_str().unwrap())
            .collect();
        assert_eq!(categories, vec!["armed_conflict", "infrastructure", "digital"]);
    }

    #[test]
    fn location_is_required() {
        assert!(LocationRisks.call(&json!({})).unwrap_err().is_tool_execution());
        assert!(
            LocationRisks
                .call(&json!({"location": "  "}))
                .unwrap_err()
                .is_tool_execution()
        );
    }
}
