use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Tool, decode_input};
use crate::error::Result;
use crate::types::ToolDescriptor;

const NAME: &str = "get_preparation_guidance";

/// Produces stub preparation guidance for an emergency scenario.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreparationGuidance;

#[derive(Debug, Deserialize)]
struct Input {
    scenario: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Serialize)]
struct Guidance {
    scenario: String,
    location: Option<String>,
    immediate_actions: Vec<&'static str>,
    short_term: Vec<&'static str>,
    long_term: Vec<&'static str>,
    supplies: Vec<&'static str>,
    communication: Vec<&'static str>,
    evacuation: Vec<&'static str>,
    note: &'static str,
}

impl Guidance {
    fn baseline(scenario: String, location: Option<String>) -> Self {
        Self {
            scenario,
            location,
            immediate_actions: vec![
                "Ensure communication plan with household.",
                "Charge essential devices and prepare backup power if available.",
            ],
            short_term: vec![
                "Stock 72-hour supply of water and non-perishable food.",
                "Maintain basic medical kit and necessary prescriptions.",
            ],
            long_term: vec![
                "Establish redundant communication channels (offline copies, radio).",
                "Diversify critical supplies and consider community coordination.",
            ],
            supplies: vec![
                "Water, food, first aid, power banks, flashlights, radio, copies of documents.",
            ],
            communication: vec![
                "Predefine meet-up points and check-in cadence.",
                "Keep written contact lists and offline maps.",
            ],
            evacuation: vec![
                "Identify evacuation routes and transportation options.",
                "Prepare a go-bag with essentials and documents.",
            ],
            note: "Stub guidance; refine with scenario-specific and location-specific intelligence.",
        }
    }
}

impl Tool for PreparationGuidance {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            NAME,
            "Provide preparation guidance for specific scenarios such as utilities interruption, \
             internet loss, armed conflict, or natural disasters.",
            json!({
                "type": "object",
                "properties": {
                    "scenario": {
                        "type": "string",
                        "description": "Scenario type (utilities interruption, internet loss, armed conflict, natural disaster, etc.)."
                    },
                    "location": {
                        "type": "string",
                        "description": "Optional location context to tailor guidance."
                    }
                },
                "required": ["scenario"]
            }),
        )
    }

    fn call(&self, arguments: &Value) -> Result<Value> {
        let input: Input = decode_input(NAME, arguments)?;
        let scenario = input.scenario.to_lowercase();
        let mut guidance = Guidance::baseline(input.scenario, input.location);
        if scenario.contains("utilities") {
            guidance
                .immediate_actions
                .push("Fill bathtubs and containers with water if safe to do so.");
        }
        if scenario.contains("internet") {
            guidance
                .communication
                .push("Prepare offline backups of critical info and contacts.");
        }
        if scenario.contains("conflict") || scenario.contains("armed") {
            guidance
                .evacuation
                .push("Stay informed on local advisories; avoid high-risk areas.");
        }
        Ok(serde_json::to_value(guidance)?)
    }
}
