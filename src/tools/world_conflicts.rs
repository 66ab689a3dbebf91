use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Tool, decode_input};
use crate::error::Result;
use crate::types::ToolDescriptor;

const NAME: &str = "get_world_conflicts";

/// Lists ongoing armed conflicts from a fixed snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldConflicts;

#[derive(Debug, Default, Deserialize)]
struct Input {
    #[serde(default)]
    region: Option<String>,
}

/// One ongoing conflict.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Conflict {
    /// `major_war`, `minor_war`, `conflict`, or `skirmish`.
    pub category: &'static str,
    /// Year the conflict began.
    pub start_of_conflict: &'static str,
    /// Common name of the conflict.
    pub conflict: &'static str,
    /// Continent or broad region.
    pub continent: &'static str,
    /// Affected countries or areas.
    pub location: &'static str,
}

const SNAPSHOT: &[Conflict] = &[
    Conflict {
        category: "major_war",
        start_of_conflict: "2014",
        conflict: "Russo-Ukrainian War",
        continent: "Europe",
        location: "Ukraine, Russia",
    },
    Conflict {
        category: "major_war",
        start_of_conflict: "2023",
        conflict: "Sudanese civil war",
        continent: "Africa",
        location: "Sudan",
    },
    Conflict {
        category: "major_war",
        start_of_conflict: "2023",
        conflict: "Gaza war",
        continent: "Asia (Middle East)",
        location: "Israel, Palestine, Lebanon",
    },
    Conflict {
        category: "major_war",
        start_of_conflict: "2021",
        conflict: "Myanmar civil war",
        continent: "Asia",
        location: "Myanmar",
    },
    Conflict {
        category: "minor_war",
        start_of_conflict: "2012",
        conflict: "Jihadist insurgency in the Sahel",
        continent: "Africa",
        location: "Mali, Burkina Faso, Niger",
    },
    Conflict {
        category: "minor_war",
        start_of_conflict: "2006",
        conflict: "Mexican drug war",
        continent: "Americas",
        location: "Mexico",
    },
    Conflict {
        category: "conflict",
        start_of_conflict: "2004",
        conflict: "Kivu conflict",
        continent: "Africa",
        location: "Democratic Republic of the Congo",
    },
    Conflict {
        category: "skirmish",
        start_of_conflict: "1947",
        conflict: "Kashmir conflict",
        continent: "Asia",
        location: "India, Pakistan",
    },
];

impl WorldConflicts {
    /// The conflicts whose continent or location mentions `region`, case-insensitively.
    pub fn matching(region: Option<&str>) -> Vec<Conflict> {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => {
                let region = region.to_lowercase();
                SNAPSHOT
                    .iter()
                    .filter(|c| {
                        c.continent.to_lowercase().contains(&region)
                            || c.location.to_lowercase().contains(&region)
                    })
                    .cloned()
                    .collect()
            }
            None => SNAPSHOT.to_vec(),
        }
    }
}

impl Tool for WorldConflicts {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            NAME,
            "List current world conflicts, including major wars, minor wars, conflicts and \
             skirmishes. Use for situational awareness and preparedness.",
            json!({
                "type": "object",
                "properties": {
                    "region": {
                        "type": "string",
                        "description": "Optional region filter (e.g., Europe, Middle East, Asia Pacific)."
                    }
                },
                "required": []
            }),
        )
    }

    fn call(&self, arguments: &Value) -> Result<Value> {
        let input: Input = decode_input(NAME, arguments)?;
        let conflicts = Self::matching(input.region.as_deref());
        let note = match &input.region {
            Some(region) => format!(
                "Filtered by region '{region}' (best-effort match). Stub snapshot of ongoing armed conflicts."
            ),
            None => "Stub snapshot of ongoing armed conflicts: major wars, minor wars, conflicts and skirmishes.".to_string(),
        };
        Ok(json!({
            "conflicts": conflicts,
            "note": note,
        }))
    }
}
