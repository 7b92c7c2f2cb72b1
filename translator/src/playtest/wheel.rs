//! Quick-cast wheel bindings: wheel → slot → glyph-id chain.

use serde::{Deserialize, Serialize};

pub const ABILITY_WHEEL: &str = "ability";
pub const COMM_WHEEL: &str = "textless_comm";

pub const SOURCE_QUICK_CAST: &str = "quick_cast";
pub const SOURCE_TEXTLESS_COMM: &str = "textless_comm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelSlot {
    pub slot: String,
    pub glyph_ids: Vec<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wheel {
    pub wheel: String,
    pub slots: Vec<WheelSlot>,
}

/// Template-bound command wheels. Players can only fire these chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelBindings {
    pub wheels: Vec<Wheel>,
}

fn slot(name: &str, glyph_ids: [&str; 3], label: &str) -> WheelSlot {
    WheelSlot {
        slot: name.to_string(),
        glyph_ids: glyph_ids.iter().map(|id| id.to_string()).collect(),
        label: label.to_string(),
    }
}

impl Default for WheelBindings {
    fn default() -> Self {
        Self {
            wheels: vec![
                Wheel {
                    wheel: ABILITY_WHEEL.to_string(),
                    slots: vec![
                        slot("north", ["ally", "shield", "target"], "Shield ally"),
                        slot("east", ["forge", "craft", "tempo"], "Fast forge"),
                        slot("south", ["dream", "deliver", "idea"], "Dream drop"),
                        slot("west", ["scout", "probe", "signal"], "Scout ping"),
                    ],
                },
                Wheel {
                    wheel: COMM_WHEEL.to_string(),
                    slots: vec![
                        slot("ping", ["ally", "deliver", "risk"], "Danger ping"),
                        slot("revive_ping", ["ally", "deliver", "rise"], "Revive call"),
                        slot("fallback", ["ally", "deliver", "fallback"], "Fallback signal"),
                    ],
                },
            ],
        }
    }
}

impl WheelBindings {
    pub fn wheel(&self, wheel: &str) -> Option<&Wheel> {
        self.wheels.iter().find(|w| w.wheel == wheel)
    }

    pub fn slot(&self, wheel: &str, slot: &str) -> Option<&WheelSlot> {
        self.wheel(wheel)?.slots.iter().find(|s| s.slot == slot)
    }

    /// Input source reported for commands fired from `wheel`
    pub fn source_for(wheel: &str) -> &'static str {
        if wheel == ABILITY_WHEEL {
            SOURCE_QUICK_CAST
        } else {
            SOURCE_TEXTLESS_COMM
        }
    }
}
