//! FILENAME: core/scenario/src/mapping.rs
//! PURPOSE: Declarative mapping from scenario fields to engine input slots.
//! CONTEXT: The calculation engine exposes nine named input slots (A1-style
//! cell references). Which field lands in which slot, and in what order the
//! writes happen, is a versioned contract with the engine artifact; changing
//! the artifact means updating this table and the output region together.

use serde::Serialize;

use crate::scenario::{FurnaceEfficiency, Scenario};

/// A named input location in the engine's model.
pub type SlotId = &'static str;

/// The nine input slots, in write order.
pub const INPUT_SLOTS: [SlotId; 9] = ["G2", "G4", "G5", "G6", "N3", "N4", "N5", "N6", "N7"];

/// A scenario field value coerced to the engine's primitive type.
/// Serializes untagged so a write carries a bare JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    Integer(u32),
    Number(f64),
    Text(&'static str),
}

/// An instruction to set one engine input slot to one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotWrite {
    pub slot: SlotId,
    pub value: SlotValue,
}

impl FurnaceEfficiency {
    /// The verbatim value written to the engine: the "unknown" literal or
    /// the numeric efficiency.
    fn slot_value(&self) -> SlotValue {
        match self {
            FurnaceEfficiency::Unknown => SlotValue::Text(FurnaceEfficiency::UNKNOWN_LABEL),
            FurnaceEfficiency::Percent80 => SlotValue::Number(0.8),
            FurnaceEfficiency::Percent92 => SlotValue::Number(0.92),
            FurnaceEfficiency::Percent97 => SlotValue::Number(0.97),
        }
    }
}

impl Scenario {
    /// Converts this scenario into the nine slot writes, in the fixed order
    /// of `INPUT_SLOTS`. Total for every scenario; no validation happens
    /// here because a `Scenario` is valid by construction.
    pub fn slot_writes(&self) -> [SlotWrite; 9] {
        [
            SlotWrite {
                slot: "G2",
                value: SlotValue::Text(self.build_year.label()),
            },
            SlotWrite {
                slot: "G4",
                value: SlotValue::Integer(self.size_of_home),
            },
            SlotWrite {
                slot: "G5",
                value: self.furnace_efficiency.slot_value(),
            },
            SlotWrite {
                slot: "G6",
                value: SlotValue::Text(self.heat_pump.label()),
            },
            SlotWrite {
                slot: "N3",
                value: SlotValue::Integer(self.hef_upgrade_estimate),
            },
            SlotWrite {
                slot: "N4",
                value: SlotValue::Integer(self.heat_pump_install_estimate),
            },
            SlotWrite {
                slot: "N5",
                value: SlotValue::Integer(self.solar_pv_install_estimate),
            },
            SlotWrite {
                slot: "N6",
                value: SlotValue::Text(self.natural_gas_cost.label()),
            },
            SlotWrite {
                slot: "N7",
                value: SlotValue::Text(self.electricity_cost.label()),
            },
        ]
    }
}
