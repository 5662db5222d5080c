//! FILENAME: core/scenario/src/lib.rs
//! PURPOSE: Main library entry point for the scenario schema.
//! CONTEXT: Re-exports the validated scenario type, its field domains, the
//! validation error, and the engine slot mapping.

pub mod mapping;
pub mod scenario;
pub mod validate;

// Re-export commonly used types at the crate root
pub use mapping::{SlotId, SlotValue, SlotWrite, INPUT_SLOTS};
pub use scenario::{
    BuildYear, FurnaceEfficiency, HeatPumpUnit, PriceOutlook, Scenario,
    DEFAULT_HEAT_PUMP_INSTALL_ESTIMATE, DEFAULT_HEF_UPGRADE_ESTIMATE,
    DEFAULT_SOLAR_PV_INSTALL_ESTIMATE,
};
pub use validate::ValidationError;
